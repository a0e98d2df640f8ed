//! Member directory
//!
//! This module provides the `MemberDirectory` struct which maintains the
//! state of all registered members. Eligibility and fine logic live on
//! [`Member`] itself; the directory is the keyed store the engine reads
//! and writes through.

use crate::types::{Member, MemberId};
use std::collections::HashMap;

/// Keyed store of all registered members
pub struct MemberDirectory {
    /// Map of member IDs to member state
    members: HashMap<MemberId, Member>,
}

impl MemberDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        MemberDirectory {
            members: HashMap::new(),
        }
    }

    /// Insert or replace a member record
    pub fn upsert(&mut self, member: Member) {
        self.members.insert(member.id, member);
    }

    /// Get a member by ID
    pub fn get(&self, member: MemberId) -> Option<&Member> {
        self.members.get(&member)
    }

    /// Get a mutable member by ID
    pub fn get_mut(&mut self, member: MemberId) -> Option<&mut Member> {
        self.members.get_mut(&member)
    }

    /// Whether a member record exists for this ID
    pub fn contains(&self, member: MemberId) -> bool {
        self.members.contains_key(&member)
    }

    /// All members sorted by member ID
    ///
    /// Sorted output keeps snapshot files and reports deterministic.
    pub fn all_members(&self) -> Vec<&Member> {
        let mut members: Vec<&Member> = self.members.values().collect();
        members.sort_by_key(|member| member.id);
        members
    }
}

impl Default for MemberDirectory {
    fn default() -> Self {
        Self::new()
    }
}
