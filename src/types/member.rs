//! Member-related types for the circulation engine
//!
//! This module defines the member record, its category and status tags,
//! and the eligibility and fine rules evaluated against the policy table.
//! Counter adjustments (`record_borrow` / `record_return` /
//! `record_renewal`) are guarded no-ops: callers must check eligibility
//! explicitly before relying on their side effects.

use crate::types::policy::{renewal_fine_rule, LoanPolicy};
use crate::types::CirculationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Member identifier
pub type MemberId = u64;

/// Membership category, the key into the policy table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberCategory {
    Student,
    Faculty,
    Regular,
}

impl FromStr for MemberCategory {
    type Err = std::convert::Infallible;

    /// Parse a category name, case-insensitively
    ///
    /// Unknown names map to [`MemberCategory::Regular`], the documented
    /// Regular-equivalent default of the policy table.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value.to_lowercase().as_str() {
            "student" => MemberCategory::Student,
            "faculty" => MemberCategory::Faculty,
            _ => MemberCategory::Regular,
        })
    }
}

impl fmt::Display for MemberCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MemberCategory::Student => "Student",
            MemberCategory::Faculty => "Faculty",
            MemberCategory::Regular => "Regular",
        };
        write!(f, "{}", name)
    }
}

/// Lifecycle status of a membership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberStatus {
    /// Full borrowing privileges
    Active,
    /// Privileges withdrawn, automatically while fines are at or above
    /// the category maximum
    Suspended,
    /// Membership lapsed; an administrative state the engine never sets
    Expired,
}

impl FromStr for MemberStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "active" => Ok(MemberStatus::Active),
            "suspended" => Ok(MemberStatus::Suspended),
            "expired" => Ok(MemberStatus::Expired),
            _ => Err(format!("Invalid member status: '{}'", value)),
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MemberStatus::Active => "Active",
            MemberStatus::Suspended => "Suspended",
            MemberStatus::Expired => "Expired",
        };
        write!(f, "{}", name)
    }
}

/// One registered member
///
/// Mutated by every circulation operation; never deleted by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    /// Unique member identifier
    pub id: MemberId,

    /// Full name (carried for reports; irrelevant to circulation rules)
    pub name: String,

    /// Contact address (carried for reports; irrelevant to circulation rules)
    pub email: String,

    /// Membership category, the key into the policy table
    pub category: MemberCategory,

    /// Current membership status
    pub status: MemberStatus,

    /// Number of books currently on loan to this member
    pub borrowed_count: u32,

    /// Outstanding fine balance
    pub fine_balance: Decimal,

    /// Number of renewals recorded against this member
    pub renewal_count: u32,
}

impl Member {
    /// Create a new active member with a clean slate
    pub fn new(id: MemberId, name: &str, email: &str, category: MemberCategory) -> Self {
        Member {
            id,
            name: name.to_string(),
            email: email.to_string(),
            category,
            status: MemberStatus::Active,
            borrowed_count: 0,
            fine_balance: Decimal::ZERO,
            renewal_count: 0,
        }
    }

    /// The loan policy for this member's category
    pub fn policy(&self) -> LoanPolicy {
        LoanPolicy::for_category(self.category)
    }

    /// Whether this member may borrow (or reserve) another book
    ///
    /// Requires, simultaneously: borrowed count below the category limit,
    /// Active status, fine balance at or below the category maximum, and
    /// renewal count at or below the renewal limit.
    pub fn can_borrow(&self) -> bool {
        let policy = self.policy();
        self.borrowed_count < policy.borrow_limit
            && self.status == MemberStatus::Active
            && self.fine_balance <= policy.max_fine
            && self.renewal_count <= policy.renewal_limit
    }

    /// Whether this member may renew a book
    ///
    /// Requires Active status, renewal count strictly below the limit,
    /// and the category's fine rule: Students must owe nothing, Faculty
    /// and Regular members must stay below half the maximum fine.
    pub fn can_renew(&self) -> bool {
        let policy = self.policy();
        self.status == MemberStatus::Active
            && self.renewal_count < policy.renewal_limit
            && renewal_fine_rule(self.category).permits(self.fine_balance, policy.max_fine)
    }

    /// Add a fine to the member's balance
    ///
    /// Suspends the membership when the new balance reaches the category
    /// maximum, keeping the suspension invariant: `status == Suspended`
    /// whenever `fine_balance >= max_fine`.
    ///
    /// # Errors
    ///
    /// Returns an error if the addition would overflow.
    pub fn apply_fine(&mut self, amount: Decimal) -> Result<(), CirculationError> {
        let new_balance = self
            .fine_balance
            .checked_add(amount)
            .ok_or_else(|| CirculationError::arithmetic_overflow("apply_fine"))?;

        self.fine_balance = new_balance;
        if self.fine_balance >= self.policy().max_fine {
            self.status = MemberStatus::Suspended;
        }

        Ok(())
    }

    /// Pay down the member's fine balance
    ///
    /// A suspended membership is reactivated once the balance drops below
    /// the category maximum.
    ///
    /// # Errors
    ///
    /// Returns [`CirculationError::InvalidPayment`] unless
    /// `0 < amount <= fine_balance`.
    pub fn pay_fine(&mut self, amount: Decimal) -> Result<(), CirculationError> {
        if amount <= Decimal::ZERO || amount > self.fine_balance {
            return Err(CirculationError::invalid_payment(
                self.id,
                amount,
                self.fine_balance,
            ));
        }

        self.fine_balance -= amount;
        if self.fine_balance < self.policy().max_fine && self.status == MemberStatus::Suspended {
            self.status = MemberStatus::Active;
        }

        Ok(())
    }

    /// Record a borrow; silently no-ops when [`Member::can_borrow`] is false
    pub fn record_borrow(&mut self) {
        if self.can_borrow() {
            self.borrowed_count += 1;
        }
    }

    /// Record a return; silently no-ops when nothing is on loan
    pub fn record_return(&mut self) {
        if self.borrowed_count > 0 {
            self.borrowed_count -= 1;
        }
    }

    /// Record a renewal; silently no-ops when [`Member::can_renew`] is false
    pub fn record_renewal(&mut self) {
        if self.can_renew() {
            self.renewal_count += 1;
        }
    }
}
