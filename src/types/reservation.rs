//! Reservation type for the circulation engine
//!
//! A reservation is identified by its (member, book) pair; a member may
//! hold at most one reservation per book. Queue ordering is maintained by
//! the reservation queue, not by this record.

use crate::types::{BookId, MemberId};
use chrono::NaiveDate;

/// One pending or copy-holding reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reservation {
    /// The reserving member
    pub member: MemberId,

    /// The reserved book
    pub book: BookId,

    /// Date the reservation was placed
    pub reserved_on: NaiveDate,
}

impl Reservation {
    /// Create a reservation
    pub fn new(member: MemberId, book: BookId, reserved_on: NaiveDate) -> Self {
        Reservation {
            member,
            book,
            reserved_on,
        }
    }
}
