//! Operation-record types for batch processing
//!
//! This module defines the parsed form of one row of the operations input
//! file. The amount field is optional because only fine payments carry an
//! amount, and the book field is optional because fine payments are not
//! tied to a book.

use crate::types::{BookId, MemberId};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Circulation operations accepted by the engine
///
/// Issue, Return, Renew, and Reserve are the four core transitions;
/// Cancel drops a reservation and PayFine settles part of a member's
/// fine balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationType {
    /// Lend a copy of a book to a member
    Issue,

    /// Take a lent copy back, charging any overdue fine
    Return,

    /// Extend an open loan's due date by one loan period
    Renew,

    /// Queue a reservation for a book
    Reserve,

    /// Cancel an outstanding reservation
    Cancel,

    /// Pay down a member's fine balance
    PayFine,
}

/// Input operation record from the operations file
///
/// Represents a single operation as read from the batch input. Field
/// presence is validated during conversion: every operation names a
/// member and a date; all but PayFine name a book; only PayFine carries
/// an amount.
#[derive(Debug, Clone)]
pub struct OperationRecord {
    /// The operation to perform
    pub op: OperationType,

    /// The member the operation applies to
    pub member: MemberId,

    /// The book the operation applies to; `None` for fine payments
    pub book: Option<BookId>,

    /// The calendar date the operation takes effect
    pub date: NaiveDate,

    /// Payment amount; `Some` only for fine payments
    pub amount: Option<Decimal>,
}
