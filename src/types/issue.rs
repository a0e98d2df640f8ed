//! Issue-record types for the circulation engine
//!
//! An issue record is one loan: created when a book is issued, closed
//! when it is returned. A record is **open** while `returned_on` is
//! unset; at most one open record may exist per (member, book) pair.

use crate::types::{BookId, MemberId};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Issue record identifier
pub type IssueId = u64;

/// One loan of one book to one member
///
/// `fine` is the amount accrued against this loan; it is monotonically
/// non-decreasing and feeds the fine-collection report.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueRecord {
    /// Unique issue identifier
    pub id: IssueId,

    /// The borrowing member
    pub member: MemberId,

    /// The borrowed book
    pub book: BookId,

    /// Date the loan started
    pub issued_on: NaiveDate,

    /// Date the loan falls due; renewals push this forward
    pub due_on: NaiveDate,

    /// Date the book came back; `None` while the loan is open
    pub returned_on: Option<NaiveDate>,

    /// Fine accrued against this loan
    pub fine: Decimal,
}

impl IssueRecord {
    /// Create an open issue record with no accrued fine
    pub fn new(
        id: IssueId,
        member: MemberId,
        book: BookId,
        issued_on: NaiveDate,
        due_on: NaiveDate,
    ) -> Self {
        IssueRecord {
            id,
            member,
            book,
            issued_on,
            due_on,
            returned_on: None,
            fine: Decimal::ZERO,
        }
    }

    /// Whether the loan is still open (book not yet returned)
    pub fn is_open(&self) -> bool {
        self.returned_on.is_none()
    }

    /// Whether the loan is open and past due as of `today`
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_open() && self.due_on < today
    }

    /// Whole days past the due date as of `on`, never negative
    ///
    /// This is the raw overdue span; the grace window is applied by the
    /// per-category fine formula, not here.
    pub fn days_overdue(&self, on: NaiveDate) -> i64 {
        on.signed_duration_since(self.due_on).num_days().max(0)
    }
}
