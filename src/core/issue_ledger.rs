//! Issue ledger
//!
//! This module provides the `IssueLedger` component that records every
//! loan, open or closed. The ledger is the source of truth for the
//! derived `issued` share of the copy-count invariant and for the
//! read-only reporting queries consumed by report collaborators:
//! overdue issues, total fines collected, and per-book issue counts.

use crate::types::{BookId, IssueId, IssueRecord, MemberId};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Append-only record of every loan
///
/// Closed records are kept for reporting; only the open subset
/// participates in circulation decisions.
pub struct IssueLedger {
    /// All issue records in creation order
    issues: Vec<IssueRecord>,
    /// Next issue ID to allocate
    next_id: IssueId,
}

impl IssueLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        IssueLedger {
            issues: Vec::new(),
            next_id: 1,
        }
    }

    /// Rebuild the ledger from a snapshot
    ///
    /// ID allocation resumes above the highest recorded ID.
    pub fn from_records(issues: Vec<IssueRecord>) -> Self {
        let next_id = issues.iter().map(|i| i.id).max().unwrap_or(0) + 1;
        IssueLedger { issues, next_id }
    }

    /// Record a new open loan and return its ID
    ///
    /// Callers must have verified that no open record exists for the
    /// pair; the ledger itself only allocates and appends.
    pub fn create(
        &mut self,
        member: MemberId,
        book: BookId,
        issued_on: NaiveDate,
        due_on: NaiveDate,
    ) -> IssueId {
        let id = self.next_id;
        self.next_id += 1;
        self.issues
            .push(IssueRecord::new(id, member, book, issued_on, due_on));
        id
    }

    /// The open record for a (member, book) pair, if any
    ///
    /// At most one open record exists per pair; the uniqueness is
    /// enforced by the engine's already-issued validation.
    pub fn open_issue_for(&self, member: MemberId, book: BookId) -> Option<&IssueRecord> {
        self.issues
            .iter()
            .find(|i| i.member == member && i.book == book && i.is_open())
    }

    /// Mutable access to the open record for a (member, book) pair
    pub fn open_issue_mut(&mut self, member: MemberId, book: BookId) -> Option<&mut IssueRecord> {
        self.issues
            .iter_mut()
            .find(|i| i.member == member && i.book == book && i.is_open())
    }

    /// Number of copies of a book currently out on loan
    ///
    /// This is the derived `issuedCopies` term of the copy-count
    /// invariant.
    pub fn open_count_for_book(&self, book: BookId) -> u32 {
        self.issues
            .iter()
            .filter(|i| i.book == book && i.is_open())
            .count() as u32
    }

    /// Number of times a book has ever been issued
    pub fn issue_count_for_book(&self, book: BookId) -> usize {
        self.issues.iter().filter(|i| i.book == book).count()
    }

    /// Open records past their due date as of `today`
    pub fn overdue(&self, today: NaiveDate) -> Vec<&IssueRecord> {
        self.issues.iter().filter(|i| i.is_overdue(today)).collect()
    }

    /// Sum of fines recorded across all loans
    pub fn total_fines(&self) -> Decimal {
        self.issues.iter().map(|i| i.fine).sum()
    }

    /// All issue records in creation order
    pub fn all(&self) -> &[IssueRecord] {
        &self.issues
    }
}

impl Default for IssueLedger {
    fn default() -> Self {
        Self::new()
    }
}
