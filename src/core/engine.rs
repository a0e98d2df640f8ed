//! Circulation engine
//!
//! This module provides the `CirculationEngine` that orchestrates
//! circulation operations by coordinating the inventory ledger, the
//! reservation queue, the member directory, and the issue ledger.
//!
//! The engine enforces business rules such as:
//! - Member eligibility checks before issuing, reserving, and renewing
//! - FIFO reservation fairness (the oldest reservation has exclusive
//!   right to borrow the book next)
//! - At most one open issue per (member, book) pair
//! - Per-category overdue fines via the policy table
//!
//! # Transaction discipline
//!
//! Every operation is validate-then-commit: all failure conditions are
//! checked before the first mutation, and a failed operation leaves the
//! inventory, the reservation queue, the member directory, and the issue
//! ledger exactly as they were. There is no rollback path because nothing
//! is ever partially applied.
//!
//! # Invariant
//!
//! After every operation, for every physical book:
//! `total_copies == available_copies + reserved_copies + open issues`.
//! Violations are programming errors and trip a debug assertion.

use crate::core::inventory::Inventory;
use crate::core::issue_ledger::IssueLedger;
use crate::core::member_directory::MemberDirectory;
use crate::core::reservation_queue::ReservationQueue;
use crate::types::{
    fine_for, Book, BookId, CirculationError, IssueId, IssueRecord, Member, MemberId,
    OperationRecord, OperationType, Reservation,
};
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

/// Per-book circulation totals for reporting collaborators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookCirculation {
    /// The book the counts refer to
    pub book: BookId,
    /// Title, carried for report formatting
    pub title: String,
    /// Times the book has ever been issued
    pub issued_count: usize,
    /// Copies currently set aside for reservation holders
    pub reserved_count: u32,
}

/// Orchestrates issue, return, renew, and reservation operations
///
/// The engine is the only component with multi-entity write transactions:
/// the sub-ledgers own their own state but expose no mutation except
/// through the operations below, which keeps the counters from drifting
/// independently of issue and reservation state.
pub struct CirculationEngine {
    inventory: Inventory,
    members: MemberDirectory,
    reservations: ReservationQueue,
    issues: IssueLedger,
}

impl CirculationEngine {
    /// Create an engine with an empty library
    pub fn new() -> Self {
        CirculationEngine {
            inventory: Inventory::new(),
            members: MemberDirectory::new(),
            reservations: ReservationQueue::new(),
            issues: IssueLedger::new(),
        }
    }

    /// Rebuild an engine from snapshot collections
    pub fn from_parts(
        books: Vec<Book>,
        members: Vec<Member>,
        issues: Vec<IssueRecord>,
        reservations: Vec<Reservation>,
    ) -> Self {
        let mut inventory = Inventory::new();
        for book in books {
            inventory.upsert(book);
        }
        let mut directory = MemberDirectory::new();
        for member in members {
            directory.upsert(member);
        }
        CirculationEngine {
            inventory,
            members: directory,
            reservations: ReservationQueue::from_records(reservations),
            issues: IssueLedger::from_records(issues),
        }
    }

    /// Add or replace a catalog entry (catalog admin surface)
    pub fn add_book(&mut self, book: Book) {
        self.inventory.upsert(book);
    }

    /// Add or replace a member record (member admin surface)
    pub fn add_member(&mut self, member: Member) {
        self.members.upsert(member);
    }

    /// Get a catalog entry by ID
    pub fn book(&self, book: BookId) -> Option<&Book> {
        self.inventory.get(book)
    }

    /// Get a member by ID
    pub fn member(&self, member: MemberId) -> Option<&Member> {
        self.members.get(member)
    }

    /// All catalog entries, sorted by ID
    pub fn all_books(&self) -> Vec<&Book> {
        self.inventory.all_books()
    }

    /// All members, sorted by ID
    pub fn all_members(&self) -> Vec<&Member> {
        self.members.all_members()
    }

    /// All issue records in creation order
    pub fn all_issues(&self) -> &[IssueRecord] {
        self.issues.all()
    }

    /// All reservations in queue order
    pub fn all_reservations(&self) -> &[Reservation] {
        self.reservations.all()
    }

    /// Apply one parsed operation record
    ///
    /// Routes the record to the matching typed operation. Records missing
    /// a required field are rejected; the conversion layer normally
    /// guarantees presence.
    pub fn apply(&mut self, record: &OperationRecord) -> Result<(), CirculationError> {
        match record.op {
            OperationType::Issue => {
                let book = required_book(record)?;
                self.issue(record.member, book, record.date).map(|_| ())
            }
            OperationType::Return => {
                let book = required_book(record)?;
                self.return_book(record.member, book, record.date).map(|_| ())
            }
            OperationType::Renew => {
                let book = required_book(record)?;
                self.renew(record.member, book)
            }
            OperationType::Reserve => {
                let book = required_book(record)?;
                self.reserve(record.member, book, record.date)
            }
            OperationType::Cancel => {
                let book = required_book(record)?;
                self.cancel_reservation(record.member, book)
            }
            OperationType::PayFine => {
                let amount = record.amount.ok_or_else(|| CirculationError::ParseError {
                    line: None,
                    message: format!("payfine for member {} requires an amount", record.member),
                })?;
                self.pay_fine(record.member, amount)
            }
        }
    }

    /// Issue a book to a member
    ///
    /// Validations, in order: the member exists and may borrow; the book
    /// exists; no open issue exists for the pair; the book's oldest
    /// reservation (if any) belongs to this member; a copy is obtainable.
    /// A fulfilled reservation consumes its held copy; otherwise an
    /// available copy is taken. The new loan falls due one loan period
    /// after `date`.
    ///
    /// # Errors
    ///
    /// [`CirculationError::MemberNotFound`], [`CirculationError::NotEligible`],
    /// [`CirculationError::BookNotFound`], [`CirculationError::AlreadyIssuedToMember`],
    /// [`CirculationError::ReservedByAnother`], [`CirculationError::NoCopyAvailable`]
    pub fn issue(
        &mut self,
        member: MemberId,
        book: BookId,
        date: NaiveDate,
    ) -> Result<IssueId, CirculationError> {
        let member_record = self
            .members
            .get(member)
            .ok_or_else(|| CirculationError::member_not_found(member))?;
        if !member_record.can_borrow() {
            return Err(CirculationError::not_eligible(member, "borrow"));
        }
        let loan_days = member_record.policy().loan_days;

        let book_record = self
            .inventory
            .get(book)
            .ok_or_else(|| CirculationError::book_not_found(book))?;

        if self.issues.open_issue_for(member, book).is_some() {
            return Err(CirculationError::already_issued(member, book));
        }

        // FIFO fairness: only the oldest reserver may take the book.
        let fulfills_reservation = match self.reservations.first_for_book(book) {
            Some(first) if first.member != member => {
                return Err(CirculationError::reserved_by_another(book, first.member));
            }
            Some(_) => true,
            None => false,
        };

        // The oldest reservation holds a copy whenever any copy is held.
        let from_reserved =
            fulfills_reservation && book_record.reserved_copies().unwrap_or(0) > 0;
        if book_record.has_finite_copies()
            && !from_reserved
            && book_record.available_copies().unwrap_or(0) == 0
        {
            return Err(CirculationError::no_copy_available(book));
        }

        let due_on = date
            .checked_add_days(Days::new(loan_days))
            .ok_or_else(|| CirculationError::date_out_of_range("issue"))?;

        // Commit: every validation has passed.
        if fulfills_reservation {
            self.reservations.remove(member, book);
        }
        self.inventory.issue_copy(book, from_reserved)?;
        let issue_id = self.issues.create(member, book, date, due_on);
        self.members
            .get_mut(member)
            .ok_or_else(|| CirculationError::member_not_found(member))?
            .record_borrow();

        self.assert_copy_count_invariant();
        Ok(issue_id)
    }

    /// Return a book, charging any overdue fine
    ///
    /// Closes the pair's open issue, computes the days past due and the
    /// category fine, adds it to the issue record and the member's
    /// balance (which may suspend the membership), restocks the copy, and
    /// converts it to a held copy if pending reservations are waiting.
    /// Returns the fine charged.
    ///
    /// # Errors
    ///
    /// [`CirculationError::MemberNotFound`], [`CirculationError::BookNotFound`],
    /// [`CirculationError::NotCurrentlyIssued`] (including a second return
    /// of the same loan, which therefore cannot double-charge)
    pub fn return_book(
        &mut self,
        member: MemberId,
        book: BookId,
        date: NaiveDate,
    ) -> Result<Decimal, CirculationError> {
        let member_record = self
            .members
            .get(member)
            .ok_or_else(|| CirculationError::member_not_found(member))?;
        let category = member_record.category;

        if !self.inventory.contains(book) {
            return Err(CirculationError::book_not_found(book));
        }

        let issue = self
            .issues
            .open_issue_for(member, book)
            .ok_or_else(|| CirculationError::not_currently_issued(member, book))?;

        let fine = fine_for(category, issue.days_overdue(date));

        // Pre-check the additions so the commit below cannot fail.
        let new_issue_fine = issue
            .fine
            .checked_add(fine)
            .ok_or_else(|| CirculationError::arithmetic_overflow("return_book"))?;
        member_record
            .fine_balance
            .checked_add(fine)
            .ok_or_else(|| CirculationError::arithmetic_overflow("return_book"))?;

        // Commit: every validation has passed.
        let issue = self
            .issues
            .open_issue_mut(member, book)
            .ok_or_else(|| CirculationError::not_currently_issued(member, book))?;
        issue.returned_on = Some(date);
        issue.fine = new_issue_fine;

        let member_record = self
            .members
            .get_mut(member)
            .ok_or_else(|| CirculationError::member_not_found(member))?;
        member_record.apply_fine(fine)?;
        member_record.record_return();

        self.inventory.return_copy(book)?;
        self.reconcile_pending(book)?;

        self.assert_copy_count_invariant();
        Ok(fine)
    }

    /// Renew an open loan, extending its due date by one loan period
    ///
    /// The extension is measured from the current due date, not from the
    /// renewal date. If the member somehow holds a reservation for the
    /// book they are renewing (legacy imports can contain one), it is
    /// removed and its held copy released, since a renewal consumes no
    /// new copy.
    ///
    /// # Errors
    ///
    /// [`CirculationError::MemberNotFound`], [`CirculationError::NotEligible`],
    /// [`CirculationError::BookNotFound`], [`CirculationError::ReservedByAnother`],
    /// [`CirculationError::NotCurrentlyIssued`]
    pub fn renew(&mut self, member: MemberId, book: BookId) -> Result<(), CirculationError> {
        let member_record = self
            .members
            .get(member)
            .ok_or_else(|| CirculationError::member_not_found(member))?;
        if !member_record.can_renew() {
            return Err(CirculationError::not_eligible(member, "renew"));
        }
        let loan_days = member_record.policy().loan_days;

        let book_record = self
            .inventory
            .get(book)
            .ok_or_else(|| CirculationError::book_not_found(book))?;

        let own_reservation = match self.reservations.first_for_book(book) {
            Some(first) if first.member != member => {
                return Err(CirculationError::reserved_by_another(book, first.member));
            }
            Some(_) => true,
            None => false,
        };
        let held = own_reservation && book_record.reserved_copies().unwrap_or(0) > 0;

        let issue = self
            .issues
            .open_issue_for(member, book)
            .ok_or_else(|| CirculationError::not_currently_issued(member, book))?;
        let new_due = issue
            .due_on
            .checked_add_days(Days::new(loan_days))
            .ok_or_else(|| CirculationError::date_out_of_range("renew"))?;

        // Commit: every validation has passed.
        if own_reservation {
            self.reservations.remove(member, book);
            if held {
                self.inventory.release_reserved_copy(book)?;
                self.reconcile_pending(book)?;
            }
        }
        self.issues
            .open_issue_mut(member, book)
            .ok_or_else(|| CirculationError::not_currently_issued(member, book))?
            .due_on = new_due;
        self.members
            .get_mut(member)
            .ok_or_else(|| CirculationError::member_not_found(member))?
            .record_renewal();

        self.assert_copy_count_invariant();
        Ok(())
    }

    /// Queue a reservation for a book
    ///
    /// Reservation requires the same base eligibility as borrowing.
    /// Queuing ahead of availability is allowed: when a copy is on the
    /// shelf it is set aside for the reserver, otherwise the reservation
    /// waits (pending) until a return frees one. A member cannot reserve
    /// a book they currently hold.
    ///
    /// # Errors
    ///
    /// [`CirculationError::MemberNotFound`], [`CirculationError::NotEligible`],
    /// [`CirculationError::BookNotFound`], [`CirculationError::AlreadyIssuedToMember`],
    /// [`CirculationError::DuplicateReservation`]
    pub fn reserve(
        &mut self,
        member: MemberId,
        book: BookId,
        date: NaiveDate,
    ) -> Result<(), CirculationError> {
        let member_record = self
            .members
            .get(member)
            .ok_or_else(|| CirculationError::member_not_found(member))?;
        if !member_record.can_borrow() {
            return Err(CirculationError::not_eligible(member, "reserve"));
        }

        let book_record = self
            .inventory
            .get(book)
            .ok_or_else(|| CirculationError::book_not_found(book))?;

        if self.issues.open_issue_for(member, book).is_some() {
            return Err(CirculationError::already_issued(member, book));
        }
        if self.reservations.contains(member, book) {
            return Err(CirculationError::duplicate_reservation(member, book));
        }

        let set_aside = book_record.available_copies().unwrap_or(0) > 0;

        // Commit: every validation has passed.
        if set_aside {
            self.inventory.reserve_copy(book)?;
        }
        self.reservations.reserve(member, book, date)?;

        self.assert_copy_count_invariant();
        Ok(())
    }

    /// Cancel a member's reservation for a book
    ///
    /// A held copy goes back on the shelf, then to the next pending
    /// reservation if one is waiting.
    ///
    /// # Errors
    ///
    /// [`CirculationError::MemberNotFound`],
    /// [`CirculationError::ReservationNotFound`]
    pub fn cancel_reservation(
        &mut self,
        member: MemberId,
        book: BookId,
    ) -> Result<(), CirculationError> {
        if !self.members.contains(member) {
            return Err(CirculationError::member_not_found(member));
        }
        let position = self
            .reservations
            .position_for(member, book)
            .ok_or_else(|| CirculationError::reservation_not_found(member, book))?;

        // Held copies map to queue positions in FIFO order.
        let reserved_copies = self
            .inventory
            .get(book)
            .and_then(|b| b.reserved_copies())
            .unwrap_or(0);
        let held = (position as u32) < reserved_copies;

        // Commit: every validation has passed.
        self.reservations.remove(member, book);
        if held {
            self.inventory.release_reserved_copy(book)?;
            self.reconcile_pending(book)?;
        }

        self.assert_copy_count_invariant();
        Ok(())
    }

    /// Pay down a member's fine balance
    ///
    /// A suspended membership reactivates once the balance drops below
    /// the category maximum.
    ///
    /// # Errors
    ///
    /// [`CirculationError::MemberNotFound`],
    /// [`CirculationError::InvalidPayment`]
    pub fn pay_fine(&mut self, member: MemberId, amount: Decimal) -> Result<(), CirculationError> {
        self.members
            .get_mut(member)
            .ok_or_else(|| CirculationError::member_not_found(member))?
            .pay_fine(amount)
    }

    /// Open issues past their due date as of `today`
    pub fn overdue_issues(&self, today: NaiveDate) -> Vec<&IssueRecord> {
        self.issues.overdue(today)
    }

    /// Members holding at least one overdue book as of `today`
    pub fn members_with_overdue(&self, today: NaiveDate) -> Vec<MemberId> {
        let mut members: Vec<MemberId> =
            self.issues.overdue(today).iter().map(|i| i.member).collect();
        members.sort_unstable();
        members.dedup();
        members
    }

    /// Sum of fines recorded across all loans
    pub fn total_fines_collected(&self) -> Decimal {
        self.issues.total_fines()
    }

    /// Per-book issue and reservation counts, most-issued first
    pub fn circulation_counts(&self) -> Vec<BookCirculation> {
        let mut counts: Vec<BookCirculation> = self
            .inventory
            .all_books()
            .into_iter()
            .map(|book| BookCirculation {
                book: book.id,
                title: book.title.clone(),
                issued_count: self.issues.issue_count_for_book(book.id),
                reserved_count: book.reserved_copies().unwrap_or(0),
            })
            .collect();
        counts.sort_by(|a, b| b.issued_count.cmp(&a.issued_count).then(a.book.cmp(&b.book)));
        counts
    }

    /// Convert freed copies into held copies while reservations wait
    fn reconcile_pending(&mut self, book: BookId) -> Result<(), CirculationError> {
        let reserved = match self.inventory.get(book).and_then(|b| b.reserved_copies()) {
            Some(reserved) => reserved,
            None => return Ok(()),
        };
        let pending = self.reservations.pending_for_book(book, reserved);
        if pending > 0 {
            self.inventory.reconcile_reservations(book, pending)?;
        }
        Ok(())
    }

    /// Debug-check the copy-count invariant over the whole inventory
    fn assert_copy_count_invariant(&self) {
        #[cfg(debug_assertions)]
        for book in self.inventory.all_books() {
            if let (Some(total), Some(available), Some(reserved)) = (
                book.total_copies(),
                book.available_copies(),
                book.reserved_copies(),
            ) {
                let issued = self.issues.open_count_for_book(book.id);
                debug_assert_eq!(
                    total,
                    available + reserved + issued,
                    "copy-count invariant violated for book {}: total {} != available {} + reserved {} + issued {}",
                    book.id,
                    total,
                    available,
                    reserved,
                    issued
                );
            }
        }
    }
}

impl Default for CirculationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the book ID an operation requires
fn required_book(record: &OperationRecord) -> Result<BookId, CirculationError> {
    record.book.ok_or_else(|| CirculationError::ParseError {
        line: None,
        message: format!("{:?} for member {} requires a book", record.op, record.member),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BookCategory, MemberCategory, MemberStatus};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    /// Engine with one two-copy physical book (42) and three students
    fn engine_with_students() -> CirculationEngine {
        let mut engine = CirculationEngine::new();
        engine.add_book(Book::physical(
            42,
            "A Wizard of Earthsea",
            "Ursula K. Le Guin",
            "Parnassus",
            1968,
            BookCategory::Fiction,
            2,
        ));
        for (id, name) in [(1001, "Asha"), (1002, "Bilal"), (1003, "Chitra")] {
            engine.add_member(Member::new(id, name, "member@example.edu", MemberCategory::Student));
        }
        engine
    }

    fn available(engine: &CirculationEngine, book: BookId) -> u32 {
        engine.book(book).unwrap().available_copies().unwrap()
    }

    fn reserved(engine: &CirculationEngine, book: BookId) -> u32 {
        engine.book(book).unwrap().reserved_copies().unwrap()
    }

    // === Issue ===

    #[test]
    fn test_issue_decrements_available_and_records_loan() {
        let mut engine = engine_with_students();

        engine.issue(1001, 42, date(1)).unwrap();

        assert_eq!(available(&engine, 42), 1);
        let issue = engine.all_issues().last().unwrap();
        assert!(issue.is_open());
        assert_eq!(issue.due_on, date(6)); // 5-day loan period
        assert_eq!(engine.member(1001).unwrap().borrowed_count, 1);
    }

    #[test]
    fn test_issue_unknown_member_fails() {
        let mut engine = engine_with_students();
        let result = engine.issue(9999, 42, date(1));
        assert_eq!(result, Err(CirculationError::member_not_found(9999)));
    }

    #[test]
    fn test_issue_unknown_book_fails() {
        let mut engine = engine_with_students();
        let result = engine.issue(1001, 99, date(1));
        assert_eq!(result, Err(CirculationError::book_not_found(99)));
    }

    #[test]
    fn test_issue_to_ineligible_member_fails() {
        let mut engine = engine_with_students();
        let mut suspended = engine.member(1001).unwrap().clone();
        suspended.status = MemberStatus::Suspended;
        engine.add_member(suspended);

        let result = engine.issue(1001, 42, date(1));

        assert!(matches!(result, Err(CirculationError::NotEligible { .. })));
        assert_eq!(available(&engine, 42), 2); // untouched
    }

    #[test]
    fn test_issue_same_pair_twice_fails() {
        let mut engine = engine_with_students();
        engine.issue(1001, 42, date(1)).unwrap();

        let result = engine.issue(1001, 42, date(2));

        assert_eq!(result, Err(CirculationError::already_issued(1001, 42)));
        assert_eq!(available(&engine, 42), 1); // second issue took nothing
    }

    #[test]
    fn test_scenario_a_two_copies_three_borrowers() {
        let mut engine = engine_with_students();

        engine.issue(1001, 42, date(1)).unwrap();
        assert_eq!(available(&engine, 42), 1);
        assert_eq!(engine.member(1001).unwrap().borrowed_count, 1);

        engine.issue(1002, 42, date(1)).unwrap();
        assert_eq!(available(&engine, 42), 0);

        let result = engine.issue(1003, 42, date(1));
        assert_eq!(result, Err(CirculationError::no_copy_available(42)));
        assert_eq!(engine.member(1003).unwrap().borrowed_count, 0);
    }

    #[test]
    fn test_issue_digital_book_never_runs_out() {
        let mut engine = engine_with_students();
        engine.add_book(Book::digital(
            7,
            "The Dispossessed",
            "Ursula K. Le Guin",
            "Harper & Row",
            1974,
            BookCategory::Fiction,
        ));

        engine.issue(1001, 7, date(1)).unwrap();
        engine.issue(1002, 7, date(1)).unwrap();
        engine.issue(1003, 7, date(1)).unwrap();

        assert_eq!(engine.all_issues().len(), 3);
    }

    // === Return and fines ===

    #[test]
    fn test_return_on_time_charges_nothing() {
        let mut engine = engine_with_students();
        engine.issue(1001, 42, date(1)).unwrap();

        let fine = engine.return_book(1001, 42, date(5)).unwrap();

        assert_eq!(fine, Decimal::ZERO);
        assert_eq!(available(&engine, 42), 2);
        assert_eq!(engine.member(1001).unwrap().borrowed_count, 0);
        assert!(engine.all_issues()[0].returned_on.is_some());
    }

    #[test]
    fn test_scenario_b_student_fine_after_grace() {
        let mut engine = engine_with_students();
        // Issued on the 1st, due on the 6th; returned 10 days after issue
        engine.issue(1001, 42, date(1)).unwrap();

        let fine = engine.return_book(1001, 42, date(11)).unwrap();

        // 5 days overdue, 3-day grace, 2 chargeable days at 2.00
        assert_eq!(fine, Decimal::new(400, 2));
        assert_eq!(engine.member(1001).unwrap().fine_balance, Decimal::new(400, 2));
        assert_eq!(engine.all_issues()[0].fine, Decimal::new(400, 2));
        assert_eq!(engine.total_fines_collected(), Decimal::new(400, 2));
    }

    #[test]
    fn test_return_of_unissued_book_fails() {
        let mut engine = engine_with_students();
        // Put one copy on loan so the counters have something to corrupt
        engine.issue(1002, 42, date(1)).unwrap();

        let result = engine.return_book(1001, 42, date(2));

        assert_eq!(result, Err(CirculationError::not_currently_issued(1001, 42)));
        assert_eq!(available(&engine, 42), 1);
    }

    #[test]
    fn test_second_return_fails_without_double_charge() {
        let mut engine = engine_with_students();
        engine.issue(1001, 42, date(1)).unwrap();
        engine.return_book(1001, 42, date(11)).unwrap();
        let balance_after_first = engine.member(1001).unwrap().fine_balance;

        let result = engine.return_book(1001, 42, date(20));

        assert_eq!(result, Err(CirculationError::not_currently_issued(1001, 42)));
        assert_eq!(engine.member(1001).unwrap().fine_balance, balance_after_first);
        assert_eq!(available(&engine, 42), 2);
    }

    #[test]
    fn test_heavy_fine_suspends_on_return() {
        let mut engine = engine_with_students();
        engine.issue(1001, 42, date(1)).unwrap();

        // 56 days late: 53 chargeable days at 2.00 = 106.00 >= 100.00 max
        let due = engine.all_issues()[0].due_on;
        let very_late = due.checked_add_days(Days::new(56)).unwrap();
        engine.return_book(1001, 42, very_late).unwrap();

        assert_eq!(engine.member(1001).unwrap().status, MemberStatus::Suspended);
    }

    // === Reservations ===

    #[test]
    fn test_reserve_with_available_copy_sets_one_aside() {
        let mut engine = engine_with_students();

        engine.reserve(1001, 42, date(1)).unwrap();

        assert_eq!(available(&engine, 42), 1);
        assert_eq!(reserved(&engine, 42), 1);
    }

    #[test]
    fn test_reserve_fully_loaned_book_queues_pending() {
        let mut engine = engine_with_students();
        engine.issue(1001, 42, date(1)).unwrap();
        engine.issue(1002, 42, date(1)).unwrap();

        engine.reserve(1003, 42, date(2)).unwrap();

        // No copy to set aside yet; the queue remembers the claim
        assert_eq!(available(&engine, 42), 0);
        assert_eq!(reserved(&engine, 42), 0);
        assert_eq!(engine.all_reservations().len(), 1);
    }

    #[test]
    fn test_duplicate_reservation_fails() {
        let mut engine = engine_with_students();
        engine.reserve(1001, 42, date(1)).unwrap();

        let result = engine.reserve(1001, 42, date(2));

        assert_eq!(result, Err(CirculationError::duplicate_reservation(1001, 42)));
        assert_eq!(reserved(&engine, 42), 1); // no second copy set aside
    }

    #[test]
    fn test_reserve_while_holding_the_book_fails() {
        let mut engine = engine_with_students();
        engine.issue(1001, 42, date(1)).unwrap();

        let result = engine.reserve(1001, 42, date(2));

        assert_eq!(result, Err(CirculationError::already_issued(1001, 42)));
    }

    #[test]
    fn test_fifo_fairness_blocks_later_member() {
        let mut engine = engine_with_students();
        engine.reserve(1001, 42, date(1)).unwrap();
        engine.reserve(1002, 42, date(2)).unwrap();

        // Member 1002 queued second; 1001's claim blocks them
        let result = engine.issue(1002, 42, date(3));

        assert_eq!(result, Err(CirculationError::reserved_by_another(42, 1001)));
    }

    #[test]
    fn test_issue_fulfills_own_reservation() {
        let mut engine = engine_with_students();
        engine.reserve(1001, 42, date(1)).unwrap();

        engine.issue(1001, 42, date(2)).unwrap();

        assert_eq!(reserved(&engine, 42), 0);
        assert_eq!(available(&engine, 42), 1);
        assert!(engine.all_reservations().is_empty());
    }

    #[test]
    fn test_scenario_c_reservation_on_loaned_single_copy() {
        let mut engine = engine_with_students();
        engine.add_book(Book::physical(
            43,
            "The Lathe of Heaven",
            "Ursula K. Le Guin",
            "Scribner",
            1971,
            BookCategory::Fiction,
            1,
        ));

        // The only copy is on loan to 1002
        engine.issue(1002, 43, date(1)).unwrap();
        engine.reserve(1001, 43, date(2)).unwrap();
        assert_eq!(reserved(&engine, 43), 0); // pending, no copy to hold yet

        // Return reconciles the freed copy into the reserved pool
        engine.return_book(1002, 43, date(3)).unwrap();
        assert_eq!(available(&engine, 43), 0);
        assert_eq!(reserved(&engine, 43), 1);

        // Only the reserver may take it, and doing so consumes the held copy
        assert_eq!(
            engine.issue(1003, 43, date(4)),
            Err(CirculationError::reserved_by_another(43, 1001))
        );
        engine.issue(1001, 43, date(4)).unwrap();
        assert_eq!(reserved(&engine, 43), 0);
        assert!(engine.all_reservations().is_empty());
    }

    #[test]
    fn test_cancel_releases_held_copy_to_next_in_queue() {
        let mut engine = engine_with_students();
        engine.issue(1001, 42, date(1)).unwrap(); // available: 1
        engine.reserve(1002, 42, date(2)).unwrap(); // held: available 0, reserved 1
        engine.reserve(1003, 42, date(3)).unwrap(); // pending

        engine.cancel_reservation(1002, 42).unwrap();

        // 1003's pending reservation inherits the freed copy
        assert_eq!(reserved(&engine, 42), 1);
        assert_eq!(available(&engine, 42), 0);
        assert_eq!(engine.all_reservations().len(), 1);
        assert_eq!(engine.all_reservations()[0].member, 1003);
    }

    #[test]
    fn test_cancel_missing_reservation_fails() {
        let mut engine = engine_with_students();
        let result = engine.cancel_reservation(1001, 42);
        assert_eq!(result, Err(CirculationError::reservation_not_found(1001, 42)));
    }

    #[test]
    fn test_reserve_requires_eligibility() {
        let mut engine = engine_with_students();
        let mut maxed = engine.member(1001).unwrap().clone();
        maxed.borrowed_count = 3;
        engine.add_member(maxed);

        let result = engine.reserve(1001, 42, date(1));

        assert!(matches!(result, Err(CirculationError::NotEligible { .. })));
        assert!(engine.all_reservations().is_empty());
    }

    // === Renew ===

    #[test]
    fn test_renew_extends_due_date_from_previous_due() {
        let mut engine = engine_with_students();
        engine.issue(1001, 42, date(1)).unwrap();

        engine.renew(1001, 42).unwrap();

        let issue = &engine.all_issues()[0];
        assert_eq!(issue.due_on, date(11)); // 6th + 5 days
        assert_eq!(engine.member(1001).unwrap().renewal_count, 1);
    }

    #[test]
    fn test_renew_without_open_issue_fails() {
        let mut engine = engine_with_students();
        let result = engine.renew(1001, 42);
        assert_eq!(result, Err(CirculationError::not_currently_issued(1001, 42)));
    }

    #[test]
    fn test_renew_blocked_by_another_members_reservation() {
        let mut engine = engine_with_students();
        engine.issue(1001, 42, date(1)).unwrap();
        engine.reserve(1002, 42, date(2)).unwrap();

        let result = engine.renew(1001, 42);

        assert_eq!(result, Err(CirculationError::reserved_by_another(42, 1002)));
        // The failed renewal must not have touched the reservation
        assert_eq!(engine.all_reservations().len(), 1);
    }

    #[test]
    fn test_scenario_d_renew_eligibility() {
        let mut engine = engine_with_students();
        engine.issue(1001, 42, date(1)).unwrap();

        // Any outstanding fine blocks a Student renewal
        engine
            .members
            .get_mut(1001)
            .unwrap()
            .apply_fine(Decimal::new(100, 2))
            .unwrap();
        assert!(matches!(
            engine.renew(1001, 42),
            Err(CirculationError::NotEligible { .. })
        ));

        // Clearing the fine but reaching the renewal limit also blocks
        engine.pay_fine(1001, Decimal::new(100, 2)).unwrap();
        engine.renew(1001, 42).unwrap();
        engine.renew(1001, 42).unwrap();
        assert!(matches!(
            engine.renew(1001, 42),
            Err(CirculationError::NotEligible { .. })
        ));
        assert_eq!(engine.member(1001).unwrap().renewal_count, 2);
    }

    #[test]
    fn test_renew_clears_own_stale_reservation() {
        // A legacy import may carry a reservation for a book the member
        // already holds; renewal removes it and releases the held copy.
        let books = vec![Book::physical(
            42,
            "A Wizard of Earthsea",
            "Ursula K. Le Guin",
            "Parnassus",
            1968,
            BookCategory::Fiction,
            2,
        )];
        let mut member = Member::new(1001, "Asha", "asha@example.edu", MemberCategory::Student);
        member.borrowed_count = 1;
        let issues = vec![IssueRecord::new(1, 1001, 42, date(1), date(6))];
        let reservations = vec![Reservation::new(1001, 42, date(2))];
        let mut engine = CirculationEngine::from_parts(
            {
                // Snapshot state: one copy issued, one held by the stale reservation
                let mut books = books;
                if let crate::types::BookFormat::Physical {
                    available_copies,
                    reserved_copies,
                    ..
                } = &mut books[0].format
                {
                    *available_copies = 0;
                    *reserved_copies = 1;
                }
                books
            },
            vec![member],
            issues,
            reservations,
        );

        engine.renew(1001, 42).unwrap();

        assert!(engine.all_reservations().is_empty());
        assert_eq!(available(&engine, 42), 1);
        assert_eq!(reserved(&engine, 42), 0);
        assert_eq!(engine.all_issues()[0].due_on, date(11));
    }

    // === Fine payment ===

    #[test]
    fn test_pay_fine_reduces_balance() {
        let mut engine = engine_with_students();
        engine.issue(1001, 42, date(1)).unwrap();
        engine.return_book(1001, 42, date(11)).unwrap(); // 4.00 fine

        engine.pay_fine(1001, Decimal::new(150, 2)).unwrap();

        assert_eq!(engine.member(1001).unwrap().fine_balance, Decimal::new(250, 2));
    }

    #[test]
    fn test_pay_fine_rejects_overpayment() {
        let mut engine = engine_with_students();
        engine.issue(1001, 42, date(1)).unwrap();
        engine.return_book(1001, 42, date(11)).unwrap(); // 4.00 fine

        let result = engine.pay_fine(1001, Decimal::new(1000, 2));

        assert!(matches!(result, Err(CirculationError::InvalidPayment { .. })));
        assert_eq!(engine.member(1001).unwrap().fine_balance, Decimal::new(400, 2));
    }

    // === Reporting ===

    #[test]
    fn test_overdue_report_and_members() {
        let mut engine = engine_with_students();
        engine.issue(1001, 42, date(1)).unwrap(); // due 6th
        engine.issue(1002, 42, date(3)).unwrap(); // due 8th

        let overdue = engine.overdue_issues(date(7));
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].member, 1001);
        assert_eq!(engine.members_with_overdue(date(7)), vec![1001]);
        assert_eq!(engine.members_with_overdue(date(9)), vec![1001, 1002]);
    }

    #[test]
    fn test_circulation_counts_sorted_by_popularity() {
        let mut engine = engine_with_students();
        engine.add_book(Book::physical(
            43,
            "The Lathe of Heaven",
            "Ursula K. Le Guin",
            "Scribner",
            1971,
            BookCategory::Fiction,
            1,
        ));

        engine.issue(1001, 43, date(1)).unwrap();
        engine.return_book(1001, 43, date(2)).unwrap();
        engine.issue(1002, 43, date(3)).unwrap();
        engine.issue(1003, 42, date(3)).unwrap();

        let counts = engine.circulation_counts();
        assert_eq!(counts[0].book, 43);
        assert_eq!(counts[0].issued_count, 2);
        assert_eq!(counts[1].book, 42);
        assert_eq!(counts[1].issued_count, 1);
    }

    // === Batch dispatch ===

    #[test]
    fn test_apply_routes_operations() {
        let mut engine = engine_with_students();

        engine
            .apply(&OperationRecord {
                op: OperationType::Issue,
                member: 1001,
                book: Some(42),
                date: date(1),
                amount: None,
            })
            .unwrap();
        engine
            .apply(&OperationRecord {
                op: OperationType::Return,
                member: 1001,
                book: Some(42),
                date: date(11),
                amount: None,
            })
            .unwrap();
        engine
            .apply(&OperationRecord {
                op: OperationType::PayFine,
                member: 1001,
                book: None,
                date: date(12),
                amount: Some(Decimal::new(400, 2)),
            })
            .unwrap();

        assert_eq!(engine.member(1001).unwrap().fine_balance, Decimal::ZERO);
    }

    #[test]
    fn test_apply_rejects_payfine_without_amount() {
        let mut engine = engine_with_students();

        let result = engine.apply(&OperationRecord {
            op: OperationType::PayFine,
            member: 1001,
            book: None,
            date: date(1),
            amount: None,
        });

        assert!(matches!(result, Err(CirculationError::ParseError { .. })));
    }
}
