//! Inventory ledger
//!
//! This module provides the `Inventory` struct which owns every catalog
//! entry and the copy-counter transitions on physical books. It is the
//! single place that dispatches on the book format: digital books answer
//! every counter operation with a successful no-op, so the engine never
//! needs format checks of its own.
//!
//! # Counter model
//!
//! A physical book's copies are split three ways: `available` (on the
//! shelf), `reserved` (set aside for reservation holders), and issued
//! (out on loan, derived from the issue ledger). The ledger enforces the
//! local bound `available + reserved <= total` on every transition; the
//! full copy-count invariant is asserted by the engine, which also sees
//! the open issues.

use crate::types::{Book, BookFormat, BookId, CirculationError};
use std::collections::HashMap;

/// Owns all catalog entries and their copy counters
///
/// Counters are mutated only through the operations below, which keeps
/// them from drifting independently of issue and reservation state.
pub struct Inventory {
    /// Map of book IDs to catalog entries
    books: HashMap<BookId, Book>,
}

impl Inventory {
    /// Create an empty inventory
    pub fn new() -> Self {
        Inventory {
            books: HashMap::new(),
        }
    }

    /// Insert or replace a catalog entry
    pub fn upsert(&mut self, book: Book) {
        self.books.insert(book.id, book);
    }

    /// Get a catalog entry by ID
    pub fn get(&self, book: BookId) -> Option<&Book> {
        self.books.get(&book)
    }

    /// Whether a catalog entry exists for this ID
    pub fn contains(&self, book: BookId) -> bool {
        self.books.contains_key(&book)
    }

    /// All catalog entries sorted by book ID
    ///
    /// Sorted output keeps snapshot files and reports deterministic.
    pub fn all_books(&self) -> Vec<&Book> {
        let mut books: Vec<&Book> = self.books.values().collect();
        books.sort_by_key(|book| book.id);
        books
    }

    /// Set one available copy aside for a reservation holder
    ///
    /// # Errors
    ///
    /// - [`CirculationError::BookNotFound`] if the ID is unknown
    /// - [`CirculationError::NoCopyAvailable`] if no copy is on the shelf
    pub fn reserve_copy(&mut self, book: BookId) -> Result<(), CirculationError> {
        self.with_physical(book, |id, total, available, reserved| {
            if *available == 0 {
                return Err(CirculationError::no_copy_available(id));
            }
            *available -= 1;
            *reserved += 1;
            debug_assert!(*available + *reserved <= total);
            Ok(())
        })
    }

    /// Hand one copy out on loan
    ///
    /// `from_reserved` selects the copy source: a fulfilled reservation
    /// consumes the copy set aside for it, any other issue consumes an
    /// available copy.
    ///
    /// # Errors
    ///
    /// - [`CirculationError::BookNotFound`] if the ID is unknown
    /// - [`CirculationError::NoCopyAvailable`] if the selected pool is empty
    pub fn issue_copy(&mut self, book: BookId, from_reserved: bool) -> Result<(), CirculationError> {
        self.with_physical(book, |id, total, available, reserved| {
            let pool = if from_reserved { &mut *reserved } else { &mut *available };
            if *pool == 0 {
                return Err(CirculationError::no_copy_available(id));
            }
            *pool -= 1;
            debug_assert!(*available + *reserved <= total);
            Ok(())
        })
    }

    /// Put one returned copy back on the shelf
    ///
    /// # Errors
    ///
    /// - [`CirculationError::BookNotFound`] if the ID is unknown
    /// - [`CirculationError::ArithmeticOverflow`] if the counters already
    ///   account for every owned copy (a programming error, not a user
    ///   condition)
    pub fn return_copy(&mut self, book: BookId) -> Result<(), CirculationError> {
        self.with_physical(book, |_, total, available, reserved| {
            let new_available = available
                .checked_add(1)
                .ok_or_else(|| CirculationError::arithmetic_overflow("return_copy"))?;
            if new_available + *reserved > total {
                return Err(CirculationError::arithmetic_overflow("return_copy"));
            }
            *available = new_available;
            Ok(())
        })
    }

    /// Release a copy held by a cancelled or fulfilled-by-renewal
    /// reservation back to the shelf
    ///
    /// # Errors
    ///
    /// - [`CirculationError::BookNotFound`] if the ID is unknown
    /// - [`CirculationError::ArithmeticOverflow`] if no copy is held
    ///   (callers must only release reservations that hold one)
    pub fn release_reserved_copy(&mut self, book: BookId) -> Result<(), CirculationError> {
        self.with_physical(book, |_, total, available, reserved| {
            if *reserved == 0 {
                return Err(CirculationError::arithmetic_overflow("release_reserved_copy"));
            }
            *reserved -= 1;
            *available += 1;
            debug_assert!(*available + *reserved <= total);
            Ok(())
        })
    }

    /// Convert freed copies into held copies for pending reservations
    ///
    /// Called after any operation that puts copies back on the shelf
    /// while the book still has queued reservations without a held copy.
    /// Converts up to `pending` copies; converting fewer (because fewer
    /// are available) is not an error.
    pub fn reconcile_reservations(
        &mut self,
        book: BookId,
        pending: u32,
    ) -> Result<(), CirculationError> {
        self.with_physical(book, |_, total, available, reserved| {
            let convert = (*available).min(pending);
            *available -= convert;
            *reserved += convert;
            debug_assert!(*available + *reserved <= total);
            Ok(())
        })
    }

    /// Run a counter transition against a book, dispatching on format once
    ///
    /// Digital books succeed without touching anything; unknown IDs fail
    /// with `BookNotFound`.
    fn with_physical<F>(&mut self, book: BookId, f: F) -> Result<(), CirculationError>
    where
        F: FnOnce(BookId, u32, &mut u32, &mut u32) -> Result<(), CirculationError>,
    {
        let entry = self
            .books
            .get_mut(&book)
            .ok_or_else(|| CirculationError::book_not_found(book))?;

        match &mut entry.format {
            BookFormat::Physical {
                total_copies,
                available_copies,
                reserved_copies,
            } => f(book, *total_copies, available_copies, reserved_copies),
            BookFormat::Digital => Ok(()),
        }
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}
