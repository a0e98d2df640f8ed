//! Library session: the engine plus durable snapshots
//!
//! `Library` composes the circulation engine with a [`SnapshotStore`],
//! committing every mutating operation in memory first and then
//! persisting the whole-collection snapshot. A persistence failure is
//! surfaced as the failure of that operation; it is never swallowed,
//! because silently continuing would let the in-memory state diverge
//! from the durable snapshot.

use crate::core::engine::CirculationEngine;
use crate::io::snapshot::{LibrarySnapshot, SnapshotStore};
use crate::types::{Book, BookId, CirculationError, IssueId, Member, MemberId, OperationRecord};
use chrono::NaiveDate;
use rust_decimal::Decimal;

/// A circulation engine bound to durable storage
pub struct Library {
    engine: CirculationEngine,
    store: Box<dyn SnapshotStore>,
}

impl Library {
    /// Open a library from the store's most recent snapshot
    ///
    /// # Errors
    ///
    /// Propagates snapshot load and parse failures.
    pub fn open(store: Box<dyn SnapshotStore>) -> Result<Self, CirculationError> {
        let snapshot = store.load()?;
        let engine = CirculationEngine::from_parts(
            snapshot.books,
            snapshot.members,
            snapshot.issues,
            snapshot.reservations,
        );
        Ok(Library { engine, store })
    }

    /// Read-only access to the engine, for reporting queries
    pub fn engine(&self) -> &CirculationEngine {
        &self.engine
    }

    /// The current in-memory state as a snapshot
    pub fn snapshot(&self) -> LibrarySnapshot {
        LibrarySnapshot {
            books: self.engine.all_books().into_iter().cloned().collect(),
            members: self.engine.all_members().into_iter().cloned().collect(),
            issues: self.engine.all_issues().to_vec(),
            reservations: self.engine.all_reservations().to_vec(),
        }
    }

    /// Apply one parsed operation and persist the result
    pub fn apply(&mut self, record: &OperationRecord) -> Result<(), CirculationError> {
        self.engine.apply(record)?;
        self.persist()
    }

    /// Issue a book and persist
    pub fn issue(
        &mut self,
        member: MemberId,
        book: BookId,
        date: NaiveDate,
    ) -> Result<IssueId, CirculationError> {
        let id = self.engine.issue(member, book, date)?;
        self.persist()?;
        Ok(id)
    }

    /// Return a book and persist; yields the fine charged
    pub fn return_book(
        &mut self,
        member: MemberId,
        book: BookId,
        date: NaiveDate,
    ) -> Result<Decimal, CirculationError> {
        let fine = self.engine.return_book(member, book, date)?;
        self.persist()?;
        Ok(fine)
    }

    /// Renew a loan and persist
    pub fn renew(&mut self, member: MemberId, book: BookId) -> Result<(), CirculationError> {
        self.engine.renew(member, book)?;
        self.persist()
    }

    /// Reserve a book and persist
    pub fn reserve(
        &mut self,
        member: MemberId,
        book: BookId,
        date: NaiveDate,
    ) -> Result<(), CirculationError> {
        self.engine.reserve(member, book, date)?;
        self.persist()
    }

    /// Cancel a reservation and persist
    pub fn cancel_reservation(
        &mut self,
        member: MemberId,
        book: BookId,
    ) -> Result<(), CirculationError> {
        self.engine.cancel_reservation(member, book)?;
        self.persist()
    }

    /// Pay down a fine and persist
    pub fn pay_fine(&mut self, member: MemberId, amount: Decimal) -> Result<(), CirculationError> {
        self.engine.pay_fine(member, amount)?;
        self.persist()
    }

    /// Add or replace a catalog entry and persist
    pub fn add_book(&mut self, book: Book) -> Result<(), CirculationError> {
        self.engine.add_book(book);
        self.persist()
    }

    /// Add or replace a member record and persist
    pub fn add_member(&mut self, member: Member) -> Result<(), CirculationError> {
        self.engine.add_member(member);
        self.persist()
    }

    fn persist(&self) -> Result<(), CirculationError> {
        self.store.save(&self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::snapshot::MemorySnapshotStore;
    use crate::types::{BookCategory, MemberCategory};
    use std::sync::Arc;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    /// Store whose saves always fail, for exercising the persistence path
    struct BrokenSnapshotStore;

    impl SnapshotStore for BrokenSnapshotStore {
        fn load(&self) -> Result<LibrarySnapshot, CirculationError> {
            Ok(LibrarySnapshot::empty())
        }

        fn save(&self, _snapshot: &LibrarySnapshot) -> Result<(), CirculationError> {
            Err(CirculationError::snapshot("disk full"))
        }
    }

    /// Shared handle so the test can inspect what the library saved
    struct SharedStore(Arc<MemorySnapshotStore>);

    impl SnapshotStore for SharedStore {
        fn load(&self) -> Result<LibrarySnapshot, CirculationError> {
            self.0.load()
        }

        fn save(&self, snapshot: &LibrarySnapshot) -> Result<(), CirculationError> {
            self.0.save(snapshot)
        }
    }

    fn seeded_store() -> Arc<MemorySnapshotStore> {
        let snapshot = LibrarySnapshot {
            books: vec![Book::physical(
                42,
                "A Wizard of Earthsea",
                "Ursula K. Le Guin",
                "Parnassus",
                1968,
                BookCategory::Fiction,
                2,
            )],
            members: vec![Member::new(
                1001,
                "Asha Rao",
                "asha@example.edu",
                MemberCategory::Student,
            )],
            issues: vec![],
            reservations: vec![],
        };
        Arc::new(MemorySnapshotStore::with_snapshot(snapshot))
    }

    #[test]
    fn test_open_restores_state_from_snapshot() {
        let store = seeded_store();
        let library = Library::open(Box::new(SharedStore(store))).unwrap();

        assert!(library.engine().book(42).is_some());
        assert!(library.engine().member(1001).is_some());
    }

    #[test]
    fn test_every_commit_is_persisted() {
        let store = seeded_store();
        let mut library = Library::open(Box::new(SharedStore(Arc::clone(&store)))).unwrap();

        library.issue(1001, 42, date(1)).unwrap();

        let saved = store.current();
        assert_eq!(saved.issues.len(), 1);
        assert_eq!(saved.books[0].available_copies(), Some(1));
        assert_eq!(saved.members[0].borrowed_count, 1);
    }

    #[test]
    fn test_failed_operation_does_not_persist() {
        let store = seeded_store();
        let mut library = Library::open(Box::new(SharedStore(Arc::clone(&store)))).unwrap();

        // Unknown member: validation fails before any mutation
        assert!(library.issue(9999, 42, date(1)).is_err());

        assert!(store.current().issues.is_empty());
    }

    #[test]
    fn test_persistence_failure_surfaces_as_operation_failure() {
        let mut library = Library::open(Box::new(BrokenSnapshotStore)).unwrap();
        library
            .engine
            .add_member(Member::new(1001, "Asha", "asha@example.edu", MemberCategory::Student));
        library.engine.add_book(Book::physical(
            42,
            "A Wizard of Earthsea",
            "Ursula K. Le Guin",
            "Parnassus",
            1968,
            BookCategory::Fiction,
            1,
        ));

        let result = library.issue(1001, 42, date(1));

        assert!(matches!(result, Err(CirculationError::SnapshotError { .. })));
    }

    #[test]
    fn test_round_trip_through_reopen() {
        let store = seeded_store();
        {
            let mut library = Library::open(Box::new(SharedStore(Arc::clone(&store)))).unwrap();
            library.issue(1001, 42, date(1)).unwrap();
            library.return_book(1001, 42, date(11)).unwrap();
        }

        let reopened = Library::open(Box::new(SharedStore(store))).unwrap();
        let member = reopened.engine().member(1001).unwrap();

        assert_eq!(member.borrowed_count, 0);
        assert_eq!(member.fine_balance, Decimal::new(400, 2));
        assert_eq!(reopened.engine().total_fines_collected(), Decimal::new(400, 2));
    }
}
