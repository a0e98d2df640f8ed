//! Circulation Engine Library
//! # Overview
//!
//! This library implements a library circulation and inventory-consistency
//! engine: it decides whether a loan, renewal, return, or reservation may
//! proceed, computes overdue fines by member category, and keeps the
//! copy-count inventory consistent.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Book, Member, IssueRecord, policies, errors)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::engine`] - Circulation orchestration (issue, return, renew, reserve)
//!   - [`core::inventory`] - Copy-counter ledger over the catalog
//!   - [`core::reservation_queue`] - Per-book FIFO reservation queue
//!   - [`core::member_directory`] - Member state management
//!   - [`core::issue_ledger`] - Loan records and reporting queries
//!   - [`core::library`] - Engine bound to durable snapshot storage
//! - [`io`] - Operations parsing, snapshot persistence, bulk import/export
//! - [`strategy`] - Pluggable processing pipelines (sync and async reading)
//!
//! # Circulation Operations
//!
//! The engine supports six operations:
//!
//! - **Issue**: Lend a copy to a member (honoring reservation order)
//! - **Return**: Take a copy back, charging any overdue fine
//! - **Renew**: Extend an open loan by one loan period
//! - **Reserve**: Queue a FIFO reservation for a book
//! - **Cancel**: Drop a reservation, releasing any held copy
//! - **PayFine**: Settle part of a member's fine balance
//!
//! # Invariants
//!
//! - For every physical book: `total == available + reserved + issued`
//! - A member is suspended exactly while their fine balance is at or
//!   above their category's maximum
//! - At most one open issue exists per (member, book) pair
//! - The oldest reservation for a book has exclusive right to borrow it

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use crate::core::{BookCirculation, CirculationEngine, Library};
pub use crate::io::{CsvSnapshotStore, LibrarySnapshot, MemorySnapshotStore, SnapshotStore};
pub use crate::types::{
    Book, BookCategory, BookFormat, BookId, CirculationError, IssueId, IssueRecord, LoanPolicy,
    Member, MemberCategory, MemberId, MemberStatus, OperationRecord, OperationType, Reservation,
};
