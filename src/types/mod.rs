//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `book`: Catalog entries and format variants
//! - `member`: Members, categories, statuses, eligibility rules
//! - `issue`: Issue (loan) records
//! - `reservation`: Reservations
//! - `operation`: Batch-input operation records
//! - `policy`: The loan policy table and fine strategies
//! - `error`: Error types for the circulation engine

pub mod book;
pub mod error;
pub mod issue;
pub mod member;
pub mod operation;
pub mod policy;
pub mod reservation;

pub use book::{Book, BookCategory, BookFormat, BookId};
pub use error::CirculationError;
pub use issue::{IssueId, IssueRecord};
pub use member::{Member, MemberCategory, MemberId, MemberStatus};
pub use operation::{OperationRecord, OperationType};
pub use policy::{fine_for, renewal_fine_rule, LoanPolicy, RenewalFineRule};
pub use reservation::Reservation;
