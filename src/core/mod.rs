//! Core business logic module
//!
//! This module contains the circulation components:
//! - `inventory` - Copy-counter ledger over the catalog
//! - `reservation_queue` - Per-book FIFO reservation queue
//! - `member_directory` - Keyed store of member state
//! - `issue_ledger` - Loan records and reporting queries
//! - `engine` - Circulation orchestration (issue, return, renew, reserve)
//! - `library` - Engine bound to durable snapshot storage

pub mod engine;
pub mod inventory;
pub mod issue_ledger;
pub mod library;
pub mod member_directory;
pub mod reservation_queue;

pub use engine::{BookCirculation, CirculationEngine};
pub use inventory::Inventory;
pub use issue_ledger::IssueLedger;
pub use library::Library;
pub use member_directory::MemberDirectory;
pub use reservation_queue::ReservationQueue;
