//! I/O module
//!
//! Handles operations-file parsing, snapshot persistence, bulk
//! import/export, and report output.
//!
//! # Components
//!
//! - `record_format` - CSV format handling (row conversion, report serialization)
//! - `snapshot` - Whole-collection snapshot persistence (`SnapshotStore`)
//! - `import` - Line-oriented `key=value` bulk import/export
//! - `sync_reader` - Synchronous operations reader with iterator interface
//! - `async_reader` - Asynchronous operations reader with batch interface

pub mod async_reader;
pub mod import;
pub mod record_format;
pub mod snapshot;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use import::{export_book, export_issue, export_member, import_books, import_issues, import_members, ImportOutcome};
pub use record_format::{
    convert_operation_row, write_circulation_report, write_member_report, write_overdue_report,
    OperationRow,
};
pub use snapshot::{CsvSnapshotStore, LibrarySnapshot, MemorySnapshotStore, SnapshotStore};
pub use sync_reader::SyncReader;
