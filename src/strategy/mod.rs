//! Processing strategy module for batch operation processing
//!
//! This module defines the Strategy pattern for complete processing
//! pipelines: reading an operations file, applying every operation to
//! the library, and writing the selected report. It allows different
//! reading implementations (synchronous streaming, asynchronous batch)
//! to be selected at runtime.
//!
//! Whatever the reading strategy, operations are applied one at a time
//! and in file order: every operation is a single atomic transaction
//! over the inventory, the reservation queue, and the member directory,
//! so there is no partitioned parallel application.

use crate::cli::{ReportKind, StrategyType};
use crate::core::engine::CirculationEngine;
use crate::core::library::Library;
use crate::io::record_format::{
    write_circulation_report, write_member_report, write_overdue_report,
};
use crate::io::snapshot::{CsvSnapshotStore, MemorySnapshotStore, SnapshotStore};
use crate::types::{CirculationError, IssueRecord, Member};
use chrono::NaiveDate;
use std::io::Write;
use std::path::{Path, PathBuf};

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Inputs to one processing run
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Path to the operations CSV file
    pub input: PathBuf,

    /// Snapshot directory; `None` runs against an ephemeral in-memory
    /// library
    pub data_dir: Option<PathBuf>,

    /// Which report to write once every operation has been applied
    pub report: ReportKind,

    /// "Today" for overdue computations in reports
    pub today: NaiveDate,
}

/// Processing strategy trait for complete operation-processing pipelines
///
/// Each strategy must load the library snapshot, apply every operation
/// from the input file in order, and write the selected report to
/// output.
///
/// # Errors
///
/// Fatal errors (input file missing, snapshot load or write failure)
/// return `Err`. Individual operation rejections are logged to stderr
/// and processing continues with the next record.
pub trait ProcessingStrategy: Send + Sync {
    /// Process operations from the input file and write the report
    fn process(&self, options: &ProcessOptions, output: &mut dyn Write) -> Result<(), String>;
}

/// Create a processing strategy based on the specified strategy type
///
/// This factory function selects and instantiates the appropriate
/// processing strategy implementation at runtime.
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config))
        }
    }
}

/// Open the library against the configured snapshot store
pub(crate) fn open_library(data_dir: Option<&Path>) -> Result<Library, String> {
    let store: Box<dyn SnapshotStore> = match data_dir {
        Some(dir) => Box::new(CsvSnapshotStore::new(dir)),
        None => Box::new(MemorySnapshotStore::new()),
    };
    Library::open(store).map_err(|e| format!("Failed to load snapshot: {}", e))
}

/// Apply one operation, deciding whether its failure is fatal
///
/// Operation rejections (not found, not eligible, conflicts) are
/// reported and skipped; a snapshot write failure aborts the run, since
/// continuing would diverge the in-memory state from durable storage.
pub(crate) fn apply_logged(
    library: &mut Library,
    record: &crate::types::OperationRecord,
) -> Result<(), String> {
    match library.apply(record) {
        Ok(()) => Ok(()),
        Err(e @ CirculationError::SnapshotError { .. }) => Err(e.to_string()),
        Err(e) => {
            eprintln!("Operation error: {}", e);
            Ok(())
        }
    }
}

/// Write the selected report from the engine's read-only queries
pub(crate) fn write_report(
    engine: &CirculationEngine,
    report: ReportKind,
    today: NaiveDate,
    output: &mut dyn Write,
) -> Result<(), String> {
    match report {
        ReportKind::Members => {
            let members: Vec<Member> = engine.all_members().into_iter().cloned().collect();
            write_member_report(&members, output)
        }
        ReportKind::Overdue => {
            let overdue: Vec<IssueRecord> =
                engine.overdue_issues(today).into_iter().cloned().collect();
            write_overdue_report(&overdue, today, output)
        }
        ReportKind::Books => write_circulation_report(&engine.circulation_counts(), output),
    }
}
