use crate::strategy::BatchConfig;
use chrono::{NaiveDate, Utc};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Process library circulation operations against a snapshot-backed library
#[derive(Parser, Debug)]
#[command(name = "circulation-engine")]
#[command(about = "Process library circulation operations (issue, return, renew, reserve)", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing operation records
    #[arg(value_name = "OPERATIONS", help = "Path to the operations CSV file")]
    pub input_file: PathBuf,

    /// Snapshot directory holding books/members/issues/reservations CSVs
    #[arg(
        long = "data-dir",
        value_name = "DIR",
        help = "Snapshot directory; omitted runs against an empty in-memory library"
    )]
    pub data_dir: Option<PathBuf>,

    /// Reading strategy to use for processing operations
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Reading strategy: 'sync' for synchronous or 'async' for asynchronous"
    )]
    pub strategy: StrategyType,

    /// Number of operations per read batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of operations per read batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Report to print to stdout after processing
    #[arg(
        long = "report",
        value_name = "REPORT",
        default_value = "members",
        help = "Report to write: 'members', 'overdue', or 'books'"
    )]
    pub report: ReportKind,

    /// Evaluation date for overdue reporting (defaults to today)
    #[arg(
        long = "as-of",
        value_name = "DATE",
        help = "Date (YYYY-MM-DD) used for overdue reporting; defaults to today"
    )]
    pub as_of: Option<NaiveDate>,
}

/// Available reading strategies for operations processing
#[derive(Clone, Debug, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

/// Reports the CLI can render after processing
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    /// Member summary: borrow counts, fines, statuses
    Members,
    /// Open issues past their due date
    Overdue,
    /// Per-book issue and reservation counts
    Books,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Uses the provided batch size or falls back to the default, with
    /// validation warnings printed to stderr.
    pub fn to_batch_config(&self) -> BatchConfig {
        match self.batch_size {
            Some(size) => BatchConfig::new(size),
            None => BatchConfig::default(),
        }
    }

    /// The evaluation date for reports: `--as-of` or today
    pub fn effective_date(&self) -> NaiveDate {
        self.as_of.unwrap_or_else(|| Utc::now().date_naive())
    }
}
