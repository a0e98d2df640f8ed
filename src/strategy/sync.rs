//! Synchronous processing strategy
//!
//! This module provides a synchronous, single-threaded implementation of
//! the ProcessingStrategy trait: one operation runs to completion before
//! the next begins.
//!
//! # Design
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - Operations parsing to `SyncReader` (iterator interface)
//! - Circulation rules to `Library`/`CirculationEngine`
//! - Report output to the `record_format` writers
//!
//! # Memory Efficiency
//!
//! Operations stream one record at a time; memory usage is bounded by
//! the library collections, not the operations file.

use crate::io::sync_reader::SyncReader;
use crate::strategy::{apply_logged, open_library, write_report, ProcessOptions, ProcessingStrategy};
use std::io::Write;

/// Synchronous processing strategy
///
/// Streams the operations file through the engine, then writes the
/// selected report.
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    /// Process operations from the input file and write the report
    ///
    /// Pipeline: open the library from its snapshot, stream operation
    /// records, apply each through the engine (rejected operations are
    /// logged and skipped), and render the report.
    ///
    /// # Errors
    ///
    /// Fatal errors: input file missing, snapshot load failure, snapshot
    /// write failure, report write failure.
    fn process(&self, options: &ProcessOptions, output: &mut dyn Write) -> Result<(), String> {
        let mut library = open_library(options.data_dir.as_deref())?;

        let reader = SyncReader::new(&options.input)?;
        for result in reader {
            match result {
                Ok(record) => apply_logged(&mut library, &record)?,
                Err(e) => eprintln!("CSV parsing error: {}", e),
            }
        }

        write_report(library.engine(), options.report, options.today, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ReportKind;
    use crate::io::snapshot::{CsvSnapshotStore, LibrarySnapshot, SnapshotStore};
    use crate::types::{Book, BookCategory, Member, MemberCategory};
    use chrono::NaiveDate;
    use std::io::Write as _;
    use tempfile::{NamedTempFile, TempDir};

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn seed_data_dir(dir: &TempDir) {
        let store = CsvSnapshotStore::new(dir.path());
        store
            .save(&LibrarySnapshot {
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
            })
            .expect("Failed to seed data dir");
    }

    fn options(input: &NamedTempFile, dir: &TempDir) -> ProcessOptions {
        ProcessOptions {
            input: input.path().to_path_buf(),
            data_dir: Some(dir.path().to_path_buf()),
            report: ReportKind::Members,
            today: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
        }
    }

    #[test]
    fn test_sync_strategy_processes_operations_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        seed_data_dir(&dir);
        let input = create_temp_csv(
            "op,member,book,date,amount\n\
             issue,1001,42,2024-03-01,\n\
             return,1001,42,2024-03-11,\n",
        );

        let strategy = SyncProcessingStrategy;
        let mut output = Vec::new();
        strategy.process(&options(&input, &dir), &mut output).unwrap();

        // Report reflects the fine charged on the late return
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("1001,Asha Rao,Student,Active,0,4.00,0"));

        // Snapshot was rewritten after the committed operations
        let saved = CsvSnapshotStore::new(dir.path()).load().unwrap();
        assert_eq!(saved.issues.len(), 1);
        assert!(saved.issues[0].returned_on.is_some());
    }

    #[test]
    fn test_sync_strategy_continues_past_rejected_operations() {
        let dir = tempfile::tempdir().unwrap();
        seed_data_dir(&dir);
        let input = create_temp_csv(
            "op,member,book,date,amount\n\
             issue,9999,42,2024-03-01,\n\
             issue,1001,42,2024-03-01,\n",
        );

        let strategy = SyncProcessingStrategy;
        let mut output = Vec::new();
        strategy.process(&options(&input, &dir), &mut output).unwrap();

        let saved = CsvSnapshotStore::new(dir.path()).load().unwrap();
        assert_eq!(saved.issues.len(), 1);
        assert_eq!(saved.issues[0].member, 1001);
    }

    #[test]
    fn test_sync_strategy_handles_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let strategy = SyncProcessingStrategy;
        let mut output = Vec::new();

        let result = strategy.process(
            &ProcessOptions {
                input: std::path::PathBuf::from("nonexistent.csv"),
                data_dir: Some(dir.path().to_path_buf()),
                report: ReportKind::Members,
                today: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            },
            &mut output,
        );

        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Failed to open file"));
    }

    #[test]
    fn test_sync_strategy_runs_without_data_dir() {
        let input = create_temp_csv("op,member,book,date,amount\n");

        let strategy = SyncProcessingStrategy;
        let mut output = Vec::new();
        strategy
            .process(
                &ProcessOptions {
                    input: input.path().to_path_buf(),
                    data_dir: None,
                    report: ReportKind::Members,
                    today: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
                },
                &mut output,
            )
            .unwrap();

        let text = String::from_utf8(output).unwrap();
        assert!(text.starts_with("member,"));
    }

    #[test]
    fn test_sync_strategy_overdue_report() {
        let dir = tempfile::tempdir().unwrap();
        seed_data_dir(&dir);
        let input = create_temp_csv("op,member,book,date,amount\nissue,1001,42,2024-03-01,\n");

        let strategy = SyncProcessingStrategy;
        let mut output = Vec::new();
        let mut opts = options(&input, &dir);
        opts.report = ReportKind::Overdue;
        strategy.process(&opts, &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        // Due 2024-03-06, nine days overdue on the 15th
        assert!(text.contains("1001,42,2024-03-06,9"));
    }

    #[test]
    fn test_sync_strategy_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncProcessingStrategy>();
    }
}
