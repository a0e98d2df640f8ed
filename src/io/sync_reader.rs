//! Synchronous operations reader with iterator interface
//!
//! Provides a streaming iterator over operation records from a CSV file.
//! Delegates format concerns to the record_format module.
//!
//! # Design
//!
//! The SyncReader uses csv::Reader to read and deserialize rows
//! sequentially, converting each to an [`crate::types::OperationRecord`]
//! via `record_format::convert_operation_row`. It processes one row at a
//! time without loading the whole file, so memory use is constant in the
//! file size.
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual row errors are yielded as Err variants in the iterator,
//!   with line numbers for debugging, and do not stop iteration

use crate::io::record_format::{convert_operation_row, OperationRow};
use crate::types::OperationRecord;
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Synchronous operations reader
///
/// Provides an iterator interface over operation records. Maintains
/// streaming behavior with constant memory usage.
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    line_num: usize,
}

impl SyncReader {
    /// Create a new SyncReader from a file path
    ///
    /// The CSV reader is configured to trim whitespace from all fields
    /// and to allow flexible field counts (the book and amount columns
    /// are optional).
    ///
    /// # Errors
    ///
    /// Returns an error string if the file cannot be opened.
    pub fn new(path: &Path) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open file '{}': {}", path.display(), e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 0,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<OperationRecord, String>;

    /// Get the next operation record from the file
    ///
    /// # Returns
    ///
    /// * `Some(Ok(OperationRecord))` - Successfully parsed record
    /// * `Some(Err(String))` - Parse or conversion error with line number
    /// * `None` - End of file reached
    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<OperationRow>();

        match deserializer.next()? {
            Ok(row) => {
                self.line_num += 1;
                // Add line number context to any conversion errors
                Some(
                    convert_operation_row(row)
                        .map_err(|e| format!("Line {}: {}", self.line_num + 1, e)),
                )
            }
            Err(e) => {
                self.line_num += 1;
                Some(Err(format!(
                    "Line {}: CSV parse error: {}",
                    self.line_num + 1,
                    e
                )))
            }
        }
    }
}
