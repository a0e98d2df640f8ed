//! Asynchronous operations reader with batch interface
//!
//! Provides a batched streaming interface over operation records from a
//! CSV source. Supports batch reading for efficient async processing.
//!
//! # Design
//!
//! The AsyncReader uses:
//! - csv-async for streaming CSV parsing
//! - futures streams for async iteration
//!
//! Conversion of rows to domain records is delegated to the
//! record_format module, exactly as in the synchronous reader.

use crate::io::record_format::{convert_operation_row, OperationRow};
use crate::types::OperationRecord;
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;

/// Asynchronous operations reader
///
/// Provides batch reading over operation records. Maintains streaming
/// behavior with constant memory usage.
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    /// Create a new AsyncReader from an async byte source
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self { csv_reader }
    }

    /// Read a batch of operation records
    ///
    /// Reads up to `batch_size` rows, converting them to
    /// [`OperationRecord`]s. Invalid rows are logged to stderr and
    /// skipped. Returns an empty vector at end of input.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<OperationRecord> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut rows = self.csv_reader.deserialize::<OperationRow>();

        while batch.len() < batch_size {
            match rows.next().await {
                Some(Ok(row)) => match convert_operation_row(row) {
                    Ok(record) => batch.push(record),
                    Err(e) => eprintln!("Record conversion error: {}", e),
                },
                Some(Err(e)) => eprintln!("CSV parse error: {}", e),
                None => break,
            }
        }

        batch
    }
}
