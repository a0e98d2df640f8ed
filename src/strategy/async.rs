//! Asynchronous batch processing strategy
//!
//! This module provides an asynchronous implementation of the
//! ProcessingStrategy trait. Reading and parsing the operations file is
//! asynchronous and batched; application is not parallelized: each
//! circulation operation is one atomic transaction over the inventory,
//! the reservation queue, and the member directory, and reservation
//! fairness depends on file order, so records are applied strictly in
//! sequence.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size)
//!     ├── AsyncReader (batched CSV reading, csv-async over tokio::fs)
//!     └── Library (snapshot-backed engine, sequential application)
//! ```

use crate::io::async_reader::AsyncReader;
use crate::strategy::{apply_logged, open_library, write_report, ProcessOptions, ProcessingStrategy};
use std::io::Write;
use tokio_util::compat::TokioAsyncReadCompatExt;

/// Configuration for batch reading
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of operation records per read batch
    pub batch_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { batch_size: 1000 }
    }
}

impl BatchConfig {
    /// Create a BatchConfig, falling back to the default for a zero size
    pub fn new(batch_size: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            eprintln!(
                "Warning: Invalid batch_size ({}), using default ({})",
                batch_size, default.batch_size
            );
            default.batch_size
        } else {
            batch_size
        };

        Self { batch_size }
    }
}

/// Asynchronous batch processing strategy
///
/// Reads the operations file asynchronously in batches and applies each
/// batch in order through the library.
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    /// Create a strategy with the given batch configuration
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Process operations from the input file and write the report
    ///
    /// Builds a tokio runtime, streams batches of records from the file,
    /// applies them in file order, and renders the report.
    ///
    /// # Errors
    ///
    /// Fatal errors: input file missing, snapshot load failure, snapshot
    /// write failure, report write failure.
    fn process(&self, options: &ProcessOptions, output: &mut dyn Write) -> Result<(), String> {
        let runtime = tokio::runtime::Runtime::new()
            .map_err(|e| format!("Failed to create async runtime: {}", e))?;

        runtime.block_on(async {
            let mut library = open_library(options.data_dir.as_deref())?;

            let file = tokio::fs::File::open(&options.input).await.map_err(|e| {
                format!("Failed to open file '{}': {}", options.input.display(), e)
            })?;
            let mut reader = AsyncReader::new(file.compat());

            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }
                for record in &batch {
                    apply_logged(&mut library, record)?;
                }
            }

            write_report(library.engine(), options.report, options.today, output)
        })
    }
}
