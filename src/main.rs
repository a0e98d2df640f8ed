//! Circulation Engine CLI
//!
//! Command-line interface for processing library circulation operations
//! from CSV files against a snapshot-backed library.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- operations.csv --data-dir ./db > members.csv
//! cargo run -- --strategy sync operations.csv > members.csv
//! cargo run -- --strategy async --batch-size 2000 operations.csv > members.csv
//! cargo run -- operations.csv --data-dir ./db --report overdue --as-of 2024-03-15 > overdue.csv
//! ```
//!
//! The program loads the library snapshot from the data directory (an
//! empty library when omitted), applies every operation in file order
//! through the circulation engine, persists a snapshot after each
//! committed operation, and writes the selected report to stdout.
//! Rejected operations are reported on stderr and skipped.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Fatal error (missing input file, snapshot load/write failure)

use circulation_engine::cli;
use circulation_engine::strategy::{self, ProcessOptions};
use std::process;

fn main() {
    // Parse command-line arguments using clap
    let args = cli::parse_args();

    // Create the appropriate processing strategy based on CLI arguments
    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy.clone(), config)
    };

    let options = ProcessOptions {
        input: args.input_file.clone(),
        data_dir: args.data_dir.clone(),
        report: args.report,
        today: args.effective_date(),
    };

    // Process operations using the selected strategy; report to stdout
    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&options, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
