//! Ledger Engine CLI
//!
//! Runs a CSV command script against a fresh ledger.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- commands.csv > accounts.csv
//! cargo run -- --strategy sync commands.csv > accounts.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 commands.csv > accounts.csv
//! cargo run -- --journal journal.csv --audit audit.csv commands.csv > accounts.csv
//! ```
//!
//! Final account states go to stdout, logs to stderr.
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (file not found, output not writable, etc.)

use std::fs::File;
use std::path::Path;
use std::process;

use ledger_engine::cli;
use ledger_engine::io::{write_audit_csv, write_journal_csv};
use ledger_engine::observability;
use ledger_engine::strategy::{self, ProcessingReport};
use ledger_engine::LedgerError;
use tracing::{error, info};

fn write_file(
    path: &Path,
    write: impl FnOnce(&mut File) -> Result<(), LedgerError>,
) -> Result<(), LedgerError> {
    let mut file = File::create(path).map_err(|e| {
        LedgerError::io_error(format!("Failed to create file '{}': {}", path.display(), e))
    })?;
    write(&mut file)?;
    info!(path = %path.display(), "wrote output file");
    Ok(())
}

fn run(args: &cli::CliArgs) -> Result<(), LedgerError> {
    let strategy = {
        let config = matches!(args.strategy, cli::StrategyType::Async)
            .then(|| args.to_batch_config());
        strategy::create_strategy(args.strategy, config)
    };

    let mut output = std::io::stdout();
    let ProcessingReport { records, audit, .. } = strategy.process(&args.input_file, &mut output)?;

    if let Some(path) = &args.journal {
        write_file(path, |file| write_journal_csv(&records, file))?;
    }
    if let Some(path) = &args.audit {
        write_file(path, |file| write_audit_csv(&audit, file))?;
    }
    Ok(())
}

fn main() {
    let args = cli::parse_args();
    observability::init(args.log_format);

    if let Err(e) = run(&args) {
        error!(category = ?e.category(), "{}", e);
        process::exit(1);
    }
}
