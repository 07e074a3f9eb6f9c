//! Synchronous processing strategy
//!
//! Single-threaded reference pipeline. It delegates:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - access checks, dispatch and auditing to `Teller<TransactionEngine>`
//! - CSV output to `csv_format::write_accounts_csv`
//!
//! Rows are processed one at a time; memory grows with accounts and journal
//! records, not with the size of the input file.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::core::{AuditTrail, Teller, TransactionEngine};
use crate::io::csv_format::write_accounts_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{ProcessingReport, ProcessingStrategy};
use crate::types::{Account, LedgerError};

/// Synchronous processing strategy
///
/// # Examples
///
/// ```no_run
/// use ledger_engine::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use std::path::Path;
/// use std::io;
///
/// let strategy = SyncProcessingStrategy;
/// let mut output = io::stdout();
///
/// strategy.process(Path::new("commands.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SyncProcessingStrategy;

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(
        &self,
        input_path: &Path,
        output: &mut dyn Write,
    ) -> Result<ProcessingReport, LedgerError> {
        let audit = Arc::new(AuditTrail::new());
        let mut teller = Teller::new(TransactionEngine::new(), Arc::clone(&audit));
        let reader = SyncReader::new(input_path)?;

        let mut commands = 0usize;
        for result in reader {
            match result {
                Ok(command) => {
                    commands += 1;
                    // Rejections are logged and audited by the teller.
                    let _ = teller.execute(&command);
                }
                Err(e) => warn!(error = %e, "skipping malformed row"),
            }
        }

        let ledger = teller.into_engine().into_ledger();
        let accounts: Vec<Account> = ledger.accounts().into_iter().cloned().collect();
        write_accounts_csv(&accounts, output)?;

        info!(
            commands,
            accounts = accounts.len(),
            records = ledger.records().len(),
            "sync processing complete"
        );

        Ok(ProcessingReport {
            accounts,
            records: ledger.records().to_vec(),
            audit: audit.entries(),
        })
    }
}
