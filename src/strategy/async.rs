//! Asynchronous batch processing strategy
//!
//! Reads commands in batches and hands each batch to a `BatchProcessor`,
//! which runs account-disjoint groups on tokio worker threads.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     ├── BatchProcessor (footprint partitioning + tokio tasks)
//!     └── AsyncTransactionEngine
//!         └── Arc<AsyncLedger> (per-account mutexes + journal)
//! ```
//!
//! Batches are processed one after another, so commands on the same account
//! keep file order across batch boundaries and final balances match the
//! sync strategy.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::r#async::{AsyncLedger, AsyncTransactionEngine, BatchProcessor};
use crate::core::AuditTrail;
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::write_accounts_csv;
use crate::strategy::{ProcessingReport, ProcessingStrategy};
use crate::types::LedgerError;

/// Configuration for batch processing
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of commands per batch
    pub batch_size: usize,
    /// Number of tokio worker threads
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig; zero values fall back to the defaults
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = default.batch_size,
                "invalid batch size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                max_concurrent_batches,
                default = default.max_concurrent_batches,
                "invalid concurrency, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous batch processing strategy
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    config: BatchConfig,
}

impl AsyncProcessingStrategy {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    fn process(
        &self,
        input_path: &Path,
        output: &mut dyn Write,
    ) -> Result<ProcessingReport, LedgerError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .build()
            .map_err(|e| LedgerError::io_error(format!("Failed to create tokio runtime: {}", e)))?;

        runtime.block_on(async {
            let ledger = Arc::new(AsyncLedger::new());
            let audit = Arc::new(AuditTrail::new());
            let processor = BatchProcessor::new(
                AsyncTransactionEngine::new(Arc::clone(&ledger)),
                Arc::clone(&audit),
            );

            let file = tokio::fs::File::open(input_path).await.map_err(|e| {
                LedgerError::io_error(format!(
                    "Failed to open file '{}': {}",
                    input_path.display(),
                    e
                ))
            })?;

            // csv-async reads futures::io, tokio files need the compat layer
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            let mut commands = 0usize;
            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }

                commands += batch.len();
                let results = processor.process_batch(batch).await;
                debug!(
                    size = results.len(),
                    rejected = results.iter().filter(|r| r.result.is_err()).count(),
                    "batch processed"
                );
            }

            let accounts = ledger.accounts();
            write_accounts_csv(&accounts, output)?;

            let records = ledger.records();
            info!(
                commands,
                accounts = accounts.len(),
                records = records.len(),
                "async processing complete"
            );

            Ok(ProcessingReport {
                accounts,
                records,
                audit: audit.entries(),
            })
        })
    }
}
