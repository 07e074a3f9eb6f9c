//! Processing strategy module
//!
//! This module defines the Strategy pattern for complete command processing
//! pipelines: parsing the CSV script, running every command through a teller,
//! and writing the final account states. Implementations (synchronous,
//! asynchronous batch) are selected at runtime.

use crate::cli::StrategyType;
use crate::core::AuditEntry;
use crate::types::{Account, LedgerError, TransactionRecord};
use std::io::Write;
use std::path::Path;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Everything a run leaves behind
///
/// Accounts are sorted by id, records are in journal order and audit
/// entries are in the order they were written.
#[derive(Debug, Clone, Default)]
pub struct ProcessingReport {
    pub accounts: Vec<Account>,
    pub records: Vec<TransactionRecord>,
    pub audit: Vec<AuditEntry>,
}

/// Processing strategy trait for complete command pipelines
pub trait ProcessingStrategy: Send + Sync {
    /// Process commands from `input_path` and write account states to `output`
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::IoError` if the input file cannot be opened or
    /// the output cannot be written. Malformed rows and rejected commands are
    /// logged and do not stop processing.
    fn process(
        &self,
        input_path: &Path,
        output: &mut dyn Write,
    ) -> Result<ProcessingReport, LedgerError>;
}

/// Create a processing strategy based on the specified strategy type
///
/// `config` is only used by the async strategy; `None` means defaults.
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
