//! Core ledger logic
//!
//! - `ledger` / `journal` - account store and append-only record journal
//! - `access_gate` - who may touch which account
//! - `engine` - deposit, withdrawal and transfer orchestration
//! - `teller` / `audit` - gate-then-engine command execution with an audit trail
//! - `traits` - seams shared by the single-threaded and concurrent engines
//! - `async` - concurrent ledger, engine and batch processor

pub mod access_gate;
pub mod r#async;
pub mod audit;
pub mod engine;
pub mod journal;
pub mod ledger;
pub mod teller;
pub mod traits;

pub use access_gate::{authorize, can_access, check_access, require_administrator};
pub use audit::{AuditEntry, AuditOutcome, AuditTrail};
pub use engine::TransactionEngine;
pub use journal::Journal;
pub use ledger::Ledger;
pub use r#async::{AsyncLedger, AsyncTransactionEngine, BatchProcessor, ProcessingResult};
pub use teller::{Outcome, Teller};
pub use traits::{LedgerEngine, OwnerDirectory};
