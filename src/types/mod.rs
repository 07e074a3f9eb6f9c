//! Types module
//!
//! Contains core data structures used throughout the ledger:
//! - `ids`: validated account and owner identifiers
//! - `account`: accounts and their kinds
//! - `transaction`: pending transactions and immutable records
//! - `principal`: callers as seen by the access gate
//! - `command`: typed operations requested by a principal
//! - `error`: the `LedgerError` enum

pub mod account;
pub mod command;
pub mod error;
pub mod ids;
pub mod principal;
pub mod transaction;

pub use account::{
    Account, AccountKind, DEFAULT_INTEREST_RATE, DEFAULT_OVERDRAFT_LIMIT, MONEY_SCALE,
};
pub use command::{Command, Operation};
pub use error::{ErrorCategory, LedgerError};
pub use ids::{AccountId, OwnerId, MAX_ACCOUNT_NUMBER};
pub use principal::Principal;
pub use transaction::{
    PendingTransaction, TransactionId, TransactionKind, TransactionRecord, TransactionStatus,
};
