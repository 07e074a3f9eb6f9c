//! Ledger Engine Library
//! # Overview
//!
//! An in-memory banking ledger: customer accounts of two kinds, deposits,
//! withdrawals, two-phase transfers, interest and overdraft limits, an
//! append-only journal of transaction records and principal-based access
//! control. Command scripts are processed from CSV by a sync or an async
//! strategy.
//!
//! # Architecture
//!
//! - [`types`] - Ids, accounts, transaction records, principals, commands, errors
//! - [`core`] - Business logic:
//!   - [`core::ledger`] / [`core::journal`] - Account store and append-only journal
//!   - [`core::engine`] - Money movement with Completed/Failed records
//!   - [`core::access_gate`] - Who may do what to which account
//!   - [`core::teller`] - Gate, engine and audit trail in one call
//!   - `core::async` - Concurrent ledger, engine and batch processor
//! - [`io`] - CSV command parsing and account/journal/audit output
//! - [`strategy`] - Sync and async processing pipelines
//! - [`cli`] / [`observability`] - Argument parsing and logging setup
//!
//! # Account Kinds
//!
//! - **NonOverdraft**: balance never drops below zero; earns interest
//! - **Overdraft**: balance may go down to minus the overdraft limit
//!
//! # Failure Model
//!
//! Withdrawals and transfers that break a balance rule still produce a
//! journal record with status FAILED and leave balances untouched. Invalid
//! input, unknown accounts and access violations are returned as errors
//! and leave no record.

pub mod cli;
pub mod core;
pub mod io;
pub mod observability;
pub mod strategy;
pub mod types;

pub use core::{Ledger, LedgerEngine, Teller, TransactionEngine};
pub use io::write_accounts_csv;
pub use types::{
    Account, AccountId, AccountKind, Command, LedgerError, Operation, OwnerId, Principal,
    TransactionId, TransactionRecord, TransactionStatus,
};
