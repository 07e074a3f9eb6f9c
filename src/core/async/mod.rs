//! Concurrent implementations of the core components
//!
//! - **AsyncLedger**: accounts behind per-account locks, plus a shared journal
//! - **AsyncTransactionEngine**: the engine operations on top of `AsyncLedger`
//! - **BatchProcessor**: runs batches of commands across tokio tasks
//!
//! # Thread Safety
//!
//! - Operations on different accounts proceed in parallel
//! - Operations on the same account are serialized by its lock
//! - Transfers lock their two accounts in ascending id order
//! - No global lock around money movement

pub mod batch_processor;
pub mod engine;
pub mod ledger;

pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use engine::AsyncTransactionEngine;
pub use ledger::AsyncLedger;
