//! Append-only transaction journal
//!
//! The journal is the only place that turns a `PendingTransaction` into a
//! `TransactionRecord`. It assigns ids 1, 2, 3... in commit order and keeps
//! timestamps non-decreasing even if the wall clock steps backwards.
//! Records are never removed or rewritten.

use chrono::{DateTime, Utc};

use crate::types::{
    AccountId, PendingTransaction, TransactionId, TransactionRecord, TransactionStatus,
};

/// Append-only list of committed records
#[derive(Debug, Default)]
pub struct Journal {
    records: Vec<TransactionRecord>,
    last_timestamp: Option<DateTime<Utc>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a pending transaction with its final status
    ///
    /// # Returns
    ///
    /// A copy of the committed record. The journal keeps the original.
    pub fn commit(
        &mut self,
        pending: PendingTransaction,
        status: TransactionStatus,
    ) -> TransactionRecord {
        let id = self.records.len() as TransactionId + 1;
        let now = Utc::now();
        let timestamp = match self.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };
        self.last_timestamp = Some(timestamp);

        let record = TransactionRecord::seal(id, pending, status, timestamp);
        self.records.push(record.clone());
        record
    }

    /// Look up a record by id
    pub fn get(&self, id: TransactionId) -> Option<&TransactionRecord> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.records.get(index)
    }

    /// All records in commit order
    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    /// Records naming `account`, including those of closed accounts
    pub fn involving(&self, account: &AccountId) -> Vec<&TransactionRecord> {
        self.records
            .iter()
            .filter(|record| record.involves(account))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
