//! Batch processing with account-footprint partitioning
//!
//! This module provides the `BatchProcessor` struct, which runs a batch of
//! commands concurrently while giving the same final state as running them
//! one by one in file order.
//!
//! # Design
//!
//! A command's footprint is the set of accounts it touches (a transfer
//! touches two). Commands whose footprints overlap, directly or through a
//! chain of other commands, end up in the same group; groups share no
//! accounts and run on separate tokio tasks. Inside a group commands keep
//! their original order.
//!
//! Commands that can touch any account (generated-id opens, interest for
//! every account) act as barriers: everything before them finishes first,
//! they run alone, then the rest of the batch continues.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     ├── AsyncTransactionEngine  (shared ledger, cheap to clone)
//!     └── Arc<AuditTrail>         (shared audit entries)
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::error;

use super::AsyncTransactionEngine;
use crate::core::audit::AuditTrail;
use crate::core::teller::{Outcome, Teller};
use crate::types::{AccountId, Command, LedgerError};

/// Result of processing a single command
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    pub command: Command,
    pub result: Result<Outcome, LedgerError>,
}

/// Batch processor with account-footprint partitioning
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    engine: AsyncTransactionEngine,
    audit: Arc<AuditTrail>,
}

/// Root of `index` in a union-find forest, halving paths on the way
fn find(parent: &mut [usize], mut index: usize) -> usize {
    while parent[index] != index {
        parent[index] = parent[parent[index]];
        index = parent[index];
    }
    index
}

impl BatchProcessor {
    pub fn new(engine: AsyncTransactionEngine, audit: Arc<AuditTrail>) -> Self {
        Self { engine, audit }
    }

    pub fn engine(&self) -> &AsyncTransactionEngine {
        &self.engine
    }

    /// Split commands into groups with disjoint account footprints
    ///
    /// # Guarantees
    ///
    /// - Each command appears in exactly one group
    /// - Commands sharing an account (transitively) share a group
    /// - Commands within a group keep their original relative order
    /// - Groups are ordered by their first command
    pub fn partition_by_accounts(&self, batch: Vec<Command>) -> Vec<Vec<Command>> {
        let mut parent: Vec<usize> = (0..batch.len()).collect();
        let mut first_seen: HashMap<&AccountId, usize> = HashMap::new();

        for (index, command) in batch.iter().enumerate() {
            for account in command.operation.footprint().unwrap_or_default() {
                match first_seen.get(account) {
                    Some(&other) => {
                        let a = find(&mut parent, index);
                        let b = find(&mut parent, other);
                        if a != b {
                            parent[a.max(b)] = a.min(b);
                        }
                    }
                    None => {
                        first_seen.insert(account, index);
                    }
                }
            }
        }

        let roots: Vec<usize> = (0..batch.len()).map(|i| find(&mut parent, i)).collect();
        let mut groups: BTreeMap<usize, Vec<Command>> = BTreeMap::new();
        for (command, root) in batch.into_iter().zip(roots) {
            groups.entry(root).or_default().push(command);
        }
        groups.into_values().collect()
    }

    /// Process one group of commands sequentially, in order
    ///
    /// Failures are captured in the results and do not stop the group.
    pub async fn process_group(&self, commands: Vec<Command>) -> Vec<ProcessingResult> {
        let mut teller = Teller::new(self.engine.clone(), Arc::clone(&self.audit));
        commands
            .into_iter()
            .map(|command| {
                let result = teller.execute(&command);
                ProcessingResult { command, result }
            })
            .collect()
    }

    /// Partition a barrier-free segment and run its groups concurrently
    async fn process_segment(&self, segment: Vec<Command>) -> Vec<ProcessingResult> {
        if segment.is_empty() {
            return Vec::new();
        }

        let mut tasks = Vec::new();
        for group in self.partition_by_accounts(segment) {
            let processor = self.clone();
            tasks.push(tokio::spawn(async move { processor.process_group(group).await }));
        }

        let mut results = Vec::new();
        for task in tasks {
            match task.await {
                Ok(group_results) => results.extend(group_results),
                Err(e) => error!(error = %e, "batch task panicked"),
            }
        }
        results
    }

    /// Process a batch of commands
    ///
    /// # Guarantees
    ///
    /// - Commands touching different accounts run concurrently
    /// - Commands touching the same account run in their original order
    /// - Barrier commands see every earlier command applied and none of the later ones
    /// - Results may come back in a different order than the input
    pub async fn process_batch(&self, batch: Vec<Command>) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(batch.len());
        let mut segment = Vec::new();

        for command in batch {
            if command.operation.footprint().is_some() {
                segment.push(command);
                continue;
            }
            results.extend(self.process_segment(std::mem::take(&mut segment)).await);
            results.extend(self.process_group(vec![command]).await);
        }
        results.extend(self.process_segment(segment).await);

        results
    }
}
