//! Audit trail of executed commands
//!
//! Every command the `Teller` executes leaves one entry, whether it was
//! completed, recorded as failed, denied by the access gate, or rejected by
//! validation. The trail is shared between tasks behind an `Arc`.

use std::fmt;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

/// How a command ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    Completed,
    /// A record was written with status `Failed`
    Failed,
    /// Refused by the access gate
    Denied,
    /// Refused by validation or lookup before any record was written
    Rejected,
}

impl fmt::Display for AuditOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AuditOutcome::Completed => "COMPLETED",
            AuditOutcome::Failed => "FAILED",
            AuditOutcome::Denied => "DENIED",
            AuditOutcome::Rejected => "REJECTED",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub principal: String,
    pub action: &'static str,
    pub details: String,
    pub outcome: AuditOutcome,
}

/// Thread-safe, append-only list of audit entries
#[derive(Debug, Default)]
pub struct AuditTrail {
    entries: Mutex<Vec<AuditEntry>>,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: AuditEntry) {
        self.entries.lock().push(entry);
    }

    /// Snapshot of all entries in the order they were recorded
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().clone()
    }

    /// Number of entries with the given outcome
    pub fn count(&self, outcome: AuditOutcome) -> usize {
        self.entries
            .lock()
            .iter()
            .filter(|entry| entry.outcome == outcome)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
