//! Teller: the gate-then-engine front door
//!
//! A `Teller` executes `Command`s on behalf of principals. For each command
//! it asks the access gate first, dispatches to the engine only if the gate
//! allows it, and leaves one audit entry either way.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use super::access_gate;
use super::audit::{AuditEntry, AuditOutcome, AuditTrail};
use super::traits::LedgerEngine;
use crate::types::{
    Account, AccountId, Command, ErrorCategory, LedgerError, Operation, TransactionRecord,
};

/// Result of a successfully dispatched command
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Opened(AccountId),
    Closed(Account),
    /// Deposit, withdrawal or transfer record (completed or failed)
    Recorded(TransactionRecord),
    /// Interest records written; empty when no interest was due
    InterestApplied(Vec<TransactionRecord>),
    LimitUpdated { account: AccountId, limit: Decimal },
}

impl Outcome {
    fn audit_outcome(&self) -> AuditOutcome {
        match self {
            Outcome::Recorded(record) if !record.is_completed() => AuditOutcome::Failed,
            _ => AuditOutcome::Completed,
        }
    }
}

/// Gate-checked command execution over any `LedgerEngine`
#[derive(Debug)]
pub struct Teller<E> {
    engine: E,
    audit: Arc<AuditTrail>,
}

impl<E: LedgerEngine> Teller<E> {
    pub fn new(engine: E, audit: Arc<AuditTrail>) -> Self {
        Teller { engine, audit }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn audit(&self) -> &Arc<AuditTrail> {
        &self.audit
    }

    pub fn into_engine(self) -> E {
        self.engine
    }

    /// Execute one command
    ///
    /// # Errors
    ///
    /// * `LedgerError::AccessDenied` / `AdministratorRequired` - Gate refused; the
    ///   engine was not called
    /// * Validation and not-found errors from the engine
    pub fn execute(&mut self, command: &Command) -> Result<Outcome, LedgerError> {
        let Command {
            principal,
            operation,
        } = command;

        let result = access_gate::authorize(principal, operation, &self.engine)
            .and_then(|()| self.dispatch(operation));

        let outcome = match &result {
            Ok(outcome) => outcome.audit_outcome(),
            Err(err) if err.category() == ErrorCategory::AccessDenied => {
                warn!(%principal, action = operation.action(), error = %err, "access denied");
                AuditOutcome::Denied
            }
            Err(err) => {
                warn!(%principal, action = operation.action(), error = %err, "command rejected");
                AuditOutcome::Rejected
            }
        };
        debug!(%principal, action = operation.action(), %outcome, "command executed");

        self.audit.record(AuditEntry {
            timestamp: Utc::now(),
            principal: principal.to_string(),
            action: operation.action(),
            details: operation.to_string(),
            outcome,
        });
        result
    }

    fn dispatch(&mut self, operation: &Operation) -> Result<Outcome, LedgerError> {
        match operation {
            Operation::OpenAccount {
                account,
                owner,
                kind,
            } => self
                .engine
                .open_account(account.clone(), owner.clone(), *kind)
                .map(Outcome::Opened),
            Operation::CloseAccount { account } => {
                self.engine.close_account(account).map(Outcome::Closed)
            }
            Operation::Deposit { account, amount } => {
                self.engine.deposit(account, *amount).map(Outcome::Recorded)
            }
            Operation::Withdraw { account, amount } => {
                self.engine.withdraw(account, *amount).map(Outcome::Recorded)
            }
            Operation::Transfer { from, to, amount } => self
                .engine
                .transfer(from, to, *amount)
                .map(Outcome::Recorded),
            Operation::ApplyInterest {
                account: Some(account),
            } => self
                .engine
                .apply_interest(account)
                .map(|record| Outcome::InterestApplied(record.into_iter().collect())),
            Operation::ApplyInterest { account: None } => Ok(Outcome::InterestApplied(
                self.engine.apply_interest_to_all(),
            )),
            Operation::SetOverdraftLimit { account, limit } => self
                .engine
                .set_overdraft_limit(account, *limit)
                .map(|()| Outcome::LimitUpdated {
                    account: account.clone(),
                    limit: *limit,
                }),
        }
    }
}
