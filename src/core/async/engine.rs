//! Transaction processing orchestration for concurrent processing
//!
//! This module provides the `AsyncTransactionEngine` struct, which runs the
//! same operations as `TransactionEngine` on top of the thread-safe
//! `AsyncLedger`.
//!
//! # Architecture
//!
//! ```text
//! AsyncTransactionEngine
//!     └── Arc<AsyncLedger>  (per-account locks + journal)
//! ```
//!
//! # Thread Safety
//!
//! The engine is cheap to clone and every clone shares the same ledger.
//! Each operation holds the locks of the accounts it touches for its whole
//! check-then-act sequence, including the journal append.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, info};

use super::AsyncLedger;
use crate::core::engine::{settle_transfer, settle_withdrawal};
use crate::core::traits::{LedgerEngine, OwnerDirectory};
use crate::types::account::ensure_valid_amount;
use crate::types::{
    Account, AccountId, AccountKind, LedgerError, OwnerId, PendingTransaction, TransactionRecord,
    TransactionStatus,
};

/// Transaction processing engine safe to share across tasks and threads
#[derive(Debug, Clone, Default)]
pub struct AsyncTransactionEngine {
    ledger: Arc<AsyncLedger>,
}

impl AsyncTransactionEngine {
    pub fn new(ledger: Arc<AsyncLedger>) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &Arc<AsyncLedger> {
        &self.ledger
    }

    pub fn open_account(
        &self,
        id: Option<AccountId>,
        owner: OwnerId,
        kind: AccountKind,
    ) -> Result<AccountId, LedgerError> {
        let id = match id {
            Some(id) => self.ledger.open_account_with_id(id, owner, kind)?,
            None => self.ledger.open_account(owner, kind)?,
        };
        debug!(account = %id, kind = %kind, "account opened");
        Ok(id)
    }

    pub fn close_account(&self, id: &AccountId) -> Result<Account, LedgerError> {
        let account = self.ledger.close_account(id)?;
        debug!(account = %id, balance = %account.balance(), "account closed");
        Ok(account)
    }

    /// Deposit funds into an account
    ///
    /// # Errors
    ///
    /// * `LedgerError::InvalidAmount` - Non-positive amount
    /// * `LedgerError::AccountNotFound` - Unknown or closed account
    /// * `LedgerError::ArithmeticOverflow` - Balance would overflow
    pub fn deposit(
        &self,
        id: &AccountId,
        amount: Decimal,
    ) -> Result<TransactionRecord, LedgerError> {
        ensure_valid_amount(amount)?;
        let record = self.ledger.update(id, |account| {
            account.deposit(amount)?;
            Ok(self.ledger.append_record(
                PendingTransaction::deposit(id.clone(), amount),
                TransactionStatus::Completed,
                &mut [account],
            ))
        })?;
        debug!(tx = record.id(), account = %id, %amount, "deposit recorded");
        Ok(record)
    }

    /// Withdraw funds; a refused withdrawal is recorded as `Failed`
    pub fn withdraw(
        &self,
        id: &AccountId,
        amount: Decimal,
    ) -> Result<TransactionRecord, LedgerError> {
        ensure_valid_amount(amount)?;
        let record = self.ledger.update(id, |account| {
            let status = settle_withdrawal(account, amount)?;
            Ok(self.ledger.append_record(
                PendingTransaction::withdraw(id.clone(), amount),
                status,
                &mut [account],
            ))
        })?;
        debug!(
            tx = record.id(),
            account = %id,
            %amount,
            status = %record.status(),
            "withdrawal recorded"
        );
        Ok(record)
    }

    /// Move funds between two accounts under both account locks
    ///
    /// # Errors
    ///
    /// * `LedgerError::InvalidAmount` - Non-positive amount
    /// * `LedgerError::SameAccountTransfer` - `from == to`
    /// * `LedgerError::AccountNotFound` - Either account is unknown or closed
    /// * `LedgerError::ArithmeticOverflow` - Destination cannot hold the amount
    pub fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        amount: Decimal,
    ) -> Result<TransactionRecord, LedgerError> {
        ensure_valid_amount(amount)?;
        let record = self.ledger.update_pair(from, to, |source, destination| {
            let status = settle_transfer(source, destination, amount)?;
            Ok(self.ledger.append_record(
                PendingTransaction::transfer(from.clone(), to.clone(), amount),
                status,
                &mut [source, destination],
            ))
        })?;
        debug!(
            tx = record.id(),
            %from,
            %to,
            %amount,
            status = %record.status(),
            "transfer recorded"
        );
        Ok(record)
    }

    /// Apply interest once; zero interest creates no record
    pub fn apply_interest(&self, id: &AccountId) -> Result<Option<TransactionRecord>, LedgerError> {
        let record = self.ledger.update(id, |account| {
            let interest = account.apply_interest_once()?;
            if interest.is_zero() {
                return Ok(None);
            }
            Ok(Some(self.ledger.append_record(
                PendingTransaction::interest(id.clone(), interest),
                TransactionStatus::Completed,
                &mut [account],
            )))
        })?;
        if let Some(record) = &record {
            debug!(
                tx = record.id(),
                account = %id,
                interest = %record.amount(),
                "interest credited"
            );
        }
        Ok(record)
    }

    /// Apply interest once to every non-overdraft account open right now
    pub fn apply_interest_to_all(&self) -> Vec<TransactionRecord> {
        let ids: Vec<AccountId> = self
            .ledger
            .accounts()
            .into_iter()
            .filter(|account| matches!(account.kind(), AccountKind::NonOverdraft { .. }))
            .map(|account| account.id().clone())
            .collect();

        ids.iter()
            .filter_map(|id| match self.apply_interest(id) {
                Ok(record) => record,
                Err(err) => {
                    info!(account = %id, error = %err, "interest skipped");
                    None
                }
            })
            .collect()
    }

    pub fn set_overdraft_limit(&self, id: &AccountId, limit: Decimal) -> Result<(), LedgerError> {
        self.ledger
            .update(id, |account| account.set_overdraft_limit(limit))?;
        debug!(account = %id, %limit, "overdraft limit updated");
        Ok(())
    }
}

impl OwnerDirectory for AsyncTransactionEngine {
    fn owner_of(&self, account: &AccountId) -> Option<OwnerId> {
        self.ledger.owner_of(account)
    }
}

impl LedgerEngine for AsyncTransactionEngine {
    fn open_account(
        &mut self,
        id: Option<AccountId>,
        owner: OwnerId,
        kind: AccountKind,
    ) -> Result<AccountId, LedgerError> {
        AsyncTransactionEngine::open_account(self, id, owner, kind)
    }

    fn close_account(&mut self, id: &AccountId) -> Result<Account, LedgerError> {
        AsyncTransactionEngine::close_account(self, id)
    }

    fn deposit(
        &mut self,
        id: &AccountId,
        amount: Decimal,
    ) -> Result<TransactionRecord, LedgerError> {
        AsyncTransactionEngine::deposit(self, id, amount)
    }

    fn withdraw(
        &mut self,
        id: &AccountId,
        amount: Decimal,
    ) -> Result<TransactionRecord, LedgerError> {
        AsyncTransactionEngine::withdraw(self, id, amount)
    }

    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Decimal,
    ) -> Result<TransactionRecord, LedgerError> {
        AsyncTransactionEngine::transfer(self, from, to, amount)
    }

    fn apply_interest(
        &mut self,
        id: &AccountId,
    ) -> Result<Option<TransactionRecord>, LedgerError> {
        AsyncTransactionEngine::apply_interest(self, id)
    }

    fn apply_interest_to_all(&mut self) -> Vec<TransactionRecord> {
        AsyncTransactionEngine::apply_interest_to_all(self)
    }

    fn set_overdraft_limit(&mut self, id: &AccountId, limit: Decimal) -> Result<(), LedgerError> {
        AsyncTransactionEngine::set_overdraft_limit(self, id, limit)
    }

    fn history(&self, id: &AccountId) -> Result<Vec<TransactionRecord>, LedgerError> {
        self.ledger.history(id)
    }

    fn accounts(&self) -> Vec<Account> {
        self.ledger.accounts()
    }

    fn records(&self) -> Vec<TransactionRecord> {
        self.ledger.records()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use rust_decimal_macros::dec;
    use std::thread;

    fn acc(s: &str) -> AccountId {
        s.parse().unwrap()
    }

    fn balance(engine: &AsyncTransactionEngine, id: &str) -> Decimal {
        engine.ledger().find_account(&acc(id)).unwrap().balance()
    }

    /// ACC001: non-overdraft, ACC002 and ACC003: overdraft with a 100 limit
    #[fixture]
    fn engine() -> AsyncTransactionEngine {
        let engine = AsyncTransactionEngine::default();
        let owner: OwnerId = "C001".parse().unwrap();
        engine
            .open_account(
                Some(acc("ACC001")),
                owner.clone(),
                AccountKind::non_overdraft(dec!(0.05)).unwrap(),
            )
            .unwrap();
        for id in ["ACC002", "ACC003"] {
            engine
                .open_account(
                    Some(acc(id)),
                    owner.clone(),
                    AccountKind::overdraft(dec!(100)).unwrap(),
                )
                .unwrap();
        }
        engine
    }

    #[rstest]
    fn test_mirrors_sync_engine(engine: AsyncTransactionEngine) {
        engine.deposit(&acc("ACC001"), dec!(1000)).unwrap();
        let failed = engine.withdraw(&acc("ACC001"), dec!(1500)).unwrap();
        let transfer = engine
            .transfer(&acc("ACC001"), &acc("ACC002"), dec!(300))
            .unwrap();

        assert_eq!(failed.status(), TransactionStatus::Failed);
        assert!(transfer.is_completed());
        assert_eq!(balance(&engine, "ACC001"), dec!(700));
        assert_eq!(balance(&engine, "ACC002"), dec!(300));
        assert_eq!(engine.ledger().history(&acc("ACC001")).unwrap().len(), 3);
        assert_eq!(engine.ledger().history(&acc("ACC002")).unwrap().len(), 1);
    }

    #[rstest]
    fn test_validation_errors_leave_no_record(engine: AsyncTransactionEngine) {
        assert_eq!(
            engine.deposit(&acc("ACC001"), dec!(0)),
            Err(LedgerError::invalid_amount(dec!(0)))
        );
        assert_eq!(
            engine.transfer(&acc("ACC001"), &acc("ACC002"), dec!(0.00005)),
            Err(LedgerError::excessive_precision(dec!(0.00005)))
        );
        assert_eq!(
            engine.transfer(&acc("ACC002"), &acc("ACC002"), dec!(1)),
            Err(LedgerError::same_account_transfer("ACC002"))
        );
        assert_eq!(
            engine.withdraw(&acc("ACC404"), dec!(1)),
            Err(LedgerError::account_not_found("ACC404"))
        );
        assert_eq!(
            engine.transfer(&acc("ACC404"), &acc("ACC405"), dec!(1)),
            Err(LedgerError::account_not_found("ACC404"))
        );
        assert!(engine.ledger().records().is_empty());
    }

    #[rstest]
    fn test_interest_and_limits(engine: AsyncTransactionEngine) {
        engine.deposit(&acc("ACC001"), dec!(200)).unwrap();
        engine.deposit(&acc("ACC002"), dec!(200)).unwrap();

        let records = engine.apply_interest_to_all();
        assert_eq!(records.len(), 1);
        assert_eq!(balance(&engine, "ACC001"), dec!(210));

        engine.withdraw(&acc("ACC003"), dec!(80)).unwrap();
        assert!(matches!(
            engine.set_overdraft_limit(&acc("ACC003"), dec!(50)),
            Err(LedgerError::OverdraftLimitBelowBalance { .. })
        ));
        engine.set_overdraft_limit(&acc("ACC003"), dec!(80)).unwrap();
    }

    #[rstest]
    fn test_opposite_transfers_do_not_deadlock(engine: AsyncTransactionEngine) {
        engine.deposit(&acc("ACC002"), dec!(1000)).unwrap();
        engine.deposit(&acc("ACC003"), dec!(1000)).unwrap();
        let total = engine.ledger().total_balance();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let engine = engine.clone();
                thread::spawn(move || {
                    let (from, to) = if i % 2 == 0 {
                        (acc("ACC002"), acc("ACC003"))
                    } else {
                        (acc("ACC003"), acc("ACC002"))
                    };
                    for _ in 0..200 {
                        engine.transfer(&from, &to, dec!(7)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(engine.ledger().total_balance(), total);
        assert_eq!(engine.ledger().records().len(), 2 + 8 * 200);
        for id in ["ACC002", "ACC003"] {
            assert!(balance(&engine, id) >= dec!(-100));
        }
    }

    #[rstest]
    fn test_concurrent_withdrawals_respect_floor(engine: AsyncTransactionEngine) {
        engine.deposit(&acc("ACC001"), dec!(100)).unwrap();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let engine = engine.clone();
                thread::spawn(move || engine.withdraw(&acc("ACC001"), dec!(30)).unwrap())
            })
            .collect();
        let completed = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(TransactionRecord::is_completed)
            .count();

        assert_eq!(completed, 3);
        assert_eq!(balance(&engine, "ACC001"), dec!(10));
    }
}
