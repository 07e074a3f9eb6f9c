//! Transaction processing engine
//!
//! The `TransactionEngine` orchestrates deposits, withdrawals and transfers
//! against a `Ledger`. It enforces:
//! - Validation before any record exists (amount and its precision, ids,
//!   same-account transfers)
//! - Policy refusals recorded as `Failed` records instead of errors
//! - Two-phase transfers: the destination is only credited if the source
//!   debit succeeded
//!
//! The engine does not look at principals. Callers gate every operation
//! through the access gate first (see `Teller`).

use rust_decimal::Decimal;
use tracing::{debug, info};

use super::ledger::Ledger;
use super::traits::{LedgerEngine, OwnerDirectory};
use crate::types::account::ensure_valid_amount;
use crate::types::{
    Account, AccountId, AccountKind, LedgerError, OwnerId, PendingTransaction, TransactionRecord,
    TransactionStatus,
};


/// Withdraw and classify the outcome
///
/// Business-rule refusals become `Failed`; any other error propagates.
pub(crate) fn settle_withdrawal(
    account: &mut Account,
    amount: Decimal,
) -> Result<TransactionStatus, LedgerError> {
    match account.withdraw(amount) {
        Ok(()) => Ok(TransactionStatus::Completed),
        Err(err) if err.is_business_rule() => {
            info!(account = %account.id(), %amount, reason = %err, "withdrawal refused");
            Ok(TransactionStatus::Failed)
        }
        Err(err) => Err(err),
    }
}

/// Run both phases of a transfer
///
/// The destination's capacity is checked before phase 1 so that phase 2
/// cannot fail after the source has been debited.
pub(crate) fn settle_transfer(
    source: &mut Account,
    destination: &mut Account,
    amount: Decimal,
) -> Result<TransactionStatus, LedgerError> {
    destination.can_accept(amount)?;

    let status = settle_withdrawal(source, amount)?;
    if status == TransactionStatus::Completed {
        destination.deposit(amount)?;
    }
    Ok(status)
}

/// Transaction processing engine over a single-threaded `Ledger`
#[derive(Debug, Default)]
pub struct TransactionEngine {
    ledger: Ledger,
}

impl TransactionEngine {
    /// Create an engine over an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ledger(ledger: Ledger) -> Self {
        TransactionEngine { ledger }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn into_ledger(self) -> Ledger {
        self.ledger
    }

    /// Open an account, generating the id when none is given
    pub fn open_account(
        &mut self,
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

    pub fn close_account(&mut self, id: &AccountId) -> Result<Account, LedgerError> {
        let account = self.ledger.close_account(id)?;
        debug!(account = %id, balance = %account.balance(), "account closed");
        Ok(account)
    }

    /// Deposit funds into an account
    ///
    /// # Arguments
    ///
    /// * `id` - Account to credit
    /// * `amount` - Strictly positive amount
    ///
    /// # Returns
    ///
    /// The `Completed` record, already appended to the account history
    ///
    /// # Errors
    ///
    /// * `LedgerError::InvalidAmount` - Non-positive amount; no record is created
    /// * `LedgerError::AccountNotFound` - Unknown account; no record is created
    /// * `LedgerError::ArithmeticOverflow` - Balance would overflow; no record is created
    pub fn deposit(
        &mut self,
        id: &AccountId,
        amount: Decimal,
    ) -> Result<TransactionRecord, LedgerError> {
        ensure_valid_amount(amount)?;
        self.ledger.find_account_mut(id)?.deposit(amount)?;

        let record = self.ledger.append_record(
            PendingTransaction::deposit(id.clone(), amount),
            TransactionStatus::Completed,
        );
        debug!(tx = record.id(), account = %id, %amount, "deposit recorded");
        Ok(record)
    }

    /// Withdraw funds from an account
    ///
    /// A withdrawal the account kind refuses still produces a record, with
    /// status `Failed`, and leaves the balance unchanged.
    ///
    /// # Errors
    ///
    /// * `LedgerError::InvalidAmount` - Non-positive amount; no record is created
    /// * `LedgerError::AccountNotFound` - Unknown account; no record is created
    pub fn withdraw(
        &mut self,
        id: &AccountId,
        amount: Decimal,
    ) -> Result<TransactionRecord, LedgerError> {
        ensure_valid_amount(amount)?;
        let status = settle_withdrawal(self.ledger.find_account_mut(id)?, amount)?;

        let record = self
            .ledger
            .append_record(PendingTransaction::withdraw(id.clone(), amount), status);
        debug!(tx = record.id(), account = %id, %amount, %status, "withdrawal recorded");
        Ok(record)
    }

    /// Move funds between two accounts
    ///
    /// Phase 1 withdraws from `from` under its account policy. Phase 2
    /// deposits into `to` only if phase 1 succeeded. A failed transfer is
    /// recorded in the source history only and leaves both balances as
    /// they were.
    ///
    /// # Errors
    ///
    /// * `LedgerError::InvalidAmount` - Non-positive amount
    /// * `LedgerError::SameAccountTransfer` - `from == to`
    /// * `LedgerError::AccountNotFound` - Either account is unknown
    /// * `LedgerError::ArithmeticOverflow` - Destination cannot hold the amount
    pub fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Decimal,
    ) -> Result<TransactionRecord, LedgerError> {
        ensure_valid_amount(amount)?;
        let status = self.ledger.with_pair(from, to, |source, destination| {
            settle_transfer(source, destination, amount)
        })??;

        let record = self.ledger.append_record(
            PendingTransaction::transfer(from.clone(), to.clone(), amount),
            status,
        );
        debug!(tx = record.id(), %from, %to, %amount, %status, "transfer recorded");
        Ok(record)
    }

    /// Apply interest once to a non-overdraft account
    ///
    /// The credit is recorded as a `Completed` interest record so that the
    /// history still replays to the balance. Zero interest creates no record.
    pub fn apply_interest(
        &mut self,
        id: &AccountId,
    ) -> Result<Option<TransactionRecord>, LedgerError> {
        let interest = self.ledger.find_account_mut(id)?.apply_interest_once()?;
        if interest.is_zero() {
            return Ok(None);
        }
        let record = self.ledger.append_record(
            PendingTransaction::interest(id.clone(), interest),
            TransactionStatus::Completed,
        );
        debug!(tx = record.id(), account = %id, %interest, "interest credited");
        Ok(Some(record))
    }

    /// Apply interest once to every non-overdraft account, in id order
    pub fn apply_interest_to_all(&mut self) -> Vec<TransactionRecord> {
        let ids: Vec<AccountId> = self
            .ledger
            .accounts()
            .into_iter()
            .filter(|account| matches!(account.kind(), AccountKind::NonOverdraft { .. }))
            .map(|account| account.id().clone())
            .collect();

        let mut records = Vec::new();
        for id in ids {
            match self.apply_interest(&id) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(err) => info!(account = %id, error = %err, "interest skipped"),
            }
        }
        records
    }

    pub fn set_overdraft_limit(
        &mut self,
        id: &AccountId,
        limit: Decimal,
    ) -> Result<(), LedgerError> {
        self.ledger.find_account_mut(id)?.set_overdraft_limit(limit)?;
        debug!(account = %id, %limit, "overdraft limit updated");
        Ok(())
    }
}

impl OwnerDirectory for TransactionEngine {
    fn owner_of(&self, account: &AccountId) -> Option<OwnerId> {
        self.ledger.owner_of(account)
    }
}

impl LedgerEngine for TransactionEngine {
    fn open_account(
        &mut self,
        id: Option<AccountId>,
        owner: OwnerId,
        kind: AccountKind,
    ) -> Result<AccountId, LedgerError> {
        TransactionEngine::open_account(self, id, owner, kind)
    }

    fn close_account(&mut self, id: &AccountId) -> Result<Account, LedgerError> {
        TransactionEngine::close_account(self, id)
    }

    fn deposit(
        &mut self,
        id: &AccountId,
        amount: Decimal,
    ) -> Result<TransactionRecord, LedgerError> {
        TransactionEngine::deposit(self, id, amount)
    }

    fn withdraw(
        &mut self,
        id: &AccountId,
        amount: Decimal,
    ) -> Result<TransactionRecord, LedgerError> {
        TransactionEngine::withdraw(self, id, amount)
    }

    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Decimal,
    ) -> Result<TransactionRecord, LedgerError> {
        TransactionEngine::transfer(self, from, to, amount)
    }

    fn apply_interest(
        &mut self,
        id: &AccountId,
    ) -> Result<Option<TransactionRecord>, LedgerError> {
        TransactionEngine::apply_interest(self, id)
    }

    fn apply_interest_to_all(&mut self) -> Vec<TransactionRecord> {
        TransactionEngine::apply_interest_to_all(self)
    }

    fn set_overdraft_limit(&mut self, id: &AccountId, limit: Decimal) -> Result<(), LedgerError> {
        TransactionEngine::set_overdraft_limit(self, id, limit)
    }

    fn history(&self, id: &AccountId) -> Result<Vec<TransactionRecord>, LedgerError> {
        Ok(self.ledger.history(id)?.into_iter().cloned().collect())
    }

    fn accounts(&self) -> Vec<Account> {
        self.ledger.accounts().into_iter().cloned().collect()
    }

    fn records(&self) -> Vec<TransactionRecord> {
        self.ledger.records().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionKind;
    use rstest::{fixture, rstest};
    use rust_decimal_macros::dec;

    fn acc(s: &str) -> AccountId {
        s.parse().unwrap()
    }

    fn balance(engine: &TransactionEngine, id: &str) -> Decimal {
        engine.ledger().find_account(&acc(id)).unwrap().balance()
    }

    /// ACC001: non-overdraft at 3%, ACC002: overdraft with a 500 limit
    #[fixture]
    fn engine() -> TransactionEngine {
        let mut engine = TransactionEngine::new();
        engine
            .open_account(
                Some(acc("ACC001")),
                "C001".parse().unwrap(),
                AccountKind::non_overdraft(dec!(0.03)).unwrap(),
            )
            .unwrap();
        engine
            .open_account(
                Some(acc("ACC002")),
                "C001".parse().unwrap(),
                AccountKind::overdraft(dec!(500)).unwrap(),
            )
            .unwrap();
        engine
    }

    #[rstest]
    fn test_deposit_records_completed(mut engine: TransactionEngine) {
        let record = engine.deposit(&acc("ACC001"), dec!(1000)).unwrap();

        assert_eq!(record.kind(), TransactionKind::Deposit);
        assert_eq!(record.status(), TransactionStatus::Completed);
        assert_eq!(record.to(), Some(&acc("ACC001")));
        assert_eq!(record.from(), None);
        assert_eq!(balance(&engine, "ACC001"), dec!(1000));
        assert_eq!(engine.ledger().find_account(&acc("ACC001")).unwrap().history(), &[1]);
    }

    #[rstest]
    #[case::zero(dec!(0), LedgerError::invalid_amount(dec!(0)))]
    #[case::negative(dec!(-1), LedgerError::invalid_amount(dec!(-1)))]
    #[case::too_precise(dec!(0.00005), LedgerError::excessive_precision(dec!(0.00005)))]
    fn test_invalid_amount_creates_no_record(
        mut engine: TransactionEngine,
        #[case] amount: Decimal,
        #[case] expected: LedgerError,
    ) {
        assert_eq!(engine.deposit(&acc("ACC001"), amount), Err(expected.clone()));
        assert_eq!(engine.withdraw(&acc("ACC001"), amount), Err(expected.clone()));
        assert_eq!(
            engine.transfer(&acc("ACC001"), &acc("ACC002"), amount),
            Err(expected)
        );
        assert!(engine.ledger().records().is_empty());
    }

    #[rstest]
    fn test_unknown_account_creates_no_record(mut engine: TransactionEngine) {
        assert_eq!(
            engine.deposit(&acc("ACC404"), dec!(1)),
            Err(LedgerError::account_not_found("ACC404"))
        );
        assert_eq!(
            engine.transfer(&acc("ACC001"), &acc("ACC404"), dec!(1)),
            Err(LedgerError::account_not_found("ACC404"))
        );
        assert_eq!(
            engine.transfer(&acc("ACC404"), &acc("ACC001"), dec!(1)),
            Err(LedgerError::account_not_found("ACC404"))
        );
        assert_eq!(
            engine.transfer(&acc("ACC404"), &acc("ACC405"), dec!(1)),
            Err(LedgerError::account_not_found("ACC404"))
        );
        assert!(engine.ledger().records().is_empty());
    }

    #[rstest]
    fn test_refused_withdrawal_records_failed(mut engine: TransactionEngine) {
        engine.deposit(&acc("ACC001"), dec!(100)).unwrap();

        let record = engine.withdraw(&acc("ACC001"), dec!(150)).unwrap();

        assert_eq!(record.status(), TransactionStatus::Failed);
        assert_eq!(balance(&engine, "ACC001"), dec!(100));
        assert_eq!(engine.ledger().find_account(&acc("ACC001")).unwrap().history(), &[1, 2]);
    }

    #[rstest]
    fn test_overdraft_withdrawal_goes_negative(mut engine: TransactionEngine) {
        engine.deposit(&acc("ACC002"), dec!(100)).unwrap();

        let record = engine.withdraw(&acc("ACC002"), dec!(150)).unwrap();

        assert_eq!(record.status(), TransactionStatus::Completed);
        assert_eq!(balance(&engine, "ACC002"), dec!(-50));
    }

    #[rstest]
    fn test_completed_transfer(mut engine: TransactionEngine) {
        engine.deposit(&acc("ACC001"), dec!(300)).unwrap();

        let record = engine
            .transfer(&acc("ACC001"), &acc("ACC002"), dec!(120))
            .unwrap();

        assert!(record.is_completed());
        assert_eq!(balance(&engine, "ACC001"), dec!(180));
        assert_eq!(balance(&engine, "ACC002"), dec!(120));
        assert_eq!(engine.ledger().find_account(&acc("ACC002")).unwrap().history(), &[2]);
    }

    #[rstest]
    fn test_failed_transfer_touches_source_history_only(mut engine: TransactionEngine) {
        engine.deposit(&acc("ACC001"), dec!(100)).unwrap();
        let total_before = engine.ledger().total_balance();

        let record = engine
            .transfer(&acc("ACC001"), &acc("ACC002"), dec!(100.01))
            .unwrap();

        assert_eq!(record.status(), TransactionStatus::Failed);
        assert_eq!(balance(&engine, "ACC001"), dec!(100));
        assert_eq!(balance(&engine, "ACC002"), dec!(0));
        assert_eq!(engine.ledger().total_balance(), total_before);
        assert_eq!(engine.ledger().find_account(&acc("ACC001")).unwrap().history(), &[1, 2]);
        assert!(engine.ledger().find_account(&acc("ACC002")).unwrap().history().is_empty());
    }

    #[rstest]
    fn test_same_account_transfer_rejected(mut engine: TransactionEngine) {
        engine.deposit(&acc("ACC001"), dec!(100)).unwrap();
        assert_eq!(
            engine.transfer(&acc("ACC001"), &acc("ACC001"), dec!(10)),
            Err(LedgerError::same_account_transfer("ACC001"))
        );
        assert_eq!(engine.ledger().records().len(), 1);
    }

    #[rstest]
    fn test_transfer_into_full_destination_rejected(mut engine: TransactionEngine) {
        engine.deposit(&acc("ACC001"), dec!(10)).unwrap();
        engine.deposit(&acc("ACC002"), Decimal::MAX).unwrap();

        let result = engine.transfer(&acc("ACC001"), &acc("ACC002"), dec!(5));

        assert!(matches!(result, Err(LedgerError::ArithmeticOverflow { .. })));
        assert_eq!(balance(&engine, "ACC001"), dec!(10));
        assert_eq!(engine.ledger().records().len(), 2);
    }

    #[rstest]
    fn test_apply_interest_records_credit(mut engine: TransactionEngine) {
        engine.deposit(&acc("ACC001"), dec!(1000)).unwrap();

        let record = engine.apply_interest(&acc("ACC001")).unwrap().unwrap();

        assert_eq!(record.kind(), TransactionKind::Interest);
        assert_eq!(record.amount(), dec!(30));
        assert_eq!(balance(&engine, "ACC001"), dec!(1030));
    }

    #[rstest]
    fn test_apply_interest_on_empty_account_has_no_record(mut engine: TransactionEngine) {
        assert_eq!(engine.apply_interest(&acc("ACC001")), Ok(None));
        assert!(engine.ledger().records().is_empty());
    }

    #[rstest]
    fn test_apply_interest_to_all_skips_overdraft_accounts(mut engine: TransactionEngine) {
        engine.deposit(&acc("ACC001"), dec!(100)).unwrap();
        engine.deposit(&acc("ACC002"), dec!(100)).unwrap();

        let records = engine.apply_interest_to_all();

        assert_eq!(records.len(), 1);
        assert_eq!(balance(&engine, "ACC001"), dec!(103));
        assert_eq!(balance(&engine, "ACC002"), dec!(100));
    }

    #[rstest]
    fn test_history_replays_to_balance(mut engine: TransactionEngine) {
        engine.deposit(&acc("ACC001"), dec!(500)).unwrap();
        engine.withdraw(&acc("ACC001"), dec!(800)).unwrap();
        engine.transfer(&acc("ACC001"), &acc("ACC002"), dec!(200)).unwrap();
        engine.transfer(&acc("ACC002"), &acc("ACC001"), dec!(650)).unwrap();
        engine.apply_interest(&acc("ACC001")).unwrap();

        for id in ["ACC001", "ACC002"] {
            let id = acc(id);
            let replayed: Decimal = LedgerEngine::history(&engine, &id)
                .unwrap()
                .iter()
                .map(|record| record.balance_effect(&id))
                .sum();
            assert_eq!(replayed, engine.ledger().find_account(&id).unwrap().balance());
        }
    }

    #[rstest]
    fn test_closed_account_is_not_found(mut engine: TransactionEngine) {
        engine.deposit(&acc("ACC001"), dec!(5)).unwrap();
        let closed = engine.close_account(&acc("ACC001")).unwrap();

        assert_eq!(closed.balance(), dec!(5));
        assert_eq!(
            engine.deposit(&acc("ACC001"), dec!(1)),
            Err(LedgerError::account_not_found("ACC001"))
        );
        assert_eq!(engine.ledger().records_involving(&acc("ACC001")).len(), 1);
    }
}
