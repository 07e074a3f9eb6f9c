//! Core traits shared by the single-threaded and concurrent implementations
//!
//! `OwnerDirectory` is the only thing the access gate needs from a ledger.
//! `LedgerEngine` is the operation set the `Teller` dispatches to, so the
//! same command handling runs on `TransactionEngine` and on
//! `AsyncTransactionEngine`.

use rust_decimal::Decimal;

use crate::types::{Account, AccountId, AccountKind, LedgerError, OwnerId, TransactionRecord};

/// Resolves the owner of an account
pub trait OwnerDirectory {
    /// Owner of `account`, or `None` if the ledger has no such account
    fn owner_of(&self, account: &AccountId) -> Option<OwnerId>;
}

/// Ledger operations available to a caller that has passed the access gate
pub trait LedgerEngine: OwnerDirectory {
    /// Open an account; `id` of `None` asks the ledger to generate one
    fn open_account(
        &mut self,
        id: Option<AccountId>,
        owner: OwnerId,
        kind: AccountKind,
    ) -> Result<AccountId, LedgerError>;

    /// Remove an account; its records stay in the journal
    fn close_account(&mut self, id: &AccountId) -> Result<Account, LedgerError>;

    fn deposit(&mut self, id: &AccountId, amount: Decimal)
        -> Result<TransactionRecord, LedgerError>;

    fn withdraw(
        &mut self,
        id: &AccountId,
        amount: Decimal,
    ) -> Result<TransactionRecord, LedgerError>;

    fn transfer(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        amount: Decimal,
    ) -> Result<TransactionRecord, LedgerError>;

    /// Apply interest once; `None` when the computed interest is zero
    fn apply_interest(
        &mut self,
        id: &AccountId,
    ) -> Result<Option<TransactionRecord>, LedgerError>;

    /// Apply interest once to every non-overdraft account
    fn apply_interest_to_all(&mut self) -> Vec<TransactionRecord>;

    fn set_overdraft_limit(&mut self, id: &AccountId, limit: Decimal)
        -> Result<(), LedgerError>;

    /// Records in an account's history, oldest first
    fn history(&self, id: &AccountId) -> Result<Vec<TransactionRecord>, LedgerError>;

    /// Snapshot of all open accounts sorted by id
    fn accounts(&self) -> Vec<Account>;

    /// Snapshot of the whole journal in commit order
    fn records(&self) -> Vec<TransactionRecord>;
}
