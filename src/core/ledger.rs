//! Single-threaded ledger
//!
//! The `Ledger` is the authoritative store of accounts together with the
//! journal of every record ever committed. It is responsible for:
//! - Opening accounts (with a caller-chosen or generated id)
//! - Looking accounts up and closing them
//! - Appending records and attaching them to account histories
//! - Sorted account listings for output

use std::collections::HashMap;

use rust_decimal::Decimal;

use super::journal::Journal;
use super::traits::OwnerDirectory;
use crate::types::{
    Account, AccountId, AccountKind, LedgerError, OwnerId, PendingTransaction, TransactionRecord,
    TransactionStatus,
};

/// Accounts and journal of one ledger instance
///
/// Ledgers are plain values; any number of them can coexist.
#[derive(Debug, Default)]
pub struct Ledger {
    accounts: HashMap<AccountId, Account>,
    journal: Journal,
    /// Highest account number ever issued; closed ids are not handed out again
    highest_issued: Option<u32>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next generated account will get
    ///
    /// # Errors
    ///
    /// * `LedgerError::AccountIdsExhausted` - If `ACC999` has already been issued
    pub fn next_account_id(&self) -> Result<AccountId, LedgerError> {
        let next = self.highest_issued.map_or(1, |n| n + 1);
        AccountId::from_number(next)
    }

    /// Open an account with a generated id
    pub fn open_account(
        &mut self,
        owner: OwnerId,
        kind: AccountKind,
    ) -> Result<AccountId, LedgerError> {
        let id = self.next_account_id()?;
        self.open_account_with_id(id, owner, kind)
    }

    /// Open an account under a caller-chosen id
    ///
    /// # Errors
    ///
    /// * `LedgerError::DuplicateAccount` - If the id is already in use
    /// * Validation errors from `Account::new`
    pub fn open_account_with_id(
        &mut self,
        id: AccountId,
        owner: OwnerId,
        kind: AccountKind,
    ) -> Result<AccountId, LedgerError> {
        if self.accounts.contains_key(&id) {
            return Err(LedgerError::duplicate_account(&id));
        }
        let account = Account::new(id.clone(), owner, kind)?;
        self.highest_issued = self.highest_issued.max(Some(id.number()));
        self.accounts.insert(id.clone(), account);
        Ok(id)
    }

    pub fn find_account(&self, id: &AccountId) -> Option<&Account> {
        self.accounts.get(id)
    }

    pub(crate) fn find_account_mut(&mut self, id: &AccountId) -> Result<&mut Account, LedgerError> {
        self.accounts
            .get_mut(id)
            .ok_or_else(|| LedgerError::account_not_found(id))
    }

    /// Run `f` with the source and destination of a transfer borrowed mutably
    ///
    /// # Errors
    ///
    /// * `LedgerError::SameAccountTransfer` - If `from == to`
    /// * `LedgerError::AccountNotFound` - If either account is missing
    pub(crate) fn with_pair<R>(
        &mut self,
        from: &AccountId,
        to: &AccountId,
        f: impl FnOnce(&mut Account, &mut Account) -> R,
    ) -> Result<R, LedgerError> {
        if from == to {
            return Err(LedgerError::same_account_transfer(from));
        }
        if !self.accounts.contains_key(from) {
            return Err(LedgerError::account_not_found(from));
        }
        if !self.accounts.contains_key(to) {
            return Err(LedgerError::account_not_found(to));
        }
        let mut source = self
            .accounts
            .remove(from)
            .ok_or_else(|| LedgerError::account_not_found(from))?;
        let result = match self.accounts.get_mut(to) {
            Some(destination) => Ok(f(&mut source, destination)),
            None => Err(LedgerError::account_not_found(to)),
        };
        self.accounts.insert(from.clone(), source);
        result
    }

    /// Remove an account
    ///
    /// Its records stay in the journal and remain visible through
    /// `records_involving`.
    pub fn close_account(&mut self, id: &AccountId) -> Result<Account, LedgerError> {
        self.accounts
            .remove(id)
            .ok_or_else(|| LedgerError::account_not_found(id))
    }

    /// Commit a record and attach it to the histories it belongs to
    ///
    /// Completed records are attached to every account they name, failed
    /// ones only to their source.
    pub fn append_record(
        &mut self,
        pending: PendingTransaction,
        status: TransactionStatus,
    ) -> TransactionRecord {
        let record = self.journal.commit(pending, status);
        for id in record.history_accounts() {
            if let Some(account) = self.accounts.get_mut(id) {
                account.push_history(record.id());
            }
        }
        record
    }

    /// History of an open account, oldest first
    ///
    /// The returned vector can be iterated any number of times.
    pub fn history(&self, id: &AccountId) -> Result<Vec<&TransactionRecord>, LedgerError> {
        let account = self
            .find_account(id)
            .ok_or_else(|| LedgerError::account_not_found(id))?;
        Ok(account
            .history()
            .iter()
            .filter_map(|tx| self.journal.get(*tx))
            .collect())
    }

    /// Every committed record in commit order
    pub fn records(&self) -> &[TransactionRecord] {
        self.journal.records()
    }

    /// Records naming `id`, whether or not the account is still open
    pub fn records_involving(&self, id: &AccountId) -> Vec<&TransactionRecord> {
        self.journal.involving(id)
    }

    /// All open accounts sorted by id
    pub fn accounts(&self) -> Vec<&Account> {
        let mut accounts: Vec<&Account> = self.accounts.values().collect();
        accounts.sort_by(|a, b| a.id().cmp(b.id()));
        accounts
    }

    /// Open accounts owned by `owner`, sorted by id
    pub fn accounts_of(&self, owner: &OwnerId) -> Vec<&Account> {
        let mut accounts: Vec<&Account> = self
            .accounts
            .values()
            .filter(|account| account.owner() == owner)
            .collect();
        accounts.sort_by(|a, b| a.id().cmp(b.id()));
        accounts
    }

    /// Sum of all open balances
    pub fn total_balance(&self) -> Decimal {
        self.accounts.values().map(Account::balance).sum()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl OwnerDirectory for Ledger {
    fn owner_of(&self, account: &AccountId) -> Option<OwnerId> {
        self.accounts.get(account).map(|acct| acct.owner().clone())
    }
}
