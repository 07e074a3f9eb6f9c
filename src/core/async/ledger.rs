//! Thread-safe ledger for concurrent processing
//!
//! This module provides the `AsyncLedger` struct, the concurrent counterpart
//! of `Ledger`.
//!
//! # Design
//!
//! Accounts live in a `DashMap` of slots. Each slot is an
//! `Arc<parking_lot::Mutex<Option<Account>>>`, so every check-then-act on an
//! account happens under that account's own lock. A closed account leaves
//! `None` behind in its slot, which any operation still holding the slot
//! observes as `AccountNotFound`.
//!
//! # Lock ordering
//!
//! - Two accounts are always locked in ascending `AccountId` order
//! - The journal lock is only taken while account locks are held, never the
//!   other way round, and only for the duration of one append
//! - No DashMap shard lock is held while waiting for an account lock
//!
//! There is no ledger-wide lock around money movement: operations on
//! disjoint accounts proceed in parallel.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use crate::core::journal::Journal;
use crate::core::traits::OwnerDirectory;
use crate::types::{
    Account, AccountId, AccountKind, LedgerError, OwnerId, PendingTransaction, TransactionRecord,
    TransactionStatus,
};

type Slot = Arc<Mutex<Option<Account>>>;

/// Thread-safe accounts and journal
#[derive(Debug, Default)]
pub struct AsyncLedger {
    accounts: DashMap<AccountId, Slot>,
    journal: Mutex<Journal>,
    /// Highest account number issued so far (0 when none)
    highest_issued: AtomicU32,
}

impl AsyncLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an account under a caller-chosen id
    ///
    /// # Errors
    ///
    /// * `LedgerError::DuplicateAccount` - If the id is already in use
    /// * Validation errors from `Account::new`
    pub fn open_account_with_id(
        &self,
        id: AccountId,
        owner: OwnerId,
        kind: AccountKind,
    ) -> Result<AccountId, LedgerError> {
        let account = Account::new(id.clone(), owner, kind)?;
        match self.accounts.entry(id.clone()) {
            Entry::Occupied(_) => Err(LedgerError::duplicate_account(&id)),
            Entry::Vacant(vacant) => {
                vacant.insert(Arc::new(Mutex::new(Some(account))));
                self.highest_issued.fetch_max(id.number(), Ordering::SeqCst);
                Ok(id)
            }
        }
    }

    /// Open an account with a generated id
    ///
    /// Numbers are reserved atomically, so concurrent callers never receive
    /// the same id. A reserved number already taken by an explicit id is
    /// skipped.
    pub fn open_account(
        &self,
        owner: OwnerId,
        kind: AccountKind,
    ) -> Result<AccountId, LedgerError> {
        loop {
            let number = self.highest_issued.fetch_add(1, Ordering::SeqCst) + 1;
            let id = AccountId::from_number(number)?;
            match self.open_account_with_id(id, owner.clone(), kind) {
                Err(LedgerError::DuplicateAccount { .. }) => continue,
                result => return result,
            }
        }
    }

    /// Id the next generated account would get if nobody else opens one first
    pub fn next_account_id(&self) -> Result<AccountId, LedgerError> {
        AccountId::from_number(self.highest_issued.load(Ordering::SeqCst) + 1)
    }

    fn slot(&self, id: &AccountId) -> Result<Slot, LedgerError> {
        self.accounts
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| LedgerError::account_not_found(id))
    }

    /// Snapshot of one account
    pub fn find_account(&self, id: &AccountId) -> Option<Account> {
        self.slot(id).ok()?.lock().clone()
    }

    /// Run `f` with exclusive access to one account
    pub fn update<T, F>(&self, id: &AccountId, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut Account) -> Result<T, LedgerError>,
    {
        let slot = self.slot(id)?;
        let mut guard = slot.lock();
        let account = guard
            .as_mut()
            .ok_or_else(|| LedgerError::account_not_found(id))?;
        f(account)
    }

    /// Run `f` with exclusive access to the source and destination of a transfer
    ///
    /// Both locks are taken in ascending id order regardless of direction,
    /// so opposite transfers between the same pair cannot deadlock.
    ///
    /// # Errors
    ///
    /// * `LedgerError::SameAccountTransfer` - If `from == to`
    /// * `LedgerError::AccountNotFound` - If either account is missing or closed
    pub fn update_pair<T, F>(
        &self,
        from: &AccountId,
        to: &AccountId,
        f: F,
    ) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut Account, &mut Account) -> Result<T, LedgerError>,
    {
        if from == to {
            return Err(LedgerError::same_account_transfer(from));
        }
        let source_slot = self.slot(from)?;
        let destination_slot = self.slot(to)?;

        let (mut source_guard, mut destination_guard) = if from < to {
            let source = source_slot.lock();
            let destination = destination_slot.lock();
            (source, destination)
        } else {
            let destination = destination_slot.lock();
            let source = source_slot.lock();
            (source, destination)
        };

        let source = source_guard
            .as_mut()
            .ok_or_else(|| LedgerError::account_not_found(from))?;
        let destination = destination_guard
            .as_mut()
            .ok_or_else(|| LedgerError::account_not_found(to))?;
        f(source, destination)
    }

    /// Commit a record and attach it to the locked accounts it belongs to
    ///
    /// Callers pass the accounts they currently hold locks on, which keeps
    /// each history in the same order as the journal.
    pub fn append_record(
        &self,
        pending: PendingTransaction,
        status: TransactionStatus,
        locked: &mut [&mut Account],
    ) -> TransactionRecord {
        let record = self.journal.lock().commit(pending, status);
        for id in record.history_accounts() {
            if let Some(account) = locked.iter_mut().find(|account| account.id() == id) {
                account.push_history(record.id());
            }
        }
        record
    }

    /// Remove an account
    ///
    /// The slot is emptied under its lock. Operations that already hold a
    /// reference to the slot see the account as missing afterwards.
    pub fn close_account(&self, id: &AccountId) -> Result<Account, LedgerError> {
        let (_, slot) = self
            .accounts
            .remove(id)
            .ok_or_else(|| LedgerError::account_not_found(id))?;
        let account = slot.lock().take();
        account.ok_or_else(|| LedgerError::account_not_found(id))
    }

    /// History of an open account, oldest first
    pub fn history(&self, id: &AccountId) -> Result<Vec<TransactionRecord>, LedgerError> {
        self.update(id, |account| {
            let journal = self.journal.lock();
            Ok(account
                .history()
                .iter()
                .filter_map(|tx| journal.get(*tx).cloned())
                .collect())
        })
    }

    /// Snapshot of every committed record in commit order
    pub fn records(&self) -> Vec<TransactionRecord> {
        self.journal.lock().records().to_vec()
    }

    /// Records naming `id`, whether or not the account is still open
    pub fn records_involving(&self, id: &AccountId) -> Vec<TransactionRecord> {
        self.journal
            .lock()
            .involving(id)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Snapshot of all open accounts sorted by id
    pub fn accounts(&self) -> Vec<Account> {
        let slots: Vec<Slot> = self
            .accounts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        let mut accounts: Vec<Account> = slots
            .iter()
            .filter_map(|slot| slot.lock().clone())
            .collect();
        accounts.sort_by(|a, b| a.id().cmp(b.id()));
        accounts
    }

    /// Sum of all open balances
    pub fn total_balance(&self) -> Decimal {
        self.accounts().iter().map(Account::balance).sum()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl OwnerDirectory for AsyncLedger {
    fn owner_of(&self, account: &AccountId) -> Option<OwnerId> {
        self.slot(account)
            .ok()?
            .lock()
            .as_ref()
            .map(|acct| acct.owner().clone())
    }
}
