//! Transaction records for the ledger
//!
//! A `PendingTransaction` describes an attempted operation before it has
//! been committed. The journal turns it into an immutable
//! `TransactionRecord` by assigning the id, final status and timestamp.
//! Records expose getters only; nothing can change a record after commit.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::ids::AccountId;

/// Transaction identifier, assigned 1, 2, 3... per ledger
pub type TransactionId = u64;

/// Kind of money movement a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    /// Credit to `to`
    Deposit,
    /// Debit from `from`
    Withdraw,
    /// Debit from `from` and credit to `to`
    Transfer,
    /// Interest credited to `to` by `apply_interest_once`
    Interest,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdraw => "withdraw",
            TransactionKind::Transfer => "transfer",
            TransactionKind::Interest => "interest",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal status of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Completed,
    Failed,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Completed => f.write_str("COMPLETED"),
            TransactionStatus::Failed => f.write_str("FAILED"),
        }
    }
}

/// An attempted operation that has not been committed to the journal yet
#[derive(Debug, Clone, PartialEq)]
pub struct PendingTransaction {
    kind: TransactionKind,
    amount: Decimal,
    from: Option<AccountId>,
    to: Option<AccountId>,
}

impl PendingTransaction {
    pub fn deposit(to: AccountId, amount: Decimal) -> Self {
        PendingTransaction {
            kind: TransactionKind::Deposit,
            amount,
            from: None,
            to: Some(to),
        }
    }

    pub fn withdraw(from: AccountId, amount: Decimal) -> Self {
        PendingTransaction {
            kind: TransactionKind::Withdraw,
            amount,
            from: Some(from),
            to: None,
        }
    }

    pub fn transfer(from: AccountId, to: AccountId, amount: Decimal) -> Self {
        PendingTransaction {
            kind: TransactionKind::Transfer,
            amount,
            from: Some(from),
            to: Some(to),
        }
    }

    pub fn interest(to: AccountId, amount: Decimal) -> Self {
        PendingTransaction {
            kind: TransactionKind::Interest,
            amount,
            from: None,
            to: Some(to),
        }
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }
}

/// Immutable journal entry
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    id: TransactionId,
    kind: TransactionKind,
    amount: Decimal,
    from: Option<AccountId>,
    to: Option<AccountId>,
    status: TransactionStatus,
    timestamp: DateTime<Utc>,
}

impl TransactionRecord {
    /// Seal a pending transaction; only the journal calls this
    pub(crate) fn seal(
        id: TransactionId,
        pending: PendingTransaction,
        status: TransactionStatus,
        timestamp: DateTime<Utc>,
    ) -> Self {
        TransactionRecord {
            id,
            kind: pending.kind,
            amount: pending.amount,
            from: pending.from,
            to: pending.to,
            status,
            timestamp,
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Display label in the `TX001` style
    pub fn label(&self) -> String {
        format!("TX{:03}", self.id)
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn from(&self) -> Option<&AccountId> {
        self.from.as_ref()
    }

    pub fn to(&self) -> Option<&AccountId> {
        self.to.as_ref()
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    pub fn is_completed(&self) -> bool {
        self.status == TransactionStatus::Completed
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Whether the record names `account` as source or destination
    pub fn involves(&self, account: &AccountId) -> bool {
        self.from.as_ref() == Some(account) || self.to.as_ref() == Some(account)
    }

    /// Accounts whose history this record is appended to
    ///
    /// Completed records go to every account they name. A failed record only
    /// ever touched its source, so the destination history stays clean.
    pub fn history_accounts(&self) -> impl Iterator<Item = &AccountId> {
        let to = match self.status {
            TransactionStatus::Completed => self.to.as_ref(),
            TransactionStatus::Failed => None,
        };
        self.from.as_ref().into_iter().chain(to)
    }

    /// Signed effect of this record on `account`'s balance
    ///
    /// Failed records have no effect. Replaying the effects of an account's
    /// history from zero yields its balance.
    pub fn balance_effect(&self, account: &AccountId) -> Decimal {
        if !self.is_completed() {
            return Decimal::ZERO;
        }
        let mut effect = Decimal::ZERO;
        if self.to.as_ref() == Some(account) {
            effect += self.amount;
        }
        if self.from.as_ref() == Some(account) {
            effect -= self.amount;
        }
        effect
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn acc(s: &str) -> AccountId {
        s.parse().unwrap()
    }

    fn seal(pending: PendingTransaction, status: TransactionStatus) -> TransactionRecord {
        TransactionRecord::seal(1, pending, status, Utc::now())
    }

    #[test]
    fn test_completed_transfer_goes_to_both_histories() {
        let record = seal(
            PendingTransaction::transfer(acc("ACC001"), acc("ACC002"), dec!(10)),
            TransactionStatus::Completed,
        );
        let accounts: Vec<&str> = record.history_accounts().map(AccountId::as_str).collect();
        assert_eq!(accounts, vec!["ACC001", "ACC002"]);
    }

    #[test]
    fn test_failed_transfer_only_goes_to_source_history() {
        let record = seal(
            PendingTransaction::transfer(acc("ACC001"), acc("ACC002"), dec!(10)),
            TransactionStatus::Failed,
        );
        let accounts: Vec<&str> = record.history_accounts().map(AccountId::as_str).collect();
        assert_eq!(accounts, vec!["ACC001"]);
    }

    #[test]
    fn test_balance_effect() {
        let transfer = seal(
            PendingTransaction::transfer(acc("ACC001"), acc("ACC002"), dec!(12.5)),
            TransactionStatus::Completed,
        );
        assert_eq!(transfer.balance_effect(&acc("ACC001")), dec!(-12.5));
        assert_eq!(transfer.balance_effect(&acc("ACC002")), dec!(12.5));
        assert_eq!(transfer.balance_effect(&acc("ACC003")), Decimal::ZERO);

        let failed = seal(
            PendingTransaction::withdraw(acc("ACC001"), dec!(5)),
            TransactionStatus::Failed,
        );
        assert_eq!(failed.balance_effect(&acc("ACC001")), Decimal::ZERO);
    }

    #[test]
    fn test_label_is_zero_padded() {
        let record = seal(
            PendingTransaction::deposit(acc("ACC001"), dec!(1)),
            TransactionStatus::Completed,
        );
        assert_eq!(record.label(), "TX001");
        assert!(record.involves(&acc("ACC001")));
        assert!(!record.involves(&acc("ACC002")));
    }
}
