//! Account types for the ledger
//!
//! An `Account` is a balance plus a fixed `AccountKind`. The kind is a tagged
//! variant: `NonOverdraft` accounts earn interest and may never go below zero,
//! `Overdraft` accounts may go negative down to their overdraft limit.
//! `Account::withdraw` is the single withdrawal contract; the only behavior
//! that varies per kind is the comparison in `AccountKind::check_withdrawal`.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};

use super::error::LedgerError;
use super::ids::{AccountId, OwnerId};
use super::transaction::TransactionId;

/// Interest rate used when an account is opened without one
pub const DEFAULT_INTEREST_RATE: Decimal = Decimal::from_parts(3, 0, 0, false, 2);

/// Overdraft limit used when an account is opened without one
pub const DEFAULT_OVERDRAFT_LIMIT: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

/// Decimal places kept for amounts, limits and credited interest
pub const MONEY_SCALE: u32 = 4;

/// Kind of an account together with its kind-specific parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    /// Balance never goes below zero; earns interest
    NonOverdraft {
        /// Rate in [0, 1] applied by `apply_interest_once`
        interest_rate: Decimal,
    },
    /// Balance may go down to `-overdraft_limit`
    Overdraft {
        /// Non-negative overdraft limit
        overdraft_limit: Decimal,
    },
}

impl AccountKind {
    /// Validated non-overdraft kind
    ///
    /// # Errors
    ///
    /// * `LedgerError::InvalidInterestRate` - If the rate is outside [0, 1]
    pub fn non_overdraft(interest_rate: Decimal) -> Result<Self, LedgerError> {
        if interest_rate < Decimal::ZERO || interest_rate > Decimal::ONE {
            return Err(LedgerError::InvalidInterestRate {
                rate: interest_rate,
            });
        }
        Ok(AccountKind::NonOverdraft { interest_rate })
    }

    /// Validated overdraft kind
    ///
    /// # Errors
    ///
    /// * `LedgerError::NegativeOverdraftLimit` - If the limit is below zero
    /// * `LedgerError::ExcessivePrecision` - If the limit has more than
    ///   `MONEY_SCALE` decimal places
    pub fn overdraft(overdraft_limit: Decimal) -> Result<Self, LedgerError> {
        if overdraft_limit < Decimal::ZERO {
            return Err(LedgerError::NegativeOverdraftLimit {
                limit: overdraft_limit,
            });
        }
        ensure_money_scale(overdraft_limit)?;
        Ok(AccountKind::Overdraft { overdraft_limit })
    }

    /// Parse a kind name and optional parameter
    ///
    /// Accepts `non_overdraft` / `savings` and `overdraft` / `checking`
    /// (case-insensitive). A missing parameter falls back to
    /// `DEFAULT_INTEREST_RATE` or `DEFAULT_OVERDRAFT_LIMIT`.
    pub fn parse(name: &str, parameter: Option<Decimal>) -> Result<Self, LedgerError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "non_overdraft" | "nonoverdraft" | "savings" => {
                Self::non_overdraft(parameter.unwrap_or(DEFAULT_INTEREST_RATE))
            }
            "overdraft" | "checking" => {
                Self::overdraft(parameter.unwrap_or(DEFAULT_OVERDRAFT_LIMIT))
            }
            _ => Err(LedgerError::unknown_account_kind(name)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AccountKind::NonOverdraft { .. } => "non_overdraft",
            AccountKind::Overdraft { .. } => "overdraft",
        }
    }

    /// Lowest balance this kind allows
    pub fn balance_floor(&self) -> Decimal {
        match self {
            AccountKind::NonOverdraft { .. } => Decimal::ZERO,
            AccountKind::Overdraft { overdraft_limit } => -*overdraft_limit,
        }
    }

    /// Business-rule check for withdrawing `amount` from `balance`
    fn check_withdrawal(
        &self,
        account: &AccountId,
        balance: Decimal,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        match self {
            AccountKind::NonOverdraft { .. } => {
                if amount > balance {
                    return Err(LedgerError::insufficient_funds(account, balance, amount));
                }
            }
            AccountKind::Overdraft { overdraft_limit } => {
                let available = balance
                    .checked_add(*overdraft_limit)
                    .ok_or_else(|| LedgerError::arithmetic_overflow("withdraw", account))?;
                if amount > available {
                    return Err(LedgerError::overdraft_limit_exceeded(
                        account, available, amount,
                    ));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A customer-owned account
///
/// Fields are private: balance and history only change through the
/// validated operations below, which keeps the per-kind floor true at all
/// times.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    id: AccountId,
    owner: OwnerId,
    balance: Decimal,
    kind: AccountKind,
    history: Vec<TransactionId>,
}

/// Reject amounts finer than `MONEY_SCALE` decimal places
fn ensure_money_scale(amount: Decimal) -> Result<(), LedgerError> {
    if amount.normalize().scale() > MONEY_SCALE {
        return Err(LedgerError::excessive_precision(amount));
    }
    Ok(())
}

/// Reject zero, negative and over-precise amounts
pub(crate) fn ensure_valid_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::invalid_amount(amount));
    }
    ensure_money_scale(amount)
}

impl Account {
    /// Create an account with a zero balance and empty history
    ///
    /// The kind is re-validated so that a hand-built `AccountKind` with an
    /// out-of-range parameter cannot slip in.
    pub fn new(id: AccountId, owner: OwnerId, kind: AccountKind) -> Result<Self, LedgerError> {
        let kind = match kind {
            AccountKind::NonOverdraft { interest_rate } => {
                AccountKind::non_overdraft(interest_rate)?
            }
            AccountKind::Overdraft { overdraft_limit } => {
                AccountKind::overdraft(overdraft_limit)?
            }
        };
        Ok(Account {
            id,
            owner,
            balance: Decimal::ZERO,
            kind,
            history: Vec::new(),
        })
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    /// Record ids in the order they were appended
    pub fn history(&self) -> &[TransactionId] {
        &self.history
    }

    /// Whether `amount` can be credited without overflowing the balance
    pub fn can_accept(&self, amount: Decimal) -> Result<(), LedgerError> {
        self.balance
            .checked_add(amount)
            .map(|_| ())
            .ok_or_else(|| LedgerError::arithmetic_overflow("deposit", &self.id))
    }

    /// Credit `amount`
    ///
    /// # Errors
    ///
    /// * `LedgerError::InvalidAmount` - If `amount` is not strictly positive
    /// * `LedgerError::ExcessivePrecision` - If `amount` is finer than `MONEY_SCALE`
    /// * `LedgerError::ArithmeticOverflow` - If the balance would overflow
    pub fn deposit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        ensure_valid_amount(amount)?;
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("deposit", &self.id))?;
        Ok(())
    }

    /// Debit `amount` if the account kind allows it
    ///
    /// A refused withdrawal leaves the balance unchanged and returns a
    /// business-rule error (`InsufficientFunds` or `OverdraftLimitExceeded`).
    ///
    /// # Errors
    ///
    /// * `LedgerError::InvalidAmount` - If `amount` is not strictly positive
    /// * `LedgerError::InsufficientFunds` - Non-overdraft account, `amount > balance`
    /// * `LedgerError::OverdraftLimitExceeded` - Overdraft account, `amount > balance + limit`
    pub fn withdraw(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        ensure_valid_amount(amount)?;
        self.kind.check_withdrawal(&self.id, self.balance, amount)?;
        self.balance = self
            .balance
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::arithmetic_overflow("withdraw", &self.id))?;
        Ok(())
    }

    /// Credit one period of interest and return the amount credited
    ///
    /// Interest is `balance * rate`, rounded to `MONEY_SCALE` places with
    /// banker's rounding. Calling this twice compounds twice.
    pub fn apply_interest_once(&mut self) -> Result<Decimal, LedgerError> {
        let AccountKind::NonOverdraft { interest_rate } = self.kind else {
            return Err(LedgerError::interest_not_supported(&self.id));
        };
        let interest = self
            .balance
            .checked_mul(interest_rate)
            .ok_or_else(|| LedgerError::arithmetic_overflow("interest", &self.id))?
            .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven);
        self.balance = self
            .balance
            .checked_add(interest)
            .ok_or_else(|| LedgerError::arithmetic_overflow("interest", &self.id))?;
        Ok(interest)
    }

    /// Change the overdraft limit of an overdraft account
    ///
    /// # Errors
    ///
    /// * `LedgerError::OverdraftNotSupported` - Non-overdraft account
    /// * `LedgerError::NegativeOverdraftLimit` - `limit < 0`
    /// * `LedgerError::ExcessivePrecision` - `limit` is finer than `MONEY_SCALE`
    /// * `LedgerError::OverdraftLimitBelowBalance` - Balance already below `-limit`
    pub fn set_overdraft_limit(&mut self, limit: Decimal) -> Result<(), LedgerError> {
        if !matches!(self.kind, AccountKind::Overdraft { .. }) {
            return Err(LedgerError::overdraft_not_supported(&self.id));
        }
        let kind = AccountKind::overdraft(limit)?;
        if self.balance < kind.balance_floor() {
            return Err(LedgerError::OverdraftLimitBelowBalance {
                account: self.id.to_string(),
                limit,
                balance: self.balance,
            });
        }
        self.kind = kind;
        Ok(())
    }

    pub(crate) fn push_history(&mut self, id: TransactionId) {
        self.history.push(id);
    }
}
