//! Commands: a principal asking for one ledger operation

use std::fmt;

use rust_decimal::Decimal;

use super::account::AccountKind;
use super::ids::{AccountId, OwnerId};
use super::principal::Principal;

/// A single ledger operation, already parsed and typed
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Open an account; the id is generated when `account` is `None`
    OpenAccount {
        account: Option<AccountId>,
        owner: OwnerId,
        kind: AccountKind,
    },
    CloseAccount {
        account: AccountId,
    },
    Deposit {
        account: AccountId,
        amount: Decimal,
    },
    Withdraw {
        account: AccountId,
        amount: Decimal,
    },
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: Decimal,
    },
    /// Apply interest once; `None` means every non-overdraft account
    ApplyInterest {
        account: Option<AccountId>,
    },
    SetOverdraftLimit {
        account: AccountId,
        limit: Decimal,
    },
}

impl Operation {
    /// Audit action name
    pub fn action(&self) -> &'static str {
        match self {
            Operation::OpenAccount { .. } => "OPEN_ACCOUNT",
            Operation::CloseAccount { .. } => "CLOSE_ACCOUNT",
            Operation::Deposit { .. } => "DEPOSIT",
            Operation::Withdraw { .. } => "WITHDRAW",
            Operation::Transfer { .. } => "TRANSFER",
            Operation::ApplyInterest { .. } => "APPLY_INTEREST",
            Operation::SetOverdraftLimit { .. } => "SET_OVERDRAFT_LIMIT",
        }
    }

    pub fn requires_administrator(&self) -> bool {
        matches!(
            self,
            Operation::OpenAccount { .. }
                | Operation::CloseAccount { .. }
                | Operation::ApplyInterest { .. }
                | Operation::SetOverdraftLimit { .. }
        )
    }

    /// Accounts this operation reads or writes
    ///
    /// `None` means the operation can touch any account in the ledger
    /// (generated-id opens and interest for every account).
    pub fn footprint(&self) -> Option<Vec<&AccountId>> {
        match self {
            Operation::OpenAccount { account, .. } => account.as_ref().map(|id| vec![id]),
            Operation::ApplyInterest { account } => account.as_ref().map(|id| vec![id]),
            Operation::CloseAccount { account }
            | Operation::Deposit { account, .. }
            | Operation::Withdraw { account, .. }
            | Operation::SetOverdraftLimit { account, .. } => Some(vec![account]),
            Operation::Transfer { from, to, .. } => Some(vec![from, to]),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::OpenAccount {
                account,
                owner,
                kind,
            } => {
                let id = account.as_ref().map(AccountId::as_str).unwrap_or("(next)");
                match kind {
                    AccountKind::NonOverdraft { interest_rate } => write!(
                        f,
                        "open {kind} account {id} for {owner} at rate {interest_rate}"
                    ),
                    AccountKind::Overdraft { overdraft_limit } => write!(
                        f,
                        "open {kind} account {id} for {owner} with limit {overdraft_limit}"
                    ),
                }
            }
            Operation::CloseAccount { account } => write!(f, "close {account}"),
            Operation::Deposit { account, amount } => write!(f, "deposit {amount} to {account}"),
            Operation::Withdraw { account, amount } => {
                write!(f, "withdraw {amount} from {account}")
            }
            Operation::Transfer { from, to, amount } => {
                write!(f, "transfer {amount} from {from} to {to}")
            }
            Operation::ApplyInterest { account: Some(account) } => {
                write!(f, "apply interest to {account}")
            }
            Operation::ApplyInterest { account: None } => {
                f.write_str("apply interest to all non_overdraft accounts")
            }
            Operation::SetOverdraftLimit { account, limit } => {
                write!(f, "set overdraft limit of {account} to {limit}")
            }
        }
    }
}

/// An operation together with the principal requesting it
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub principal: Principal,
    pub operation: Operation,
}

impl Command {
    pub fn new(principal: Principal, operation: Operation) -> Self {
        Command {
            principal,
            operation,
        }
    }
}
