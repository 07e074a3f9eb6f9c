//! Access gate
//!
//! Decides whether a principal may touch an account. The gate reads account
//! ownership through `OwnerDirectory` and nothing else.
//!
//! - No IO
//! - No panics
//! - Fails closed: anything it cannot positively allow is denied

use super::traits::OwnerDirectory;
use crate::types::{AccountId, LedgerError, Operation, Principal};

/// Whether `principal` may operate on `account`
///
/// Administrators may address any id, including ones that do not exist (the
/// engine then reports `AccountNotFound`). Account holders need the account
/// to exist and be owned by their linked owner id. Everyone else is denied.
pub fn can_access<D>(principal: &Principal, account: &AccountId, directory: &D) -> bool
where
    D: OwnerDirectory + ?Sized,
{
    match principal {
        Principal::Administrator => true,
        Principal::AccountHolder { owner } => directory
            .owner_of(account)
            .is_some_and(|account_owner| &account_owner == owner),
        Principal::Anonymous => false,
    }
}

/// `can_access` as a `Result`
pub fn check_access<D>(
    principal: &Principal,
    account: &AccountId,
    directory: &D,
) -> Result<(), LedgerError>
where
    D: OwnerDirectory + ?Sized,
{
    if can_access(principal, account, directory) {
        Ok(())
    } else {
        Err(LedgerError::access_denied(principal, account))
    }
}

pub fn require_administrator(principal: &Principal, operation: &str) -> Result<(), LedgerError> {
    if principal.is_administrator() {
        Ok(())
    } else {
        Err(LedgerError::administrator_required(principal, operation))
    }
}

/// Authorize a whole operation before it reaches the engine
///
/// Account administration (open, close, interest, overdraft limits) is
/// reserved for administrators. Deposits and withdrawals are checked on
/// their account; transfers on the source account only, so a holder can pay
/// into an account they do not own.
pub fn authorize<D>(
    principal: &Principal,
    operation: &Operation,
    directory: &D,
) -> Result<(), LedgerError>
where
    D: OwnerDirectory + ?Sized,
{
    if operation.requires_administrator() {
        return require_administrator(principal, operation.action());
    }
    match operation {
        Operation::Deposit { account, .. } | Operation::Withdraw { account, .. } => {
            check_access(principal, account, directory)
        }
        Operation::Transfer { from, .. } => check_access(principal, from, directory),
        _ => require_administrator(principal, operation.action()),
    }
}
