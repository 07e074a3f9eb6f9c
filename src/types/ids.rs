//! Identifier types for accounts and owners
//!
//! Both identifiers are validated newtypes over `String` so an account can
//! never be constructed with a malformed id or without an owner.
//!
//! - `AccountId`: `ACC` followed by exactly three digits (`ACC001`)
//! - `OwnerId`: `C` followed by exactly three digits (`C001`)

use std::fmt;
use std::str::FromStr;

use super::error::LedgerError;

/// Highest number an `AccountId` can carry (`ACC999`)
pub const MAX_ACCOUNT_NUMBER: u32 = 999;

const ACCOUNT_PREFIX: &str = "ACC";
const OWNER_PREFIX: &str = "C";
const DIGITS: usize = 3;

/// Returns the numeric part of `value` if it is `prefix` followed by exactly three ASCII digits
fn numbered(value: &str, prefix: &str) -> Option<u32> {
    let digits = value.strip_prefix(prefix)?;
    if digits.len() != DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Account identifier
///
/// Ordering is lexicographic, which for the fixed `ACC###` format equals
/// numeric ordering. The concurrent ledger relies on this total order when
/// it locks two accounts for a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(String);

impl AccountId {
    /// Build the id for an account number (`7` becomes `ACC007`)
    ///
    /// # Errors
    ///
    /// * `LedgerError::AccountIdsExhausted` - If `number` exceeds `MAX_ACCOUNT_NUMBER`
    pub fn from_number(number: u32) -> Result<Self, LedgerError> {
        if number > MAX_ACCOUNT_NUMBER {
            return Err(LedgerError::AccountIdsExhausted);
        }
        Ok(AccountId(format!("{ACCOUNT_PREFIX}{number:03}")))
    }

    /// Numeric part of the id
    pub fn number(&self) -> u32 {
        // Format was checked on construction.
        numbered(&self.0, ACCOUNT_PREFIX).unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccountId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match numbered(s, ACCOUNT_PREFIX) {
            Some(_) => Ok(AccountId(s.to_string())),
            None => Err(LedgerError::invalid_account_id(s)),
        }
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Owner (customer) identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OwnerId {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match numbered(s, OWNER_PREFIX) {
            Some(_) => Ok(OwnerId(s.to_string())),
            None => Err(LedgerError::invalid_owner_id(s)),
        }
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
