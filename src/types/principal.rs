//! Principals: who is asking
//!
//! A principal is resolved by the surrounding identity layer. The ledger
//! only needs to know whether it is an administrator, an account holder
//! linked to an owner id, or nobody at all.

use std::fmt;
use std::str::FromStr;

use super::error::LedgerError;
use super::ids::OwnerId;

/// The authenticated (or not) caller of an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// Staff with access to every account and to admin-only operations
    Administrator,
    /// Customer; may only touch accounts owned by `owner`
    AccountHolder { owner: OwnerId },
    /// No resolved identity; denied everywhere
    Anonymous,
}

impl Principal {
    pub fn holder(owner: OwnerId) -> Self {
        Principal::AccountHolder { owner }
    }

    pub fn is_administrator(&self) -> bool {
        matches!(self, Principal::Administrator)
    }

    /// Owner id an account holder is linked to
    pub fn linked_owner(&self) -> Option<&OwnerId> {
        match self {
            Principal::AccountHolder { owner } => Some(owner),
            _ => None,
        }
    }
}

/// Parses `admin`, `holder:C001`, and `anonymous` or the empty string
impl FromStr for Principal {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("anonymous") {
            return Ok(Principal::Anonymous);
        }
        if value.eq_ignore_ascii_case("admin") || value.eq_ignore_ascii_case("administrator") {
            return Ok(Principal::Administrator);
        }
        match value.split_once(':') {
            Some((role, owner)) if role.eq_ignore_ascii_case("holder") => {
                Ok(Principal::holder(owner.trim().parse()?))
            }
            _ => Err(LedgerError::invalid_principal(value)),
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Principal::Administrator => f.write_str("admin"),
            Principal::AccountHolder { owner } => write!(f, "holder:{owner}"),
            Principal::Anonymous => f.write_str("anonymous"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::admin("admin", Principal::Administrator)]
    #[case::admin_long("Administrator", Principal::Administrator)]
    #[case::holder("holder:C001", Principal::holder("C001".parse().unwrap()))]
    #[case::holder_spaced(" holder: C002 ", Principal::holder("C002".parse().unwrap()))]
    #[case::empty("", Principal::Anonymous)]
    #[case::anonymous("anonymous", Principal::Anonymous)]
    fn test_parse(#[case] input: &str, #[case] expected: Principal) {
        assert_eq!(input.parse::<Principal>().unwrap(), expected);
    }

    #[rstest]
    #[case::unknown_role("teller:C001")]
    #[case::bad_owner("holder:X1")]
    #[case::bare_owner("C001")]
    fn test_parse_rejects(#[case] input: &str) {
        assert!(input.parse::<Principal>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        let holder = Principal::holder("C007".parse().unwrap());
        assert_eq!(holder.to_string(), "holder:C007");
        assert_eq!(holder.to_string().parse::<Principal>().unwrap(), holder);
        assert_eq!(holder.linked_owner().map(OwnerId::as_str), Some("C007"));
        assert!(!holder.is_administrator());
    }
}
