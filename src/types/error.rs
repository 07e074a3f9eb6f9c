//! Error types for the ledger engine
//!
//! Every failure the ledger can report is a variant of `LedgerError`.
//! Variants are grouped into categories (see `ErrorCategory`) which decide how
//! the engine reacts:
//!
//! - **Validation**: malformed input; surfaced immediately, no state change
//! - **NotFound**: an account id that the ledger cannot resolve
//! - **BusinessRule**: a well-formed withdrawal the account policy refuses;
//!   the engine turns these into `Failed` transaction records
//! - **AccessDenied**: the access gate refused the principal
//! - **Io**: file or CSV problems in the outer layers

use rust_decimal::Decimal;
use thiserror::Error;

use super::account::MONEY_SCALE;

/// Coarse classification of a `LedgerError`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    BusinessRule,
    AccessDenied,
    Io,
}

/// Main error type for the ledger engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Amount is zero or negative
    #[error("Invalid amount {amount}: amounts must be strictly positive")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// Amount has more decimal places than balances keep
    #[error("Invalid amount {amount}: at most {max_scale} decimal places are allowed")]
    ExcessivePrecision { amount: Decimal, max_scale: u32 },

    /// Account id does not match `ACC###`
    #[error("Invalid account id '{value}': expected ACC followed by three digits")]
    InvalidAccountId { value: String },

    /// Owner id does not match `C###`
    #[error("Invalid owner id '{value}': expected C followed by three digits")]
    InvalidOwnerId { value: String },

    /// Principal string could not be interpreted
    #[error("Invalid principal '{value}'")]
    InvalidPrincipal { value: String },

    /// Account kind name is not recognised
    #[error("Unknown account kind '{kind}'")]
    UnknownAccountKind { kind: String },

    /// Interest rate outside [0, 1]
    #[error("Invalid interest rate {rate}: must be between 0 and 1")]
    InvalidInterestRate { rate: Decimal },

    /// Overdraft limit below zero
    #[error("Invalid overdraft limit {limit}: must not be negative")]
    NegativeOverdraftLimit { limit: Decimal },

    /// Transfer source and destination are the same account
    #[error("Cannot transfer from account {account} to itself")]
    SameAccountTransfer { account: String },

    /// Interest was requested on an account kind that does not earn it
    #[error("Account {account} does not earn interest")]
    InterestNotSupported { account: String },

    /// Overdraft limit change on an account kind without overdraft
    #[error("Account {account} does not have an overdraft facility")]
    OverdraftNotSupported { account: String },

    /// New overdraft limit would leave the current balance out of bounds
    #[error("Overdraft limit {limit} for account {account} is below the current balance {balance}")]
    OverdraftLimitBelowBalance {
        account: String,
        limit: Decimal,
        balance: Decimal,
    },

    /// Account id already present in the ledger
    #[error("Account {account} already exists")]
    DuplicateAccount { account: String },

    /// No account ids left to hand out
    #[error("No account ids left to issue")]
    AccountIdsExhausted,

    /// Checked decimal arithmetic failed
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow { operation: String, account: String },

    /// A command row could not be turned into an operation
    #[error("Invalid {command} command: {message}")]
    InvalidCommand { command: String, message: String },

    /// Account id the ledger cannot resolve
    #[error("Account {account} not found")]
    AccountNotFound { account: String },

    /// Non-overdraft withdrawal larger than the balance
    #[error(
        "Insufficient funds in account {account}: balance {balance}, requested {requested}"
    )]
    InsufficientFunds {
        account: String,
        balance: Decimal,
        requested: Decimal,
    },

    /// Overdraft withdrawal beyond balance plus limit
    #[error(
        "Overdraft limit exceeded for account {account}: available {available}, requested {requested}"
    )]
    OverdraftLimitExceeded {
        account: String,
        /// Balance plus overdraft limit
        available: Decimal,
        requested: Decimal,
    },

    /// The principal may not touch this account
    #[error("Access denied for {principal} on account {account}")]
    AccessDenied { principal: String, account: String },

    /// Administrator-only operation attempted by someone else
    #[error("Access denied for {principal}: {operation} requires an administrator")]
    AdministratorRequired {
        principal: String,
        operation: String,
    },

    /// I/O error while reading or writing files
    #[error("I/O error: {message}")]
    IoError { message: String },

    /// CSV parsing error
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError { line: Option<u64>, message: String },
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        if let csv::ErrorKind::Io(io_error) = error.kind() {
            return LedgerError::io_error(io_error.to_string());
        }
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

impl LedgerError {
    /// Category this error belongs to
    pub fn category(&self) -> ErrorCategory {
        match self {
            LedgerError::InsufficientFunds { .. } | LedgerError::OverdraftLimitExceeded { .. } => {
                ErrorCategory::BusinessRule
            }
            LedgerError::AccountNotFound { .. } => ErrorCategory::NotFound,
            LedgerError::AccessDenied { .. } | LedgerError::AdministratorRequired { .. } => {
                ErrorCategory::AccessDenied
            }
            LedgerError::IoError { .. } | LedgerError::ParseError { .. } => ErrorCategory::Io,
            _ => ErrorCategory::Validation,
        }
    }

    /// True for policy refusals that become `Failed` records instead of errors
    pub fn is_business_rule(&self) -> bool {
        self.category() == ErrorCategory::BusinessRule
    }

    pub fn invalid_amount(amount: Decimal) -> Self {
        LedgerError::InvalidAmount { amount }
    }

    pub fn excessive_precision(amount: Decimal) -> Self {
        LedgerError::ExcessivePrecision {
            amount,
            max_scale: MONEY_SCALE,
        }
    }

    pub fn invalid_account_id(value: &str) -> Self {
        LedgerError::InvalidAccountId {
            value: value.to_string(),
        }
    }

    pub fn invalid_owner_id(value: &str) -> Self {
        LedgerError::InvalidOwnerId {
            value: value.to_string(),
        }
    }

    pub fn invalid_principal(value: &str) -> Self {
        LedgerError::InvalidPrincipal {
            value: value.to_string(),
        }
    }

    pub fn unknown_account_kind(kind: &str) -> Self {
        LedgerError::UnknownAccountKind {
            kind: kind.to_string(),
        }
    }

    pub fn same_account_transfer(account: impl ToString) -> Self {
        LedgerError::SameAccountTransfer {
            account: account.to_string(),
        }
    }

    pub fn interest_not_supported(account: impl ToString) -> Self {
        LedgerError::InterestNotSupported {
            account: account.to_string(),
        }
    }

    pub fn overdraft_not_supported(account: impl ToString) -> Self {
        LedgerError::OverdraftNotSupported {
            account: account.to_string(),
        }
    }

    pub fn duplicate_account(account: impl ToString) -> Self {
        LedgerError::DuplicateAccount {
            account: account.to_string(),
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str, account: impl ToString) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            account: account.to_string(),
        }
    }

    pub fn invalid_command(command: &str, message: impl Into<String>) -> Self {
        LedgerError::InvalidCommand {
            command: command.to_string(),
            message: message.into(),
        }
    }

    /// Create an AccountNotFound error
    pub fn account_not_found(account: impl ToString) -> Self {
        LedgerError::AccountNotFound {
            account: account.to_string(),
        }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(
        account: impl ToString,
        balance: Decimal,
        requested: Decimal,
    ) -> Self {
        LedgerError::InsufficientFunds {
            account: account.to_string(),
            balance,
            requested,
        }
    }

    /// Create an OverdraftLimitExceeded error
    pub fn overdraft_limit_exceeded(
        account: impl ToString,
        available: Decimal,
        requested: Decimal,
    ) -> Self {
        LedgerError::OverdraftLimitExceeded {
            account: account.to_string(),
            available,
            requested,
        }
    }

    pub fn access_denied(principal: impl ToString, account: impl ToString) -> Self {
        LedgerError::AccessDenied {
            principal: principal.to_string(),
            account: account.to_string(),
        }
    }

    pub fn administrator_required(principal: impl ToString, operation: &str) -> Self {
        LedgerError::AdministratorRequired {
            principal: principal.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn io_error(message: impl Into<String>) -> Self {
        LedgerError::IoError {
            message: message.into(),
        }
    }

    /// Create a ParseError for a row of a command script
    pub fn parse_error(line: u64, message: impl ToString) -> Self {
        LedgerError::ParseError {
            line: Some(line),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::invalid_amount(
        LedgerError::invalid_amount(Decimal::new(-5, 0)),
        "Invalid amount -5: amounts must be strictly positive"
    )]
    #[case::excessive_precision(
        LedgerError::excessive_precision(Decimal::new(5, 5)),
        "Invalid amount 0.00005: at most 4 decimal places are allowed"
    )]
    #[case::account_not_found(
        LedgerError::account_not_found("ACC404"),
        "Account ACC404 not found"
    )]
    #[case::insufficient_funds(
        LedgerError::insufficient_funds("ACC001", Decimal::new(5000, 4), Decimal::new(10000, 4)),
        "Insufficient funds in account ACC001: balance 0.5000, requested 1.0000"
    )]
    #[case::overdraft_limit_exceeded(
        LedgerError::overdraft_limit_exceeded("ACC002", Decimal::new(600, 0), Decimal::new(700, 0)),
        "Overdraft limit exceeded for account ACC002: available 600, requested 700"
    )]
    #[case::same_account(
        LedgerError::same_account_transfer("ACC001"),
        "Cannot transfer from account ACC001 to itself"
    )]
    #[case::access_denied(
        LedgerError::access_denied("holder C002", "ACC001"),
        "Access denied for holder C002 on account ACC001"
    )]
    #[case::administrator_required(
        LedgerError::administrator_required("anonymous", "CLOSE_ACCOUNT"),
        "Access denied for anonymous: CLOSE_ACCOUNT requires an administrator"
    )]
    #[case::parse_error_with_line(
        LedgerError::ParseError { line: Some(42), message: "Invalid field".to_string() },
        "CSV parse error at line 42: Invalid field"
    )]
    #[case::parse_error_without_line(
        LedgerError::ParseError { line: None, message: "Invalid field".to_string() },
        "CSV parse error: Invalid field"
    )]
    fn test_error_display(#[case] error: LedgerError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::insufficient(LedgerError::insufficient_funds("ACC001", Decimal::ZERO, Decimal::ONE), ErrorCategory::BusinessRule)]
    #[case::overdraft(LedgerError::overdraft_limit_exceeded("ACC001", Decimal::ZERO, Decimal::ONE), ErrorCategory::BusinessRule)]
    #[case::not_found(LedgerError::account_not_found("ACC001"), ErrorCategory::NotFound)]
    #[case::denied(LedgerError::access_denied("anonymous", "ACC001"), ErrorCategory::AccessDenied)]
    #[case::admin(LedgerError::administrator_required("anonymous", "OPEN_ACCOUNT"), ErrorCategory::AccessDenied)]
    #[case::amount(LedgerError::invalid_amount(Decimal::ZERO), ErrorCategory::Validation)]
    #[case::overflow(LedgerError::arithmetic_overflow("deposit", "ACC001"), ErrorCategory::Validation)]
    #[case::precision(LedgerError::excessive_precision(Decimal::new(5, 5)), ErrorCategory::Validation)]
    #[case::io(LedgerError::io_error("disk"), ErrorCategory::Io)]
    #[case::parse(LedgerError::parse_error(3, "bad row"), ErrorCategory::Io)]
    fn test_category(#[case] error: LedgerError, #[case] expected: ErrorCategory) {
        assert_eq!(error.category(), expected);
        assert_eq!(error.is_business_rule(), expected == ErrorCategory::BusinessRule);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: LedgerError = io_error.into();
        assert!(matches!(error, LedgerError::IoError { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }

    #[test]
    fn test_csv_error_conversion_keeps_line() {
        let mut reader = csv::ReaderBuilder::new().from_reader("a,b\n1,2\n3\n".as_bytes());
        let error = reader
            .records()
            .find_map(Result::err)
            .expect("short row should fail");

        let error: LedgerError = error.into();
        assert!(matches!(error, LedgerError::ParseError { line: Some(3), .. }));
        assert_eq!(error.category(), ErrorCategory::Io);
    }
}
