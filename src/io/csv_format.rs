//! CSV format handling for command scripts and ledger output
//!
//! This module centralizes all CSV format concerns, providing:
//! - `CsvRecord` structure for deserialization of command rows
//! - Conversion from CSV records to typed `Command`s
//! - Serialization of accounts, journal records and audit entries
//!
//! All functions are pure (no file I/O) for easy testing.
//!
//! # Input columns
//!
//! `type,principal,account,to,owner,kind,amount`
//!
//! | type        | required columns                | amount means          |
//! |-------------|---------------------------------|-----------------------|
//! | `open`      | owner, kind (account optional)  | rate or limit, optional |
//! | `close`     | account                         | -                     |
//! | `deposit`   | account, amount                 | amount                |
//! | `withdraw`  | account, amount                 | amount                |
//! | `transfer`  | account (source), to, amount    | amount                |
//! | `interest`  | account optional (empty = all)  | -                     |
//! | `set_limit` | account, amount                 | new overdraft limit   |

use std::io::Write;
use std::str::FromStr;

use chrono::SecondsFormat;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::core::AuditEntry;
use crate::types::{
    Account, AccountId, AccountKind, Command, LedgerError, Operation, Principal, TransactionRecord,
};

/// CSV record structure for deserialization
///
/// Every column except `type` may be empty or missing.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct CsvRecord {
    #[serde(rename = "type")]
    pub command_type: String,
    #[serde(default)]
    pub principal: Option<String>,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
}

/// Trimmed, non-empty field value
fn field(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn required<'a>(
    value: &'a Option<String>,
    command: &str,
    name: &str,
) -> Result<&'a str, LedgerError> {
    field(value).ok_or_else(|| LedgerError::invalid_command(command, format!("missing {name}")))
}

fn decimal(value: &str, command: &str) -> Result<Decimal, LedgerError> {
    Decimal::from_str(value)
        .map_err(|_| LedgerError::invalid_command(command, format!("invalid amount '{value}'")))
}

fn parse_command(record: &CsvRecord) -> Result<Command, LedgerError> {
    let command = record.command_type.trim().to_ascii_lowercase();
    let command = command.as_str();
    let principal: Principal = field(&record.principal).unwrap_or_default().parse()?;

    let account = || -> Result<AccountId, LedgerError> {
        required(&record.account, command, "account")?.parse()
    };
    let amount = || -> Result<Decimal, LedgerError> {
        decimal(required(&record.amount, command, "amount")?, command)
    };

    let operation = match command {
        "open" => {
            let parameter = field(&record.amount)
                .map(|value| decimal(value, command))
                .transpose()?;
            Operation::OpenAccount {
                account: field(&record.account)
                    .map(str::parse::<AccountId>)
                    .transpose()?,
                owner: required(&record.owner, command, "owner")?.parse()?,
                kind: AccountKind::parse(required(&record.kind, command, "kind")?, parameter)?,
            }
        }
        "close" => Operation::CloseAccount {
            account: account()?,
        },
        "deposit" => Operation::Deposit {
            account: account()?,
            amount: amount()?,
        },
        "withdraw" | "withdrawal" => Operation::Withdraw {
            account: account()?,
            amount: amount()?,
        },
        "transfer" => Operation::Transfer {
            from: account()?,
            to: required(&record.to, command, "to")?.parse()?,
            amount: amount()?,
        },
        "interest" => Operation::ApplyInterest {
            account: field(&record.account)
                .map(str::parse::<AccountId>)
                .transpose()?,
        },
        "set_limit" => Operation::SetOverdraftLimit {
            account: account()?,
            limit: amount()?,
        },
        other => {
            return Err(LedgerError::invalid_command(
                other,
                "unknown command type",
            ))
        }
    };

    Ok(Command::new(principal, operation))
}

/// Convert a CsvRecord to a Command
///
/// # Errors
///
/// Any validation error for the row: unknown type, missing or malformed
/// column, invalid id, principal or account kind.
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<Command, LedgerError> {
    parse_command(&csv_record)
}

/// Write account states to CSV
///
/// Columns: `account,owner,kind,balance,transactions`. Accounts are sorted
/// by id and balances are written with four decimal places.
pub fn write_accounts_csv(
    accounts: &[Account],
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record(["account", "owner", "kind", "balance", "transactions"])?;

    let mut sorted_accounts: Vec<&Account> = accounts.iter().collect();
    sorted_accounts.sort_by(|a, b| a.id().cmp(b.id()));

    for account in sorted_accounts {
        writer.write_record(&[
            account.id().to_string(),
            account.owner().to_string(),
            account.kind().to_string(),
            format!("{:.4}", account.balance()),
            account.history().len().to_string(),
        ])?;
    }

    writer.flush()?;

    Ok(())
}

/// Write journal records to CSV in commit order
///
/// Columns: `tx,kind,from,to,amount,status,timestamp`
pub fn write_journal_csv(
    records: &[TransactionRecord],
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record(["tx", "kind", "from", "to", "amount", "status", "timestamp"])?;

    for record in records {
        writer.write_record(&[
            record.label(),
            record.kind().to_string(),
            record.from().map(ToString::to_string).unwrap_or_default(),
            record.to().map(ToString::to_string).unwrap_or_default(),
            format!("{:.4}", record.amount()),
            record.status().to_string(),
            record.timestamp().to_rfc3339_opts(SecondsFormat::Micros, true),
        ])?;
    }

    writer.flush()?;

    Ok(())
}

/// Write audit entries to CSV
///
/// Columns: `timestamp,principal,action,details,outcome`
pub fn write_audit_csv(entries: &[AuditEntry], output: &mut dyn Write) -> Result<(), LedgerError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record(["timestamp", "principal", "action", "details", "outcome"])?;

    for entry in entries {
        writer.write_record(&[
            entry.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            entry.principal.clone(),
            entry.action.to_string(),
            entry.details.clone(),
            entry.outcome.to_string(),
        ])?;
    }

    writer.flush()?;

    Ok(())
}
