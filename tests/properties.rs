//! Property tests for ledger invariants
//!
//! Random sequences of deposits, withdrawals, transfers and interest runs
//! over a fixed set of accounts, checked for:
//! - balance floors (zero for non-overdraft, minus the limit for overdraft)
//! - money conservation against the journal
//! - failed transfers leaving both balances untouched
//! - history replay reproducing every balance
//! - the async batch processor matching the sequential engine

use std::sync::Arc;

use ledger_engine::core::{AsyncLedger, AsyncTransactionEngine, AuditTrail, BatchProcessor};
use ledger_engine::types::{
    AccountId, AccountKind, Command, Operation, Principal, TransactionKind, TransactionStatus,
};
use ledger_engine::TransactionEngine;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[derive(Debug, Clone)]
enum Step {
    Deposit(usize, Decimal),
    Withdraw(usize, Decimal),
    Transfer(usize, usize, Decimal),
    Interest(usize),
}

const ACCOUNTS: usize = 3;

fn account_id(index: usize) -> AccountId {
    AccountId::from_number(index as u32 + 1).unwrap()
}

fn kinds() -> [AccountKind; ACCOUNTS] {
    [
        AccountKind::non_overdraft(dec!(0.03)).unwrap(),
        AccountKind::overdraft(dec!(200)).unwrap(),
        AccountKind::non_overdraft(dec!(0)).unwrap(),
    ]
}

fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0..ACCOUNTS, amount()).prop_map(|(a, x)| Step::Deposit(a, x)),
        (0..ACCOUNTS, amount()).prop_map(|(a, x)| Step::Withdraw(a, x)),
        (0..ACCOUNTS, 0..ACCOUNTS, amount()).prop_map(|(a, b, x)| Step::Transfer(a, b, x)),
        (0..ACCOUNTS).prop_map(Step::Interest),
    ]
}

fn open_engine() -> TransactionEngine {
    let mut engine = TransactionEngine::new();
    for (index, kind) in kinds().into_iter().enumerate() {
        engine
            .open_account(Some(account_id(index)), "C001".parse().unwrap(), kind)
            .unwrap();
    }
    engine
}

fn balance(engine: &TransactionEngine, index: usize) -> Decimal {
    engine
        .ledger()
        .find_account(&account_id(index))
        .unwrap()
        .balance()
}

fn apply(engine: &mut TransactionEngine, step: &Step) {
    match *step {
        Step::Deposit(a, x) => {
            engine.deposit(&account_id(a), x).unwrap();
        }
        Step::Withdraw(a, x) => {
            engine.withdraw(&account_id(a), x).unwrap();
        }
        Step::Transfer(a, b, x) => {
            // Same-account transfers are rejected before any record exists
            let _ = engine.transfer(&account_id(a), &account_id(b), x);
        }
        Step::Interest(a) => {
            // Overdraft accounts do not earn interest
            let _ = engine.apply_interest(&account_id(a));
        }
    }
}

fn to_command(step: &Step) -> Command {
    let operation = match *step {
        Step::Deposit(a, amount) => Operation::Deposit {
            account: account_id(a),
            amount,
        },
        Step::Withdraw(a, amount) => Operation::Withdraw {
            account: account_id(a),
            amount,
        },
        Step::Transfer(a, b, amount) => Operation::Transfer {
            from: account_id(a),
            to: account_id(b),
            amount,
        },
        Step::Interest(a) => Operation::ApplyInterest {
            account: Some(account_id(a)),
        },
    };
    Command::new(Principal::Administrator, operation)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    })]

    /// Property: no operation ever takes a balance below its kind's floor
    #[test]
    fn balances_never_cross_their_floor(steps in prop::collection::vec(step(), 1..60)) {
        let mut engine = open_engine();
        let kinds = kinds();

        for step in &steps {
            apply(&mut engine, step);
            for (index, kind) in kinds.iter().enumerate() {
                prop_assert!(balance(&engine, index) >= kind.balance_floor());
            }
        }
    }

    /// Property: total balance equals deposits plus interest minus withdrawals
    #[test]
    fn money_is_conserved(steps in prop::collection::vec(step(), 1..60)) {
        let mut engine = open_engine();
        for step in &steps {
            apply(&mut engine, step);
        }

        let expected: Decimal = engine
            .ledger()
            .records()
            .iter()
            .filter(|record| record.status() == TransactionStatus::Completed)
            .map(|record| match record.kind() {
                TransactionKind::Deposit | TransactionKind::Interest => record.amount(),
                TransactionKind::Withdraw => -record.amount(),
                TransactionKind::Transfer => Decimal::ZERO,
            })
            .sum();
        prop_assert_eq!(engine.ledger().total_balance(), expected);
    }

    /// Property: a failed transfer leaves both balances as they were and
    /// a completed one moves exactly the amount
    #[test]
    fn transfers_are_all_or_nothing(
        steps in prop::collection::vec(step(), 0..30),
        from in 0..ACCOUNTS,
        offset in 1..ACCOUNTS,
        amount in amount(),
    ) {
        let mut engine = open_engine();
        for step in &steps {
            apply(&mut engine, step);
        }

        let to = (from + offset) % ACCOUNTS;
        let (source_before, destination_before) = (balance(&engine, from), balance(&engine, to));
        let record = engine.transfer(&account_id(from), &account_id(to), amount).unwrap();

        let moved = match record.status() {
            TransactionStatus::Completed => amount,
            TransactionStatus::Failed => Decimal::ZERO,
        };
        prop_assert_eq!(balance(&engine, from), source_before - moved);
        prop_assert_eq!(balance(&engine, to), destination_before + moved);
    }

    /// Property: summing each history's effects reproduces the balance
    #[test]
    fn history_replays_to_balance(steps in prop::collection::vec(step(), 1..60)) {
        let mut engine = open_engine();
        for step in &steps {
            apply(&mut engine, step);
        }

        for index in 0..ACCOUNTS {
            let id = account_id(index);
            let replayed: Decimal = engine
                .ledger()
                .history(&id)
                .unwrap()
                .into_iter()
                .map(|record| record.balance_effect(&id))
                .sum();
            prop_assert_eq!(replayed, balance(&engine, index));
        }
    }

    /// Property: the batch processor ends in the same state as sequential execution
    #[test]
    fn batch_processing_matches_sequential(steps in prop::collection::vec(step(), 1..80)) {
        let mut engine = open_engine();
        for step in &steps {
            apply(&mut engine, step);
        }

        let ledger = Arc::new(AsyncLedger::new());
        for (index, kind) in kinds().into_iter().enumerate() {
            ledger
                .open_account_with_id(account_id(index), "C001".parse().unwrap(), kind)
                .unwrap();
        }
        let processor = BatchProcessor::new(
            AsyncTransactionEngine::new(Arc::clone(&ledger)),
            Arc::new(AuditTrail::new()),
        );
        let commands: Vec<Command> = steps.iter().map(to_command).collect();
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(processor.process_batch(commands));

        for index in 0..ACCOUNTS {
            let expected = engine.ledger().find_account(&account_id(index)).unwrap();
            let actual = ledger.find_account(&account_id(index)).unwrap();
            prop_assert_eq!(actual.balance(), expected.balance());
            prop_assert_eq!(actual.history().len(), expected.history().len());
        }
        prop_assert_eq!(ledger.records().len(), engine.ledger().records().len());
    }
}
