//! Benchmark suite for comparing processing strategies
//!
//! ```bash
//! cargo bench
//! ```
//!
//! Scripts are generated into temporary files: 50 accounts split between
//! four owners, followed by a mix of deposits, withdrawals and transfers with
//! an interest run every 500 commands.

use ledger_engine::cli::StrategyType;
use ledger_engine::strategy::{create_strategy, BatchConfig};
use std::io::Write;
use tempfile::NamedTempFile;

const ACCOUNTS: usize = 50;

fn main() {
    divan::main();
}

fn generate_script(commands: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(file, "type,principal,account,to,owner,kind,amount").unwrap();

    for n in 1..=ACCOUNTS {
        let kind = if n % 2 == 0 { "checking" } else { "savings" };
        writeln!(file, "open,admin,ACC{:03},,C{:03},{},", n, n % 4 + 1, kind).unwrap();
    }

    for i in 0..commands {
        let account = i % ACCOUNTS + 1;
        let other = (i * 7 + 3) % ACCOUNTS + 1;
        let amount = (i % 97 + 1) * 10;
        let line = match i % 10 {
            _ if i % 500 == 499 => "interest,admin,,,,,".to_string(),
            0..=3 => format!("deposit,admin,ACC{:03},,,,{}", account, amount),
            4..=6 => format!("withdraw,admin,ACC{:03},,,,{}", account, amount),
            _ if account == other => format!("deposit,admin,ACC{:03},,,,{}", account, amount),
            _ => format!(
                "transfer,admin,ACC{:03},ACC{:03},,,{}",
                account, other, amount
            ),
        };
        writeln!(file, "{}", line).unwrap();
    }

    file.flush().expect("Failed to flush temp file");
    file
}

#[divan::bench(args = [100, 1_000, 10_000])]
fn sync_strategy(bencher: divan::Bencher, commands: usize) {
    let script = generate_script(commands);
    let strategy = create_strategy(StrategyType::Sync, None);

    bencher.bench_local(|| {
        let mut output = Vec::new();
        strategy
            .process(script.path(), &mut output)
            .expect("Processing failed")
    });
}

#[divan::bench(args = [100, 1_000, 10_000])]
fn async_strategy(bencher: divan::Bencher, commands: usize) {
    let script = generate_script(commands);
    let strategy = create_strategy(StrategyType::Async, Some(BatchConfig::default()));

    bencher.bench_local(|| {
        let mut output = Vec::new();
        strategy
            .process(script.path(), &mut output)
            .expect("Processing failed")
    });
}

#[divan::bench(args = [10, 100, 1_000])]
fn async_strategy_batch_size(bencher: divan::Bencher, batch_size: usize) {
    let script = generate_script(10_000);
    let strategy = create_strategy(
        StrategyType::Async,
        Some(BatchConfig::new(batch_size, num_cpus::get())),
    );

    bencher.bench_local(|| {
        let mut output = Vec::new();
        strategy
            .process(script.path(), &mut output)
            .expect("Processing failed")
    });
}
