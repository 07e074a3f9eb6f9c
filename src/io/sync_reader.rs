//! Synchronous CSV reader with iterator interface
//!
//! Provides a streaming iterator over commands from a CSV script.
//! Delegates CSV format concerns to the csv_format module.
//!
//! # Iterator Interface
//!
//! SyncReader implements the Iterator trait, yielding `Result<Command, LedgerError>`
//! for each CSV row:
//!
//! ```no_run
//! use ledger_engine::io::sync_reader::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("commands.csv")).unwrap();
//! for result in reader {
//!     match result {
//!         Ok(command) => println!("{}", command.operation),
//!         Err(e) => eprintln!("{}", e),
//!     }
//! }
//! ```
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()` as
//!   `LedgerError::IoError`
//! - Row errors are yielded as `LedgerError::ParseError` with their line number
//! - Rows are read one at a time; the file is never loaded whole

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::{Command, LedgerError};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::path::Path;

/// Synchronous CSV command reader
#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    line_num: usize,
}

impl SyncReader {
    /// Open a command script for streaming iteration
    ///
    /// The CSV reader trims every field, accepts rows with fewer columns
    /// than the header and uses an 8KB buffer.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::IoError` if the file cannot be opened.
    pub fn new(path: &Path) -> Result<Self, LedgerError> {
        let file = File::open(path).map_err(|e| {
            LedgerError::io_error(format!("Failed to open file '{}': {}", path.display(), e))
        })?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            line_num: 0,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<Command, LedgerError>;

    /// Next command, or the reason its row was rejected
    ///
    /// Line numbers count the header as line 1.
    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<CsvRecord>();
        let row = deserializer.next()?;
        self.line_num += 1;
        let line = self.line_num as u64 + 1;

        Some(
            row.map_err(|e| LedgerError::parse_error(line, e))
                .and_then(|csv_record| {
                    convert_csv_record(csv_record).map_err(|e| LedgerError::parse_error(line, e))
                }),
        )
    }
}
