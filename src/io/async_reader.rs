//! Asynchronous CSV reader with batch interface
//!
//! Reads commands from any `futures::io::AsyncRead` source in batches for
//! the async processing strategy.
//!
//! ```text
//! CSV source → AsyncReader → Vec<Command> batches
//!                  ↓
//!           csv_format module
//!           (CsvRecord, convert_csv_record)
//! ```

use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::{Command, LedgerError};
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use tracing::warn;

/// Asynchronous CSV command reader
pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    line_num: usize,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            line_num: 0,
        }
    }

    /// Read up to `batch_size` commands
    ///
    /// Rows that fail to parse are logged and skipped; they do not count
    /// towards the batch size. An empty vector means end of input.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<Command> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<CsvRecord>();

        while batch.len() < batch_size {
            let Some(row) = records.next().await else {
                break;
            };
            self.line_num += 1;
            let line = self.line_num as u64 + 1;

            let command = row
                .map_err(|e| LedgerError::parse_error(line, e))
                .and_then(|csv_record| {
                    convert_csv_record(csv_record).map_err(|e| LedgerError::parse_error(line, e))
                });
            match command {
                Ok(command) => batch.push(command),
                Err(e) => warn!(line, error = %e, "skipping malformed row"),
            }
        }

        batch
    }
}
