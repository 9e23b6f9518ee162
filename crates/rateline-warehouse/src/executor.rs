//! Runs a statement and decodes its rows into [`RateResult`]s.

use std::time::Instant;

use rateline_core::RateResult;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{DecodeError, RateError, RowCursor, Statement, WarehouseClient};

/// Lazily decoded rate rows from a single submission.
///
/// The sequence stops after the first error and cannot be restarted; run the
/// statement again for a fresh cursor.
pub struct RateRows<'c> {
    cursor: Box<dyn RowCursor + 'c>,
    position: usize,
    finished: bool,
}

impl<'c> RateRows<'c> {
    pub fn new(cursor: Box<dyn RowCursor + 'c>) -> Self {
        Self {
            cursor,
            position: 0,
            finished: false,
        }
    }

    /// Number of rows handed out so far.
    pub fn position(&self) -> usize {
        self.position
    }
}

impl Iterator for RateRows<'_> {
    type Item = Result<RateResult, RateError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let row = self.position;
        let decoded = match self.cursor.next_row() {
            Ok(Some(fields)) => serde_json::from_value::<RateResult>(Value::Object(fields))
                .map_err(DecodeError::Row),
            Ok(None) => {
                self.finished = true;
                return None;
            }
            Err(error) => Err(DecodeError::Fetch(error)),
        };

        match decoded {
            Ok(result) => {
                self.position += 1;
                Some(Ok(result))
            }
            Err(source) => {
                self.finished = true;
                warn!(row, error = %source, "abandoning rate cursor");
                Some(Err(RateError::Decode { row, source }))
            }
        }
    }
}

/// Submit `statement` and return its rows as a lazy sequence.
pub fn execute<'c, C>(client: &'c C, statement: &Statement) -> Result<RateRows<'c>, RateError>
where
    C: WarehouseClient + ?Sized,
{
    debug!(params = statement.params().len(), "submitting rate query");
    match client.submit(statement) {
        Ok(cursor) => Ok(RateRows::new(cursor)),
        Err(source) => {
            warn!(error = %source, "rate query failed to execute");
            Err(RateError::Execution {
                sql: statement.inline_sql(),
                source,
            })
        }
    }
}

/// Submit `statement` and drain every row. Any failure discards the rows
/// decoded so far.
pub fn collect_rates<C>(client: &C, statement: &Statement) -> Result<Vec<RateResult>, RateError>
where
    C: WarehouseClient + ?Sized,
{
    let started = Instant::now();
    let results = execute(client, statement)?.collect::<Result<Vec<_>, _>>()?;
    info!(
        rows = results.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "rate query completed"
    );
    Ok(results)
}
