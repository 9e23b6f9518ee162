//! Warehouse capability consumed by the executor.

use std::collections::VecDeque;

use serde_json::{Map, Value};

use crate::{SqlDialect, Statement, WarehouseError};

/// One result row keyed by column name.
pub type WarehouseRow = Map<String, Value>;

/// Something that can run a [`Statement`] and hand back its rows.
///
/// Implementations own connection handling, cancellation, and timeouts; the
/// rate layer adds none of its own.
pub trait WarehouseClient: Send + Sync {
    fn submit(&self, statement: &Statement) -> Result<Box<dyn RowCursor + '_>, WarehouseError>;

    /// SQL dialect this client runs.
    fn dialect(&self) -> SqlDialect {
        SqlDialect::BigQuery
    }
}

/// Forward-only cursor over a submitted statement's rows.
pub trait RowCursor {
    /// Next row, or `None` once the result set is exhausted.
    fn next_row(&mut self) -> Result<Option<WarehouseRow>, WarehouseError>;
}

/// Cursor over rows that were already fetched into memory.
#[derive(Debug, Clone, Default)]
pub struct BufferedCursor {
    rows: VecDeque<WarehouseRow>,
}

impl BufferedCursor {
    pub fn new(rows: impl IntoIterator<Item = WarehouseRow>) -> Self {
        Self {
            rows: rows.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.rows.len()
    }
}

impl RowCursor for BufferedCursor {
    fn next_row(&mut self) -> Result<Option<WarehouseRow>, WarehouseError> {
        Ok(self.rows.pop_front())
    }
}
