use rateline_core::ValidationError;
use thiserror::Error;

/// Errors raised by a warehouse client while running a statement.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// `DuckDB` database error.
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    /// I/O error (database directory creation).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Statement was rejected before reaching the engine.
    #[error("query rejected: {0}")]
    QueryRejected(String),

    /// Statement exceeded the client's time budget.
    #[error("query timed out after {timeout_ms}ms")]
    QueryTimeout { timeout_ms: u64 },

    /// Connection pool lock was poisoned by a panicking holder.
    #[error("connection pool is unavailable: lock poisoned")]
    PoolPoisoned,

    /// Failure reported by a remote warehouse backend.
    #[error("warehouse backend error: {0}")]
    Backend(String),
}

/// Why a result row could not be turned into a `RateResult`.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The cursor failed while fetching the next row.
    #[error("failed to fetch row: {0}")]
    Fetch(#[source] WarehouseError),

    /// The row did not have the `{title, rate}` shape.
    #[error("malformed rate row: {0}")]
    Row(#[source] serde_json::Error),
}

/// Top-level error for rate computations. Every variant is terminal for the
/// call; no partial results are returned alongside it.
#[derive(Debug, Error)]
pub enum RateError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid rate configuration: {0}")]
    InvalidConfig(String),

    /// The warehouse rejected or failed to run the statement.
    #[error("error running query\n{sql}\n{source}")]
    Execution {
        sql: String,
        #[source]
        source: WarehouseError,
    },

    /// A result row could not be decoded; the rest of the cursor was dropped.
    #[error("error parsing results from query at row {row}: {source}")]
    Decode {
        row: usize,
        #[source]
        source: DecodeError,
    },
}

impl RateError {
    /// Stage label used in logs: `validate`, `execute`, or `decode`.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Validation(_) | Self::InvalidConfig(_) => "validate",
            Self::Execution { .. } => "execute",
            Self::Decode { .. } => "decode",
        }
    }
}
