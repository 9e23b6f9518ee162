//! SQL dialects the rate builders can target.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Which engine a [`Statement`](crate::Statement) is written for.
///
/// | Dialect | Literals | Tables | Best bid/ask |
/// |---------|----------|--------|--------------|
/// | `BigQuery` | `"text"` with backslash escapes | `` `project.dataset.table` `` | sorted `ARRAY_AGG` + `[OFFSET(0)]` |
/// | `DuckDb` | `'text'` with doubled quotes | `"schema"."table"` | `MAX`/`MIN` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    #[default]
    BigQuery,
    DuckDb,
}

impl SqlDialect {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BigQuery => "bigquery",
            Self::DuckDb => "duckdb",
        }
    }

    /// Quoted string literal.
    pub fn string_literal(self, value: &str) -> String {
        let (quote, escape) = match self {
            Self::BigQuery => ('"', '\\'),
            Self::DuckDb => ('\'', '\''),
        };

        let mut literal = String::with_capacity(value.len() + 2);
        literal.push(quote);
        for ch in value.chars() {
            let needs_escape = match self {
                Self::BigQuery => matches!(ch, '"' | '\\'),
                Self::DuckDb => ch == '\'',
            };
            if needs_escape {
                literal.push(escape);
            }
            literal.push(ch);
        }
        literal.push(quote);
        literal
    }

    /// Quoted table reference. DuckDB quotes each dotted segment so
    /// `main.trades` resolves as schema and table.
    pub fn table(self, name: &str) -> String {
        match self {
            Self::BigQuery => format!("`{name}`"),
            Self::DuckDb => name
                .split('.')
                .map(|segment| format!("\"{segment}\""))
                .collect::<Vec<_>>()
                .join("."),
        }
    }

    /// Timestamp expression for a bound unix-seconds parameter.
    pub(crate) fn unix_seconds(self, param: &str) -> String {
        match self {
            Self::BigQuery => format!("TIMESTAMP_SECONDS(@{param})"),
            Self::DuckDb => format!("epoch_ms(CAST(@{param} AS BIGINT) * 1000)"),
        }
    }
}

impl Display for SqlDialect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
