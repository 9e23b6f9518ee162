use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// Aggregation granularity for rate buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateBy {
    /// One bucket per closed ledger, titled `Ledger <sequence>`.
    Ledger,
    /// One bucket per UTC calendar day, titled `YYYY-MM-DD`.
    #[default]
    Day,
}

impl AggregateBy {
    /// Interpret a request parameter. Only `"ledger"` selects ledger buckets;
    /// every other value falls back to day buckets.
    pub fn from_param(value: &str) -> Self {
        if value == "ledger" {
            Self::Ledger
        } else {
            Self::Day
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ledger => "ledger",
            Self::Day => "day",
        }
    }
}

impl Display for AggregateBy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for AggregateBy {
    fn from(value: &str) -> Self {
        Self::from_param(value)
    }
}
