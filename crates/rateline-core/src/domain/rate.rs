use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::Date;

use crate::ValidationError;

const LEDGER_PREFIX: &str = "Ledger ";
const DAY_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// One rate observation for a single bucket.
///
/// `rate` is `None` when the warehouse returned NULL for the bucket; callers
/// decide how to present gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateResult {
    pub title: String,
    pub rate: Option<f64>,
}

impl RateResult {
    pub fn new(title: impl Into<String>, rate: Option<f64>) -> Self {
        Self {
            title: title.into(),
            rate,
        }
    }

    /// Parse the title back into the bucket it labels.
    pub fn bucket(&self) -> Result<Bucket, ValidationError> {
        Bucket::parse(&self.title)
    }
}

/// Aggregation bucket recovered from a result title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Bucket {
    Ledger(u64),
    Day(Date),
}

impl Bucket {
    pub fn parse(title: &str) -> Result<Self, ValidationError> {
        let unrecognized = || ValidationError::UnrecognizedBucket {
            value: title.to_owned(),
        };

        if let Some(sequence) = title.strip_prefix(LEDGER_PREFIX) {
            return sequence
                .parse::<u64>()
                .map(Self::Ledger)
                .map_err(|_| unrecognized());
        }

        Date::parse(title, DAY_FORMAT)
            .map(Self::Day)
            .map_err(|_| unrecognized())
    }
}

impl Display for Bucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ledger(sequence) => write!(f, "{LEDGER_PREFIX}{sequence}"),
            Self::Day(date) => {
                let formatted = date.format(DAY_FORMAT).map_err(|_| std::fmt::Error)?;
                f.write_str(&formatted)
            }
        }
    }
}
