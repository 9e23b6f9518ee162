use std::fmt::{Display, Formatter};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::ValidationError;

/// Inclusive window on ledger close time, in unix seconds (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeRange {
    start: OffsetDateTime,
    end: OffsetDateTime,
}

impl TimeRange {
    pub fn new(start: i64, end: i64) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvertedTimeRange { start, end });
        }

        Ok(Self {
            start: to_datetime(start)?,
            end: to_datetime(end)?,
        })
    }

    /// Parse the decimal-string bounds accepted by the public entry points.
    ///
    /// Both empty disables time filtering and yields `None`. Exactly one empty
    /// bound is rejected.
    pub fn from_unix_params(start: &str, end: &str) -> Result<Option<Self>, ValidationError> {
        let (start, end) = (start.trim(), end.trim());
        match (start.is_empty(), end.is_empty()) {
            (true, true) => Ok(None),
            (false, false) => Self::new(parse_seconds(start)?, parse_seconds(end)?).map(Some),
            _ => Err(ValidationError::PartialTimeRange),
        }
    }

    /// Start bound in unix seconds.
    pub fn start(self) -> i64 {
        self.start.unix_timestamp()
    }

    /// End bound in unix seconds.
    pub fn end(self) -> i64 {
        self.end.unix_timestamp()
    }

    pub const fn start_datetime(self) -> OffsetDateTime {
        self.start
    }

    pub const fn end_datetime(self) -> OffsetDateTime {
        self.end
    }
}

impl Display for TimeRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let start = self.start.format(&Rfc3339).map_err(|_| std::fmt::Error)?;
        let end = self.end.format(&Rfc3339).map_err(|_| std::fmt::Error)?;
        write!(f, "{start}..={end}")
    }
}

fn parse_seconds(value: &str) -> Result<i64, ValidationError> {
    value
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidUnixTimestamp {
            value: value.to_owned(),
        })
}

fn to_datetime(seconds: i64) -> Result<OffsetDateTime, ValidationError> {
    OffsetDateTime::from_unix_timestamp(seconds).map_err(|_| {
        ValidationError::InvalidUnixTimestamp {
            value: seconds.to_string(),
        }
    })
}
