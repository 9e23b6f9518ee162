use crate::{AggregateBy, Asset, TimeRange, ValidationError};

/// Validated parameters for a single rate computation.
///
/// Rates are always expressed as destination units per source unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateRequest {
    source: Asset,
    dest: Asset,
    time_range: Option<TimeRange>,
    aggregate_by: AggregateBy,
}

impl RateRequest {
    pub fn new(
        source: Asset,
        dest: Asset,
        time_range: Option<TimeRange>,
        aggregate_by: AggregateBy,
    ) -> Result<Self, ValidationError> {
        if source == dest {
            return Err(ValidationError::IdenticalAssets {
                asset: source.to_string(),
            });
        }

        Ok(Self {
            source,
            dest,
            time_range,
            aggregate_by,
        })
    }

    /// Build a request from the string-typed parameters of the public entry
    /// points: decimal unix-second bounds (both empty for no filter) and an
    /// aggregation name.
    pub fn from_params(
        source: Asset,
        dest: Asset,
        start_unix: &str,
        end_unix: &str,
        aggregate_by: &str,
    ) -> Result<Self, ValidationError> {
        let time_range = TimeRange::from_unix_params(start_unix, end_unix)?;
        Self::new(source, dest, time_range, AggregateBy::from_param(aggregate_by))
    }

    pub fn source(&self) -> &Asset {
        &self.source
    }

    pub fn dest(&self) -> &Asset {
        &self.dest
    }

    pub fn time_range(&self) -> Option<TimeRange> {
        self.time_range
    }

    pub fn aggregate_by(&self) -> AggregateBy {
        self.aggregate_by
    }

    /// The same request with source and destination swapped.
    pub fn reversed(&self) -> Self {
        Self {
            source: self.dest.clone(),
            dest: self.source.clone(),
            time_range: self.time_range,
            aggregate_by: self.aggregate_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(code: &str, issuer: &str) -> Asset {
        Asset::new(code, issuer).expect("asset")
    }

    #[test]
    fn builds_from_string_params() {
        let request = RateRequest::from_params(
            asset("NGNT", "ISSUER_A"),
            asset("EURT", "ISSUER_B"),
            "1000",
            "2000",
            "ledger",
        )
        .expect("request should build");

        assert_eq!(request.aggregate_by(), AggregateBy::Ledger);
        let range = request.time_range().expect("range present");
        assert_eq!((range.start(), range.end()), (1000, 2000));
    }

    #[test]
    fn rejects_identical_assets() {
        let err = RateRequest::new(
            asset("NGNT", "ISSUER_A"),
            asset("NGNT", "ISSUER_A"),
            None,
            AggregateBy::Day,
        )
        .expect_err("must fail");
        assert!(matches!(err, ValidationError::IdenticalAssets { .. }));
    }

    #[test]
    fn reversed_swaps_only_the_pair() {
        let request = RateRequest::from_params(
            asset("NGNT", "ISSUER_A"),
            asset("EURT", "ISSUER_B"),
            "",
            "",
            "day",
        )
        .expect("request should build");

        let reversed = request.reversed();
        assert_eq!(reversed.source(), request.dest());
        assert_eq!(reversed.dest(), request.source());
        assert_eq!(reversed.time_range(), None);
        assert_eq!(reversed.aggregate_by(), AggregateBy::Day);
    }
}
