use thiserror::Error;

/// Validation errors for rate request parameters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("asset code cannot be empty")]
    EmptyAssetCode,
    #[error("asset issuer cannot be empty")]
    EmptyAssetIssuer,

    #[error("source and destination must be distinct assets: '{asset}'")]
    IdenticalAssets { asset: String },

    #[error("start and end time must both be set or both be empty")]
    PartialTimeRange,
    #[error("'{value}' is not a valid unix timestamp in seconds")]
    InvalidUnixTimestamp { value: String },
    #[error("start time {start} is after end time {end}")]
    InvertedTimeRange { start: i64, end: i64 },

    #[error("title '{value}' is neither a ledger nor a day bucket")]
    UnrecognizedBucket { value: String },
}
