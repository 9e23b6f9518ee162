//! # Domain Models
//!
//! Value objects for historical rate queries. Every type validates its
//! invariants at construction and is immutable afterwards.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Asset`] | Tradable asset identified by code and issuer |
//! | [`AggregateBy`] | Bucketing granularity (per ledger or per day) |
//! | [`TimeRange`] | Inclusive unix-second window on ledger close time |
//! | [`RateRequest`] | Validated source/destination pair plus window and bucketing |
//! | [`RateResult`] | One rate observation per bucket |
//! | [`Bucket`] | Parsed form of a result title |

mod aggregate;
mod asset;
mod rate;
mod request;
mod time_range;

pub use aggregate::AggregateBy;
pub use asset::Asset;
pub use rate::{Bucket, RateResult};
pub use request::RateRequest;
pub use time_range::TimeRange;
