//! Core contracts for rateline.
//!
//! This crate contains the value objects that flow through a single rate
//! request:
//! - [`Asset`] pairs identified by code and issuer
//! - [`RateRequest`] with its optional [`TimeRange`] and [`AggregateBy`] bucketing
//! - [`RateResult`] rows and their parsed [`Bucket`]
//! - [`ValidationError`] for malformed caller input

pub mod domain;
pub mod error;

pub use domain::{AggregateBy, Asset, Bucket, RateRequest, RateResult, TimeRange};
pub use error::ValidationError;
