//! SQL builders for the two rate formulations.
//!
//! | Builder | Rate | Empty bucket |
//! |---------|------|--------------|
//! | [`build_trade_rate_query`] | volume-weighted over trades | kept, `rate` NULL |
//! | [`build_orderbook_rate_query`] | best bid/ask mid-price | dropped |
//!
//! Both bind the request through the same named parameters, listed below.

mod orderbook;
mod title;
mod trade;

pub use orderbook::build_orderbook_rate_query;
pub use title::title_field;
pub use trade::build_trade_rate_query;

use rateline_core::RateRequest;

use crate::{SqlDialect, Statement};

pub const SOURCE_CODE: &str = "source_code";
pub const SOURCE_ISSUER: &str = "source_issuer";
pub const DEST_CODE: &str = "dest_code";
pub const DEST_ISSUER: &str = "dest_issuer";
pub const START_TS: &str = "start_ts";
pub const END_TS: &str = "end_ts";

/// Column names holding the code and issuer of each stored leg.
#[derive(Debug, Clone, Copy)]
struct LegColumns {
    base_code: &'static str,
    base_issuer: &'static str,
    counter_code: &'static str,
    counter_issuer: &'static str,
}

impl LegColumns {
    /// Predicate matching the stored pair when `base` sits in the base leg and
    /// `counter` in the counter leg.
    fn pair_match(self, base: Leg, counter: Leg) -> String {
        let (base_code, base_issuer) = base.params();
        let (counter_code, counter_issuer) = counter.params();
        format!(
            "({}=@{base_code} AND {}=@{base_issuer} AND {}=@{counter_code} AND {}=@{counter_issuer})",
            self.base_code, self.base_issuer, self.counter_code, self.counter_issuer
        )
    }
}

/// Which side of the request a predicate refers to.
#[derive(Debug, Clone, Copy)]
enum Leg {
    Source,
    Dest,
}

impl Leg {
    const fn params(self) -> (&'static str, &'static str) {
        match self {
            Self::Source => (SOURCE_CODE, SOURCE_ISSUER),
            Self::Dest => (DEST_CODE, DEST_ISSUER),
        }
    }
}

/// `AND <column> BETWEEN ...` when the request carries a time range.
fn time_filter(closed_at_column: &str, request: &RateRequest, dialect: SqlDialect) -> String {
    match request.time_range() {
        Some(_) => format!(
            " AND {closed_at_column} BETWEEN {} AND {}",
            dialect.unix_seconds(START_TS),
            dialect.unix_seconds(END_TS)
        ),
        None => String::new(),
    }
}

fn bind_request(statement: Statement, request: &RateRequest, dialect: SqlDialect) -> Statement {
    let statement = statement
        .in_dialect(dialect)
        .bind(SOURCE_CODE, request.source().code())
        .bind(SOURCE_ISSUER, request.source().issuer())
        .bind(DEST_CODE, request.dest().code())
        .bind(DEST_ISSUER, request.dest().issuer());

    match request.time_range() {
        Some(range) => statement
            .bind(START_TS, range.start())
            .bind(END_TS, range.end()),
        None => statement,
    }
}
