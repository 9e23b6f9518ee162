use rateline_core::RateRequest;
use tracing::debug;

use super::{bind_request, time_filter, title_field, Leg, LegColumns};
use crate::{RatesConfig, Statement};

const TRADE_LEGS: LegColumns = LegColumns {
    base_code: "B.asset_code",
    base_issuer: "B.asset_issuer",
    counter_code: "C.asset_code",
    counter_issuer: "C.asset_issuer",
};

/// Volume-weighted rate per bucket from executed trades.
///
/// A trade counts when its stored base/counter legs equal (source, dest) or
/// (dest, source). Forward trades contribute `counter/base`, reversed ones
/// `base/counter`, so the rate is always dest per source. Groups are keyed by
/// leg identity, so each one takes exactly one `CASE` branch; a NULL rate only
/// comes from the warehouse itself, e.g. a bucket whose amounts are all NULL.
/// Such buckets are kept.
///
/// `config` is expected to have passed [`RatesConfig::validate`].
pub fn build_trade_rate_query(request: &RateRequest, config: &RatesConfig) -> Statement {
    let forward = TRADE_LEGS.pair_match(Leg::Source, Leg::Dest);
    let forward_rate = "SUM(T.counter_amount)/SUM(T.base_amount)";
    let reverse = TRADE_LEGS.pair_match(Leg::Dest, Leg::Source);
    let reverse_rate = "SUM(T.base_amount)/SUM(T.counter_amount)";
    let dialect = config.dialect;
    let title = title_field("L.sequence", "L.closed_at", request.aggregate_by(), dialect);
    let tables = &config.tables;

    let mut sql = format!(
        "SELECT {title}, CASE WHEN {forward} THEN {forward_rate} WHEN {reverse} THEN {reverse_rate} END AS rate"
    );
    sql.push_str(&format!(" FROM {} T", dialect.table(&tables.trades)));
    sql.push_str(&format!(
        " JOIN {} B ON B.id=T.base_asset_id",
        dialect.table(&tables.assets)
    ));
    sql.push_str(&format!(
        " JOIN {} C ON C.id=T.counter_asset_id",
        dialect.table(&tables.assets)
    ));
    sql.push_str(&format!(
        " JOIN {} L ON L.closed_at=T.ledger_closed_at",
        dialect.table(&tables.ledgers)
    ));
    sql.push_str(&format!(" WHERE ({forward} OR {reverse})"));
    sql.push_str(&time_filter("L.closed_at", request, dialect));
    sql.push_str(&format!(
        " GROUP BY title, B.asset_code, B.asset_issuer, C.asset_code, C.asset_issuer ORDER BY title ASC LIMIT {}",
        config.row_limit
    ));

    let statement = bind_request(Statement::new(sql), request, dialect);
    debug!(
        %dialect,
        source = %request.source(),
        dest = %request.dest(),
        aggregate_by = %request.aggregate_by(),
        sql = statement.sql(),
        "built trade rate query"
    );
    statement
}
