use rateline_core::RateRequest;
use tracing::debug;

use super::{bind_request, time_filter, title_field, Leg, LegColumns, SOURCE_CODE, SOURCE_ISSUER};
use crate::{RatesConfig, SqlDialect, Statement};

const MARKET_LEGS: LegColumns = LegColumns {
    base_code: "M.base_code",
    base_issuer: "M.base_issuer",
    counter_code: "M.counter_code",
    counter_issuer: "M.counter_issuer",
};

/// Mid-price rate per bucket from historical order books.
///
/// The `orderbooks` stage collects, per bucket and market, the best bid and
/// best ask. Buckets lacking either side have a NULL mid-price and are
/// filtered out rather than returned empty. When the market stores the pair
/// as (dest, source) the rate is `1/mid`.
///
/// `config` is expected to have passed [`RatesConfig::validate`].
pub fn build_orderbook_rate_query(request: &RateRequest, config: &RatesConfig) -> Statement {
    let dialect = config.dialect;
    let normal = MARKET_LEGS.pair_match(Leg::Source, Leg::Dest);
    let reverse = MARKET_LEGS.pair_match(Leg::Dest, Leg::Source);
    let title = title_field("E.ledger_id", "L.closed_at", request.aggregate_by(), dialect);
    let best_prices = best_price_columns(dialect);
    let mid = mid_price(dialect);
    let tables = &config.tables;

    let mut sql = String::from("WITH orderbooks AS (");
    sql.push_str(&format!(
        " SELECT {title}, M.base_code, M.base_issuer, M.counter_code, M.counter_issuer, {best_prices}"
    ));
    sql.push_str(&format!(" FROM {} AS E", dialect.table(&tables.offer_events)));
    sql.push_str(&format!(
        " INNER JOIN {} O ON (E.offer_instance_id = O.dim_offer_id)",
        dialect.table(&tables.offers)
    ));
    sql.push_str(&format!(
        " INNER JOIN {} M ON (M.market_id = O.market_id)",
        dialect.table(&tables.markets)
    ));
    sql.push_str(&format!(
        " INNER JOIN {} L ON (L.sequence = E.ledger_id)",
        dialect.table(&tables.orderbook_ledgers)
    ));
    sql.push_str(&format!(" WHERE ({normal} OR {reverse})"));
    sql.push_str(&time_filter("L.closed_at", request, dialect));
    sql.push_str(" GROUP BY title, M.base_code, M.base_issuer, M.counter_code, M.counter_issuer)");

    // A market stored as (dest, source) quotes source per dest.
    let base_is_source = format!(
        "orderbooks.base_code=@{SOURCE_CODE} AND orderbooks.base_issuer=@{SOURCE_ISSUER}"
    );
    sql.push_str(&format!(
        " SELECT orderbooks.title, CASE WHEN {base_is_source} THEN {mid} ELSE 1/({mid}) END AS rate FROM orderbooks"
    ));
    sql.push_str(&format!(" WHERE {mid} IS NOT NULL"));
    sql.push_str(&format!(
        " ORDER BY orderbooks.title ASC LIMIT {}",
        config.row_limit
    ));

    let statement = bind_request(Statement::new(sql), request, dialect);
    debug!(
        %dialect,
        source = %request.source(),
        dest = %request.dest(),
        aggregate_by = %request.aggregate_by(),
        sql = statement.sql(),
        "built orderbook rate query"
    );
    statement
}

/// Per-group best bid (`action` b) and best ask (`action` s).
fn best_price_columns(dialect: SqlDialect) -> String {
    let bid = dialect.string_literal("b");
    let ask = dialect.string_literal("s");
    match dialect {
        SqlDialect::BigQuery => format!(
            "ARRAY_AGG(CASE WHEN O.action={bid} THEN O.price END IGNORE NULLS ORDER BY O.price DESC) AS bidPrices, \
             ARRAY_AGG(CASE WHEN O.action={ask} THEN O.price END IGNORE NULLS ORDER BY O.price ASC) AS askPrices"
        ),
        SqlDialect::DuckDb => format!(
            "MAX(CASE WHEN O.action={bid} THEN O.price END) AS bestBid, \
             MIN(CASE WHEN O.action={ask} THEN O.price END) AS bestAsk"
        ),
    }
}

fn mid_price(dialect: SqlDialect) -> &'static str {
    match dialect {
        SqlDialect::BigQuery => "(orderbooks.askPrices[OFFSET(0)]+orderbooks.bidPrices[OFFSET(0)])/2",
        SqlDialect::DuckDb => "(orderbooks.bestAsk+orderbooks.bestBid)/2",
    }
}
