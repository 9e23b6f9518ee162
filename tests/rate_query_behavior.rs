//! Behavior-driven tests for rate query construction
//!
//! These tests verify WHAT statement a caller's request turns into, and
//! which requests are refused before anything reaches the warehouse.

use rateline_tests::*;
use rateline_warehouse::queries::{build_orderbook_rate_query, build_trade_rate_query};
use rateline_warehouse::{compute_rates, run_rate_query, ParamValue, RateMethod};

// =============================================================================
// Trade rates
// =============================================================================

#[test]
fn when_user_requests_ledger_trade_rates_in_a_window_the_statement_binds_every_input() {
    // Given: NGNT/ISSUER_A -> EURT/ISSUER_B between 1000 and 2000, per ledger
    let request = RateRequest::from_params(ngnt(), eurt(), "1000", "2000", "ledger")
        .expect("valid request");

    // When: The trade statement is built
    let statement = build_trade_rate_query(&request, &RatesConfig::default());

    // Then: Values travel as parameters, never spliced into the SQL text
    assert!(!statement.sql().contains("NGNT"));
    assert_eq!(statement.param("source_code"), Some(&ParamValue::from("NGNT")));
    assert_eq!(statement.param("dest_issuer"), Some(&ParamValue::from("ISSUER_B")));
    assert_eq!(statement.param("start_ts"), Some(&ParamValue::Int(1000)));
    assert_eq!(statement.param("end_ts"), Some(&ParamValue::Int(2000)));

    // And: The rendered query buckets per ledger inside the window
    let sql = statement.inline_sql();
    assert!(sql.contains(r#"FORMAT("Ledger %d", L.sequence) AS title"#));
    assert!(sql.contains(
        "L.closed_at BETWEEN TIMESTAMP_SECONDS(1000) AND TIMESTAMP_SECONDS(2000)"
    ));
    assert!(sql.ends_with("ORDER BY title ASC LIMIT 100"));
}

#[test]
fn when_user_swaps_source_and_dest_the_rate_branches_swap_with_them() {
    // Given: A request and its reverse
    let request = RateRequest::from_params(ngnt(), eurt(), "", "", "day").expect("request");
    let config = RatesConfig::default();

    // When: Both statements are built
    let forward = build_trade_rate_query(&request, &config).inline_sql();
    let reverse = build_trade_rate_query(&request.reversed(), &config).inline_sql();

    // Then: The trade matched by the first branch of one is the second of the other
    let ngnt_base = r#"(B.asset_code="NGNT" AND B.asset_issuer="ISSUER_A" AND C.asset_code="EURT" AND C.asset_issuer="ISSUER_B")"#;
    let eurt_base = r#"(B.asset_code="EURT" AND B.asset_issuer="ISSUER_B" AND C.asset_code="NGNT" AND C.asset_issuer="ISSUER_A")"#;
    assert!(forward.contains(&format!(
        "CASE WHEN {ngnt_base} THEN SUM(T.counter_amount)/SUM(T.base_amount) WHEN {eurt_base} THEN SUM(T.base_amount)/SUM(T.counter_amount) END"
    )));
    assert!(reverse.contains(&format!(
        "CASE WHEN {eurt_base} THEN SUM(T.counter_amount)/SUM(T.base_amount) WHEN {ngnt_base} THEN SUM(T.base_amount)/SUM(T.counter_amount) END"
    )));
}

#[test]
fn when_user_omits_the_window_no_time_filter_is_applied() {
    // Given: No start or end
    let request = RateRequest::from_params(ngnt(), eurt(), "", "", "day").expect("request");

    // When: Either statement is built
    let config = RatesConfig::default();
    let trade = build_trade_rate_query(&request, &config);
    let orderbook = build_orderbook_rate_query(&request, &config);

    // Then: Neither filters on close time nor binds timestamps
    for statement in [&trade, &orderbook] {
        assert!(!statement.sql().contains("BETWEEN"));
        assert!(statement.param("start_ts").is_none());
        assert!(statement.param("end_ts").is_none());
    }
}

// =============================================================================
// Orderbook rates
// =============================================================================

#[test]
fn when_user_requests_daily_orderbook_rates_empty_books_are_filtered_out() {
    // Given: A day-bucketed request
    let request = RateRequest::from_params(ngnt(), eurt(), "", "", "week").expect("request");
    assert_eq!(request.aggregate_by(), AggregateBy::Day);

    // When: The orderbook statement is built
    let sql = build_orderbook_rate_query(&request, &RatesConfig::default()).inline_sql();

    // Then: Titles are UTC days and buckets without a mid-price never come back
    assert!(sql.starts_with("WITH orderbooks AS ("));
    assert!(sql.contains(
        r#"FORMAT_TIMESTAMP("%Y-%m-%d", TIMESTAMP_TRUNC(L.closed_at, DAY, "UTC"), "UTC") AS title"#
    ));
    assert!(sql.contains(
        "WHERE (orderbooks.askPrices[OFFSET(0)]+orderbooks.bidPrices[OFFSET(0)])/2 IS NOT NULL"
    ));
    assert!(sql.contains(
        r#"CASE WHEN orderbooks.base_code="NGNT" AND orderbooks.base_issuer="ISSUER_A" THEN"#
    ));
    assert!(sql.ends_with("ORDER BY orderbooks.title ASC LIMIT 100"));
}

#[test]
fn when_operator_overrides_tables_and_limit_the_statement_uses_them() {
    // Given: A config pointing at a private dataset
    let mut config = RatesConfig {
        row_limit: 7,
        ..RatesConfig::default()
    };
    config.tables.offer_events = String::from("my-project.rates.offer_events");

    // When: The orderbook statement is built
    let request = RateRequest::from_params(ngnt(), eurt(), "", "", "ledger").expect("request");
    let sql = build_orderbook_rate_query(&request, &config).inline_sql();

    // Then: The configured table and limit appear
    assert!(sql.contains("FROM `my-project.rates.offer_events` AS E"));
    assert!(sql.ends_with("LIMIT 7"));
}

// =============================================================================
// Entry points: validation
// =============================================================================

#[test]
fn when_user_asks_for_an_asset_against_itself_nothing_is_submitted() {
    // Given: A warehouse that would answer anything
    let warehouse = ScriptedWarehouse::default();

    // When: Source and dest are the same asset
    let error = run_rate_query(ngnt(), ngnt(), "", "", "day", &warehouse, &RatesConfig::default())
        .expect_err("identical assets must be refused");

    // Then: A validation error is returned before submission
    assert_eq!(error.stage(), "validate");
    assert!(matches!(
        error,
        RateError::Validation(ValidationError::IdenticalAssets { .. })
    ));
    assert!(warehouse.submitted().is_empty());
}

#[test]
fn when_user_sends_malformed_time_bounds_they_are_refused() {
    let warehouse = ScriptedWarehouse::default();
    let config = RatesConfig::default();

    for (start, end) in [("1000", ""), ("", "2000"), ("abc", "2000"), ("2000", "1000")] {
        let error = run_rate_query(ngnt(), eurt(), start, end, "ledger", &warehouse, &config)
            .expect_err("malformed window must be refused");
        assert_eq!(error.stage(), "validate", "start={start:?} end={end:?}");
    }

    assert!(warehouse.submitted().is_empty());
}

#[test]
fn when_operator_misconfigures_the_row_limit_nothing_is_submitted() {
    let warehouse = ScriptedWarehouse::default();
    let config = RatesConfig {
        row_limit: 0,
        ..RatesConfig::default()
    };
    let request = RateRequest::from_params(ngnt(), eurt(), "", "", "day").expect("request");

    let error = compute_rates(RateMethod::Trades, &request, &warehouse, &config)
        .expect_err("zero limit must be refused");

    assert!(matches!(error, RateError::InvalidConfig(_)));
    assert!(warehouse.submitted().is_empty());
}

#[test]
fn when_user_runs_the_string_entry_point_the_orderbook_formulation_is_used() {
    // Given: A warehouse with one daily bucket
    let warehouse =
        ScriptedWarehouse::with_rows([row("2020-09-13", serde_json::json!(0.0021))]);

    // When: The string entry point runs
    let rates = run_rate_query(
        ngnt(),
        eurt(),
        "1600000000",
        "1600086400",
        "day",
        &warehouse,
        &RatesConfig::default(),
    )
    .expect("rates");

    // Then: One orderbook statement was submitted and its row decoded
    let submitted = warehouse.submitted();
    assert_eq!(submitted.len(), 1);
    assert!(submitted[0].starts_with("WITH orderbooks AS ("));
    assert_eq!(rates, vec![RateResult::new("2020-09-13", Some(0.0021))]);
}
