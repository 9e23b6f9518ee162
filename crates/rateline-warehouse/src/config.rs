//! Injected configuration for the rate query builders.

use std::env;

use serde::Deserialize;

use crate::{RateError, SqlDialect};

/// Environment variable that overrides [`RatesConfig::row_limit`].
pub const ROW_LIMIT_ENV: &str = "RATELINE_ROW_LIMIT";

/// Default cap on returned buckets per query.
pub const DEFAULT_ROW_LIMIT: usize = 100;

/// Fully qualified warehouse tables referenced by the generated SQL.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WarehouseTables {
    pub trades: String,
    pub assets: String,
    pub ledgers: String,
    pub offer_events: String,
    pub offers: String,
    pub markets: String,
    /// Ledger table joined by the orderbook query; lives in a separate dataset.
    pub orderbook_ledgers: String,
}

impl Default for WarehouseTables {
    fn default() -> Self {
        Self {
            trades: String::from("crypto-stellar.crypto_stellar.history_trades"),
            assets: String::from("crypto-stellar.crypto_stellar.history_assets"),
            ledgers: String::from("crypto-stellar.crypto_stellar.history_ledgers"),
            offer_events: String::from("hubble-261722.liquidity_data.fact_offer_events"),
            offers: String::from("hubble-261722.liquidity_data.dim_offers"),
            markets: String::from("hubble-261722.liquidity_data.dim_markets"),
            orderbook_ledgers: String::from(
                "hubble-261722.crypto_stellar_internal.history_ledgers",
            ),
        }
    }
}

impl WarehouseTables {
    /// Unqualified table names used by [`DuckDbWarehouse::create_rate_tables`](crate::DuckDbWarehouse::create_rate_tables).
    /// Both formulations share one `ledgers` table.
    pub fn local() -> Self {
        Self {
            trades: String::from("trades"),
            assets: String::from("assets"),
            ledgers: String::from("ledgers"),
            offer_events: String::from("offer_events"),
            offers: String::from("offers"),
            markets: String::from("markets"),
            orderbook_ledgers: String::from("ledgers"),
        }
    }

    pub(crate) fn entries(&self) -> [(&'static str, &str); 7] {
        [
            ("trades", &self.trades),
            ("assets", &self.assets),
            ("ledgers", &self.ledgers),
            ("offer_events", &self.offer_events),
            ("offers", &self.offers),
            ("markets", &self.markets),
            ("orderbook_ledgers", &self.orderbook_ledgers),
        ]
    }
}

/// Settings shared by both rate query builders.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RatesConfig {
    /// Maximum number of buckets a single query may return.
    pub row_limit: usize,
    /// Must match the dialect of the client the statements are sent to.
    pub dialect: SqlDialect,
    pub tables: WarehouseTables,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            row_limit: DEFAULT_ROW_LIMIT,
            dialect: SqlDialect::BigQuery,
            tables: WarehouseTables::default(),
        }
    }
}

impl RatesConfig {
    /// DuckDB SQL over the [`WarehouseTables::local`] layout.
    pub fn local() -> Self {
        Self {
            row_limit: DEFAULT_ROW_LIMIT,
            dialect: SqlDialect::DuckDb,
            tables: WarehouseTables::local(),
        }
    }

    /// Defaults with `RATELINE_ROW_LIMIT` applied when set.
    pub fn from_env() -> Result<Self, RateError> {
        let mut config = Self::default();
        if let Some(raw) = env::var_os(ROW_LIMIT_ENV) {
            let raw = raw.to_string_lossy();
            config.row_limit = raw.trim().parse().map_err(|_| {
                RateError::InvalidConfig(format!(
                    "{ROW_LIMIT_ENV} must be a positive integer, got '{raw}'"
                ))
            })?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Table names are inlined into SQL, so only plain dotted identifiers are
    /// accepted.
    pub fn validate(&self) -> Result<(), RateError> {
        if self.row_limit == 0 {
            return Err(RateError::InvalidConfig(String::from(
                "row_limit must be greater than zero",
            )));
        }

        for (field, table) in self.tables.entries() {
            if !is_table_identifier(table) {
                return Err(RateError::InvalidConfig(format!(
                    "table '{field}' has an invalid identifier '{table}'"
                )));
            }
        }

        Ok(())
    }
}

pub(crate) fn is_table_identifier(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.'))
}
