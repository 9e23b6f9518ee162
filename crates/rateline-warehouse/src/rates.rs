//! Public entry points: validate, build, execute, collect.

use std::fmt::{Display, Formatter};

use rateline_core::{Asset, RateRequest, RateResult};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::queries::{build_orderbook_rate_query, build_trade_rate_query};
use crate::{collect_rates, RateError, RatesConfig, Statement, WarehouseClient};

/// Which warehouse data a rate is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateMethod {
    /// Volume-weighted over executed trades.
    Trades,
    /// Mid-price of the best bid and ask.
    #[default]
    Orderbook,
}

impl RateMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trades => "trades",
            Self::Orderbook => "orderbook",
        }
    }

    /// Build the statement for `request` after checking `config`.
    pub fn build(self, request: &RateRequest, config: &RatesConfig) -> Result<Statement, RateError> {
        config.validate()?;
        Ok(match self {
            Self::Trades => build_trade_rate_query(request, config),
            Self::Orderbook => build_orderbook_rate_query(request, config),
        })
    }
}

impl Display for RateMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute the rate series for `request` with the chosen formulation.
pub fn compute_rates<C>(
    method: RateMethod,
    request: &RateRequest,
    client: &C,
    config: &RatesConfig,
) -> Result<Vec<RateResult>, RateError>
where
    C: WarehouseClient + ?Sized,
{
    info!(
        %method,
        source = %request.source(),
        dest = %request.dest(),
        aggregate_by = %request.aggregate_by(),
        "computing rates"
    );
    if config.dialect != client.dialect() {
        return Err(RateError::InvalidConfig(format!(
            "rates config targets {} SQL but the warehouse client runs {}",
            config.dialect,
            client.dialect()
        )));
    }
    let statement = method.build(request, config)?;
    collect_rates(client, &statement)
}

/// Trade-volume-weighted rates. A bucket keeps its row with `rate: None`
/// when the warehouse yields a NULL ratio, e.g. all amounts NULL.
pub fn compute_trade_rates<C>(
    request: &RateRequest,
    client: &C,
    config: &RatesConfig,
) -> Result<Vec<RateResult>, RateError>
where
    C: WarehouseClient + ?Sized,
{
    compute_rates(RateMethod::Trades, request, client, config)
}

/// Order-book mid-price rates. Buckets without both a bid and an ask are
/// absent from the result.
pub fn compute_orderbook_rates<C>(
    request: &RateRequest,
    client: &C,
    config: &RatesConfig,
) -> Result<Vec<RateResult>, RateError>
where
    C: WarehouseClient + ?Sized,
{
    compute_rates(RateMethod::Orderbook, request, client, config)
}

/// String-parameter entry point for the order-book rate.
///
/// `start_unix`/`end_unix` are decimal unix seconds, both empty for no time
/// filter. `aggregate_by` is `"ledger"` for per-ledger buckets; anything else
/// buckets per day.
pub fn run_rate_query<C>(
    source: Asset,
    dest: Asset,
    start_unix: &str,
    end_unix: &str,
    aggregate_by: &str,
    client: &C,
    config: &RatesConfig,
) -> Result<Vec<RateResult>, RateError>
where
    C: WarehouseClient + ?Sized,
{
    let request = RateRequest::from_params(source, dest, start_unix, end_unix, aggregate_by)?;
    compute_orderbook_rates(&request, client, config)
}
