//! # Rateline Warehouse
//!
//! Historical exchange rates between two ledger assets, computed by the
//! analytical warehouse.
//!
//! ## Overview
//!
//! A [`RateRequest`](rateline_core::RateRequest) is turned into a single
//! parameterized [`Statement`] by one of two builders:
//!
//! - [`queries::build_trade_rate_query`]: volume-weighted price of executed trades
//! - [`queries::build_orderbook_rate_query`]: mid-price of the best bid and ask
//!
//! The statement is submitted to a [`WarehouseClient`] and its rows are
//! decoded into [`RateResult`](rateline_core::RateResult)s by [`execute`] or
//! [`collect_rates`]. [`DuckDbWarehouse`] is an embedded client for local
//! copies of the warehouse tables.
//!
//! Statements are written in the [`SqlDialect`] named by [`RatesConfig`],
//! which must match the client's: BigQuery for the hosted tables, DuckDB for
//! [`DuckDbWarehouse`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rateline_core::Asset;
//! use rateline_warehouse::{run_rate_query, DuckDbWarehouse, RatesConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let warehouse = DuckDbWarehouse::open_default()?;
//!     let config = RatesConfig::local();
//!     warehouse.create_rate_tables(&config.tables)?;
//!
//!     let source = Asset::new("NGNT", "GAWODAROMJ33V5YDFY3NPYTHVYQG7MJXVJ2ND3AOGIHYRWINES6ACCPD")?;
//!     let dest = Asset::new("EURT", "GAP5LETOV6YIE62YAM56STDANPRDO7ZFDBGSNHJQIYGGKSMOZAHOOS2S")?;
//!     let rates = run_rate_query(
//!         source,
//!         dest,
//!         "1600000000",
//!         "1600086400",
//!         "day",
//!         &warehouse,
//!         &config,
//!     )?;
//!     for rate in rates {
//!         println!("{} {:?}", rate.title, rate.rate);
//!     }
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod dialect;
mod error;
mod executor;
mod local;
mod pool;
pub mod queries;
mod rates;
mod statement;

pub use client::{BufferedCursor, RowCursor, WarehouseClient, WarehouseRow};
pub use config::{RatesConfig, WarehouseTables, DEFAULT_ROW_LIMIT, ROW_LIMIT_ENV};
pub use dialect::SqlDialect;
pub use error::{DecodeError, RateError, WarehouseError};
pub use executor::{collect_rates, execute, RateRows};
pub use local::{DuckDbConfig, DuckDbWarehouse, QueryGuardrails, HOME_ENV};
pub use pool::{ConnectionPool, PooledConnection};
pub use rates::{
    compute_orderbook_rates, compute_rates, compute_trade_rates, run_rate_query, RateMethod,
};
pub use statement::{ParamValue, QueryParam, Statement};
