//! Embedded `DuckDB` warehouse.
//!
//! Holds a local copy of the rate tables in the layout of
//! [`WarehouseTables`] and answers the DuckDB dialect of both rate queries.
//! Submitted statements must be a single SELECT/WITH query; seeding goes
//! through [`DuckDbWarehouse::execute_batch`].

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use ::duckdb::types::{ToSqlOutput, Value as DuckValue};
use ::duckdb::{Row, Rows, ToSql};
use serde_json::{Number, Value};
use tracing::{debug, warn};

use crate::config::is_table_identifier;
use crate::pool::ConnectionPool;
use crate::{
    BufferedCursor, ParamValue, RowCursor, SqlDialect, Statement, WarehouseClient,
    WarehouseError, WarehouseRow, WarehouseTables,
};

/// Environment variable pointing at the rateline data directory.
pub const HOME_ENV: &str = "RATELINE_HOME";

/// Limits applied to every submitted statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryGuardrails {
    /// Rows beyond this count are dropped with a warning.
    pub max_rows: usize,
    pub query_timeout_ms: u64,
}

impl Default for QueryGuardrails {
    fn default() -> Self {
        Self {
            max_rows: 10_000,
            query_timeout_ms: 5_000,
        }
    }
}

impl QueryGuardrails {
    pub fn validate(self) -> Result<(), WarehouseError> {
        match (self.max_rows, self.query_timeout_ms) {
            (0, _) => Err(rejected("max_rows must be greater than zero")),
            (_, 0) => Err(rejected("query_timeout_ms must be greater than zero")),
            _ => Ok(()),
        }
    }
}

/// Location and limits of the local warehouse.
#[derive(Debug, Clone)]
pub struct DuckDbConfig {
    pub db_path: PathBuf,
    /// Idle connections kept for reuse.
    pub max_pool_size: usize,
    pub guardrails: QueryGuardrails,
}

impl Default for DuckDbConfig {
    /// `$RATELINE_HOME/warehouse.duckdb`, falling back to `~/.rateline`.
    fn default() -> Self {
        Self {
            db_path: rateline_home().join("warehouse.duckdb"),
            max_pool_size: 4,
            guardrails: QueryGuardrails::default(),
        }
    }
}

/// Local warehouse backed by a `DuckDB` file.
#[derive(Clone)]
pub struct DuckDbWarehouse {
    guardrails: QueryGuardrails,
    pool: ConnectionPool,
}

impl DuckDbWarehouse {
    pub fn open_default() -> Result<Self, WarehouseError> {
        Self::open(DuckDbConfig::default())
    }

    pub fn open(config: DuckDbConfig) -> Result<Self, WarehouseError> {
        config.guardrails.validate()?;
        if let Some(parent) = config.db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(Self {
            guardrails: config.guardrails,
            pool: ConnectionPool::open(config.db_path, config.max_pool_size)?,
        })
    }

    pub fn db_path(&self) -> &Path {
        self.pool.db_path()
    }

    pub fn guardrails(&self) -> QueryGuardrails {
        self.guardrails
    }

    /// Create any missing table the rate queries read, named per `tables`.
    pub fn create_rate_tables(&self, tables: &WarehouseTables) -> Result<(), WarehouseError> {
        if let Some((field, name)) = tables
            .entries()
            .into_iter()
            .find(|(_, name)| !is_table_identifier(name))
        {
            return Err(WarehouseError::QueryRejected(format!(
                "table '{field}' has an invalid identifier '{name}'"
            )));
        }

        let table = |name: &str| SqlDialect::DuckDb.table(name);
        let ledgers = "(sequence BIGINT, closed_at TIMESTAMP)";
        let ddl = [
            format!(
                "CREATE TABLE IF NOT EXISTS {} (id BIGINT, asset_code VARCHAR, asset_issuer VARCHAR);",
                table(&tables.assets)
            ),
            format!("CREATE TABLE IF NOT EXISTS {} {ledgers};", table(&tables.ledgers)),
            format!(
                "CREATE TABLE IF NOT EXISTS {} {ledgers};",
                table(&tables.orderbook_ledgers)
            ),
            format!(
                "CREATE TABLE IF NOT EXISTS {} (ledger_closed_at TIMESTAMP, base_asset_id BIGINT, \
                 counter_asset_id BIGINT, base_amount DOUBLE, counter_amount DOUBLE);",
                table(&tables.trades)
            ),
            format!(
                "CREATE TABLE IF NOT EXISTS {} (market_id BIGINT, base_code VARCHAR, base_issuer VARCHAR, \
                 counter_code VARCHAR, counter_issuer VARCHAR);",
                table(&tables.markets)
            ),
            format!(
                "CREATE TABLE IF NOT EXISTS {} (dim_offer_id BIGINT, market_id BIGINT, action VARCHAR, price DOUBLE);",
                table(&tables.offers)
            ),
            format!(
                "CREATE TABLE IF NOT EXISTS {} (offer_instance_id BIGINT, ledger_id BIGINT);",
                table(&tables.offer_events)
            ),
        ]
        .join("\n");

        self.execute_batch(&ddl)
    }

    /// Run write statements such as schema setup or seeding.
    pub fn execute_batch(&self, sql: &str) -> Result<(), WarehouseError> {
        if sql.trim().is_empty() {
            return Err(rejected("batch must not be empty"));
        }
        self.pool.acquire()?.execute_batch(sql)?;
        Ok(())
    }

    fn fetch_rows(&self, statement: &Statement) -> Result<Vec<WarehouseRow>, WarehouseError> {
        let deadline = Deadline::start(self.guardrails);
        let (sql, values) = statement.positional();
        let sql = read_only_query(&sql)?;
        let params: Vec<&dyn ToSql> = values.iter().map(|value| *value as &dyn ToSql).collect();

        let connection = self.pool.acquire()?;
        let mut prepared = connection.prepare(sql)?;
        let mut rows = prepared.query(params.as_slice())?;
        let columns = column_names(&rows)?;

        let mut output = Vec::new();
        while let Some(row) = rows.next()? {
            deadline.check()?;
            if output.len() == self.guardrails.max_rows {
                warn!(
                    max_rows = self.guardrails.max_rows,
                    "local query truncated at row cap"
                );
                break;
            }
            output.push(decode_row(row, &columns)?);
        }
        deadline.check()?;

        debug!(
            rows = output.len(),
            elapsed_ms = deadline.elapsed_ms(),
            "local warehouse query finished"
        );
        Ok(output)
    }
}

impl WarehouseClient for DuckDbWarehouse {
    fn submit(&self, statement: &Statement) -> Result<Box<dyn RowCursor + '_>, WarehouseError> {
        let rows = self.fetch_rows(statement)?;
        Ok(Box::new(BufferedCursor::new(rows)))
    }

    fn dialect(&self) -> SqlDialect {
        SqlDialect::DuckDb
    }
}

impl ToSql for ParamValue {
    fn to_sql(&self) -> ::duckdb::Result<ToSqlOutput<'_>> {
        match self {
            Self::Text(value) => value.to_sql(),
            Self::Int(value) => value.to_sql(),
        }
    }
}

/// Time budget for one statement, checked between rows.
struct Deadline {
    started: Instant,
    budget: Duration,
    timeout_ms: u64,
}

impl Deadline {
    fn start(guardrails: QueryGuardrails) -> Self {
        Self {
            started: Instant::now(),
            budget: Duration::from_millis(guardrails.query_timeout_ms),
            timeout_ms: guardrails.query_timeout_ms,
        }
    }

    fn check(&self) -> Result<(), WarehouseError> {
        if self.started.elapsed() > self.budget {
            return Err(WarehouseError::QueryTimeout {
                timeout_ms: self.timeout_ms,
            });
        }
        Ok(())
    }

    fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }
}

fn rejected(reason: &str) -> WarehouseError {
    WarehouseError::QueryRejected(String::from(reason))
}

/// The statement trimmed of trailing semicolons, if it is one SELECT/WITH query.
fn read_only_query(sql: &str) -> Result<&str, WarehouseError> {
    let sql = sql.trim().trim_end_matches(';').trim_end();
    let keyword = sql.split_whitespace().next().unwrap_or_default();
    if !(keyword.eq_ignore_ascii_case("select") || keyword.eq_ignore_ascii_case("with")) {
        return Err(rejected("only SELECT and WITH queries can be submitted"));
    }
    if has_statement_separator(sql) {
        return Err(rejected("multiple SQL statements are not allowed"));
    }
    Ok(sql)
}

/// `;` outside quoted text.
fn has_statement_separator(sql: &str) -> bool {
    let mut quote = None;
    for ch in sql.chars() {
        match quote {
            Some(open) if ch == open => quote = None,
            Some(_) => {}
            None if matches!(ch, '\'' | '"') => quote = Some(ch),
            None if ch == ';' => return true,
            None => {}
        }
    }
    false
}

fn column_names(rows: &Rows<'_>) -> Result<Vec<String>, ::duckdb::Error> {
    let Some(statement) = rows.as_ref() else {
        return Ok(Vec::new());
    };
    (0..statement.column_count())
        .map(|index| statement.column_name(index).map(|name| name.to_string()))
        .collect()
}

fn decode_row(row: &Row<'_>, columns: &[String]) -> Result<WarehouseRow, ::duckdb::Error> {
    columns
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let value: DuckValue = row.get(index)?;
            Ok::<_, ::duckdb::Error>((name.clone(), column_value(value)))
        })
        .collect()
}

/// JSON form of a column value as [`RateResult`](rateline_core::RateResult)
/// decoding expects it: text titles, numeric or NULL rates.
fn column_value(value: DuckValue) -> Value {
    match value {
        DuckValue::Null => Value::Null,
        DuckValue::Boolean(flag) => Value::Bool(flag),
        DuckValue::Text(text) => Value::String(text),
        DuckValue::Blob(bytes) => Value::String(hex::encode(bytes)),
        other => {
            if let Some(number) = integer(&other) {
                Value::Number(number)
            } else if let Some(float) = floating(&other) {
                // NaN and infinities decode as a NULL rate.
                Number::from_f64(float).map_or(Value::Null, Value::Number)
            } else {
                Value::String(format!("{other:?}"))
            }
        }
    }
}

fn integer(value: &DuckValue) -> Option<Number> {
    let number = match *value {
        DuckValue::TinyInt(v) => Number::from(v),
        DuckValue::SmallInt(v) => Number::from(v),
        DuckValue::Int(v) => Number::from(v),
        DuckValue::BigInt(v) => Number::from(v),
        DuckValue::HugeInt(v) => Number::from(i64::try_from(v).ok()?),
        DuckValue::UTinyInt(v) => Number::from(v),
        DuckValue::USmallInt(v) => Number::from(v),
        DuckValue::UInt(v) => Number::from(v),
        DuckValue::UBigInt(v) => Number::from(v),
        _ => return None,
    };
    Some(number)
}

fn floating(value: &DuckValue) -> Option<f64> {
    match value {
        DuckValue::Float(v) => Some(f64::from(*v)),
        DuckValue::Double(v) => Some(*v),
        DuckValue::HugeInt(v) => Some(*v as f64),
        DuckValue::Decimal(v) => v.to_string().parse().ok(),
        _ => None,
    }
}

fn rateline_home() -> PathBuf {
    match env::var_os(HOME_ENV) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(".rateline"))
            .unwrap_or_else(|| PathBuf::from(".rateline")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect_rates;
    use rateline_core::RateResult;
    use tempfile::tempdir;

    fn open_warehouse(dir: &Path, guardrails: QueryGuardrails) -> DuckDbWarehouse {
        DuckDbWarehouse::open(DuckDbConfig {
            db_path: dir.join("local").join("warehouse.duckdb"),
            max_pool_size: 2,
            guardrails,
        })
        .expect("warehouse open")
    }

    #[test]
    fn binds_named_parameters_positionally() {
        let temp = tempdir().expect("tempdir");
        let warehouse = open_warehouse(temp.path(), QueryGuardrails::default());

        let statement = Statement::new(
            "SELECT CAST(@title AS VARCHAR) AS title, CAST(@rate_bp AS DOUBLE) / 10000 AS rate",
        )
        .bind("title", "Ledger 9")
        .bind("rate_bp", 2_500_i64);
        let rates = collect_rates(&warehouse, &statement).expect("rates");

        assert_eq!(rates, vec![RateResult::new("Ledger 9", Some(0.25))]);
    }

    #[test]
    fn runs_each_statement_once() {
        let temp = tempdir().expect("tempdir");
        let warehouse = open_warehouse(temp.path(), QueryGuardrails::default());
        warehouse
            .execute_batch("CREATE SEQUENCE submissions START 1;")
            .expect("sequence");

        let statement = Statement::new(
            "SELECT CAST(nextval('submissions') AS VARCHAR) AS title, CAST(NULL AS DOUBLE) AS rate",
        );
        let first = collect_rates(&warehouse, &statement).expect("first");
        let second = collect_rates(&warehouse, &statement).expect("second");

        assert_eq!(first, vec![RateResult::new("1", None)]);
        assert_eq!(second, vec![RateResult::new("2", None)]);
    }

    #[test]
    fn creates_rate_tables_idempotently() {
        let temp = tempdir().expect("tempdir");
        let warehouse = open_warehouse(temp.path(), QueryGuardrails::default());
        let tables = WarehouseTables::local();

        warehouse.create_rate_tables(&tables).expect("create");
        warehouse.create_rate_tables(&tables).expect("create again");

        let rows = warehouse
            .fetch_rows(&Statement::new(
                "SELECT CAST(COUNT(*) AS VARCHAR) AS title FROM duckdb_tables() WHERE NOT internal",
            ))
            .expect("rows");
        assert_eq!(rows[0]["title"], Value::from("6"));
    }

    #[test]
    fn refuses_table_names_outside_identifier_charset() {
        let temp = tempdir().expect("tempdir");
        let warehouse = open_warehouse(temp.path(), QueryGuardrails::default());
        let mut tables = WarehouseTables::local();
        tables.offers = String::from("offers\"; DROP TABLE trades; --");

        let error = warehouse.create_rate_tables(&tables).expect_err("must fail");
        assert!(matches!(error, WarehouseError::QueryRejected(_)));
    }

    #[test]
    fn truncates_at_max_rows() {
        let temp = tempdir().expect("tempdir");
        let warehouse = open_warehouse(
            temp.path(),
            QueryGuardrails {
                max_rows: 3,
                query_timeout_ms: 20_000,
            },
        );

        let rows = warehouse
            .fetch_rows(&Statement::new(
                "SELECT 'Ledger ' || CAST(i AS VARCHAR) AS title, CAST(i AS DOUBLE) AS rate FROM range(10) t(i)",
            ))
            .expect("rows");
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn accepts_only_single_read_queries() {
        assert_eq!(
            read_only_query("  SELECT ';' AS title;  ").expect("select"),
            "SELECT ';' AS title"
        );
        assert!(read_only_query("with t AS (SELECT 1) SELECT * FROM t").is_ok());
        assert!(read_only_query("").is_err());
        assert!(read_only_query("CREATE TABLE t (id INTEGER)").is_err());
        assert!(read_only_query("SELECT 1; DROP TABLE t").is_err());
    }

    #[test]
    fn rejects_zero_guardrails() {
        let zero_rows = QueryGuardrails {
            max_rows: 0,
            query_timeout_ms: 1_000,
        };
        let zero_timeout = QueryGuardrails {
            max_rows: 1,
            query_timeout_ms: 0,
        };
        assert!(zero_rows.validate().is_err());
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn non_finite_and_wide_numbers() {
        assert_eq!(column_value(DuckValue::Double(f64::NAN)), Value::Null);
        assert_eq!(column_value(DuckValue::Double(2.5)), Value::from(2.5));
        assert_eq!(column_value(DuckValue::HugeInt(42)), Value::from(42));
        assert_eq!(
            column_value(DuckValue::HugeInt(i128::from(i64::MAX) * 4)),
            Value::from(i64::MAX as f64 * 4.0)
        );
    }
}
