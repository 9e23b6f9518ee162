use rateline_core::AggregateBy;

use crate::SqlDialect;

/// `SELECT` expression labelling each row with its bucket, aliased `title`.
///
/// Ledger buckets read `Ledger <sequence>`; day buckets are the UTC calendar
/// day of the close time as `YYYY-MM-DD`. Both sort and group by the alias.
pub fn title_field(
    sequence_column: &str,
    closed_at_column: &str,
    aggregate_by: AggregateBy,
    dialect: SqlDialect,
) -> String {
    match (aggregate_by, dialect) {
        (AggregateBy::Ledger, SqlDialect::BigQuery) => {
            format!(r#"FORMAT("Ledger %d", {sequence_column}) AS title"#)
        }
        (AggregateBy::Ledger, SqlDialect::DuckDb) => {
            format!("'Ledger ' || CAST({sequence_column} AS VARCHAR) AS title")
        }
        (AggregateBy::Day, SqlDialect::BigQuery) => format!(
            r#"FORMAT_TIMESTAMP("%Y-%m-%d", TIMESTAMP_TRUNC({closed_at_column}, DAY, "UTC"), "UTC") AS title"#
        ),
        // Close times are stored as UTC `TIMESTAMP`s locally.
        (AggregateBy::Day, SqlDialect::DuckDb) => format!(
            "strftime(date_trunc('day', {closed_at_column}), '%Y-%m-%d') AS title"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_title_uses_sequence_column() {
        assert_eq!(
            title_field("L.sequence", "L.closed_at", AggregateBy::Ledger, SqlDialect::BigQuery),
            r#"FORMAT("Ledger %d", L.sequence) AS title"#
        );
        assert_eq!(
            title_field("E.ledger_id", "L.closed_at", AggregateBy::Ledger, SqlDialect::DuckDb),
            "'Ledger ' || CAST(E.ledger_id AS VARCHAR) AS title"
        );
    }

    #[test]
    fn day_title_truncates_close_time_in_utc() {
        let field = title_field("E.ledger_id", "L.closed_at", AggregateBy::Day, SqlDialect::BigQuery);
        assert_eq!(
            field,
            r#"FORMAT_TIMESTAMP("%Y-%m-%d", TIMESTAMP_TRUNC(L.closed_at, DAY, "UTC"), "UTC") AS title"#
        );
        assert!(!field.contains("E.ledger_id"));

        assert_eq!(
            title_field("E.ledger_id", "L.closed_at", AggregateBy::Day, SqlDialect::DuckDb),
            "strftime(date_trunc('day', L.closed_at), '%Y-%m-%d') AS title"
        );
    }
}
