//! Helpers for writing query providers.
//!
//! Providers are plain `fn` items: given a [`DateRange`] (and, for details
//! queries, [`ExtraParams`]) they return SQL text. They perform no I/O and
//! must cover every calendar day of the range, end day included.
//!
//! Most SQL the catalog needs is portable between the warehouses. The few
//! constructs that are not go through a [`Dialect`]; providers that use them
//! are generic over it and monomorphized per backend.

use chrono::NaiveDate;
use metricdeck_domain::{impl_domain_status_conversions, DateRange, ExtraParams};

/// SQL flavour spoken by a warehouse gateway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SqlDialect {
    #[default]
    Snowflake,
    Sqlite,
}

impl_domain_status_conversions!(SqlDialect {
    Snowflake => "snowflake",
    Sqlite => "sqlite",
});

/// Backend-specific SQL fragments.
pub trait Dialect {
    const KIND: SqlDialect;

    /// `column` lies within `hours` hours of `start` (both inclusive).
    fn within_hours_after(column: &str, start: &str, hours: u32) -> String;
}

/// Snowflake SQL.
#[derive(Debug, Clone, Copy)]
pub struct SnowflakeSql;

/// SQLite SQL; timestamps are ISO 8601 text.
#[derive(Debug, Clone, Copy)]
pub struct SqliteSql;

impl Dialect for SnowflakeSql {
    const KIND: SqlDialect = SqlDialect::Snowflake;

    fn within_hours_after(column: &str, start: &str, hours: u32) -> String {
        format!("{column} BETWEEN {start} AND DATEADD(hour, {hours}, {start})")
    }
}

impl Dialect for SqliteSql {
    const KIND: SqlDialect = SqlDialect::Sqlite;

    fn within_hours_after(column: &str, start: &str, hours: u32) -> String {
        format!(
            "datetime({column}) BETWEEN datetime({start}) AND datetime({start}, '+{hours} hours')"
        )
    }
}

/// `'YYYY-MM-DD'` SQL literal.
pub fn date_literal(date: NaiveDate) -> String {
    format!("'{}'", date.format("%Y-%m-%d"))
}

/// `column >= 'start' AND column < 'end + 1 day'`
///
/// Half-open on the day after `end` so timestamp columns keep the whole end
/// day; date columns behave exactly like an inclusive `<= end`.
pub fn inclusive_range(column: &str, range: &DateRange) -> String {
    let start = date_literal(range.start);
    match range.end_exclusive() {
        Some(next) => format!("{column} >= {start} AND {column} < {}", date_literal(next)),
        None => format!("{column} >= {start}"),
    }
}

/// Quote `value` as a SQL string literal, doubling embedded single quotes.
pub fn sql_string(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Read a boolean filter parameter.
///
/// Only `true`/`false` (any case) are recognised; absent or unrecognised
/// values yield `None` so the query stays unfiltered.
pub fn flag_param(params: &ExtraParams, name: &str) -> Option<bool> {
    let raw = params.get(name)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
