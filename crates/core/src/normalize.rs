//! Row normalization.
//!
//! Turns the raw rows of a summary query into a [`MetricResult`] according to
//! the metric's [`ValueFormat`], then applies the metric's thresholds.

use metricdeck_domain::{MetricConfig, MetricResult, MetricStatus, Row, Threshold, ValueFormat};
use serde_json::Value;

/// Columns that may carry the count behind a rate.
pub const NUMERATOR_COLUMNS: &[&str] = &[
    "numerator",
    "dormant_users",
    "activated_users",
    "canceled_subscriptions",
    "recovered",
    "conversions",
    "total_leads",
];

/// Columns that may carry the population behind a rate.
pub const DENOMINATOR_COLUMNS: &[&str] = &["denominator", "total_users", "total_cancels", "failed"];

/// Normalize summary rows for `config`.
pub fn normalize(config: &MetricConfig, rows: Vec<Row>) -> MetricResult {
    let result = if config.value_format.is_tabular() {
        normalize_tabular(config, rows)
    } else {
        normalize_scalar(config, rows)
    };
    apply_thresholds(result, &config.thresholds)
}

fn normalize_tabular(config: &MetricConfig, rows: Vec<Row>) -> MetricResult {
    if rows.is_empty() {
        return MetricResult {
            data: Some(Vec::new()),
            ..MetricResult::missing(format!("No data available for {}", config.title))
        };
    }
    MetricResult::rows(rows).with_message(config.description.clone())
}

fn normalize_scalar(config: &MetricConfig, rows: Vec<Row>) -> MetricResult {
    let Some(row) = rows.first() else {
        return MetricResult::error(format!("Query returned no rows for {}", config.title));
    };

    let value = first_numeric(row, config.value_format.value_columns());
    let numerator = first_numeric(row, NUMERATOR_COLUMNS);
    let denominator = first_numeric(row, DENOMINATOR_COLUMNS);

    if denominator == Some(0.0) {
        let mut partial = MetricResult::missing("No qualifying records in range")
            .with_counts(numerator, denominator);
        partial.status = MetricStatus::Partial;
        partial.value = value;
        return partial;
    }

    let Some(value) = value else {
        return MetricResult::missing(format!("No data available for {}", config.title))
            .with_counts(numerator, denominator);
    };

    let message = ok_message(config.value_format, value, numerator, denominator);
    MetricResult::ok(value).with_counts(numerator, denominator).with_message(message)
}

fn ok_message(
    format: ValueFormat,
    value: f64,
    numerator: Option<f64>,
    denominator: Option<f64>,
) -> String {
    match format {
        ValueFormat::Percentage => match (numerator, denominator) {
            (Some(num), Some(den)) if den > 0.0 => format!(
                "{} out of {} users ({:.1}%)",
                group_thousands(num),
                group_thousands(den),
                value * 100.0
            ),
            _ => format!("{:.1}% rate", value * 100.0),
        },
        ValueFormat::Count => format!("{} total", group_thousands(value)),
        ValueFormat::Ratio => format!("{value:.2} ratio"),
        ValueFormat::Currency => format!("${value:.2}"),
        ValueFormat::List | ValueFormat::Pareto => String::new(),
    }
}

/// First matching threshold replaces status and message of an `ok` result.
pub fn apply_thresholds(mut result: MetricResult, thresholds: &[Threshold]) -> MetricResult {
    if result.status != MetricStatus::Ok {
        return result;
    }
    let Some(value) = result.value else {
        return result;
    };
    if let Some(band) = Threshold::first_match(thresholds, value) {
        result.status = band.status;
        result.message = Some(band.message.clone());
    }
    result
}

/// Case-insensitive column lookup.
pub fn find_column<'a>(row: &'a Row, name: &str) -> Option<&'a Value> {
    row.get(name).or_else(|| {
        row.iter()
            .find(|(column, _)| column.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    })
}

/// Numeric view of a JSON value; numeric strings are accepted.
pub fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|parsed| parsed.is_finite()),
        _ => None,
    }
}

fn first_numeric(row: &Row, columns: &[&str]) -> Option<f64> {
    columns.iter().find_map(|column| find_column(row, column).and_then(numeric))
}

/// Round to an integer and insert `,` every three digits.
fn group_thousands(value: f64) -> String {
    let rounded = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(rounded.len() + rounded.len() / 3);
    for (position, digit) in rounded.chars().enumerate() {
        if position > 0 && (rounded.len() - position) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    if value < 0.0 && rounded != "0" {
        grouped.insert(0, '-');
    }
    grouped
}

#[cfg(test)]
mod tests {
    use metricdeck_domain::{Category, DateRange, QueryText};
    use serde_json::json;

    use super::*;

    fn summary(_: &DateRange) -> QueryText {
        QueryText::new("SELECT 1")
    }

    fn config(format: ValueFormat) -> MetricConfig {
        MetricConfig::new("metric", "Metric", Category::Finance, format, summary)
            .with_description("Top offenders")
    }

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn percentage_rate_is_ok() {
        let rows = vec![row(json!({ "rate": 0.23 }))];
        let result = normalize(&config(ValueFormat::Percentage), rows);
        assert_eq!(result.status, MetricStatus::Ok);
        assert_eq!(result.value, Some(0.23));
        assert_eq!(result.message.as_deref(), Some("23.0% rate"));
    }

    #[test]
    fn percentage_with_counts_describes_fraction() {
        let rows = vec![row(json!({
            "DORMANT_USERS": "1200",
            "TOTAL_USERS": "4800",
            "DORMANT_RATE": "0.25",
        }))];
        let result = normalize(&config(ValueFormat::Percentage), rows);
        assert_eq!(result.status, MetricStatus::Ok);
        assert_eq!(result.value, Some(0.25));
        assert_eq!(result.numerator, Some(1200.0));
        assert_eq!(result.denominator, Some(4800.0));
        assert_eq!(result.message.as_deref(), Some("1,200 out of 4,800 users (25.0%)"));
    }

    #[test]
    fn row_without_accepted_column_is_missing() {
        let result = normalize(&config(ValueFormat::Percentage), vec![Row::new()]);
        assert_eq!(result.status, MetricStatus::Missing);
        assert_eq!(result.value, None);
        assert_eq!(result.message.as_deref(), Some("No data available for Metric"));

        let nulls = normalize(&config(ValueFormat::Count), vec![row(json!({ "total": null }))]);
        assert_eq!(nulls.status, MetricStatus::Missing);
    }

    #[test]
    fn empty_scalar_result_is_error() {
        let result = normalize(&config(ValueFormat::Currency), Vec::new());
        assert_eq!(result.status, MetricStatus::Error);
        assert_eq!(result.message.as_deref(), Some("Query returned no rows for Metric"));
    }

    #[test]
    fn zero_denominator_is_partial() {
        let rows = vec![row(json!({ "recovered": 0, "failed": 0, "dunning_recovery_rate": null }))];
        let result = normalize(&config(ValueFormat::Percentage), rows);
        assert_eq!(result.status, MetricStatus::Partial);
        assert_eq!(result.value, None);
        assert_eq!(result.denominator, Some(0.0));
        assert_eq!(result.message.as_deref(), Some("No qualifying records in range"));
    }

    #[test]
    fn count_and_currency_messages() {
        let count =
            normalize(&config(ValueFormat::Count), vec![row(json!({ "TOTAL_LEADS": 1234567 }))]);
        assert_eq!(count.value, Some(1_234_567.0));
        assert_eq!(count.message.as_deref(), Some("1,234,567 total"));

        let spend = normalize(&config(ValueFormat::Currency), vec![row(json!({ "spend": 99.5 }))]);
        assert_eq!(spend.message.as_deref(), Some("$99.50"));

        let ratio = normalize(&config(ValueFormat::Ratio), vec![row(json!({ "value": "3.456" }))]);
        assert_eq!(ratio.message.as_deref(), Some("3.46 ratio"));
    }

    #[test]
    fn tabular_formats_keep_rows() {
        let rows = vec![
            row(json!({ "platform": "ios", "users": 10 })),
            row(json!({ "platform": "web", "users": 4 })),
        ];
        let result = normalize(&config(ValueFormat::List), rows.clone());
        assert_eq!(result.status, MetricStatus::Ok);
        assert_eq!(result.value, None);
        assert_eq!(result.data, Some(rows));
        assert_eq!(result.message.as_deref(), Some("Top offenders"));

        let empty = normalize(&config(ValueFormat::Pareto), Vec::new());
        assert_eq!(empty.status, MetricStatus::Missing);
        assert_eq!(empty.data, Some(Vec::new()));
    }

    #[test]
    fn thresholds_apply_to_ok_values_only() {
        let bands = config(ValueFormat::Ratio)
            .with_threshold(Threshold::below(2.0, MetricStatus::Error, "Overspending"))
            .with_threshold(Threshold::below(3.0, MetricStatus::Warning, "Slightly Overspending"));

        let low = normalize(&bands, vec![row(json!({ "cac_to_ltv_ratio": 1.5 }))]);
        assert_eq!(low.status, MetricStatus::Error);
        assert_eq!(low.message.as_deref(), Some("Overspending"));
        assert_eq!(low.value, Some(1.5));

        let healthy = normalize(&bands, vec![row(json!({ "cac_to_ltv_ratio": 3.5 }))]);
        assert_eq!(healthy.status, MetricStatus::Ok);

        let missing = normalize(&bands, vec![Row::new()]);
        assert_eq!(missing.status, MetricStatus::Missing);
    }

    #[test]
    fn numeric_coercion() {
        assert_eq!(numeric(&json!(4)), Some(4.0));
        assert_eq!(numeric(&json!(" 0.5 ")), Some(0.5));
        assert_eq!(numeric(&json!("n/a")), None);
        assert_eq!(numeric(&json!(true)), None);
        assert_eq!(numeric(&Value::Null), None);
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.4), "999");
        assert_eq!(group_thousands(1000.0), "1,000");
        assert_eq!(group_thousands(-12345.0), "-12,345");
    }
}
