//! Shared test helpers for `metricdeck-core` integration tests.
//!
//! Scripted in-memory gateways and metric fixtures so service tests can
//! focus on behaviour instead of warehouse plumbing.

#![allow(dead_code)]

pub mod gateways;

use metricdeck_domain::{
    Category, DateRange, ExtraParams, MetricConfig, QueryText, Row, ValueFormat,
};

/// Build a row from a JSON object literal.
pub fn row(value: serde_json::Value) -> Row {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

pub fn january() -> DateRange {
    DateRange::parse("2025-01-01", "2025-01-31").expect("valid range")
}

pub fn churn_summary(range: &DateRange) -> QueryText {
    QueryText::new(format!(
        "SELECT 'churn' AS marker, 0.23 AS rate WHERE d >= '{}' AND d <= '{}'",
        range.start_iso(),
        range.end_iso()
    ))
}

pub fn leads_summary(range: &DateRange) -> QueryText {
    QueryText::new(format!(
        "SELECT 'leads' AS marker WHERE d >= '{}' AND d <= '{}'",
        range.start_iso(),
        range.end_iso()
    ))
}

pub fn ratio_summary(_range: &DateRange) -> QueryText {
    QueryText::new("SELECT 'ratio' AS marker")
}

pub fn churn_details(range: &DateRange, params: &ExtraParams) -> QueryText {
    let filter = metricdeck_core::query::flag_param(params, "dormant")
        .map(|flag| format!(" AND dormant = {flag}"))
        .unwrap_or_default();
    QueryText::new(format!(
        "SELECT 'churn_details' AS marker WHERE {}{filter}",
        metricdeck_core::query::inclusive_range("d", range)
    ))
}

pub fn churn_metric() -> MetricConfig {
    MetricConfig::new(
        "churn_rate",
        "Churn Rate",
        Category::Finance,
        ValueFormat::Percentage,
        churn_summary,
    )
    .with_details(churn_details)
    .with_param_option("dormant", ["true", "false"])
}

pub fn leads_metric() -> MetricConfig {
    MetricConfig::new(
        "lead_total",
        "Lead Total",
        Category::Marketing,
        ValueFormat::Count,
        leads_summary,
    )
}

pub fn ratio_metric() -> MetricConfig {
    use metricdeck_domain::{MetricStatus, Threshold};

    MetricConfig::new(
        "cac_ratio",
        "CAC Ratio",
        Category::Marketing,
        ValueFormat::Ratio,
        ratio_summary,
    )
        .with_threshold(Threshold::below(2.0, MetricStatus::Error, "Overspending"))
        .with_threshold(Threshold::below(3.0, MetricStatus::Warning, "Slightly Overspending"))
        .with_threshold(Threshold::above(5.0, MetricStatus::Error, "Underspending"))
        .with_threshold(Threshold::above(4.0, MetricStatus::Warning, "Slightly Underspending"))
}
