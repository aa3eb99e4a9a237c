//! Shared fixtures for router tests: a canned gateway and a small catalog.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use metricdeck_api::{build_router, AppContext};
use metricdeck_core::query::{flag_param, inclusive_range};
use metricdeck_core::{MetricRegistry, WarehouseGateway};
use metricdeck_domain::{
    Category, DashboardError, DateRange, ExtraParams, MetricConfig, QueryText, Result, Row,
    ValueFormat,
};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Answers summary and report queries by marker and echoes details queries
/// back as a single `{ "sql": ... }` row.
#[derive(Default)]
pub struct CannedGateway {
    calls: AtomicUsize,
}

impl CannedGateway {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn rows(value: Value) -> Vec<Row> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[async_trait]
impl WarehouseGateway for CannedGateway {
    async fn execute(&self, query: &QueryText) -> Result<Vec<Row>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let sql = query.as_str();
        if sql.contains("-- details") {
            return Ok(rows(json!([{ "sql": sql }])));
        }
        if sql.contains("'signups'") {
            return Ok(rows(json!([{ "numerator": 25, "denominator": 100, "rate": 0.25 }])));
        }
        if sql.contains("'orders'") {
            return Err(DashboardError::Query("SQL compilation error".into()));
        }
        if sql.contains("AS total_subscriptions") {
            return Ok(rows(json!([{
                "total_subscriptions": 4,
                "from_facebook": 1,
                "from_other_sources": 3,
                "facebook_percentage": 25.0
            }])));
        }
        if sql.contains("ORDER BY created DESC") {
            return Ok(rows(json!([
                { "subscription_id": "sub_2", "from_facebook": "Yes" },
                { "subscription_id": "sub_1", "from_facebook": "No" }
            ])));
        }
        if sql.contains("'pages'") {
            return Ok(rows(json!([
                { "page": "/pricing", "views": 120 },
                { "page": "/docs", "views": 80 }
            ])));
        }
        Ok(Vec::new())
    }

    fn backend(&self) -> &'static str {
        "canned"
    }
}

fn signup_summary(range: &DateRange) -> QueryText {
    QueryText::new(format!(
        "SELECT 'signups' AS marker, 0.25 AS rate FROM visits WHERE {}",
        inclusive_range("day", range)
    ))
}

fn signup_details(range: &DateRange, params: &ExtraParams) -> QueryText {
    let filter = match flag_param(params, "converted") {
        Some(true) => " AND converted = 1",
        Some(false) => " AND converted = 0",
        None => "",
    };
    QueryText::new(format!(
        "-- details\nSELECT * FROM visits WHERE {}{filter}",
        inclusive_range("day", range)
    ))
}

fn orders_summary(range: &DateRange) -> QueryText {
    QueryText::new(format!(
        "SELECT 'orders' AS marker, COUNT(*) AS total FROM orders WHERE {}",
        inclusive_range("placed", range)
    ))
}

fn pages_summary(range: &DateRange) -> QueryText {
    QueryText::new(format!(
        "SELECT 'pages' AS marker, page, views FROM page_views WHERE {}",
        inclusive_range("day", range)
    ))
}

pub fn registry() -> MetricRegistry {
    MetricRegistry::from_configs([
        MetricConfig::new(
            "signup_rate",
            "Signup Rate",
            Category::Marketing,
            ValueFormat::Percentage,
            signup_summary,
        )
        .with_description("Visitors who signed up")
        .with_details(signup_details)
        .with_param_option("converted", ["true", "false"]),
        MetricConfig::new(
            "orders_total",
            "Orders Total",
            Category::Finance,
            ValueFormat::Count,
            orders_summary,
        ),
        MetricConfig::new(
            "top_pages",
            "Top Pages",
            Category::ProductIt,
            ValueFormat::List,
            pages_summary,
        )
        .with_description("Most viewed pages"),
    ])
    .expect("fixture keys are unique")
}

pub struct TestApp {
    pub router: Router,
    pub gateway: Arc<CannedGateway>,
}

pub fn app() -> TestApp {
    let gateway = Arc::new(CannedGateway::default());
    let ctx = AppContext::from_parts(Arc::new(registry()), gateway.clone());
    TestApp { router: build_router(Arc::new(ctx)), gateway }
}

/// Issue a GET and return the raw body text.
pub async fn get_text(router: &Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("valid request"))
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body is readable");
    (status, String::from_utf8(bytes.to_vec()).expect("body is UTF-8"))
}

/// Issue a GET and decode the JSON body.
pub async fn get(router: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, text) = get_text(router, uri).await;
    (status, serde_json::from_str(&text).unwrap_or(Value::Null))
}

/// Assert that top-level `keys` appear in `json` text in the given order.
///
/// `serde_json::Value` sorts object keys, so order is checked on the text.
pub fn assert_key_order(json: &str, keys: &[&str]) {
    let positions: Vec<usize> = keys
        .iter()
        .map(|key| {
            json.find(&format!("\"{key}\":"))
                .unwrap_or_else(|| panic!("key {key} missing from {json}"))
        })
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "keys out of order: {json}");
}
