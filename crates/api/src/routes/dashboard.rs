//! Dashboard routes
//!
//! - `GET /api/dashboard_metrics?start=&end=`: every registered metric
//! - `GET /api/dashboard_metrics/{key}?start=&end=`: one metric
//! - `GET /api/dashboard_metric_rows?metric=&start=&end=&...`: drill-down rows

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use metricdeck_core::MetricBatch;
use metricdeck_domain::{MetricResult, Row};
use serde::Serialize;
use tracing::info;

use super::params::{
    extra_params, range_or_default, required, required_range, ApiQuery, RawParams,
};
use super::AppState;
use crate::error::Result;

/// Drill-down response body
#[derive(Debug, Serialize)]
pub struct RowsResponse {
    pub rows: Vec<Row>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/dashboard_metrics", get(all_metrics))
        .route("/api/dashboard_metrics/{key}", get(single_metric))
        .route("/api/dashboard_metric_rows", get(metric_rows))
}

async fn all_metrics(
    State(ctx): State<AppState>,
    ApiQuery(params): ApiQuery<RawParams>,
) -> Result<Json<MetricBatch>> {
    let range = range_or_default(&params)?;
    info!(range = %range, "Dashboard metrics requested");
    Ok(Json(ctx.service.compute_all(&range).await))
}

async fn single_metric(
    State(ctx): State<AppState>,
    Path(key): Path<String>,
    ApiQuery(params): ApiQuery<RawParams>,
) -> Result<Json<MetricResult>> {
    let range = range_or_default(&params)?;
    Ok(Json(ctx.service.compute_metric(&key, &range).await?))
}

async fn metric_rows(
    State(ctx): State<AppState>,
    ApiQuery(params): ApiQuery<RawParams>,
) -> Result<Json<RowsResponse>> {
    let key = required(&params, "metric")?;
    let range = required_range(&params)?;
    let rows = ctx.service.compute_details(key, &range, &extra_params(&params)).await?;
    Ok(Json(RowsResponse { rows }))
}
