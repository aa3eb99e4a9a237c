//! Analysis routes
//!
//! - `GET /api/facebook_subscription_analysis?start=&end=`: lead-ad
//!   attribution of starter, premium and elite subscriptions

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use metricdeck_core::Report;
use serde::Serialize;
use tracing::info;

use super::params::{range_or_default, ApiQuery, RawParams};
use super::AppState;
use crate::error::Result;

/// Report body with a `status` marker ahead of its sections.
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub report: Report,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/facebook_subscription_analysis", get(subscription_analysis))
}

async fn subscription_analysis(
    State(ctx): State<AppState>,
    ApiQuery(params): ApiQuery<RawParams>,
) -> Result<Json<AnalysisResponse>> {
    let range = range_or_default(&params)?;
    info!(range = %range, "Subscription attribution requested");
    let report = ctx.service.run_report(&ctx.subscription_analysis, &range).await?;
    Ok(Json(AnalysisResponse { status: "success", report }))
}
