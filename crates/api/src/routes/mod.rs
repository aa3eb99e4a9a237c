//! API routes
//!
//! Dashboard computation, analysis reports, catalog introspection and health
//! endpoints, all under `/api`.

pub mod analysis;
pub mod catalog;
pub mod dashboard;
pub mod health;
mod params;

use std::sync::Arc;

use axum::http::Uri;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;
use crate::error::ApiError;

/// Shared router state
pub type AppState = Arc<AppContext>;

/// Build the complete API router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(dashboard::routes())
        .merge(analysis::routes())
        .merge(catalog::routes())
        .merge(health::routes())
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::RouteNotFound(uri.path().to_string())
}
