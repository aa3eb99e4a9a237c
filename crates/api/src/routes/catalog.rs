//! Catalog routes: metric descriptors and categories for the frontend.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use metricdeck_domain::{Category, MetricDescriptor};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::AppState;

/// `key -> descriptor`, serialized in registry order.
#[derive(Debug)]
pub struct MetricsConfigResponse(Vec<(String, MetricDescriptor)>);

impl Serialize for MetricsConfigResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, descriptor) in &self.0 {
            map.serialize_entry(key, descriptor)?;
        }
        map.end()
    }
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<Category>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/metrics/config", get(metrics_config))
        .route("/api/categories", get(categories))
}

async fn metrics_config(State(ctx): State<AppState>) -> Json<MetricsConfigResponse> {
    let descriptors = ctx
        .registry()
        .list_all()
        .iter()
        .map(|config| (config.key.clone(), config.descriptor()))
        .collect();
    Json(MetricsConfigResponse(descriptors))
}

async fn categories(State(ctx): State<AppState>) -> Json<CategoriesResponse> {
    Json(CategoriesResponse { categories: ctx.registry().categories() })
}
