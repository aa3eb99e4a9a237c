//! Application context - dependency injection container

use std::sync::Arc;

use metricdeck_core::{MetricRegistry, MetricsService, ReportQueries, WarehouseGateway};
use metricdeck_domain::{Config, Result};
use metricdeck_infra::{builtin_registry, connect, facebook_subscription_analysis};
use tracing::info;

/// Application context - holds the shared services behind every route
pub struct AppContext {
    pub service: MetricsService,
    /// Queries behind `/api/facebook_subscription_analysis`
    pub subscription_analysis: ReportQueries,
}

impl AppContext {
    /// Wire the built-in catalog to the warehouse selected by `config`.
    ///
    /// # Errors
    /// Returns an error if the gateway cannot be constructed or the catalog
    /// holds duplicate keys.
    pub fn new(config: &Config) -> Result<Self> {
        let gateway = connect(&config.warehouse)?;
        let registry = builtin_registry(gateway.dialect())?;
        info!(
            metrics = registry.len(),
            backend = gateway.backend(),
            dialect = %gateway.dialect(),
            "Application context initialized"
        );
        Ok(Self::from_parts(Arc::new(registry), gateway))
    }

    /// Build a context around an existing registry and gateway.
    pub fn from_parts(registry: Arc<MetricRegistry>, gateway: Arc<dyn WarehouseGateway>) -> Self {
        Self {
            service: MetricsService::new(registry, gateway),
            subscription_analysis: facebook_subscription_analysis(),
        }
    }

    pub fn registry(&self) -> &MetricRegistry {
        self.service.registry()
    }
}
