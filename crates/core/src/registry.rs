//! Metric registry - the single source of truth for dashboard metrics.
//!
//! Built once at startup, then shared read-only (`Arc<MetricRegistry>`) with
//! the metrics service and the HTTP layer. Registration order is the order
//! in which metrics are computed, serialized and rendered.

use std::collections::HashMap;

use metricdeck_domain::{Category, DashboardError, MetricConfig, Result};
use tracing::debug;

/// Ordered `key -> MetricConfig` mapping.
#[derive(Debug, Default, Clone)]
pub struct MetricRegistry {
    metrics: Vec<MetricConfig>,
    index: HashMap<String, usize>,
}

impl MetricRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from configs, in the order given.
    ///
    /// # Errors
    /// Returns `DashboardError::DuplicateMetric` on the first repeated key.
    pub fn from_configs(configs: impl IntoIterator<Item = MetricConfig>) -> Result<Self> {
        let mut registry = Self::new();
        for config in configs {
            registry.register(config)?;
        }
        Ok(registry)
    }

    /// Add a metric at the end of the registry.
    ///
    /// Duplicate keys are rejected; the existing entry is left untouched.
    ///
    /// # Errors
    /// Returns `DashboardError::DuplicateMetric` if `config.key` is taken, or
    /// `DashboardError::InvalidInput` for an empty key.
    pub fn register(&mut self, config: MetricConfig) -> Result<()> {
        if config.key.trim().is_empty() {
            return Err(DashboardError::InvalidInput("metric key must not be empty".into()));
        }
        if self.index.contains_key(&config.key) {
            return Err(DashboardError::DuplicateMetric(config.key));
        }

        debug!(metric = %config.key, category = %config.category, "Registered metric");
        self.index.insert(config.key.clone(), self.metrics.len());
        self.metrics.push(config);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&MetricConfig> {
        self.index.get(key).map(|&position| &self.metrics[position])
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// All metrics in registration order.
    pub fn list_all(&self) -> &[MetricConfig] {
        &self.metrics
    }

    /// Metrics in `category`, in registration order.
    pub fn list_by_category(&self, category: Category) -> Vec<&MetricConfig> {
        self.metrics.iter().filter(|config| config.category == category).collect()
    }

    /// Distinct categories in use, sorted by display name.
    pub fn categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = Vec::new();
        for config in &self.metrics {
            if !categories.contains(&config.category) {
                categories.push(config.category);
            }
        }
        categories.sort_by_key(Category::display_name);
        categories
    }

    /// Metric keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.metrics.iter().map(|config| config.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}
