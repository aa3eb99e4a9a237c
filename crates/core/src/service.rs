//! Metrics service - runs summary and details queries through the warehouse
//! gateway and normalizes their results.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::future::{join_all, try_join};
use futures::FutureExt;
use metricdeck_domain::{
    DashboardError, DateRange, ExtraParams, MetricConfig, MetricResult, MetricStatus, Result, Row,
};
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, error, info, instrument, warn};

use crate::normalize::normalize;
use crate::registry::MetricRegistry;
use crate::report::{Report, ReportQueries};
use crate::warehouse_ports::WarehouseGateway;

/// Computes dashboard metrics for a date range.
///
/// Stateless apart from its shared registry and gateway; clone freely.
#[derive(Clone)]
pub struct MetricsService {
    registry: Arc<MetricRegistry>,
    gateway: Arc<dyn WarehouseGateway>,
}

impl MetricsService {
    pub fn new(registry: Arc<MetricRegistry>, gateway: Arc<dyn WarehouseGateway>) -> Self {
        Self { registry, gateway }
    }

    pub fn registry(&self) -> &Arc<MetricRegistry> {
        &self.registry
    }

    pub fn gateway(&self) -> &Arc<dyn WarehouseGateway> {
        &self.gateway
    }

    /// Compute every registered metric.
    ///
    /// Summary queries run concurrently; the batch is assembled once all of
    /// them have finished. A failing metric becomes an `error` entry and never
    /// affects the others, so the batch always holds one entry per key.
    #[instrument(skip(self, range), fields(range = %range, backend = self.gateway.backend()))]
    pub async fn compute_all(&self, range: &DateRange) -> MetricBatch {
        let started = Instant::now();
        let configs = self.registry.list_all();

        let results =
            join_all(configs.iter().map(|config| self.compute_isolated(config, range))).await;

        let batch = MetricBatch {
            entries: configs.iter().map(|config| config.key.clone()).zip(results).collect(),
        };

        info!(
            metrics = batch.len(),
            ok = batch.count_by_status(MetricStatus::Ok),
            errors = batch.count_by_status(MetricStatus::Error),
            elapsed_ms = elapsed_ms(started),
            "Computed dashboard metrics"
        );
        batch
    }

    /// Compute a single metric.
    ///
    /// # Errors
    /// `DashboardError::UnknownMetric` if `key` is not registered. Query
    /// failures are reported inside the returned envelope.
    pub async fn compute_metric(&self, key: &str, range: &DateRange) -> Result<MetricResult> {
        let config = self.lookup(key)?;
        Ok(self.compute_isolated(config, range).await)
    }

    /// Run the drill-down query for `key`.
    ///
    /// A gateway failure is logged and yields no rows.
    ///
    /// # Errors
    /// `DashboardError::UnknownMetric` for an unregistered key,
    /// `DashboardError::NoDetailsAvailable` when the metric has no details
    /// query (the warehouse is not contacted).
    #[instrument(skip(self, range, params), fields(range = %range))]
    pub async fn compute_details(
        &self,
        key: &str,
        range: &DateRange,
        params: &ExtraParams,
    ) -> Result<Vec<Row>> {
        let config = self.lookup(key)?;
        let Some(details_query) = config.details_query else {
            return Err(DashboardError::NoDetailsAvailable(key.to_string()));
        };

        let query = details_query(range, params);
        let started = Instant::now();
        match self.gateway.execute(&query).await {
            Ok(rows) => {
                debug!(
                    metric = key,
                    rows = rows.len(),
                    elapsed_ms = elapsed_ms(started),
                    "Fetched details"
                );
                Ok(rows)
            }
            Err(err) => {
                error!(metric = key, error = %err, "Details query failed");
                Ok(Vec::new())
            }
        }
    }

    /// Run both queries of `report` concurrently.
    ///
    /// # Errors
    /// The first gateway error from either query.
    #[instrument(skip(self, report, range), fields(report = report.name, range = %range))]
    pub async fn run_report(&self, report: &ReportQueries, range: &DateRange) -> Result<Report> {
        let started = Instant::now();
        let summary = (report.summary)(range);
        let details = (report.details)(range);

        let (summary_rows, detail_rows) =
            try_join(self.gateway.execute(&summary), self.gateway.execute(&details))
                .await
                .map_err(|err| {
                    error!(report = report.name, error = %err, "Report query failed");
                    err
                })?;

        let report_out = Report::new(summary_rows, detail_rows);
        info!(
            report = report.name,
            records = report_out.total_records,
            elapsed_ms = elapsed_ms(started),
            "Report computed"
        );
        Ok(report_out)
    }

    fn lookup(&self, key: &str) -> Result<&MetricConfig> {
        self.registry.get(key).ok_or_else(|| DashboardError::UnknownMetric(key.to_string()))
    }

    /// Compute one metric, converting query errors and panics into an
    /// `error` envelope.
    async fn compute_isolated(&self, config: &MetricConfig, range: &DateRange) -> MetricResult {
        match AssertUnwindSafe(self.compute_one(config, range)).catch_unwind().await {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => {
                error!(metric = %config.key, error = %err, "Metric calculation failed");
                MetricResult::error(format!("Error calculating {}: {err}", config.key))
            }
            Err(panic) => {
                let cause = panic_message(&*panic);
                error!(metric = %config.key, cause = %cause, "Metric calculation panicked");
                MetricResult::error(format!("Error calculating {}: {cause}", config.key))
            }
        }
    }

    async fn compute_one(&self, config: &MetricConfig, range: &DateRange) -> Result<MetricResult> {
        let query = (config.summary_query)(range);
        let started = Instant::now();
        let rows = self.gateway.execute(&query).await?;
        let elapsed = elapsed_ms(started);

        let result = normalize(config, rows).with_execution_time_ms(elapsed);
        if result.status == MetricStatus::Missing {
            warn!(metric = %config.key, elapsed_ms = elapsed, "Metric returned no usable value");
        } else {
            debug!(
                metric = %config.key,
                status = %result.status,
                elapsed_ms = elapsed,
                "Metric computed"
            );
        }
        Ok(result)
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic during metric calculation".to_string()
    }
}

/// Results of one `compute_all` call, in registry order.
///
/// Serializes as a JSON object keyed by metric key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricBatch {
    entries: Vec<(String, MetricResult)>,
}

impl MetricBatch {
    pub fn get(&self, key: &str) -> Option<&MetricResult> {
        self.entries.iter().find(|(entry_key, _)| entry_key == key).map(|(_, result)| result)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricResult)> {
        self.entries.iter().map(|(key, result)| (key.as_str(), result))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn count_by_status(&self, status: MetricStatus) -> usize {
        self.entries.iter().filter(|(_, result)| result.status == status).count()
    }

    pub fn into_entries(self) -> Vec<(String, MetricResult)> {
        self.entries
    }
}

impl Serialize for MetricBatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, result) in &self.entries {
            map.serialize_entry(key, result)?;
        }
        map.end()
    }
}
