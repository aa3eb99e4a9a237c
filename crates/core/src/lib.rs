//! # MetricDeck Core
//!
//! Metric computation logic - no infrastructure dependencies.
//!
//! This crate contains:
//! - The metric registry
//! - Row normalization and threshold evaluation
//! - The metrics service (summary batches, drill-down details and reports)
//! - The warehouse gateway port and SQL dialect seam
//!
//! ## Architecture Principles
//! - Only depends on `metricdeck-domain`
//! - No database, HTTP, or platform code
//! - The warehouse is reached through [`WarehouseGateway`]

pub mod normalize;
pub mod query;
pub mod registry;
pub mod report;
pub mod service;
pub mod warehouse_ports;

pub use query::SqlDialect;
pub use registry::MetricRegistry;
pub use report::{Report, ReportQueries};
pub use service::{MetricBatch, MetricsService};
pub use warehouse_ports::WarehouseGateway;
