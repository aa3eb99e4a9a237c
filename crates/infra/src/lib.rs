//! # MetricDeck Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Warehouse gateways (Snowflake SQL API, local SQLite)
//! - The built-in metric catalog
//! - Configuration loading (environment, TOML/JSON files)
//! - Conversions from third-party errors into `DashboardError`
//!
//! ## Architecture
//! - Implements traits defined in `metricdeck-core`
//! - Depends on `metricdeck-domain` and `metricdeck-core`
//! - Contains all "impure" code (network, filesystem, database)

pub mod catalog;
pub mod config;
pub mod errors;
pub mod warehouse;

// Re-export commonly used items
pub use catalog::{builtin_metrics, builtin_registry, facebook_subscription_analysis};
pub use errors::InfraError;
pub use warehouse::{connect, SnowflakeGateway, SqliteGateway};
