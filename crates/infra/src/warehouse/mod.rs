//! Warehouse gateway implementations.

pub mod snowflake;
pub mod sqlite;

use std::sync::Arc;

use metricdeck_core::WarehouseGateway;
use metricdeck_domain::{Result, WarehouseConfig};
use tracing::info;

pub use snowflake::SnowflakeGateway;
pub use sqlite::SqliteGateway;

/// Build the gateway selected by `config`.
///
/// # Errors
/// Returns the backend's construction error (missing key file, unusable
/// database path, ...).
pub fn connect(config: &WarehouseConfig) -> Result<Arc<dyn WarehouseGateway>> {
    let gateway: Arc<dyn WarehouseGateway> = match config {
        WarehouseConfig::Snowflake(snowflake) => Arc::new(SnowflakeGateway::new(snowflake)?),
        WarehouseConfig::Sqlite(sqlite) => Arc::new(SqliteGateway::open(sqlite)?),
    };
    info!(backend = gateway.backend(), "Warehouse gateway ready");
    Ok(gateway)
}
