//! Warehouse gateway port.
//!
//! The only boundary between metric computation and the analytical
//! warehouse: run a query, get rows back.
//!
//! # Example
//!
//! ```no_run
//! use metricdeck_core::WarehouseGateway;
//! use metricdeck_domain::QueryText;
//!
//! async fn row_count(gateway: &dyn WarehouseGateway) -> usize {
//!     let rows = gateway.execute(&QueryText::new("SELECT 1 AS one")).await.unwrap();
//!     rows.len()
//! }
//! ```

use async_trait::async_trait;
use metricdeck_domain::{QueryText, Result, Row};

use crate::query::SqlDialect;

/// Port for executing analytical queries against the warehouse.
///
/// Implementations own connection management and timeouts. Any failure to
/// run a query (transport, auth, malformed SQL, timeout) is reported as an
/// `Err`; the metrics service decides how to degrade.
#[async_trait]
pub trait WarehouseGateway: Send + Sync {
    /// Execute `query` and return every row it produced, in order.
    async fn execute(&self, query: &QueryText) -> Result<Vec<Row>>;

    /// Short backend identifier used in logs and health output.
    fn backend(&self) -> &'static str;

    /// SQL flavour the catalog must generate for this warehouse.
    fn dialect(&self) -> SqlDialect {
        SqlDialect::Snowflake
    }

    /// Verify the warehouse is reachable.
    async fn health_check(&self) -> Result<()> {
        self.execute(&QueryText::new("SELECT 1 AS ok")).await.map(|_| ())
    }
}
