//! Local SQLite warehouse gateway.
//!
//! Runs queries against a SQLite file through an r2d2 pool. Intended for
//! development, demos, and tests against a warehouse extract. Source schemas
//! (`STRIPE`, `FACEBOOKADS`, ...) are separate files attached under their
//! schema name on every pooled connection.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use metricdeck_core::{SqlDialect, WarehouseGateway};
use metricdeck_domain::constants::QUERY_LOG_PREVIEW_CHARS;
use metricdeck_domain::{DashboardError, QueryText, Result as DomainResult, Row, SqliteConfig};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::ValueRef;
use serde_json::{Number, Value};
use tokio::task;
use tracing::{debug, info, instrument, warn};

use crate::errors::to_domain;

const CONNECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// SQLite-backed implementation of `WarehouseGateway`.
///
/// Connections are opened with `query_only` so dashboard queries can never
/// modify the extract.
#[derive(Clone)]
pub struct SqliteGateway {
    pool: Arc<Pool<SqliteConnectionManager>>,
    path: PathBuf,
}

impl SqliteGateway {
    /// Open a pool on the configured database file.
    ///
    /// # Errors
    /// Returns `DashboardError::Config` if an attached schema file does not
    /// exist, or the pool error if no connection can be established.
    #[instrument(skip(config), fields(db_path = %config.path.display(), pool_size = config.pool_size))]
    pub fn open(config: &SqliteConfig) -> DomainResult<Self> {
        let mut attachments = Vec::with_capacity(config.schemas.len());
        for (schema, path) in &config.schemas {
            if !path.is_file() {
                return Err(DashboardError::Config(format!(
                    "Schema file for {schema} not found: {}",
                    path.display()
                )));
            }
            attachments.push((schema.clone(), path.to_string_lossy().into_owned()));
        }

        let manager = SqliteConnectionManager::file(&config.path).with_init(move |conn| {
            for (schema, path) in &attachments {
                conn.execute("ATTACH DATABASE ?1 AS ?2", rusqlite::params![path, schema])?;
            }
            conn.execute_batch("PRAGMA query_only = ON;")
        });

        let pool = Pool::builder()
            .max_size(config.pool_size.max(1))
            .connection_timeout(CONNECTION_TIMEOUT)
            .build(manager)
            .map_err(|e| {
                warn!(error = %e, "Failed to create SQLite pool");
                to_domain(e)
            })?;

        info!(schemas = config.schemas.len(), "SQLite warehouse pool initialised");
        Ok(Self { pool: Arc::new(pool), path: config.path.clone() })
    }

    /// Return the configured database path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl WarehouseGateway for SqliteGateway {
    async fn execute(&self, query: &QueryText) -> DomainResult<Vec<Row>> {
        let pool = Arc::clone(&self.pool);
        let sql = query.as_str().to_string();
        let started = Instant::now();

        info!(query = %query.preview(QUERY_LOG_PREVIEW_CHARS), "Executing query");

        let result = task::spawn_blocking(move || -> DomainResult<Vec<Row>> {
            let conn = pool.get().map_err(to_domain)?;
            run_query(&conn, &sql)
        })
        .await
        .map_err(map_join_error)?;

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        match &result {
            Ok(rows) => info!(rows = rows.len(), elapsed_ms, "Query executed successfully"),
            Err(err) => warn!(error = %err, elapsed_ms, "Query execution failed"),
        }
        result
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn dialect(&self) -> SqlDialect {
        SqlDialect::Sqlite
    }
}

fn run_query(conn: &rusqlite::Connection, sql: &str) -> DomainResult<Vec<Row>> {
    let mut stmt = conn.prepare(sql).map_err(to_domain)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();

    let mut rows = stmt.query([]).map_err(to_domain)?;
    let mut out = Vec::new();
    while let Some(row) = rows.next().map_err(to_domain)? {
        let mut record = Row::new();
        for (index, column) in columns.iter().enumerate() {
            let value = row.get_ref(index).map_err(to_domain)?;
            record.insert(column.clone(), to_json(value));
        }
        out.push(record);
    }

    debug!(columns = columns.len(), rows = out.len(), "Decoded SQLite rows");
    Ok(out)
}

fn to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null | ValueRef::Blob(_) => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
    }
}

fn map_join_error(err: task::JoinError) -> DashboardError {
    DashboardError::Internal(format!("Task join error: {err}"))
}

#[cfg(test)]
mod tests {
    use metricdeck_domain::DateRange;
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;

    fn seeded_gateway(dir: &TempDir) -> SqliteGateway {
        let path = dir.path().join("warehouse.db");
        let conn = rusqlite::Connection::open(&path).expect("db created");
        conn.execute_batch(
            "CREATE TABLE signups (
                 id INTEGER, platform TEXT, created TIMESTAMP, score REAL, avatar BLOB
             );
             INSERT INTO signups VALUES (1, 'ios', '2025-01-01 09:00:00', 0.5, x'00ff');
             INSERT INTO signups VALUES (2, 'web', '2025-01-15 12:00:00', NULL, NULL);
             INSERT INTO signups VALUES (3, 'web', '2025-01-31 10:00:00', 1.5, NULL);
             INSERT INTO signups VALUES (4, 'web', '2025-02-01 00:00:00', 2.0, NULL);",
        )
        .expect("schema seeded");
        drop(conn);

        SqliteGateway::open(&SqliteConfig::new(path).with_pool_size(2)).expect("gateway opened")
    }

    #[tokio::test]
    async fn maps_sqlite_values_to_json() {
        let dir = TempDir::new().expect("temp dir created");
        let gateway = seeded_gateway(&dir);

        let query = QueryText::new("SELECT id, platform, score, avatar FROM signups ORDER BY id");
        let rows = gateway.execute(&query).await.unwrap();

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0]["id"], json!(1));
        assert_eq!(rows[0]["platform"], json!("ios"));
        assert_eq!(rows[0]["score"], json!(0.5));
        assert_eq!(rows[0]["avatar"], Value::Null);
        assert_eq!(rows[1]["score"], Value::Null);
    }

    #[tokio::test]
    async fn range_filter_keeps_timestamps_on_the_end_day() {
        let dir = TempDir::new().expect("temp dir created");
        let gateway = seeded_gateway(&dir);
        let range = DateRange::parse("2025-01-01", "2025-01-31").unwrap();

        let sql = format!(
            "SELECT COUNT(*) AS TOTAL FROM signups WHERE {}",
            metricdeck_core::query::inclusive_range("created", &range)
        );
        let rows = gateway.execute(&QueryText::new(sql)).await.unwrap();

        assert_eq!(rows, vec![json!({ "TOTAL": 3 }).as_object().unwrap().clone()]);
    }

    #[tokio::test]
    async fn invalid_sql_is_a_query_error() {
        let dir = TempDir::new().expect("temp dir created");
        let gateway = seeded_gateway(&dir);

        let query = QueryText::new("SELECT * FROM missing_table");
        let err = gateway.execute(&query).await.unwrap_err();
        assert!(matches!(err, DashboardError::Query(_)), "{err:?}");
    }

    #[tokio::test]
    async fn connections_are_read_only() {
        let dir = TempDir::new().expect("temp dir created");
        let gateway = seeded_gateway(&dir);

        let err = gateway.execute(&QueryText::new("DELETE FROM signups")).await.unwrap_err();
        assert!(matches!(err, DashboardError::Query(_)));

        let query = QueryText::new("SELECT COUNT(*) AS n FROM signups");
        let rows = gateway.execute(&query).await.unwrap();
        assert_eq!(rows[0]["n"], json!(4));
    }

    #[tokio::test]
    async fn attached_schemas_resolve_qualified_tables() {
        let dir = TempDir::new().expect("temp dir created");
        let stripe = dir.path().join("stripe.db");
        rusqlite::Connection::open(&stripe)
            .expect("schema db created")
            .execute_batch(
                "CREATE TABLE CHARGES (ID TEXT, STATUS TEXT);
                 INSERT INTO CHARGES VALUES ('ch_1', 'failed'), ('ch_2', 'succeeded');",
            )
            .expect("schema seeded");
        let main = dir.path().join("events.db");
        rusqlite::Connection::open(&main).expect("main db created");

        let gateway =
            SqliteGateway::open(&SqliteConfig::new(main).with_schema("STRIPE", stripe)).unwrap();
        let rows = gateway
            .execute(&QueryText::new(
                "SELECT COUNT(*) AS failed FROM STRIPE.CHARGES WHERE STATUS = 'failed'",
            ))
            .await
            .unwrap();
        assert_eq!(rows[0]["failed"], json!(1));
        assert_eq!(gateway.dialect(), SqlDialect::Sqlite);

        let err = gateway
            .execute(&QueryText::new("DELETE FROM STRIPE.CHARGES"))
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Query(_)), "{err:?}");
    }

    #[test]
    fn missing_schema_file_is_a_config_error() {
        let dir = TempDir::new().expect("temp dir created");
        let config = SqliteConfig::new(dir.path().join("events.db"))
            .with_schema("STRIPE", dir.path().join("absent.db"));

        let err = SqliteGateway::open(&config).err().expect("open should fail");
        assert!(
            matches!(err, DashboardError::Config(ref msg) if msg.contains("STRIPE")),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn health_check_succeeds() {
        let dir = TempDir::new().expect("temp dir created");
        let gateway = seeded_gateway(&dir);
        gateway.health_check().await.expect("health check passed");
        assert_eq!(gateway.backend(), "sqlite");
        assert!(gateway.path().ends_with("warehouse.db"));
    }
}
