//! Integration tests for configuration loader
//!
//! Tests the end-to-end behavior of loading configuration from files and
//! turning it into a working warehouse gateway.

use std::path::PathBuf;

use metricdeck_core::WarehouseGateway;
use metricdeck_domain::{DashboardError, LogFormat, QueryText, WarehouseConfig};
use metricdeck_infra::{config, connect};
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("Failed to write config file");
    path
}

#[tokio::test]
async fn test_toml_sqlite_config_connects_and_queries() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("warehouse.db");
    {
        let conn = rusqlite::Connection::open(&db_path).expect("Failed to create database");
        conn.execute_batch(
            "CREATE TABLE leads (id INTEGER, created TEXT);
             INSERT INTO leads VALUES (1, '2025-01-01'), (2, '2025-01-31'), (3, '2025-02-01');",
        )
        .expect("Failed to seed database");
    }

    let config_path = write(
        &dir,
        "metricdeck.toml",
        &format!(
            r#"
[server]
host = "127.0.0.1"
port = 8088

[warehouse]
backend = "sqlite"
path = "{}"
pool_size = 2

[logging]
format = "json"
"#,
            db_path.display()
        ),
    );

    let config = config::load_from_file(Some(config_path)).expect("Failed to load TOML config");
    assert_eq!(config.server.bind_address(), "127.0.0.1:8088");
    assert_eq!(config.logging.format, LogFormat::Json);

    let gateway = connect(&config.warehouse).expect("Failed to open SQLite warehouse");
    assert_eq!(gateway.backend(), "sqlite");

    let rows = gateway
        .execute(&QueryText::new(
            "SELECT COUNT(*) AS total FROM leads \
             WHERE created >= '2025-01-01' AND created <= '2025-01-31'",
        ))
        .await
        .expect("Query should succeed");
    assert_eq!(rows[0]["total"], serde_json::json!(2));
}

#[test]
fn test_json_snowflake_config_applies_defaults() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write(
        &dir,
        "config.json",
        r#"{
            "warehouse": {
                "backend": "snowflake",
                "account": "ORG-ACCT",
                "user": "SVC_DASHBOARD",
                "role": "ANALYST",
                "warehouse": "REPORTING_WH",
                "database": "EVENTS",
                "schema": "PROD",
                "private_key_path": "keys/dashboard.p8",
                "public_key_fingerprint": "SHA256:abc="
            }
        }"#,
    );

    let config = config::load_from_file(Some(path)).expect("Failed to load JSON config");
    assert_eq!(config.logging.format, LogFormat::Pretty);
    match config.warehouse {
        WarehouseConfig::Snowflake(snowflake) => {
            assert_eq!(snowflake.timeout_secs, 60);
            assert_eq!(snowflake.api_base_url(), "https://org-acct.snowflakecomputing.com");
        }
        other => panic!("Expected Snowflake backend, got {other:?}"),
    }
}

#[test]
fn test_snowflake_config_without_key_fails_to_connect() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write(
        &dir,
        "config.toml",
        r#"
[warehouse]
backend = "snowflake"
account = "ORG-ACCT"
user = "SVC_DASHBOARD"
role = "ANALYST"
warehouse = "REPORTING_WH"
database = "EVENTS"
schema = "PROD"
private_key_path = "/nonexistent/dashboard.p8"
public_key_fingerprint = "SHA256:abc="
"#,
    );

    let config = config::load_from_file(Some(path)).expect("Failed to load TOML config");
    assert!(matches!(connect(&config.warehouse), Err(DashboardError::Config(_))));
}

#[test]
fn test_load_config_from_nonexistent_file() {
    match config::load_from_file(Some("/nonexistent/path/config.json".into())) {
        Err(DashboardError::Config(msg)) => {
            assert!(msg.contains("not found"), "Error message should mention 'not found'");
        }
        other => panic!("Expected Config error, got {other:?}"),
    }
}

#[test]
fn test_load_config_with_invalid_format() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write(&dir, "config.json", r#"{ "this is": "not valid" "#);

    match config::load_from_file(Some(path)) {
        Err(DashboardError::Config(msg)) => {
            assert!(msg.contains("Invalid JSON"), "Error message should mention invalid JSON");
        }
        other => panic!("Expected Config error, got {other:?}"),
    }
}

#[test]
fn test_missing_backend_is_rejected() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = write(&dir, "config.toml", "[warehouse]\npath = \"/tmp/warehouse.db\"\n");

    assert!(matches!(
        config::load_from_file(Some(path)),
        Err(DashboardError::Config(msg)) if msg.contains("Invalid TOML")
    ));
}
