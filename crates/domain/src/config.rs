//! Configuration structures
//!
//! Populated by `metricdeck_infra::config` from the environment or a
//! TOML/JSON file.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SNOWFLAKE_TIMEOUT_SECS, DEFAULT_SQLITE_POOL_SIZE,
};
use crate::impl_domain_status_conversions;

/// Top-level application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub warehouse: WarehouseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Warehouse backend selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum WarehouseConfig {
    Snowflake(SnowflakeConfig),
    Sqlite(SqliteConfig),
}

impl WarehouseConfig {
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::Snowflake(_) => "snowflake",
            Self::Sqlite(_) => "sqlite",
        }
    }
}

/// Snowflake SQL API connection settings (key-pair authentication)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnowflakeConfig {
    pub account: String,
    pub user: String,
    pub role: String,
    pub warehouse: String,
    pub database: String,
    pub schema: String,
    pub private_key_path: PathBuf,
    /// `SHA256:...` fingerprint of the registered public key.
    pub public_key_fingerprint: String,
    #[serde(default = "default_snowflake_timeout")]
    pub timeout_secs: u64,
    /// Overrides `https://<account>.snowflakecomputing.com`.
    #[serde(default)]
    pub base_url: Option<String>,
}

impl SnowflakeConfig {
    /// Root URL of the account's SQL API.
    pub fn api_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.snowflakecomputing.com", self.account.to_lowercase()),
        }
    }
}

/// Local SQLite warehouse settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteConfig {
    pub path: PathBuf,
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    /// Extra database files attached under a schema name, e.g. `STRIPE`,
    /// so schema-qualified tables resolve as they do in the warehouse.
    #[serde(default)]
    pub schemas: BTreeMap<String, PathBuf>,
}

impl SqliteConfig {
    /// Config for a single database file with default pool size and no
    /// attached schemas.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), pool_size: default_pool_size(), schemas: BTreeMap::new() }
    }

    pub fn with_pool_size(mut self, pool_size: u32) -> Self {
        self.pool_size = pool_size;
        self
    }

    pub fn with_schema(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.schemas.insert(name.into(), path.into());
        self
    }
}

/// Logging output settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
}

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl_domain_status_conversions!(LogFormat {
    Pretty => "pretty",
    Json => "json",
});

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_snowflake_timeout() -> u64 {
    DEFAULT_SNOWFLAKE_TIMEOUT_SECS
}

fn default_pool_size() -> u32 {
    DEFAULT_SQLITE_POOL_SIZE
}
