//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `METRICDECK_HOST` / `METRICDECK_PORT` (or `PORT`): HTTP listener
//! - `METRICDECK_WAREHOUSE`: `snowflake` (default) or `sqlite`
//! - `METRICDECK_LOG_FORMAT`: `pretty` (default) or `json`
//! - `SNOWFLAKE_ACCOUNT`, `SNOWFLAKE_USER`, `SNOWFLAKE_ROLE`,
//!   `SNOWFLAKE_WAREHOUSE`, `SNOWFLAKE_DATABASE`, `SNOWFLAKE_SCHEMA`,
//!   `SNOWFLAKE_PUBLIC_KEY_FINGERPRINT`: required for the Snowflake backend
//! - `SNOWFLAKE_PRIVATE_KEY_PATH`: PKCS#8 key file (default
//!   `snowflake_private_key.p8`)
//! - `SNOWFLAKE_TIMEOUT_SECS`, `SNOWFLAKE_BASE_URL`: optional
//! - `METRICDECK_SQLITE_PATH`: required for the SQLite backend
//! - `METRICDECK_SQLITE_POOL_SIZE`: optional
//! - `METRICDECK_SQLITE_SCHEMAS`: optional `NAME=path,...` files attached
//!   as schemas
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./config.toml` or `./config.json` (current working directory)
//! 2. `./metricdeck.toml` or `./metricdeck.json` (current working directory)
//! 3. `../config.toml` or `../config.json` (parent directory)
//! 4. `../../config.toml` or `../../config.json` (grandparent directory)
//! 5. Relative to executable location

use std::path::{Path, PathBuf};

use metricdeck_domain::constants::{
    DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SNOWFLAKE_TIMEOUT_SECS, DEFAULT_SQLITE_POOL_SIZE,
};
use metricdeck_domain::{
    Config, DashboardError, LogFormat, LoggingConfig, Result, ServerConfig, SnowflakeConfig,
    SqliteConfig, WarehouseConfig,
};

const DEFAULT_PRIVATE_KEY_PATH: &str = "snowflake_private_key.p8";

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `DashboardError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - Required fields are missing
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!(
                backend = config.warehouse.backend_name(),
                "Configuration loaded from environment variables"
            );
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// The warehouse section must be complete; server and logging settings fall
/// back to their defaults.
///
/// # Errors
/// Returns `DashboardError::Config` if required variables are missing
/// or have invalid values.
pub fn load_from_env() -> Result<Config> {
    let server = ServerConfig {
        host: std::env::var("METRICDECK_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
        port: match env_opt("METRICDECK_PORT").or_else(|| env_opt("PORT")) {
            Some(raw) => parse_number(&raw, "port")?,
            None => DEFAULT_PORT,
        },
    };

    let logging = LoggingConfig {
        format: match env_opt("METRICDECK_LOG_FORMAT") {
            Some(raw) => raw.parse::<LogFormat>().map_err(DashboardError::Config)?,
            None => LogFormat::default(),
        },
    };

    let backend = env_opt("METRICDECK_WAREHOUSE").unwrap_or_else(|| "snowflake".to_string());
    let warehouse = match backend.trim().to_ascii_lowercase().as_str() {
        "snowflake" => WarehouseConfig::Snowflake(snowflake_from_env()?),
        "sqlite" => WarehouseConfig::Sqlite(sqlite_from_env()?),
        other => {
            return Err(DashboardError::Config(format!("Unsupported warehouse backend: {other}")))
        }
    };

    Ok(Config { server, warehouse, logging })
}

fn snowflake_from_env() -> Result<SnowflakeConfig> {
    let timeout_secs = match env_opt("SNOWFLAKE_TIMEOUT_SECS") {
        Some(raw) => parse_number(&raw, "Snowflake timeout")?,
        None => DEFAULT_SNOWFLAKE_TIMEOUT_SECS,
    };

    Ok(SnowflakeConfig {
        account: env_var("SNOWFLAKE_ACCOUNT")?,
        user: env_var("SNOWFLAKE_USER")?,
        role: env_var("SNOWFLAKE_ROLE")?,
        warehouse: env_var("SNOWFLAKE_WAREHOUSE")?,
        database: env_var("SNOWFLAKE_DATABASE")?,
        schema: env_var("SNOWFLAKE_SCHEMA")?,
        private_key_path: PathBuf::from(
            env_opt("SNOWFLAKE_PRIVATE_KEY_PATH")
                .unwrap_or_else(|| DEFAULT_PRIVATE_KEY_PATH.to_string()),
        ),
        public_key_fingerprint: env_var("SNOWFLAKE_PUBLIC_KEY_FINGERPRINT")?,
        timeout_secs,
        base_url: env_opt("SNOWFLAKE_BASE_URL"),
    })
}

fn sqlite_from_env() -> Result<SqliteConfig> {
    let pool_size = match env_opt("METRICDECK_SQLITE_POOL_SIZE") {
        Some(raw) => parse_number(&raw, "pool size")?,
        None => DEFAULT_SQLITE_POOL_SIZE,
    };
    let path = PathBuf::from(env_var("METRICDECK_SQLITE_PATH")?);
    let mut config = SqliteConfig::new(path).with_pool_size(pool_size);
    if let Some(raw) = env_opt("METRICDECK_SQLITE_SCHEMAS") {
        for (name, path) in parse_schemas(&raw)? {
            config = config.with_schema(name, path);
        }
    }
    Ok(config)
}

/// Parse `NAME=path[,NAME=path...]`.
fn parse_schemas(raw: &str) -> Result<Vec<(String, PathBuf)>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((name, path)) if !name.trim().is_empty() && !path.trim().is_empty() => {
                Ok((name.trim().to_string(), PathBuf::from(path.trim())))
            }
            _ => Err(DashboardError::Config(format!(
                "Invalid METRICDECK_SQLITE_SCHEMAS entry '{entry}', expected NAME=path"
            ))),
        })
        .collect()
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Arguments
/// * `path` - Optional path to config file. If `None`, uses
///   [`probe_config_paths`].
///
/// # Errors
/// Returns `DashboardError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - Required fields are missing
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(DashboardError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            DashboardError::Config(
                "No config file found in any of the standard locations".to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| DashboardError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration from string content
///
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `DashboardError::Config` if format is invalid or parsing fails.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| DashboardError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| DashboardError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(DashboardError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// Probe multiple paths for configuration files
///
/// Searches the working directory, up to two parent directories, and the
/// executable's directory.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    const NAMES: [&str; 4] = ["config.toml", "config.json", "metricdeck.toml", "metricdeck.json"];

    let mut roots = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        roots.push(cwd);
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            roots.push(exe_dir.to_path_buf());
        }
    }

    roots
        .iter()
        .flat_map(|root| {
            [root.clone(), root.join(".."), root.join("../..")]
                .into_iter()
                .flat_map(|dir| NAMES.iter().map(move |name| dir.join(name)))
        })
        .find(|path| path.is_file())
}

/// Get required environment variable
///
/// # Errors
/// Returns `DashboardError::Config` if the variable is not set or empty.
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| {
        DashboardError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Optional environment variable; blank values count as unset.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_number<T>(raw: &str, what: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| DashboardError::Config(format!("Invalid {what}: {e}")))
}
