//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Service identity
pub const SERVICE_NAME: &str = "metricdeck";
pub const QUERY_TAG: &str = "metricdeck";

// Server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5002;

// Dashboard defaults
pub const DEFAULT_LOOKBACK_DAYS: i64 = 30;
pub const DETAILS_ROW_LIMIT: usize = 100;
pub const SUMMARY_LIST_LIMIT: usize = 5;

// Logging
pub const QUERY_LOG_PREVIEW_CHARS: usize = 100;

// Warehouse defaults
pub const DEFAULT_SNOWFLAKE_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_SQLITE_POOL_SIZE: u32 = 4;
pub const SNOWFLAKE_JWT_LIFETIME_SECS: i64 = 59 * 60;
pub const SNOWFLAKE_JWT_REFRESH_MARGIN_SECS: i64 = 5 * 60;
