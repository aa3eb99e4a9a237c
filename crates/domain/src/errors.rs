//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for MetricDeck
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum DashboardError {
    /// The warehouse could not run a query (network, auth, malformed SQL).
    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("No details available for metric: {0}")]
    NoDetailsAvailable(String),

    #[error("Metric already registered: {0}")]
    DuplicateMetric(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DashboardError {
    /// Stable label suitable for logging fields.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Query(_) => "query",
            Self::UnknownMetric(_) => "unknown_metric",
            Self::NoDetailsAvailable(_) => "no_details_available",
            Self::DuplicateMetric(_) => "duplicate_metric",
            Self::InvalidInput(_) => "invalid_input",
            Self::Config(_) => "config",
            Self::Auth(_) => "auth",
            Self::Network(_) => "network",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether this error was caused by the caller rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownMetric(_) | Self::NoDetailsAvailable(_) | Self::InvalidInput(_)
        )
    }
}

/// Result type alias for MetricDeck operations
pub type Result<T> = std::result::Result<T, DashboardError>;
