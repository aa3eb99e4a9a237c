//! HTTP error mapping
//!
//! Every failure leaves the API as `{ "error": <CODE>, "message": <text> }`.

use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use metricdeck_domain::DashboardError;
use serde::Serialize;
use thiserror::Error;

/// API errors
#[derive(Debug, Error)]
pub enum ApiError {
    /// A required query parameter is absent or blank
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// The query string could not be decoded
    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    /// A date parameter could not be parsed
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Route does not exist
    #[error("No route for {0}")]
    RouteNotFound(String),

    /// Error raised by the metrics service
    #[error(transparent)]
    Dashboard(#[from] DashboardError),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingParameter(_) | Self::InvalidQuery(_) | Self::InvalidDate(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::RouteNotFound(_) => StatusCode::NOT_FOUND,
            Self::Dashboard(err) => match err {
                DashboardError::UnknownMetric(_) => StatusCode::NOT_FOUND,
                DashboardError::NoDetailsAvailable(_) | DashboardError::InvalidInput(_) => {
                    StatusCode::BAD_REQUEST
                }
                DashboardError::Auth(_) | DashboardError::Network(_) => StatusCode::BAD_GATEWAY,
                DashboardError::Query(_)
                | DashboardError::DuplicateMetric(_)
                | DashboardError::Config(_)
                | DashboardError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingParameter(_) => "MISSING_PARAMETER",
            Self::InvalidQuery(_) => "INVALID_QUERY",
            Self::InvalidDate(_) => "INVALID_DATE",
            Self::RouteNotFound(_) => "NOT_FOUND",
            Self::Dashboard(err) => match err {
                DashboardError::UnknownMetric(_) => "UNKNOWN_METRIC",
                DashboardError::NoDetailsAvailable(_) => "NO_DETAILS_AVAILABLE",
                DashboardError::InvalidInput(_) => "INVALID_INPUT",
                DashboardError::Query(_) => "QUERY_FAILED",
                DashboardError::Auth(_) => "WAREHOUSE_AUTH_FAILED",
                DashboardError::Network(_) => "WAREHOUSE_UNAVAILABLE",
                DashboardError::DuplicateMetric(_)
                | DashboardError::Config(_)
                | DashboardError::Internal(_) => "INTERNAL_ERROR",
            },
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidQuery(rejection.body_text())
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code (machine-readable)
    pub error: &'static str,
    /// Error message (human-readable)
    pub message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse { error: self.code(), message: self.to_string() };

        if status.is_server_error() {
            tracing::error!(
                error_code = body.error,
                error_message = %body.message,
                status = %status,
                "API error"
            );
        } else {
            tracing::warn!(
                error_code = body.error,
                error_message = %body.message,
                status = %status,
                "API error"
            );
        }

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type Result<T> = std::result::Result<T, ApiError>;
