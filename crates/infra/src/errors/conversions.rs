//! Conversions from external infrastructure errors into domain errors.

use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use metricdeck_domain::DashboardError;
use reqwest::Error as HttpError;
use rusqlite::Error as SqlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub DashboardError);

impl From<InfraError> for DashboardError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<DashboardError> for InfraError {
    fn from(value: DashboardError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoDashboardError {
    fn into_dashboard(self) -> DashboardError;
}

/* -------------------------------------------------------------------------- */
/* rusqlite::Error → DashboardError */
/* -------------------------------------------------------------------------- */

impl IntoDashboardError for SqlError {
    fn into_dashboard(self) -> DashboardError {
        use rusqlite::ffi::ErrorCode;
        use rusqlite::Error as RE;

        match self {
            RE::SqliteFailure(err, maybe_message) => {
                let message = maybe_message.unwrap_or_default();
                match err.code {
                    ErrorCode::DatabaseBusy => DashboardError::Query("database is busy".into()),
                    ErrorCode::DatabaseLocked => {
                        DashboardError::Query("database is locked".into())
                    }
                    ErrorCode::CannotOpen => {
                        DashboardError::Config(format!("unable to open warehouse file: {message}"))
                    }
                    _ => DashboardError::Query(format!(
                        "sqlite failure {:?} (code {}): {}",
                        err.code, err.extended_code, message
                    )),
                }
            }
            RE::FromSqlConversionFailure(_, _, cause) => {
                DashboardError::Query(format!("failed to convert sqlite value: {cause}"))
            }
            RE::InvalidColumnType(_, name, ty) => {
                DashboardError::Query(format!("invalid column type for {name}: {ty}"))
            }
            RE::Utf8Error(_) => DashboardError::Query("invalid UTF-8 returned from sqlite".into()),
            RE::InvalidPath(path) => DashboardError::Config(format!(
                "invalid warehouse path: {}",
                path.to_string_lossy()
            )),
            RE::InvalidQuery => DashboardError::Query("invalid SQL query".into()),
            other => DashboardError::Query(other.to_string()),
        }
    }
}

impl From<SqlError> for InfraError {
    fn from(value: SqlError) -> Self {
        InfraError(value.into_dashboard())
    }
}

/* -------------------------------------------------------------------------- */
/* r2d2::Error → DashboardError */
/* -------------------------------------------------------------------------- */

impl IntoDashboardError for r2d2::Error {
    fn into_dashboard(self) -> DashboardError {
        DashboardError::Query(format!("connection pool error: {self}"))
    }
}

impl From<r2d2::Error> for InfraError {
    fn from(value: r2d2::Error) -> Self {
        InfraError(value.into_dashboard())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → DashboardError */
/* -------------------------------------------------------------------------- */

impl IntoDashboardError for HttpError {
    fn into_dashboard(self) -> DashboardError {
        if self.is_timeout() {
            return DashboardError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return DashboardError::Network("HTTP connection failure".into());
        }

        if self.is_decode() {
            return DashboardError::Query(format!("malformed warehouse response: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => DashboardError::Auth(message),
                429 | 500..=599 => DashboardError::Network(message),
                _ => DashboardError::Query(message),
            };
        }

        DashboardError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_dashboard())
    }
}

/* -------------------------------------------------------------------------- */
/* jsonwebtoken::Error → DashboardError */
/* -------------------------------------------------------------------------- */

impl IntoDashboardError for JwtError {
    fn into_dashboard(self) -> DashboardError {
        match self.kind() {
            JwtErrorKind::InvalidRsaKey(_) | JwtErrorKind::InvalidKeyFormat => {
                DashboardError::Config(format!("invalid warehouse private key: {self}"))
            }
            _ => DashboardError::Auth(format!("failed to sign warehouse token: {self}")),
        }
    }
}

impl From<JwtError> for InfraError {
    fn from(value: JwtError) -> Self {
        InfraError(value.into_dashboard())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → DashboardError */
/* -------------------------------------------------------------------------- */

impl IntoDashboardError for std::io::Error {
    fn into_dashboard(self) -> DashboardError {
        DashboardError::Config(format!("I/O error: {self}"))
    }
}

impl From<std::io::Error> for InfraError {
    fn from(value: std::io::Error) -> Self {
        InfraError(value.into_dashboard())
    }
}

/// Map any supported infrastructure error into the domain error.
pub(crate) fn to_domain<E>(err: E) -> DashboardError
where
    InfraError: From<E>,
{
    InfraError::from(err).into()
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
