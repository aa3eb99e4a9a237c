//! Key-pair JWT authentication for the Snowflake SQL API.
//!
//! Snowflake accepts an RS256 token whose issuer is
//! `<ACCOUNT>.<USER>.<public key fingerprint>` and whose subject is
//! `<ACCOUNT>.<USER>`. Tokens are cached and re-signed shortly before they
//! expire.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use metricdeck_domain::constants::{
    SNOWFLAKE_JWT_LIFETIME_SECS, SNOWFLAKE_JWT_REFRESH_MARGIN_SECS,
};
use metricdeck_domain::{DashboardError, Result, SnowflakeConfig};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::to_domain;

/// Claims of a Snowflake key-pair token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPairClaims {
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Signs and caches key-pair JWTs.
pub struct KeyPairAuth {
    qualified_user: String,
    fingerprint: String,
    key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl KeyPairAuth {
    /// Build from a PEM-encoded RSA private key.
    ///
    /// # Errors
    /// Returns `DashboardError::Config` if the key cannot be parsed.
    pub fn from_pem(account: &str, user: &str, fingerprint: &str, pem: &[u8]) -> Result<Self> {
        let key = EncodingKey::from_rsa_pem(pem).map_err(to_domain)?;
        Ok(Self {
            qualified_user: format!("{}.{}", account_locator(account), user.to_uppercase()),
            fingerprint: fingerprint.trim().to_string(),
            key,
            cached: Mutex::new(None),
        })
    }

    /// Load the private key named by `config`.
    ///
    /// # Errors
    /// Returns `DashboardError::Config` if the key file is missing or invalid.
    pub fn from_config(config: &SnowflakeConfig) -> Result<Self> {
        let path = resolve_key_path(&config.private_key_path)?;
        let pem = std::fs::read(&path).map_err(to_domain)?;
        info!(key_path = %path.display(), "Loaded Snowflake private key");
        Self::from_pem(&config.account, &config.user, &config.public_key_fingerprint, &pem)
    }

    /// Current bearer token, signing a new one when the cached token is
    /// within the refresh margin of its expiry.
    ///
    /// # Errors
    /// Returns `DashboardError::Auth` if signing fails.
    pub fn token(&self) -> Result<String> {
        self.token_at(Utc::now())
    }

    fn token_at(&self, now: DateTime<Utc>) -> Result<String> {
        let mut cached = self.cached.lock();
        if let Some(current) = cached.as_ref() {
            if now + Duration::seconds(SNOWFLAKE_JWT_REFRESH_MARGIN_SECS) < current.expires_at {
                return Ok(current.token.clone());
            }
        }

        let claims = self.claims(now);
        let expires_at = now + Duration::seconds(SNOWFLAKE_JWT_LIFETIME_SECS);
        let token = encode(&Header::new(Algorithm::RS256), &claims, &self.key).map_err(to_domain)?;
        debug!(issuer = %claims.iss, %expires_at, "Signed new Snowflake token");

        *cached = Some(CachedToken { token: token.clone(), expires_at });
        Ok(token)
    }

    fn claims(&self, now: DateTime<Utc>) -> KeyPairClaims {
        KeyPairClaims {
            iss: format!("{}.{}", self.qualified_user, self.fingerprint),
            sub: self.qualified_user.clone(),
            iat: now.timestamp(),
            exp: now.timestamp() + SNOWFLAKE_JWT_LIFETIME_SECS,
        }
    }
}

/// Account part of the JWT issuer: upper-cased, without any region or cloud
/// suffix (`xy12345.us-east-1` becomes `XY12345`).
fn account_locator(account: &str) -> String {
    account.split('.').next().unwrap_or(account).to_uppercase()
}

/// Use `path` if it exists, otherwise the same path with `.p8` replaced by
/// `.pem`.
fn resolve_key_path(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return Ok(path.to_path_buf());
    }
    if path.extension().is_some_and(|ext| ext == "p8") {
        let fallback = path.with_extension("pem");
        if fallback.exists() {
            return Ok(fallback);
        }
    }
    Err(DashboardError::Config(format!("Private key file not found: {}", path.display())))
}
