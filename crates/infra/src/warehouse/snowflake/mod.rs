//! Snowflake warehouse gateway (SQL API v2 with key-pair authentication).

mod auth;
mod client;
mod types;

pub use auth::{KeyPairAuth, KeyPairClaims};
pub use client::SnowflakeGateway;
