//! # MetricDeck API
//!
//! HTTP application layer - routes and server wiring.
//!
//! This crate contains:
//! - axum routes (frontend → backend bridge)
//! - Application context (dependency injection)
//! - HTTP error mapping
//! - Logging bootstrap for the `metricdeck` binary
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod context;
pub mod error;
pub mod routes;
pub mod utils;

// Re-export for convenience
pub use context::AppContext;
pub use error::{ApiError, ErrorResponse};
pub use routes::{build_router, AppState};
