//! Process-level helpers for the server binary.

pub mod logging;

pub use logging::init_tracing;
