//! Tracing subscriber setup.

use metricdeck_domain::constants::SERVICE_NAME;
use metricdeck_domain::LogFormat;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is unset or invalid.
fn default_filter() -> String {
    format!(
        "info,{SERVICE_NAME}=debug,metricdeck_api=debug,metricdeck_core=debug,\
         metricdeck_infra=debug,tower_http=info"
    )
}

/// Install the global subscriber.
///
/// Filtering comes from `RUST_LOG`; `format` picks human-readable or JSON
/// lines. Calling this twice is a no-op.
pub fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter()));

    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true).with_span_list(false))
            .try_init(),
    };

    if let Err(err) = result {
        tracing::debug!(error = %err, "Tracing subscriber already installed");
    }
}
