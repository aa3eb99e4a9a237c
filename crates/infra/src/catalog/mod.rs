//! Built-in metric catalog.
//!
//! Query providers target the schema the dashboard reads from: event tables
//! (`TRACKS`, `PAGE_VIEW`, `PURCHASE`) live in the configured schema, while
//! `STRIPE`, `FACEBOOKADS` and `FACEBOOK_LEAD_ADS` are addressed explicitly.
//! The SQL runs unchanged on Snowflake and SQLite except where a
//! [`Dialect`] supplies the backend-specific fragment.

mod attribution;
mod customer_success;
mod finance;
mod marketing;
mod product;

use metricdeck_core::query::{Dialect, SnowflakeSql, SqlDialect, SqliteSql};
use metricdeck_core::MetricRegistry;
use metricdeck_domain::{MetricConfig, Result};

pub use attribution::facebook_subscription_analysis;

/// Every built-in metric, in dashboard order, written for `dialect`.
pub fn builtin_metrics(dialect: SqlDialect) -> Vec<MetricConfig> {
    match dialect {
        SqlDialect::Snowflake => metrics_for::<SnowflakeSql>(),
        SqlDialect::Sqlite => metrics_for::<SqliteSql>(),
    }
}

fn metrics_for<D: Dialect>() -> Vec<MetricConfig> {
    vec![
        customer_success::dormant_account_rate(),
        customer_success::t24h_activation_rate::<D>(),
        finance::involuntary_churn_rate(),
        finance::dunning_recovery_rate(),
        marketing::facebook_cac_to_ltv_ratio(),
        marketing::facebook_lead_ads_total(),
        product::platform_breakdown(),
        finance::root_cause_pareto(),
    ]
}

/// Registry holding the built-in catalog for `dialect`.
///
/// # Errors
/// Fails only if two built-in metrics share a key.
pub fn builtin_registry(dialect: SqlDialect) -> Result<MetricRegistry> {
    MetricRegistry::from_configs(builtin_metrics(dialect))
}
