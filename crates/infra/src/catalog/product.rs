//! Product & IT metrics.

use metricdeck_core::query::inclusive_range;
use metricdeck_domain::constants::{DETAILS_ROW_LIMIT, SUMMARY_LIST_LIMIT};
use metricdeck_domain::{Category, DateRange, ExtraParams, MetricConfig, QueryText, ValueFormat};

pub(super) fn platform_breakdown() -> MetricConfig {
    MetricConfig::new(
        "platform_breakdown",
        "Platform Breakdown",
        Category::ProductIt,
        ValueFormat::List,
        platform_summary,
    )
    .with_description("Top platforms by event count")
    .with_details(platform_details)
    .with_color("bg-gray-50 border-gray-200 text-gray-700")
    .with_icon("Monitor")
}

fn page_views(range: &DateRange) -> String {
    format!(
        "FROM PAGE_VIEW
    WHERE {}
      AND CONTEXT_USER_AGENT_DATA_PLATFORM IS NOT NULL",
        inclusive_range("TIMESTAMP", range)
    )
}

fn platform_summary(range: &DateRange) -> QueryText {
    QueryText::new(format!(
        "SELECT CONTEXT_USER_AGENT_DATA_PLATFORM AS platform,
           COUNT(*) AS event_count,
           COUNT(DISTINCT USER_ID) AS unique_users
    {}
    GROUP BY CONTEXT_USER_AGENT_DATA_PLATFORM
    ORDER BY event_count DESC
    LIMIT {SUMMARY_LIST_LIMIT}",
        page_views(range)
    ))
}

fn platform_details(range: &DateRange, _params: &ExtraParams) -> QueryText {
    QueryText::new(format!(
        "SELECT CONTEXT_USER_AGENT_DATA_PLATFORM AS platform,
           COUNT(*) AS event_count,
           COUNT(DISTINCT USER_ID) AS unique_users,
           DATE(TIMESTAMP) AS date
    {}
    GROUP BY CONTEXT_USER_AGENT_DATA_PLATFORM, DATE(TIMESTAMP)
    ORDER BY date DESC, event_count DESC
    LIMIT {DETAILS_ROW_LIMIT}",
        page_views(range)
    ))
}
