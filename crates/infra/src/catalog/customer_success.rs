//! Customer Success metrics: post-purchase dormancy and 24h activation.

use metricdeck_core::query::{flag_param, inclusive_range, Dialect};
use metricdeck_domain::constants::DETAILS_ROW_LIMIT;
use metricdeck_domain::{
    Category, DateRange, ExtraParams, MetricConfig, QueryText, Trend, ValueFormat,
};

/// Events that count as activation within a user's first day.
const ACTIVATION_EVENTS: &str = "'purchase', 'complete_registration', 'schedule'";

const ACTIVATION_WINDOW_HOURS: u32 = 24;

pub(super) fn dormant_account_rate() -> MetricConfig {
    MetricConfig::new(
        "dormant_account_rate",
        "Dormant Account Rate",
        Category::CustomerSuccess,
        ValueFormat::Percentage,
        dormant_summary,
    )
    .with_description("Percentage of new purchasers with zero sessions after first purchase")
    .with_details(dormant_details)
    .with_color("bg-red-50 border-red-200 text-red-700")
    .with_icon("Users")
    .with_trend(Trend::Down, "-2.3%")
    .with_param_option("dormant", ["true", "false"])
}

pub(super) fn t24h_activation_rate<D: Dialect>() -> MetricConfig {
    MetricConfig::new(
        "t24h_activation_rate",
        "24h Activation Rate",
        Category::CustomerSuccess,
        ValueFormat::Percentage,
        activation_summary::<D>,
    )
    .with_description("Percentage of new users who performed a key action within 24 hours")
    .with_details(activation_details::<D>)
    .with_color("bg-blue-50 border-blue-200 text-blue-700")
    .with_icon("Target")
    .with_trend(Trend::Up, "+3.8%")
    .with_param_option("activated", ["true", "false"])
}

fn purchasers_cte(range: &DateRange) -> String {
    format!(
        "WITH first_purchases AS (
        SELECT ANONYMOUS_ID, MIN(ORIGINAL_TIMESTAMP) AS first_purchase_date
        FROM TRACKS
        WHERE EVENT = 'purchase'
          AND {}
        GROUP BY ANONYMOUS_ID
    ),
    user_sessions_after_purchase AS (
        SELECT fp.ANONYMOUS_ID, fp.first_purchase_date,
               CASE WHEN COUNT(t.ORIGINAL_TIMESTAMP) = 0 THEN 1 ELSE 0 END AS is_dormant
        FROM first_purchases fp
        LEFT JOIN TRACKS t ON fp.ANONYMOUS_ID = t.ANONYMOUS_ID
            AND t.ORIGINAL_TIMESTAMP > fp.first_purchase_date
        GROUP BY fp.ANONYMOUS_ID, fp.first_purchase_date
    )",
        inclusive_range("ORIGINAL_TIMESTAMP", range)
    )
}

fn dormant_summary(range: &DateRange) -> QueryText {
    QueryText::new(format!(
        "{}
    SELECT COUNT(*) AS total_users,
           SUM(is_dormant) AS dormant_users,
           CASE WHEN COUNT(*) > 0 THEN CAST(SUM(is_dormant) AS REAL) / COUNT(*) END
               AS dormant_rate
    FROM user_sessions_after_purchase",
        purchasers_cte(range)
    ))
}

fn dormant_details(range: &DateRange, params: &ExtraParams) -> QueryText {
    let filter = match flag_param(params, "dormant") {
        Some(true) => "WHERE is_dormant = 1",
        Some(false) => "WHERE is_dormant = 0",
        None => "",
    };
    QueryText::new(format!(
        "{}
    SELECT ANONYMOUS_ID AS user_id, first_purchase_date, is_dormant,
           CASE WHEN is_dormant = 1 THEN 'Dormant' ELSE 'Active' END AS status
    FROM user_sessions_after_purchase
    {filter}
    ORDER BY first_purchase_date DESC
    LIMIT {DETAILS_ROW_LIMIT}",
        purchasers_cte(range)
    ))
}

fn new_users_cte<D: Dialect>(range: &DateRange) -> String {
    let window = D::within_hours_after(
        "t.ORIGINAL_TIMESTAMP",
        "nu.first_event_date",
        ACTIVATION_WINDOW_HOURS,
    );
    format!(
        "WITH new_users AS (
        SELECT ANONYMOUS_ID, MIN(ORIGINAL_TIMESTAMP) AS first_event_date
        FROM TRACKS
        WHERE {}
        GROUP BY ANONYMOUS_ID
    ),
    activated_users AS (
        SELECT nu.ANONYMOUS_ID, nu.first_event_date,
               CASE WHEN COUNT(t.ORIGINAL_TIMESTAMP) > 0 THEN 1 ELSE 0 END AS is_activated,
               COUNT(t.ORIGINAL_TIMESTAMP) AS activation_events
        FROM new_users nu
        LEFT JOIN TRACKS t ON nu.ANONYMOUS_ID = t.ANONYMOUS_ID
            AND {window}
            AND t.EVENT IN ({ACTIVATION_EVENTS})
        GROUP BY nu.ANONYMOUS_ID, nu.first_event_date
    )",
        inclusive_range("ORIGINAL_TIMESTAMP", range)
    )
}

fn activation_summary<D: Dialect>(range: &DateRange) -> QueryText {
    QueryText::new(format!(
        "{}
    SELECT COUNT(*) AS total_users,
           SUM(is_activated) AS activated_users,
           CASE WHEN COUNT(*) > 0 THEN CAST(SUM(is_activated) AS REAL) / COUNT(*) END
               AS activation_rate
    FROM activated_users",
        new_users_cte::<D>(range)
    ))
}

fn activation_details<D: Dialect>(range: &DateRange, params: &ExtraParams) -> QueryText {
    let filter = match flag_param(params, "activated") {
        Some(true) => "WHERE is_activated = 1",
        Some(false) => "WHERE is_activated = 0",
        None => "",
    };
    QueryText::new(format!(
        "{}
    SELECT ANONYMOUS_ID AS user_id, first_event_date, is_activated, activation_events,
           CASE WHEN is_activated = 1 THEN 'Activated' ELSE 'Not Activated' END AS status
    FROM activated_users
    {filter}
    ORDER BY first_event_date DESC
    LIMIT {DETAILS_ROW_LIMIT}",
        new_users_cte::<D>(range)
    ))
}
