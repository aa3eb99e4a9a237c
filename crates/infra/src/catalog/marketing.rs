//! Marketing metrics: Facebook acquisition efficiency and lead volume.

use metricdeck_core::query::inclusive_range;
use metricdeck_domain::constants::DETAILS_ROW_LIMIT;
use metricdeck_domain::{
    Category, DateRange, ExtraParams, MetricConfig, MetricStatus, QueryText, Threshold, Trend,
    ValueFormat,
};

/// Months of average revenue counted as lifetime value.
const LTV_MONTHS: u32 = 12;

pub(super) fn facebook_cac_to_ltv_ratio() -> MetricConfig {
    MetricConfig::new(
        "facebook_cac_to_ltv_ratio",
        "Facebook CAC to LTV Ratio",
        Category::Marketing,
        ValueFormat::Ratio,
        cac_to_ltv_summary,
    )
    .with_description("Customer Acquisition Cost to Lifetime Value ratio for Facebook ads")
    .with_details(cac_to_ltv_details)
    .with_color("bg-purple-50 border-purple-200 text-purple-700")
    .with_icon("TrendingUp")
    .with_trend(Trend::Up, "+0.2")
    .with_threshold(Threshold::below(2.0, MetricStatus::Error, "Overspending"))
    .with_threshold(Threshold::below(3.0, MetricStatus::Warning, "Slightly Overspending"))
    .with_threshold(Threshold::above(5.0, MetricStatus::Error, "Underspending"))
    .with_threshold(Threshold::above(4.0, MetricStatus::Warning, "Slightly Underspending"))
}

pub(super) fn facebook_lead_ads_total() -> MetricConfig {
    MetricConfig::new(
        "facebook_lead_ads_total",
        "Facebook Lead Ads Total",
        Category::Marketing,
        ValueFormat::Count,
        lead_ads_summary,
    )
    .with_description("Total count of Facebook lead ads in the selected date range")
    .with_details(lead_ads_details)
    .with_color("bg-pink-50 border-pink-200 text-pink-700")
    .with_icon("DollarSign")
    .with_trend(Trend::Up, "+12%")
}

// A range without Facebook conversions yields a NULL ratio, which normalizes
// to `missing` instead of tripping the "Overspending" band with a zero.
fn cac_to_ltv_summary(range: &DateRange) -> QueryText {
    QueryText::new(format!(
        "WITH facebook_spend AS (
        SELECT SUM(SPEND) AS total_spend
        FROM FACEBOOKADS.INSIGHTS
        WHERE {spend}
    ),
    facebook_conversions AS (
        SELECT COUNT(DISTINCT USER_ID) AS conversions
        FROM PURCHASE
        WHERE {purchases}
          AND CONTEXT_CAMPAIGN_SOURCE = 'facebook'
    ),
    avg_revenue AS (
        SELECT AVG(VALUE) AS avg_revenue
        FROM PURCHASE
        WHERE {purchases}
    )
    SELECT COALESCE(fs.total_spend, 0) AS total_spend,
           COALESCE(fc.conversions, 0) AS conversions,
           COALESCE(ar.avg_revenue, 0) AS avg_revenue,
           CASE WHEN COALESCE(fc.conversions, 0) > 0
               THEN CAST(COALESCE(fs.total_spend, 0) AS REAL) / fc.conversions
           END AS cac,
           COALESCE(ar.avg_revenue, 0) * {LTV_MONTHS} AS ltv,
           CASE WHEN COALESCE(fc.conversions, 0) > 0 AND COALESCE(fs.total_spend, 0) > 0
               THEN (COALESCE(ar.avg_revenue, 0) * {LTV_MONTHS})
                    / (CAST(COALESCE(fs.total_spend, 0) AS REAL) / fc.conversions)
           END AS cac_to_ltv_ratio
    FROM facebook_spend fs
    CROSS JOIN facebook_conversions fc
    CROSS JOIN avg_revenue ar",
        spend = inclusive_range("DATE_START", range),
        purchases = inclusive_range("TIMESTAMP", range),
    ))
}

fn cac_to_ltv_details(range: &DateRange, _params: &ExtraParams) -> QueryText {
    QueryText::new(format!(
        "SELECT 'Facebook Ad Spend' AS metric_type, SUM(SPEND) AS value, 'USD' AS unit
    FROM FACEBOOKADS.INSIGHTS
    WHERE {spend}
    UNION ALL
    SELECT 'Facebook Conversions' AS metric_type, COUNT(DISTINCT USER_ID) AS value,
           'users' AS unit
    FROM PURCHASE
    WHERE {purchases}
      AND CONTEXT_CAMPAIGN_SOURCE = 'facebook'
    UNION ALL
    SELECT 'Average Revenue' AS metric_type, AVG(VALUE) AS value, 'USD' AS unit
    FROM PURCHASE
    WHERE {purchases}",
        spend = inclusive_range("DATE_START", range),
        purchases = inclusive_range("TIMESTAMP", range),
    ))
}

fn lead_ads_summary(range: &DateRange) -> QueryText {
    QueryText::new(format!(
        "SELECT COUNT(*) AS total_leads
    FROM FACEBOOK_LEAD_ADS.IDENTIFIES
    WHERE {}",
        inclusive_range("TIMESTAMP", range)
    ))
}

fn lead_ads_details(range: &DateRange, _params: &ExtraParams) -> QueryText {
    QueryText::new(format!(
        "SELECT ID AS user_id, TIMESTAMP AS timestamp, CAMPAIGN_NAME AS campaign_name,
           'facebook_lead_ads' AS source, EMAIL AS email, NAME AS name, PHONE_NUMBER AS phone
    FROM FACEBOOK_LEAD_ADS.IDENTIFIES
    WHERE {}
    ORDER BY TIMESTAMP DESC
    LIMIT {DETAILS_ROW_LIMIT}",
        inclusive_range("TIMESTAMP", range)
    ))
}
