//! Finance metrics backed by the Stripe share: involuntary churn, dunning
//! recovery and the payment-failure Pareto.

use metricdeck_core::query::inclusive_range;
use metricdeck_domain::constants::{DETAILS_ROW_LIMIT, SUMMARY_LIST_LIMIT};
use metricdeck_domain::{
    Category, DateRange, ExtraParams, MetricConfig, QueryText, Trend, ValueFormat,
};

pub(super) fn involuntary_churn_rate() -> MetricConfig {
    MetricConfig::new(
        "involuntary_churn_rate",
        "Involuntary Churn Rate",
        Category::Finance,
        ValueFormat::Percentage,
        churn_summary,
    )
    .with_description("Percentage of subscriptions canceled due to failed payments")
    .with_details(churn_details)
    .with_color("bg-orange-50 border-orange-200 text-orange-700")
    .with_icon("CreditCard")
    .with_trend(Trend::Up, "+1.1%")
}

pub(super) fn dunning_recovery_rate() -> MetricConfig {
    MetricConfig::new(
        "dunning_recovery_rate",
        "Dunning Recovery Rate",
        Category::Finance,
        ValueFormat::Percentage,
        dunning_summary,
    )
    .with_description("Percentage of failed payments that were successfully recovered")
    .with_details(dunning_details)
    .with_color("bg-green-50 border-green-200 text-green-700")
    .with_icon("AlertTriangle")
    .with_trend(Trend::Up, "+5.2%")
}

pub(super) fn root_cause_pareto() -> MetricConfig {
    MetricConfig::new(
        "root_cause_pareto",
        "Root Cause Pareto",
        Category::Finance,
        ValueFormat::Pareto,
        pareto_summary,
    )
    .with_description("Top payment failure reasons")
    .with_details(pareto_details)
    .with_color("bg-rose-50 border-rose-200 text-rose-700")
    .with_icon("Activity")
}

fn churn_summary(range: &DateRange) -> QueryText {
    QueryText::new(format!(
        "SELECT COUNT(*) AS total_cancels,
           COUNT(CASE WHEN s.STATUS = 'canceled' AND s.CANCELED_AT IS NOT NULL THEN 1 END)
               AS canceled_subscriptions,
           CASE WHEN COUNT(*) > 0
               THEN CAST(COUNT(CASE WHEN s.STATUS = 'canceled'
                                    AND s.CANCELED_AT IS NOT NULL THEN 1 END) AS REAL)
                    / COUNT(*)
               ELSE 0
           END AS churn_rate
    FROM STRIPE.SUBSCRIPTIONS s
    WHERE s.STATUS = 'canceled'
      AND {}",
        inclusive_range("s.CANCELED_AT", range)
    ))
}

fn churn_details(range: &DateRange, _params: &ExtraParams) -> QueryText {
    QueryText::new(format!(
        "SELECT s.CUSTOMER_ID AS customer_id, s.CANCELED_AT AS canceled_at, c.EMAIL AS email
    FROM STRIPE.SUBSCRIPTIONS s
    LEFT JOIN STRIPE.CUSTOMERS c ON s.CUSTOMER_ID = c.ID
    WHERE s.STATUS = 'canceled'
      AND {}
    ORDER BY s.CANCELED_AT DESC
    LIMIT {DETAILS_ROW_LIMIT}",
        inclusive_range("s.CANCELED_AT", range)
    ))
}

/// Invoices that failed in range, and those later paid within the range.
fn dunning_ctes(range: &DateRange) -> String {
    format!(
        "WITH failed AS (
        SELECT ID AS invoice_id, CUSTOMER_ID, MIN(CREATED) AS first_failed
        FROM STRIPE.INVOICES
        WHERE STATUS = 'failed'
          AND {}
        GROUP BY ID, CUSTOMER_ID
    ),
    recovered AS (
        SELECT i.ID AS invoice_id, i.CUSTOMER_ID AS customer_id, i.CREATED AS paid_at,
               c.EMAIL AS email
        FROM STRIPE.INVOICES i
        JOIN failed f ON i.ID = f.invoice_id
        LEFT JOIN STRIPE.CUSTOMERS c ON i.CUSTOMER_ID = c.ID
        WHERE i.STATUS = 'paid'
          AND i.CREATED > f.first_failed
          AND {}
    )",
        inclusive_range("CREATED", range),
        inclusive_range("i.CREATED", range)
    )
}

fn dunning_summary(range: &DateRange) -> QueryText {
    QueryText::new(format!(
        "{}
    SELECT (SELECT COUNT(*) FROM recovered) AS recovered,
           (SELECT COUNT(*) FROM failed) AS failed,
           CASE WHEN (SELECT COUNT(*) FROM failed) > 0
               THEN CAST((SELECT COUNT(*) FROM recovered) AS REAL) / (SELECT COUNT(*) FROM failed)
               ELSE 0
           END AS dunning_recovery_rate",
        dunning_ctes(range)
    ))
}

fn dunning_details(range: &DateRange, _params: &ExtraParams) -> QueryText {
    QueryText::new(format!(
        "{}
    SELECT invoice_id, customer_id, paid_at, email
    FROM recovered
    ORDER BY paid_at DESC
    LIMIT {DETAILS_ROW_LIMIT}",
        dunning_ctes(range)
    ))
}

fn failed_charges(range: &DateRange) -> String {
    format!(
        "FROM STRIPE.CHARGES
    WHERE STATUS = 'failed'
      AND FAILURE_CODE IS NOT NULL
      AND {}",
        inclusive_range("CREATED", range)
    )
}

fn pareto_summary(range: &DateRange) -> QueryText {
    QueryText::new(format!(
        "SELECT FAILURE_CODE AS reason, COUNT(*) AS count
    {}
    GROUP BY FAILURE_CODE
    ORDER BY count DESC
    LIMIT {SUMMARY_LIST_LIMIT}",
        failed_charges(range)
    ))
}

fn pareto_details(range: &DateRange, _params: &ExtraParams) -> QueryText {
    QueryText::new(format!(
        "SELECT DATE(CREATED) AS date, FAILURE_CODE AS reason, COUNT(*) AS count
    {}
    GROUP BY DATE(CREATED), FAILURE_CODE
    ORDER BY date DESC, count DESC
    LIMIT {DETAILS_ROW_LIMIT}",
        failed_charges(range)
    ))
}
