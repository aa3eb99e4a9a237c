//! Facebook Lead Ads attribution for paid subscriptions.
//!
//! Subscriptions on starter, premium or elite products created in the range
//! are matched against lead-form identities submitted in the same range. A
//! subscription counts as Facebook-sourced when its customer email equals a
//! lead's email or the phone number the lead typed into the form.

use metricdeck_core::query::inclusive_range;
use metricdeck_core::ReportQueries;
use metricdeck_domain::{DateRange, QueryText};

/// Summary plus per-subscription breakdown of lead-ad attribution.
pub fn facebook_subscription_analysis() -> ReportQueries {
    ReportQueries {
        name: "facebook_subscription_analysis",
        summary: attribution_summary,
        details: attribution_details,
    }
}

fn attributed_subscriptions(range: &DateRange) -> String {
    format!(
        "WITH facebook_leads AS (
        SELECT DISTINCT EMAIL, PHONE_NUMBER, USER_PROVIDED_PHONE_NUMBER
        FROM FACEBOOK_LEAD_ADS.IDENTIFIES
        WHERE {leads_window}
          AND (EMAIL IS NOT NULL
               OR PHONE_NUMBER IS NOT NULL
               OR USER_PROVIDED_PHONE_NUMBER IS NOT NULL)
    ),
    plan_subscriptions AS (
        SELECT s.ID AS subscription_id,
               s.CREATED AS created,
               s.STATUS AS status,
               c.EMAIL AS customer_email,
               c.DESCRIPTION AS customer_name,
               pr.NAME AS product_name,
               p.AMOUNT AS amount,
               p.CURRENCY AS currency
        FROM STRIPE.SUBSCRIPTIONS s
        JOIN STRIPE.CUSTOMERS c ON s.CUSTOMER_ID = c.ID
        JOIN STRIPE.PLANS p ON s.PLAN_ID = p.ID
        JOIN STRIPE.PRODUCTS pr ON p.PRODUCT = pr.ID
        WHERE {subscriptions_window}
          AND (LOWER(pr.NAME) LIKE '%starter%'
               OR LOWER(pr.NAME) LIKE '%elite%'
               OR LOWER(pr.NAME) LIKE '%premium%')
    ),
    attributed AS (
        SELECT ps.*,
               CASE WHEN fl.EMAIL IS NOT NULL
                         OR fl.PHONE_NUMBER IS NOT NULL
                         OR fl.USER_PROVIDED_PHONE_NUMBER IS NOT NULL
                    THEN 'Facebook Lead Ad'
                    ELSE 'Other Source'
               END AS attribution_source,
               fl.EMAIL AS facebook_email,
               COALESCE(fl.PHONE_NUMBER, fl.USER_PROVIDED_PHONE_NUMBER) AS facebook_phone
        FROM plan_subscriptions ps
        LEFT JOIN facebook_leads fl
          ON LOWER(ps.customer_email) = LOWER(fl.EMAIL)
          OR LOWER(ps.customer_email) = LOWER(fl.USER_PROVIDED_PHONE_NUMBER)
    )",
        leads_window = inclusive_range("TIMESTAMP", range),
        subscriptions_window = inclusive_range("s.CREATED", range),
    )
}

fn attribution_summary(range: &DateRange) -> QueryText {
    QueryText::new(format!(
        "{}
    SELECT COUNT(*) AS total_subscriptions,
           COUNT(CASE WHEN attribution_source = 'Facebook Lead Ad' THEN 1 END) AS from_facebook,
           COUNT(CASE WHEN attribution_source = 'Other Source' THEN 1 END) AS from_other_sources,
           CASE WHEN COUNT(*) > 0
               THEN ROUND(COUNT(CASE WHEN attribution_source = 'Facebook Lead Ad' THEN 1 END)
                          * 100.0 / COUNT(*), 2)
               ELSE 0
           END AS facebook_percentage
    FROM attributed",
        attributed_subscriptions(range)
    ))
}

fn attribution_details(range: &DateRange) -> QueryText {
    QueryText::new(format!(
        "{}
    SELECT subscription_id,
           customer_email,
           customer_name,
           product_name,
           created,
           status,
           amount,
           currency,
           attribution_source,
           facebook_email,
           facebook_phone,
           CASE WHEN attribution_source = 'Facebook Lead Ad' THEN 'Yes' ELSE 'No' END
               AS from_facebook
    FROM attributed
    ORDER BY created DESC",
        attributed_subscriptions(range)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn march() -> DateRange {
        DateRange::parse("2025-03-01", "2025-03-31").unwrap()
    }

    #[test]
    fn both_queries_window_leads_and_subscriptions() {
        let report = facebook_subscription_analysis();
        for sql in [(report.summary)(&march()), (report.details)(&march())] {
            let sql = sql.as_str();
            assert!(sql.contains("TIMESTAMP >= '2025-03-01' AND TIMESTAMP < '2025-04-01'"));
            assert!(sql.contains("s.CREATED >= '2025-03-01' AND s.CREATED < '2025-04-01'"));
            assert!(!sql.contains("CURRENT_TIMESTAMP"));
            assert!(!sql.contains("DATEADD"));
        }
    }

    #[test]
    fn summary_guards_the_percentage_against_no_subscriptions() {
        let sql = attribution_summary(&march());
        assert!(sql.as_str().contains("CASE WHEN COUNT(*) > 0"));
        assert!(sql.as_str().contains("AS facebook_percentage"));
    }

    #[test]
    fn details_list_newest_subscriptions_first() {
        let sql = attribution_details(&march());
        assert!(sql.as_str().contains("AS from_facebook"));
        assert!(sql.as_str().trim_end().ends_with("ORDER BY created DESC"));
    }

    #[test]
    fn only_tiered_products_are_considered() {
        let sql = attribution_summary(&march());
        for tier in ["starter", "premium", "elite"] {
            assert!(sql.as_str().contains(&format!("LIKE '%{tier}%'")), "{tier}");
        }
    }
}
