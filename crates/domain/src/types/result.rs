//! The normalized envelope returned for every metric.

use serde::{Deserialize, Serialize};

use super::query::Row;
use crate::impl_domain_status_conversions;

/// Outcome of computing one metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricStatus {
    Ok,
    Warning,
    Error,
    Missing,
    Partial,
}

impl_domain_status_conversions!(MetricStatus {
    Ok => "ok",
    Warning => "warning",
    Error => "error",
    Missing => "missing",
    Partial => "partial",
});

/// Result envelope for one metric in one request.
///
/// `value` is absent for `missing`/`error` results and for tabular formats,
/// which carry their rows in `data` instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    pub status: MetricStatus,
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Row>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numerator: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub denominator: Option<f64>,
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
}

impl MetricResult {
    fn with_status(status: MetricStatus) -> Self {
        Self {
            status,
            value: None,
            data: None,
            numerator: None,
            denominator: None,
            message: None,
            execution_time_ms: None,
        }
    }

    /// Scalar result with a headline value.
    pub fn ok(value: f64) -> Self {
        Self { value: Some(value), ..Self::with_status(MetricStatus::Ok) }
    }

    /// Tabular result (list/pareto formats).
    pub fn rows(rows: Vec<Row>) -> Self {
        Self { data: Some(rows), ..Self::with_status(MetricStatus::Ok) }
    }

    pub fn missing(message: impl Into<String>) -> Self {
        Self { message: Some(message.into()), ..Self::with_status(MetricStatus::Missing) }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { message: Some(message.into()), ..Self::with_status(MetricStatus::Error) }
    }

    pub fn with_counts(mut self, numerator: Option<f64>, denominator: Option<f64>) -> Self {
        self.numerator = numerator;
        self.denominator = denominator;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_execution_time_ms(mut self, elapsed_ms: u64) -> Self {
        self.execution_time_ms = Some(elapsed_ms);
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == MetricStatus::Ok
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn error_envelope_serializes_null_value() {
        let result = MetricResult::error("Error calculating churn: timeout");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            json!({
                "status": "error",
                "value": null,
                "message": "Error calculating churn: timeout",
            })
        );
    }

    #[test]
    fn ok_envelope_carries_counts() {
        let result = MetricResult::ok(0.25)
            .with_counts(Some(5.0), Some(20.0))
            .with_message("5 out of 20 users (25.0%)")
            .with_execution_time_ms(12);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["value"], 0.25);
        assert_eq!(json["numerator"], 5.0);
        assert_eq!(json["denominator"], 20.0);
        assert_eq!(json["execution_time_ms"], 12);
        assert!(json.get("data").is_none());
    }

    #[test]
    fn status_parses_from_wire_name() {
        assert_eq!("PARTIAL".parse::<MetricStatus>().unwrap(), MetricStatus::Partial);
        assert_eq!(MetricStatus::Warning.to_string(), "warning");
    }
}
