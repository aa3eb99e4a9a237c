//! Declarative business bands attached to a metric.
//!
//! A metric carries an ordered list of thresholds. After normalization the
//! service walks the list and the first matching band replaces the result's
//! status and message.

use serde::{Deserialize, Serialize};

use super::result::MetricStatus;

/// Comparison applied to a metric value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", content = "limit", rename_all = "snake_case")]
pub enum Bound {
    /// Matches when `value < limit`.
    Below(f64),
    /// Matches when `value > limit`.
    Above(f64),
}

impl Bound {
    pub fn matches(&self, value: f64) -> bool {
        match *self {
            Self::Below(limit) => value < limit,
            Self::Above(limit) => value > limit,
        }
    }
}

/// One `(predicate, status, message)` band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub bound: Bound,
    pub status: MetricStatus,
    pub message: String,
}

impl Threshold {
    pub fn below(limit: f64, status: MetricStatus, message: impl Into<String>) -> Self {
        Self { bound: Bound::Below(limit), status, message: message.into() }
    }

    pub fn above(limit: f64, status: MetricStatus, message: impl Into<String>) -> Self {
        Self { bound: Bound::Above(limit), status, message: message.into() }
    }

    /// First threshold in `bands` matching `value`.
    pub fn first_match(bands: &[Self], value: f64) -> Option<&Self> {
        bands.iter().find(|band| band.bound.matches(value))
    }
}
