//! Inclusive date range consumed by every query provider.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::errors::{DashboardError, Result};

/// Inclusive `[start, end]` calendar date range.
///
/// Only existence and format are validated. A reversed range is passed through
/// unchanged and simply yields empty query results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Parse both bounds from ISO 8601 strings.
    ///
    /// # Errors
    /// Returns `DashboardError::InvalidInput` naming the offending bound.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start = parse_date(start)
            .map_err(|e| DashboardError::InvalidInput(format!("start: {e}")))?;
        let end =
            parse_date(end).map_err(|e| DashboardError::InvalidInput(format!("end: {e}")))?;
        Ok(Self { start, end })
    }

    /// The `days`-long window ending on `today` (inclusive).
    pub fn trailing_days(today: NaiveDate, days: i64) -> Self {
        Self { start: today - Duration::days(days), end: today }
    }

    /// Number of calendar days covered, counting both ends.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// First day after the range, for half-open timestamp filters.
    ///
    /// `None` only when `end` is the last representable date.
    pub fn end_exclusive(&self) -> Option<NaiveDate> {
        self.end.succ_opt()
    }

    /// `start` formatted as `YYYY-MM-DD`.
    pub fn start_iso(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    /// `end` formatted as `YYYY-MM-DD`.
    pub fn end_iso(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start_iso(), self.end_iso())
    }
}

/// Parse an ISO 8601 date or timestamp, keeping only its calendar date.
///
/// Accepts `2025-01-31`, `2025-01-31T10:00:00`, `2025-01-31 10:00:00` and
/// RFC 3339 timestamps such as `2025-01-31T10:00:00.000Z`. Timestamps with an
/// offset keep the date as written in that offset.
pub fn parse_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("empty date".to_string());
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.date_naive());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Ok(ts.date());
        }
    }

    Err(format!("'{raw}' is not an ISO 8601 date"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_plain_dates() {
        let range = DateRange::parse("2025-01-01", "2025-01-31").unwrap();
        assert_eq!(range.start, date(2025, 1, 1));
        assert_eq!(range.end, date(2025, 1, 31));
        assert_eq!(range.days(), 31);
        assert_eq!(range.end_exclusive(), Some(date(2025, 2, 1)));
    }

    #[test]
    fn end_exclusive_crosses_year_and_saturates() {
        let december = DateRange::new(date(2024, 12, 1), date(2024, 12, 31));
        assert_eq!(december.end_exclusive(), Some(date(2025, 1, 1)));
        assert_eq!(DateRange::new(NaiveDate::MIN, NaiveDate::MAX).end_exclusive(), None);
    }

    #[test]
    fn parses_timestamps_from_browsers() {
        assert_eq!(parse_date("2025-01-31T23:59:59.999Z").unwrap(), date(2025, 1, 31));
        assert_eq!(parse_date("2025-01-31T10:00:00+05:00").unwrap(), date(2025, 1, 31));
        assert_eq!(parse_date("2025-01-31T10:00:00").unwrap(), date(2025, 1, 31));
        assert_eq!(parse_date("2025-01-31 10:00:00").unwrap(), date(2025, 1, 31));
    }

    #[test]
    fn rejects_garbage_with_bound_name() {
        let err = DateRange::parse("2025-01-01", "last tuesday").unwrap_err();
        assert!(matches!(err, DashboardError::InvalidInput(ref msg) if msg.starts_with("end:")));
        assert!(DateRange::parse("", "2025-01-01").is_err());
    }

    #[test]
    fn reversed_ranges_are_not_rejected() {
        let range = DateRange::parse("2025-02-01", "2025-01-01").unwrap();
        assert!(range.start > range.end);
    }

    #[test]
    fn trailing_window_ends_today() {
        let range = DateRange::trailing_days(date(2025, 3, 31), 30);
        assert_eq!(range.start, date(2025, 3, 1));
        assert_eq!(range.end, date(2025, 3, 31));
        assert_eq!(range.to_string(), "2025-03-01..2025-03-31");
    }
}
