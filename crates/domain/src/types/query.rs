//! Query payload types shared by query providers and warehouse gateways.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::range::DateRange;

/// A single result row, keyed by column name as returned by the warehouse.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Extra request parameters forwarded to details queries (e.g. `dormant=true`).
///
/// Providers read the keys they understand and ignore the rest.
pub type ExtraParams = BTreeMap<String, String>;

/// Builds the aggregate query behind a metric's headline value.
pub type SummaryQueryFn = fn(&DateRange) -> QueryText;

/// Builds the row-level drill-down query for a metric.
pub type DetailsQueryFn = fn(&DateRange, &ExtraParams) -> QueryText;

/// SQL text produced by a query provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryText(String);

impl QueryText {
    /// Wrap raw SQL text.
    pub fn new(sql: impl Into<String>) -> Self {
        Self(sql.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// First `max_chars` characters with whitespace runs collapsed, for log lines.
    pub fn preview(&self, max_chars: usize) -> String {
        let collapsed = self.0.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.chars().count() <= max_chars {
            return collapsed;
        }
        let mut truncated: String = collapsed.chars().take(max_chars).collect();
        truncated.push_str("...");
        truncated
    }
}

impl fmt::Display for QueryText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for QueryText {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for QueryText {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl AsRef<str> for QueryText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
