//! Static metric descriptors.
//!
//! A [`MetricConfig`] is built once at startup, handed to the registry and
//! never mutated afterwards. Its [`ValueFormat`] decides how a raw warehouse
//! row is read back into a [`super::MetricResult`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::query::{DetailsQueryFn, SummaryQueryFn};
use super::threshold::Threshold;
use crate::impl_domain_status_conversions;

/// Dashboard section a metric belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Customer Success")]
    CustomerSuccess,
    #[serde(rename = "Finance")]
    Finance,
    #[serde(rename = "Marketing")]
    Marketing,
    #[serde(rename = "Product & IT")]
    ProductIt,
}

impl Category {
    pub const ALL: [Self; 4] =
        [Self::CustomerSuccess, Self::Finance, Self::Marketing, Self::ProductIt];

    /// Human-readable name, also used on the wire.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::CustomerSuccess => "Customer Success",
            Self::Finance => "Finance",
            Self::Marketing => "Marketing",
            Self::ProductIt => "Product & IT",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.display_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("Invalid Category: {s}"))
    }
}

/// How a metric's raw result is interpreted and rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueFormat {
    Percentage,
    Ratio,
    Currency,
    Count,
    List,
    Pareto,
}

impl_domain_status_conversions!(ValueFormat {
    Percentage => "percentage",
    Ratio => "ratio",
    Currency => "currency",
    Count => "count",
    List => "list",
    Pareto => "pareto",
});

impl ValueFormat {
    /// Column names accepted for the headline value, in priority order.
    ///
    /// Tabular formats have no scalar value and return an empty slice.
    pub fn value_columns(&self) -> &'static [&'static str] {
        match self {
            Self::Percentage => &[
                "rate",
                "percentage",
                "ratio",
                "dormant_rate",
                "activation_rate",
                "churn_rate",
                "dunning_recovery_rate",
            ],
            Self::Ratio => &["ratio", "cac_to_ltv_ratio", "value"],
            Self::Count => &["total", "count", "total_leads", "total_users"],
            Self::Currency => &["amount", "revenue", "spend", "value"],
            Self::List | Self::Pareto => &[],
        }
    }

    /// Whether results of this format are row sets rather than a single value.
    pub fn is_tabular(&self) -> bool {
        matches!(self, Self::List | Self::Pareto)
    }
}

/// Direction of the trend arrow shown on a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
}

impl_domain_status_conversions!(Trend {
    Up => "up",
    Down => "down",
});

/// Presentation hints forwarded untouched to the frontend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayHints {
    pub color: String,
    pub icon: String,
    pub trend: Option<Trend>,
    pub trend_value: Option<String>,
}

impl Default for DisplayHints {
    fn default() -> Self {
        Self {
            color: "bg-blue-50 border-blue-200 text-blue-700".to_string(),
            icon: "Activity".to_string(),
            trend: None,
            trend_value: None,
        }
    }
}

/// Static descriptor of one dashboard metric.
#[derive(Debug, Clone)]
pub struct MetricConfig {
    pub key: String,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub value_format: ValueFormat,
    pub summary_query: SummaryQueryFn,
    pub details_query: Option<DetailsQueryFn>,
    pub display: DisplayHints,
    /// Extra details parameters understood by `details_query`, with their allowed values.
    pub param_options: BTreeMap<String, Vec<String>>,
    /// Ordered business bands; first match wins.
    pub thresholds: Vec<Threshold>,
}

impl MetricConfig {
    pub fn new(
        key: impl Into<String>,
        title: impl Into<String>,
        category: Category,
        value_format: ValueFormat,
        summary_query: SummaryQueryFn,
    ) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            description: String::new(),
            category,
            value_format,
            summary_query,
            details_query: None,
            display: DisplayHints::default(),
            param_options: BTreeMap::new(),
            thresholds: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_details(mut self, details_query: DetailsQueryFn) -> Self {
        self.details_query = Some(details_query);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.display.color = color.into();
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.display.icon = icon.into();
        self
    }

    pub fn with_trend(mut self, trend: Trend, trend_value: impl Into<String>) -> Self {
        self.display.trend = Some(trend);
        self.display.trend_value = Some(trend_value.into());
        self
    }

    /// Declare a details filter parameter and its allowed values.
    pub fn with_param_option<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.param_options.insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_threshold(mut self, threshold: Threshold) -> Self {
        self.thresholds.push(threshold);
        self
    }

    pub fn has_details(&self) -> bool {
        self.details_query.is_some()
    }

    pub fn requires_params(&self) -> bool {
        !self.param_options.is_empty()
    }

    /// Serializable view for the frontend's configuration endpoint.
    pub fn descriptor(&self) -> MetricDescriptor {
        MetricDescriptor {
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category,
            metric_type: self.value_format,
            color: self.display.color.clone(),
            icon: self.display.icon.clone(),
            trend: self.display.trend,
            trend_value: self.display.trend_value.clone(),
            requires_params: self.requires_params(),
            param_options: (!self.param_options.is_empty()).then(|| self.param_options.clone()),
            has_details: self.has_details(),
        }
    }
}

/// Frontend-facing description of a registered metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDescriptor {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub metric_type: ValueFormat,
    pub color: String,
    pub icon: String,
    pub trend: Option<Trend>,
    pub trend_value: Option<String>,
    pub requires_params: bool,
    pub param_options: Option<BTreeMap<String, Vec<String>>>,
    pub has_details: bool,
}
