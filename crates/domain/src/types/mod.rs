//! Domain types and models
//!
//! Everything the registry, the service and the HTTP layer exchange:
//! metric descriptors, result envelopes, date ranges and query payloads.

pub mod metric;
pub mod query;
pub mod range;
pub mod result;
pub mod threshold;

pub use metric::{Category, DisplayHints, MetricConfig, MetricDescriptor, Trend, ValueFormat};
pub use query::{DetailsQueryFn, ExtraParams, QueryText, Row, SummaryQueryFn};
pub use range::DateRange;
pub use result::{MetricResult, MetricStatus};
pub use threshold::{Bound, Threshold};
