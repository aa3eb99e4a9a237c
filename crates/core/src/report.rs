//! Analysis reports served next to the metric cards.
//!
//! A report pairs an aggregate query with the row-level query it summarizes.
//! Unlike metrics, a report has no envelope: a failing query fails the whole
//! report.

use metricdeck_domain::{Row, SummaryQueryFn};
use serde::Serialize;

/// Summary and row-level queries behind one analysis endpoint.
#[derive(Debug, Clone, Copy)]
pub struct ReportQueries {
    pub name: &'static str,
    pub summary: SummaryQueryFn,
    pub details: SummaryQueryFn,
}

/// Output of running a [`ReportQueries`] pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    /// First summary row, or an empty object when the query returned none.
    pub summary: Row,
    pub detailed_data: Vec<Row>,
    pub total_records: usize,
}

impl Report {
    pub fn new(summary_rows: Vec<Row>, detailed_data: Vec<Row>) -> Self {
        Self {
            summary: summary_rows.into_iter().next().unwrap_or_default(),
            total_records: detailed_data.len(),
            detailed_data,
        }
    }
}
