//! Per-query timing reports.

use std::sync::Arc;

use serde::Serialize;

/// Timing and size of one answered query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryMetrics {
    /// Operation name, e.g. `get_catalog`.
    pub operation: &'static str,
    /// Wall-clock time spent answering.
    pub response_time_ms: f64,
    /// Number of records in the answer.
    pub result_count: usize,
}

/// Callback receiving a [`QueryMetrics`] after every query.
pub type MetricsObserver = Arc<dyn Fn(&QueryMetrics) + Send + Sync>;
