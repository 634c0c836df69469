//! Aggregate index health.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stemma_common::diagnostic::Diagnostic;
use stemma_common::types::HealthStatus;

use crate::index::IndexSnapshot;

/// Health of the index at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Overall status.
    pub status: HealthStatus,
    /// Number of indexed components.
    pub component_count: usize,
    /// Every recorded diagnostic.
    pub diagnostics: Vec<Diagnostic>,
    /// When the index was last modified, if ever.
    pub last_indexed_at: Option<DateTime<Utc>>,
}

impl HealthReport {
    /// Derives the report from a snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: &IndexSnapshot) -> Self {
        let diagnostics = snapshot.diagnostics();
        Self {
            status: classify(snapshot.len(), diagnostics.len()),
            component_count: snapshot.len(),
            diagnostics,
            last_indexed_at: snapshot.last_indexed_at(),
        }
    }
}

const fn classify(components: usize, diagnostics: usize) -> HealthStatus {
    if components == 0 {
        HealthStatus::Empty
    } else if diagnostics > 0 {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}
