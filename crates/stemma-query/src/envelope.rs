//! The uniform result envelope.

use serde::{Deserialize, Serialize};
use stemma_common::diagnostic::Diagnostic;

/// Answer to any query.
///
/// Exactly one of `data` and `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult<T> {
    /// The answer, when the query succeeded.
    pub data: Option<T>,
    /// Why the query produced no answer.
    pub error: Option<String>,
    /// Diagnostics relevant to the answer.
    pub diagnostics: Vec<Diagnostic>,
    /// Wall-clock time spent answering.
    pub elapsed_time_ms: f64,
}

impl<T> QueryResult<T> {
    /// Whether the query produced an answer.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.data.is_some()
    }

    /// Returns the answer, if any.
    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }
}
