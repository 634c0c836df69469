//! The query engine.
//!
//! Every operation reads one snapshot of the index, so an answer never
//! mixes state from before and after a concurrent reindex.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use stemma_common::diagnostic::{Diagnostic, DiagnosticKind};
use stemma_common::error::StemmaError;
use stemma_index::health::HealthReport;
use stemma_index::index::{ComponentIndex, IndexSnapshot};
use stemma_index::metadata::ComponentMetadata;
use stemma_resolve::composition::{self, CompositionResult, RequiresCheck};

use crate::envelope::QueryResult;
use crate::metrics::{MetricsObserver, QueryMetrics};
use crate::projection::{
    CatalogEntry, ComponentFilter, ComponentSummary, MatchField, SearchHit, purpose_match,
};

/// What an operation produced before timing is attached.
struct Answer<T> {
    data: Result<T, String>,
    count: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<T> Answer<T> {
    const fn found(data: T, count: usize) -> Self {
        Self {
            data: Ok(data),
            count,
            diagnostics: Vec::new(),
        }
    }

    fn missing(name: &str) -> Self {
        let error = StemmaError::NotFound {
            kind: "component",
            id: name.to_string(),
        };
        let message = error.to_string();
        Self {
            diagnostics: vec![
                Diagnostic::new(DiagnosticKind::NotFound, message.clone()).for_component(name),
            ],
            data: Err(message),
            count: 0,
        }
    }

    fn with_diagnostics(mut self, diagnostics: &[Diagnostic]) -> Self {
        self.diagnostics.extend_from_slice(diagnostics);
        self
    }
}

/// Read-only query API over a shared [`ComponentIndex`].
pub struct QueryEngine {
    index: Arc<ComponentIndex>,
    observer: Option<MetricsObserver>,
}

impl std::fmt::Debug for QueryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEngine")
            .field("index", &self.index)
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

impl QueryEngine {
    /// Creates an engine over `index`.
    #[must_use]
    pub const fn new(index: Arc<ComponentIndex>) -> Self {
        Self {
            index,
            observer: None,
        }
    }

    /// Reports [`QueryMetrics`] for every answered query to `observer`.
    #[must_use]
    pub fn with_metrics(mut self, observer: MetricsObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Lists every component with its minimal projection, sorted by name.
    pub fn get_catalog(&self) -> QueryResult<Vec<CatalogEntry>> {
        self.answer("get_catalog", |snapshot| {
            let entries: Vec<CatalogEntry> = snapshot
                .entries()
                .map(|meta| CatalogEntry::from(meta.as_ref()))
                .collect();
            let count = entries.len();
            Answer::found(entries, count)
        })
    }

    /// Returns the summary projection of `name`.
    pub fn get_component_summary(&self, name: &str) -> QueryResult<ComponentSummary> {
        self.answer("get_component_summary", |snapshot| {
            snapshot.get(name).map_or_else(
                || Answer::missing(name),
                |meta| {
                    Answer::found(ComponentSummary::from(meta.as_ref()), 1)
                        .with_diagnostics(&meta.diagnostics)
                },
            )
        })
    }

    /// Returns the full metadata of `name`.
    pub fn get_component(&self, name: &str) -> QueryResult<ComponentMetadata> {
        self.answer("get_component", |snapshot| {
            snapshot.get(name).map_or_else(
                || Answer::missing(name),
                |meta| {
                    Answer::found(ComponentMetadata::clone(meta), 1)
                        .with_diagnostics(&meta.diagnostics)
                },
            )
        })
    }

    /// Lists components passing every set filter, sorted by name.
    pub fn find_components(&self, filter: &ComponentFilter) -> QueryResult<Vec<CatalogEntry>> {
        self.answer("find_components", |snapshot| {
            let entries: Vec<CatalogEntry> = snapshot
                .entries()
                .filter(|meta| filter.matches(meta))
                .map(|meta| CatalogEntry::from(meta.as_ref()))
                .collect();
            let count = entries.len();
            Answer::found(entries, count)
        })
    }

    /// Finds components whose purpose or description mentions `keyword`.
    ///
    /// Purpose matches rank before description-only matches; each tier is
    /// sorted by name. A blank keyword is rejected.
    pub fn search_by_purpose(&self, keyword: &str) -> QueryResult<Vec<SearchHit>> {
        self.answer("search_by_purpose", |snapshot| {
            if keyword.trim().is_empty() {
                return Answer {
                    data: Err("search keyword must not be empty".into()),
                    count: 0,
                    diagnostics: Vec::new(),
                };
            }
            let mut hits: Vec<SearchHit> = snapshot
                .entries()
                .filter_map(|meta| {
                    purpose_match(meta, keyword).map(|matched_on| SearchHit {
                        entry: CatalogEntry::from(meta.as_ref()),
                        matched_on,
                    })
                })
                .collect();
            hits.sort_by(|a, b| {
                tier(a.matched_on)
                    .cmp(&tier(b.matched_on))
                    .then_with(|| a.entry.name.cmp(&b.entry.name))
            });
            let count = hits.len();
            Answer::found(hits, count)
        })
    }

    /// Decides whether `parent` may contain `child`.
    ///
    /// `parent_props` feeds the conditional rules; without it only the
    /// static constraints apply.
    pub fn check_composition(
        &self,
        parent: &str,
        child: &str,
        parent_props: Option<&BTreeMap<String, Value>>,
    ) -> QueryResult<CompositionResult> {
        self.answer("check_composition", |snapshot| {
            snapshot.get(parent).map_or_else(
                || Answer::missing(parent),
                |meta| {
                    let result = composition::check(&meta.declaration, child, snapshot, parent_props);
                    Answer::found(result, 1)
                },
            )
        })
    }

    /// Checks that every child type `parent` requires is present.
    pub fn check_requires(
        &self,
        parent: &str,
        present_child_types: &[String],
    ) -> QueryResult<RequiresCheck> {
        self.answer("check_requires", |snapshot| {
            snapshot.get(parent).map_or_else(
                || Answer::missing(parent),
                |meta| {
                    let check = composition::validate_requires(&meta.declaration, present_child_types);
                    Answer::found(check, 1)
                },
            )
        })
    }

    /// Reports index health.
    pub fn get_health(&self) -> QueryResult<HealthReport> {
        self.answer("get_health", |snapshot| {
            let report = HealthReport::from_snapshot(snapshot);
            let count = report.component_count;
            Answer::found(report, count)
        })
    }

    fn answer<T>(
        &self,
        operation: &'static str,
        query: impl FnOnce(&IndexSnapshot) -> Answer<T>,
    ) -> QueryResult<T> {
        let started = Instant::now();
        let snapshot = self.index.snapshot();
        let answer = query(&snapshot);
        let elapsed_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        let metrics = QueryMetrics {
            operation,
            response_time_ms: elapsed_time_ms,
            result_count: answer.count,
        };
        tracing::debug!(
            operation,
            response_time_ms = metrics.response_time_ms,
            result_count = metrics.result_count,
            "query answered"
        );
        if let Some(observer) = &self.observer {
            observer(&metrics);
        }

        let (data, error) = match answer.data {
            Ok(data) => (Some(data), None),
            Err(error) => (None, Some(error)),
        };
        QueryResult {
            data,
            error,
            diagnostics: answer.diagnostics,
            elapsed_time_ms,
        }
    }
}

const fn tier(field: MatchField) -> u8 {
    match field {
        MatchField::Purpose => 0,
        MatchField::Description => 1,
    }
}
