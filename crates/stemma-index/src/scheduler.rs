//! Debounced per-unit reindexing.
//!
//! Each notification for a unit aborts that unit's pending timer and starts
//! a new one. Once a timer elapses its reindex runs to completion; later
//! notifications only schedule another run.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use stemma_common::config::IndexConfig;
use stemma_common::error::StemmaError;
use tokio::task::JoinHandle;

use crate::index::ComponentIndex;

struct PendingRun {
    generation: u64,
    handle: JoinHandle<()>,
}

type PendingMap = Arc<Mutex<HashMap<PathBuf, PendingRun>>>;

/// Coalesces change notifications into one reindex per unit.
pub struct ReindexScheduler {
    index: Arc<ComponentIndex>,
    delay: Duration,
    pending: PendingMap,
    generation: AtomicU64,
    runs: Arc<AtomicUsize>,
}

impl std::fmt::Debug for ReindexScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReindexScheduler")
            .field("delay", &self.delay)
            .field("pending", &self.pending())
            .field("runs", &self.runs())
            .finish_non_exhaustive()
    }
}

impl ReindexScheduler {
    /// Creates a scheduler that waits `delay` after the last notification.
    #[must_use]
    pub fn new(index: Arc<ComponentIndex>, delay: Duration) -> Self {
        Self {
            index,
            delay,
            pending: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
            runs: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Creates a scheduler using the configured debounce delay.
    #[must_use]
    pub fn from_config(index: Arc<ComponentIndex>, config: &IndexConfig) -> Self {
        Self::new(index, Duration::from_millis(config.debounce_ms))
    }

    /// Records that `unit` changed.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn notify(&self, unit: PathBuf) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let mut pending = self.pending.lock();

        if let Some(previous) = pending.remove(&unit) {
            previous.handle.abort();
            tracing::debug!(unit = %unit.display(), "debounce timer reset");
        }

        let handle = tokio::spawn(run_after_delay(
            Arc::clone(&self.index),
            Arc::clone(&self.pending),
            Arc::clone(&self.runs),
            unit.clone(),
            generation,
            self.delay,
        ));
        let _ = pending.insert(unit, PendingRun { generation, handle });
    }

    /// Number of units waiting for their timer.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Number of reindexes that completed successfully.
    #[must_use]
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::Relaxed)
    }

    /// Aborts every timer that has not yet elapsed.
    pub fn cancel_all(&self) {
        for (_, run) in self.pending.lock().drain() {
            run.handle.abort();
        }
    }
}

impl Drop for ReindexScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

async fn run_after_delay(
    index: Arc<ComponentIndex>,
    pending: PendingMap,
    runs: Arc<AtomicUsize>,
    unit: PathBuf,
    generation: u64,
    delay: Duration,
) {
    tokio::time::sleep(delay).await;

    {
        let mut map = pending.lock();
        if !map.get(&unit).is_some_and(|run| run.generation == generation) {
            return;
        }
        let _ = map.remove(&unit);
    }

    let target = unit.clone();
    match tokio::task::spawn_blocking(move || index.reindex_one(&target)).await {
        Ok(Ok(())) => {
            let _ = runs.fetch_add(1, Ordering::Relaxed);
            tracing::info!(unit = %unit.display(), "debounced reindex complete");
        }
        Ok(Err(e)) => {
            tracing::error!(unit = %unit.display(), error = %e, "debounced reindex failed");
        }
        Err(e) => {
            let error = StemmaError::Unexpected {
                message: format!("reindex task did not finish: {e}"),
            };
            tracing::error!(unit = %unit.display(), error = %error, "debounced reindex aborted");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn write_unit(root: &Path, unit: &str, name: &str) {
        let dir = root.join(unit);
        std::fs::create_dir_all(&dir).expect("mkdir");
        std::fs::write(
            dir.join(format!("{unit}.schema.yaml")),
            format!("name: {name}\ntype: primitive\n"),
        )
        .expect("write");
    }

    fn indexed(root: &Path) -> Arc<ComponentIndex> {
        let index = Arc::new(ComponentIndex::from_config(&IndexConfig::default()));
        let _ = index.index_all(root).expect("index");
        index
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(300)).await;
    }

    #[tokio::test]
    async fn burst_for_one_unit_coalesces_into_one_run() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_unit(dir.path(), "Button", "Button");
        let index = indexed(dir.path());
        let scheduler = ReindexScheduler::new(Arc::clone(&index), Duration::from_millis(50));

        let unit = dir.path().join("Button");
        for _ in 0..5 {
            scheduler.notify(unit.clone());
        }
        assert_eq!(scheduler.pending(), 1);

        settle().await;
        assert_eq!(scheduler.runs(), 1);
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test]
    async fn distinct_units_are_independent() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_unit(dir.path(), "Button", "Button");
        write_unit(dir.path(), "Card", "Card");
        let index = indexed(dir.path());
        let scheduler = ReindexScheduler::new(Arc::clone(&index), Duration::from_millis(50));

        scheduler.notify(dir.path().join("Button"));
        scheduler.notify(dir.path().join("Card"));
        assert_eq!(scheduler.pending(), 2);

        settle().await;
        assert_eq!(scheduler.runs(), 2);
    }

    #[tokio::test]
    async fn elapsed_reindex_picks_up_changes() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_unit(dir.path(), "Button", "Button");
        let index = indexed(dir.path());
        let scheduler = ReindexScheduler::new(Arc::clone(&index), Duration::from_millis(20));

        write_unit(dir.path(), "Button", "PrimaryButton");
        scheduler.notify(dir.path().join("Button"));
        settle().await;

        assert!(index.get("Button").is_none());
        assert!(index.get("PrimaryButton").is_some());
    }

    #[tokio::test]
    async fn cancel_all_drops_pending_timers() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_unit(dir.path(), "Button", "Button");
        let index = indexed(dir.path());
        let scheduler = ReindexScheduler::new(Arc::clone(&index), Duration::from_millis(50));

        scheduler.notify(dir.path().join("Button"));
        scheduler.cancel_all();
        settle().await;

        assert_eq!(scheduler.runs(), 0);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn delay_comes_from_config() {
        let index = Arc::new(ComponentIndex::from_config(&IndexConfig::default()));
        let config = IndexConfig {
            debounce_ms: 125,
            ..IndexConfig::default()
        };
        let scheduler = ReindexScheduler::from_config(index, &config);
        assert_eq!(scheduler.delay, Duration::from_millis(125));
    }
}
