use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use shed_model::{LAST_RUN_RETURNCODE, Metrics, STATS_LAST_UPDATED, is_host_metric};
use tokio::sync::Notify;

/// In-memory metric storage shared by the scheduler (writer) and the exporter (reader).
///
/// Every write replaces its part of the map under one lock and then raises the
/// freshness signal. The signal holds at most one pending wake-up: several writes
/// before the reader gets to it collapse into a single [`MetricStore::changed`]
/// completion, after which the reader sees the latest values.
#[derive(Clone, Default)]
pub struct MetricStore {
    inner: Arc<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    metrics: RwLock<Metrics>,
    fresh: Notify,
}

impl MetricStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge the metrics of a completed run.
    ///
    /// All `host_*` entries from earlier runs are dropped first, so hosts absent from
    /// this run disappear. Globals not present in `update` keep their previous value.
    pub fn merge_run(&self, update: Metrics) {
        {
            let mut metrics = self.write();
            metrics.retain(|name, _| !is_host_metric(name));
            metrics.extend(update);
        }
        self.mark_fresh();
    }

    /// Record a cycle that produced no parsable run.
    ///
    /// Per-host counters from the previous run stay in place.
    pub fn record_failure(&self, returncode: i64, now: i64) {
        {
            let mut metrics = self.write();
            metrics.insert(LAST_RUN_RETURNCODE.to_string(), returncode);
            metrics.insert(STATS_LAST_UPDATED.to_string(), now);
        }
        self.mark_fresh();
    }

    /// Copy of the current metrics.
    pub fn snapshot(&self) -> Metrics {
        self.read().clone()
    }

    /// Current value of a single metric.
    pub fn get(&self, name: &str) -> Option<i64> {
        self.read().get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Raise the freshness signal without touching the metrics.
    #[inline]
    pub fn mark_fresh(&self) {
        self.inner.fresh.notify_one();
    }

    /// Wait until the store changed since the last completed call.
    ///
    /// Completing consumes the pending signal. Intended for a single reader.
    pub async fn changed(&self) {
        self.inner.fresh.notified().await;
    }

    fn read(&self) -> RwLockReadGuard<'_, Metrics> {
        self.inner
            .metrics
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Metrics> {
        self.inner
            .metrics
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
