use tracing::debug;

use shed_core::MetricStore;

use crate::backend::PrometheusMetrics;

/// Mirror `store` into `metrics` every time the store signals fresh data.
///
/// Bursts of signals collapse into one update that reads the latest snapshot.
pub async fn run_updater(metrics: PrometheusMetrics, store: MetricStore) {
    loop {
        store.changed().await;
        let snapshot = store.snapshot();
        let report = metrics.apply(&snapshot);
        debug!(
            updated = report.updated,
            skipped = report.skipped.len(),
            "exported gauges refreshed"
        );
    }
}
