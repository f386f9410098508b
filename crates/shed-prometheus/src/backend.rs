use std::{
    collections::BTreeMap,
    sync::{Arc, PoisonError, RwLock},
};

use prometheus::{IntGaugeVec, Opts, Registry, TextEncoder, proto::MetricFamily};
use tracing::warn;

use shed_model::{HOST_STATS, LAST_RUN_RETURNCODE, LAST_RUN_TIME, MetricKey, Metrics, STATS_LAST_UPDATED};

use crate::error::ExpositionError;

const HOSTNAME_LABEL: &str = "hostname";
const NO_LABELS: &[&str] = &[];

/// Outcome of pushing one snapshot into the registry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub updated: usize,
    /// Names that match no registered gauge.
    pub skipped: Vec<String>,
}

/// Gauge registry exposing the metric store.
///
/// Every family is a vec, globals included with no labels, so a series is only
/// exported once the store has published a value for it. Cheap to clone; all
/// clones share one registry.
#[derive(Clone)]
pub struct PrometheusMetrics {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Registry,
    last_run_returncode: IntGaugeVec,
    last_run_time: IntGaugeVec,
    stats_last_updated: IntGaugeVec,
    host_stats: BTreeMap<&'static str, IntGaugeVec>,
    /// Held for writing while a snapshot is applied so scrapes never see half of one.
    apply_lock: RwLock<()>,
}

fn register_vec(
    registry: &Registry,
    name: impl Into<String>,
    help: impl Into<String>,
    labels: &[&str],
) -> Result<IntGaugeVec, prometheus::Error> {
    let gauge = IntGaugeVec::new(Opts::new(name, help), labels)?;
    registry.register(Box::new(gauge.clone()))?;
    Ok(gauge)
}

impl PrometheusMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let last_run_returncode = register_vec(
            &registry,
            LAST_RUN_RETURNCODE,
            "Return code of the last automation run, -1 when it could not run",
            NO_LABELS,
        )?;
        let last_run_time = register_vec(
            &registry,
            LAST_RUN_TIME,
            "Seconds the last automation run took",
            NO_LABELS,
        )?;
        let stats_last_updated = register_vec(
            &registry,
            STATS_LAST_UPDATED,
            "Unix time the stats were last published",
            NO_LABELS,
        )?;

        let mut host_stats = BTreeMap::new();
        for stat in HOST_STATS {
            let gauge = register_vec(
                &registry,
                format!("ansible_{stat}"),
                format!("Tasks reported as {stat} per host in the last play recap"),
                &[HOSTNAME_LABEL],
            )?;
            host_stats.insert(stat, gauge);
        }

        Ok(Self {
            inner: Arc::new(Inner {
                registry,
                last_run_returncode,
                last_run_time,
                stats_last_updated,
                host_stats,
                apply_lock: RwLock::new(()),
            }),
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn gather(&self) -> Vec<MetricFamily> {
        let _guard = self
            .inner
            .apply_lock
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        self.inner.registry.gather()
    }

    /// Replace the exposed values with `snapshot`.
    ///
    /// Every series is reset first, so names missing from the snapshot disappear.
    pub fn apply(&self, snapshot: &Metrics) -> ApplyReport {
        let _guard = self
            .inner
            .apply_lock
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        for gauge in self.families() {
            gauge.reset();
        }

        let mut report = ApplyReport::default();
        for (name, value) in snapshot {
            if self.set(name, *value) {
                report.updated += 1;
            } else {
                warn!(metric = %name, "no gauge for metric; skipping");
                report.skipped.push(name.clone());
            }
        }
        report
    }

    fn families(&self) -> impl Iterator<Item = &IntGaugeVec> {
        [
            &self.inner.last_run_returncode,
            &self.inner.last_run_time,
            &self.inner.stats_last_updated,
        ]
        .into_iter()
        .chain(self.inner.host_stats.values())
    }

    fn set(&self, name: &str, value: i64) -> bool {
        let Ok(key) = name.parse::<MetricKey>() else {
            return false;
        };
        let (gauge, labels) = match &key {
            MetricKey::LastRunReturncode => (&self.inner.last_run_returncode, NO_LABELS),
            MetricKey::LastRunTime => (&self.inner.last_run_time, NO_LABELS),
            MetricKey::StatsLastUpdated => (&self.inner.stats_last_updated, NO_LABELS),
            MetricKey::Host { hostname, stat } => {
                let Some(gauge) = self.inner.host_stats.get(stat.as_str()) else {
                    return false;
                };
                gauge.with_label_values(&[hostname.as_str()]).set(value);
                return true;
            }
        };
        gauge.with_label_values(labels).set(value);
        true
    }

    /// Current registry contents in the Prometheus text format.
    pub fn render(&self) -> Result<String, ExpositionError> {
        let families = self.gather();
        Ok(TextEncoder::new().encode_to_string(&families)?)
    }
}
