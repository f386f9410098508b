mod config;
pub use config::{SHED_CONFIG_SECTION, ShedConfig};

mod metric_key;
pub use metric_key::{
    HOST_PREFIX, HOST_STATS, LAST_RUN_RETURNCODE, LAST_RUN_TIME, MetricKey, STATS_LAST_UPDATED,
    is_host_metric,
};

mod run_result;
pub use run_result::RunResult;

/// Metric name to value mapping produced by the parser and held by the store.
///
/// Ordered so debug dumps and exposition passes are deterministic.
pub type Metrics = std::collections::BTreeMap<String, i64>;

/// Exit code recorded when a cycle fails before the playbook produced one.
pub const FAILED_RUN_RETURNCODE: i64 = -1;
