use std::{fmt, str::FromStr};

use crate::error::UnknownMetric;

/// Exit code of the last playbook run.
pub const LAST_RUN_RETURNCODE: &str = "ansible_last_run_returncode";
/// Wall-clock seconds the last playbook run took.
pub const LAST_RUN_TIME: &str = "ansible_last_run_time";
/// Epoch seconds of the last stats update.
pub const STATS_LAST_UPDATED: &str = "ansible_stats_last_updated";

/// Prefix of per-host metric names: `host_<hostname>_<stat>`.
pub const HOST_PREFIX: &str = "host_";

/// Outcome categories reported per host in a play recap.
pub const HOST_STATS: [&str; 7] = [
    "ok",
    "changed",
    "unreachable",
    "failed",
    "skipped",
    "rescued",
    "ignored",
];

/// Returns `true` for `host_<hostname>_<stat>` names.
#[inline]
pub fn is_host_metric(name: &str) -> bool {
    name.starts_with(HOST_PREFIX)
}

/// Parsed form of a metric store key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MetricKey {
    LastRunReturncode,
    LastRunTime,
    StatsLastUpdated,
    /// Per-host outcome counter.
    Host { hostname: String, stat: String },
}

impl MetricKey {
    pub fn host(hostname: impl Into<String>, stat: impl Into<String>) -> Self {
        MetricKey::Host {
            hostname: hostname.into(),
            stat: stat.into(),
        }
    }

    #[inline]
    pub fn is_host(&self) -> bool {
        matches!(self, MetricKey::Host { .. })
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKey::LastRunReturncode => f.write_str(LAST_RUN_RETURNCODE),
            MetricKey::LastRunTime => f.write_str(LAST_RUN_TIME),
            MetricKey::StatsLastUpdated => f.write_str(STATS_LAST_UPDATED),
            MetricKey::Host { hostname, stat } => write!(f, "{HOST_PREFIX}{hostname}_{stat}"),
        }
    }
}

impl FromStr for MetricKey {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            LAST_RUN_RETURNCODE => return Ok(MetricKey::LastRunReturncode),
            LAST_RUN_TIME => return Ok(MetricKey::LastRunTime),
            STATS_LAST_UPDATED => return Ok(MetricKey::StatsLastUpdated),
            _ => {}
        }

        // Hostnames never contain '_', so the first one separates host from stat.
        let (hostname, stat) = s
            .strip_prefix(HOST_PREFIX)
            .and_then(|rest| rest.split_once('_'))
            .ok_or_else(|| UnknownMetric(s.to_string()))?;

        if hostname.is_empty() || stat.is_empty() {
            return Err(UnknownMetric(s.to_string()));
        }
        Ok(MetricKey::host(hostname, stat))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn globals_roundtrip_through_names() {
        for key in [
            MetricKey::LastRunReturncode,
            MetricKey::LastRunTime,
            MetricKey::StatsLastUpdated,
        ] {
            assert_eq!(key.to_string().parse::<MetricKey>().unwrap(), key);
            assert!(!key.is_host());
        }
    }

    #[test]
    fn host_key_splits_on_first_underscore() {
        let key: MetricKey = "host_h1.example.com_unreachable".parse().unwrap();
        assert_eq!(key, MetricKey::host("h1.example.com", "unreachable"));
        assert_eq!(key.to_string(), "host_h1.example.com_unreachable");
        assert!(key.is_host());
    }

    #[test]
    fn malformed_names_are_unknown() {
        for name in ["", "host_", "host_nostat", "host__ok", "host_h1_", "ansible_whatever"] {
            assert_eq!(
                name.parse::<MetricKey>(),
                Err(UnknownMetric(name.to_string())),
                "{name}"
            );
        }
    }

    #[test]
    fn host_prefix_check() {
        assert!(is_host_metric("host_a_ok"));
        assert!(!is_host_metric(LAST_RUN_TIME));
    }
}
