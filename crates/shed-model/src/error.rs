use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config has no [{0}] table")]
    MissingSection(&'static str),
    #[error("invalid value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Metric name that is neither a known global nor a `host_<name>_<stat>` entry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown metric name: {0}")]
pub struct UnknownMetric(pub String);
