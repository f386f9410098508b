//! Shared types for the ansible-shed daemon.
//!
//! - [`ShedConfig`]: immutable snapshot of the `[ansible_shed]` configuration table.
//! - [`MetricKey`] / [`Metrics`]: names and values flowing from the output parser to the exporter.
//! - [`RunResult`]: captured outcome of one playbook invocation.

mod error;
pub use error::{ConfigError, UnknownMetric};

mod domain;
pub use domain::*;
