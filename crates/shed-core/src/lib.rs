//! Orchestration core of the ansible-shed daemon.
//!
//! ```text
//! Scheduler ── RepoSync ── Runner ── parse_output ──▶ MetricStore ──(freshness)──▶ exporter
//! ```

pub mod error;
pub use error::{CoreError, RunnerError, SyncError};

pub mod parser;
pub use parser::{ParseWarning, ParsedOutput, parse_output, parse_output_at};

pub mod runner;
pub use runner::{RepoSync, Runner};

pub mod scheduler;
pub use scheduler::{CycleReport, Scheduler};

pub mod store;
pub use store::MetricStore;

/// Current wall-clock time in epoch seconds.
pub fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
