use async_trait::async_trait;
use shed_model::{RunResult, ShedConfig};

use crate::error::{RunnerError, SyncError};

/// Keeps the local working copy of the playbook repository current.
#[async_trait]
pub trait RepoSync: Send + Sync {
    /// Clone into `repo_path` when the entry playbook is missing (discarding whatever
    /// is there), otherwise fetch and fast-forward the tracked branch.
    async fn ensure_and_update(&self, config: &ShedConfig) -> Result<(), SyncError>;
}

/// Executes the playbook once and captures its output.
#[async_trait]
pub trait Runner: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, config: &ShedConfig) -> Result<RunResult, RunnerError>;
}
