use shed_model::ConfigError;
use thiserror::Error;

/// Failure of the repo sync step.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("spawn failed: {0}")]
    Spawn(String),
    #[error("`{command}` exited with code {code}: {stderr}")]
    Command {
        command: String,
        code: i32,
        stderr: String,
    },
    #[error("io error: {0}")]
    Io(String),
}

/// Failure of the playbook run step.
///
/// A non-zero exit of the playbook is not an error; it is reported through
/// [`shed_model::RunResult::returncode`].
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("invalid invocation: {0}")]
    InvalidInvocation(String),
    #[error("spawn failed: {0}")]
    Spawn(String),
    #[error("io error: {0}")]
    Io(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("repo sync: {0}")]
    Sync(#[from] SyncError),
    #[error("playbook run: {0}")]
    Runner(#[from] RunnerError),
}

impl CoreError {
    /// Cycle step that produced the error, for log fields.
    pub fn step(&self) -> &'static str {
        match self {
            CoreError::Config(_) => "config",
            CoreError::Sync(_) => "sync",
            CoreError::Runner(_) => "run",
        }
    }
}
