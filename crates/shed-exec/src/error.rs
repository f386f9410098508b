use shed_core::{RunnerError, SyncError};
use thiserror::Error;

pub type ExecResult<T> = Result<T, ExecError>;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("missing program")]
    MissingProgram,
    #[error("spawn failed: {0}")]
    Spawn(String),
    #[error("`{command}` exited with code {code}: {stderr}")]
    NonZeroExit {
        command: String,
        code: i32,
        stderr: String,
    },
    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ExecError {
    fn from(e: std::io::Error) -> Self {
        ExecError::Io(e.to_string())
    }
}

impl From<ExecError> for RunnerError {
    fn from(e: ExecError) -> Self {
        match e {
            ExecError::MissingProgram => RunnerError::InvalidInvocation(e.to_string()),
            ExecError::Spawn(msg) => RunnerError::Spawn(msg),
            other => RunnerError::Io(other.to_string()),
        }
    }
}

impl From<ExecError> for SyncError {
    fn from(e: ExecError) -> Self {
        match e {
            ExecError::NonZeroExit {
                command,
                code,
                stderr,
            } => SyncError::Command {
                command,
                code,
                stderr,
            },
            ExecError::Spawn(msg) => SyncError::Spawn(msg),
            ExecError::MissingProgram => SyncError::Spawn(e.to_string()),
            ExecError::Io(msg) => SyncError::Io(msg),
        }
    }
}
