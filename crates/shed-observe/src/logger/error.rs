use thiserror::Error;
use tracing_subscriber::{filter::ParseError, util::TryInitError};

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format `{0}` (expected text, json or journald)")]
    UnknownFormat(String),

    #[error("journald output needs a linux build with the `journald` feature")]
    JournaldUnavailable,

    #[error("invalid log filter `{directive}`: {source}")]
    InvalidFilter {
        directive: String,
        #[source]
        source: ParseError,
    },

    #[error("connecting to journald: {0}")]
    Journald(#[source] std::io::Error),

    /// Another subscriber already owns the global dispatcher.
    #[error("a global logger is already installed")]
    AlreadyInitialized,

    #[error("installing the logger: {0}")]
    Install(#[from] TryInitError),
}
