mod config;
mod error;
mod format;
mod output;

pub use config::LoggerConfig;
pub use error::LoggerError;
pub use format::LoggerFormat;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the process-wide subscriber described by `cfg`.
///
/// The filter and output are validated before anything is installed, so a bad
/// directive or format leaves the dispatcher untouched.
pub fn logger_init(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    if tracing::dispatcher::has_been_set() {
        return Err(LoggerError::AlreadyInitialized);
    }

    let filter = output::filter(&cfg.level)?;
    let output = output::layer(cfg)?;
    tracing_subscriber::registry()
        .with(filter)
        .with(output)
        .try_init()?;
    Ok(())
}
