use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, fmt::time::OffsetTime, layer::Layered,
};

use crate::logger::{config::LoggerConfig, error::LoggerError, format::LoggerFormat};

/// Subscriber stack every output layer sits on.
pub(crate) type Filtered = Layered<EnvFilter, Registry>;

pub(crate) type OutputLayer = Box<dyn Layer<Filtered> + Send + Sync + 'static>;

/// Parse an `EnvFilter` directive such as `info,shed_exec=debug`.
pub(crate) fn filter(directive: &str) -> Result<EnvFilter, LoggerError> {
    EnvFilter::try_new(directive).map_err(|source| LoggerError::InvalidFilter {
        directive: directive.to_string(),
        source,
    })
}

/// Output layer for the configured format.
pub(crate) fn layer(cfg: &LoggerConfig) -> Result<OutputLayer, LoggerError> {
    let layer = match cfg.format {
        LoggerFormat::Text => fmt::layer()
            .with_ansi(cfg.use_color)
            .with_target(cfg.with_targets)
            .with_timer(local_timer())
            .boxed(),
        LoggerFormat::Json => fmt::layer()
            .json()
            .with_ansi(false)
            .with_target(cfg.with_targets)
            .with_current_span(true)
            .with_timer(local_timer())
            .boxed(),
        LoggerFormat::Journald => journald()?,
    };
    Ok(layer)
}

fn local_timer() -> OffsetTime<Rfc3339> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, Rfc3339)
}

#[cfg(all(target_os = "linux", feature = "journald"))]
fn journald() -> Result<OutputLayer, LoggerError> {
    let layer = tracing_journald::layer()
        .map_err(LoggerError::Journald)?
        .with_syslog_identifier("ansible-shed".to_string());
    Ok(layer.boxed())
}

#[cfg(not(all(target_os = "linux", feature = "journald")))]
fn journald() -> Result<OutputLayer, LoggerError> {
    Err(LoggerError::JournaldUnavailable)
}
