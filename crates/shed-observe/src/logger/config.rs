use std::io::IsTerminal;

use crate::logger::format::LoggerFormat;

/// Level used when `--debug` is given.
pub const DEBUG_LEVEL: &str = "debug";

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// Any `EnvFilter` directive, e.g. `info` or `info,shed_exec=debug`.
    pub level: String,
    pub with_targets: bool,
    pub use_color: bool,
}

impl LoggerConfig {
    /// `--debug` wins over an explicit level.
    pub fn with_debug(mut self, debug: bool) -> Self {
        if debug {
            self.level = DEBUG_LEVEL.to_string();
        }
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_format(mut self, format: LoggerFormat) -> Self {
        self.format = format;
        self
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        let use_color = cfg!(test) || std::io::stdout().is_terminal();
        Self {
            format: LoggerFormat::Text,
            level: "info".to_string(),
            with_targets: true,
            use_color,
        }
    }
}
