use std::path::PathBuf;

use clap::Parser;
use shed_observe::{LoggerConfig, LoggerFormat};

pub const DEFAULT_CONFIG_PATH: &str = "/etc/ansible_shed.toml";

#[derive(Debug, Parser)]
#[command(
    name = "ansible-shed",
    version,
    about = "Run ansible-playbook on an interval and export the play recap to Prometheus"
)]
pub struct Cli {
    /// Path to the TOML config; re-read at the start of every cycle.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Debug logging, including the full stats after each cycle.
    #[arg(short, long)]
    pub debug: bool,

    /// Log filter directive, e.g. `info` or `info,shed_exec=debug`.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// text | json | journald
    #[arg(long, default_value = "text")]
    pub log_format: LoggerFormat,
}

impl Cli {
    pub fn logger_config(&self) -> LoggerConfig {
        LoggerConfig::default()
            .with_format(self.log_format)
            .with_level(self.log_level.clone())
            .with_debug(self.debug)
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["ansible-shed"]).unwrap();
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert!(!cli.debug);
        assert_eq!(cli.log_format, LoggerFormat::Text);
        assert_eq!(cli.logger_config().level, "info");
    }

    #[test]
    fn debug_flag_sets_debug_level() {
        let cli = Cli::try_parse_from([
            "ansible-shed",
            "--config",
            "/tmp/shed.toml",
            "--debug",
            "--log-level",
            "warn",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/tmp/shed.toml"));
        assert_eq!(cli.log_format, LoggerFormat::Json);
        assert_eq!(cli.logger_config().level, "debug");
    }

    #[test]
    fn rejects_unknown_log_format() {
        assert!(Cli::try_parse_from(["ansible-shed", "--log-format", "xml"]).is_err());
    }
}
