use std::{fmt, path::PathBuf};

use shed_model::ShedConfig;
use tokio::process::Command;

use crate::util::cmd_program;

/// Optional flag appended after the entry playbook.
enum OptionalArg {
    Switch {
        flag: &'static str,
        enabled: fn(&ShedConfig) -> bool,
    },
    Value {
        flag: &'static str,
        value: fn(&ShedConfig) -> Option<&str>,
    },
}

fn show_diff(c: &ShedConfig) -> bool {
    c.show_diff
}

fn limit(c: &ShedConfig) -> Option<&str> {
    c.limit.as_deref()
}

fn tags(c: &ShedConfig) -> Option<&str> {
    c.tags.as_deref()
}

fn skip_tags(c: &ShedConfig) -> Option<&str> {
    c.skip_tags.as_deref()
}

/// Appended in this order.
const OPTIONAL_ARGS: [OptionalArg; 4] = [
    OptionalArg::Switch {
        flag: "--diff",
        enabled: show_diff,
    },
    OptionalArg::Value {
        flag: "--limit",
        value: limit,
    },
    OptionalArg::Value {
        flag: "--tags",
        value: tags,
    },
    OptionalArg::Value {
        flag: "--skip-tags",
        value: skip_tags,
    },
];

/// Command line of one playbook run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    /// The working copy; inventory and playbook paths are relative to it.
    pub cwd: PathBuf,
}

impl Invocation {
    pub fn from_config(config: &ShedConfig) -> Self {
        let mut args = vec![
            "--inventory".to_string(),
            config.hosts_inventory.clone(),
            config.playbook_init.clone(),
        ];

        for arg in &OPTIONAL_ARGS {
            match arg {
                OptionalArg::Switch { flag, enabled } => {
                    if enabled(config) {
                        args.push(flag.to_string());
                    }
                }
                OptionalArg::Value { flag, value } => {
                    if let Some(v) = value(config).filter(|v| !v.is_empty()) {
                        args.push(flag.to_string());
                        args.push(v.to_string());
                    }
                }
            }
        }

        Self {
            program: config.automation_binary.clone(),
            args,
            cwd: config.repo_path.clone(),
        }
    }

    pub fn command(&self) -> Command {
        let mut cmd = cmd_program(&self.program, &self.args);
        cmd.current_dir(&self.cwd);
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
