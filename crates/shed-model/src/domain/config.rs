use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::error::ConfigError;

/// Name of the TOML table holding the daemon options.
pub const SHED_CONFIG_SECTION: &str = "ansible_shed";

/// Snapshot of the `[ansible_shed]` table.
///
/// A fresh value is loaded at the start of every cycle and never mutated afterwards,
/// so edits to the file take effect on the next cycle.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ShedConfig {
    /// Local working copy of the playbook repository.
    pub repo_path: PathBuf,
    /// Remote the working copy is cloned from.
    pub repo_url: String,
    /// Private key used for ssh transport.
    #[serde(default)]
    pub repo_key: Option<PathBuf>,
    /// Branch tracked by the working copy.
    #[serde(default = "default_repo_branch")]
    pub repo_branch: String,

    /// Minutes between cycle starts.
    pub interval: u64,
    /// Upper bound (seconds) of the random delay before the first cycle.
    #[serde(default)]
    pub start_splay: u64,

    /// Exporter port.
    pub port: u16,
    /// Exporter bind address; any address by default.
    #[serde(default = "default_bind_addr")]
    pub prometheus_bind_addr: String,

    #[serde(default = "default_automation_binary", alias = "ansible_playbook_binary")]
    pub automation_binary: String,
    #[serde(alias = "ansible_hosts_inventory")]
    pub hosts_inventory: String,
    /// Entry playbook, relative to `repo_path`.
    #[serde(alias = "ansible_playbook_init")]
    pub playbook_init: String,
    #[serde(default, alias = "ansible_limit")]
    pub limit: Option<String>,
    #[serde(default, alias = "ansible_tags")]
    pub tags: Option<String>,
    #[serde(default, alias = "ansible_skip_tags")]
    pub skip_tags: Option<String>,
    #[serde(default)]
    pub show_diff: bool,

    /// Directory for timestamped run logs and the `latest.log` pointer.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
    /// Vault password staged into the working copy before each run.
    #[serde(default)]
    pub vault_pass_file: Option<PathBuf>,
}

fn default_repo_branch() -> String {
    "main".to_string()
}

fn default_bind_addr() -> String {
    "::".to_string()
}

fn default_automation_binary() -> String {
    "ansible-playbook".to_string()
}

impl ShedConfig {
    /// Read and validate the config file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parse a TOML document and extract the `[ansible_shed]` table.
    ///
    /// Other tables are ignored. Empty optional values are treated as absent.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let mut doc: toml::Table = raw.parse()?;
        let section = doc
            .remove(SHED_CONFIG_SECTION)
            .ok_or(ConfigError::MissingSection(SHED_CONFIG_SECTION))?;

        let mut cfg: ShedConfig = section.try_into()?;
        cfg.normalize();
        cfg.validate()?;
        Ok(cfg)
    }

    fn normalize(&mut self) {
        fn blank_path(p: &Option<PathBuf>) -> bool {
            p.as_ref().is_some_and(|p| p.as_os_str().is_empty())
        }
        fn blank_str(s: &Option<String>) -> bool {
            s.as_ref().is_some_and(|s| s.trim().is_empty())
        }

        if blank_path(&self.repo_key) {
            self.repo_key = None;
        }
        if blank_path(&self.log_dir) {
            self.log_dir = None;
        }
        if blank_path(&self.vault_pass_file) {
            self.vault_pass_file = None;
        }
        if blank_str(&self.limit) {
            self.limit = None;
        }
        if blank_str(&self.tags) {
            self.tags = None;
        }
        if blank_str(&self.skip_tags) {
            self.skip_tags = None;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.interval == 0 {
            return Err(ConfigError::Invalid {
                key: "interval",
                reason: "must be at least 1 minute".into(),
            });
        }
        if self.repo_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                key: "repo_path",
                reason: "is empty".into(),
            });
        }
        if self.playbook_init.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "playbook_init",
                reason: "is empty".into(),
            });
        }
        if self.automation_binary.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "automation_binary",
                reason: "is empty".into(),
            });
        }
        Ok(())
    }

    /// Time between cycle starts.
    #[inline]
    pub fn interval_duration(&self) -> Duration {
        Duration::from_secs(self.interval.saturating_mul(60))
    }

    /// File whose presence marks a usable working copy.
    #[inline]
    pub fn entry_point(&self) -> PathBuf {
        self.repo_path.join(&self.playbook_init)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[ansible_shed]
repo_path = "/opt/shed/repo"
repo_url = "git@github.com:example/infra.git"
interval = 60
port = 12345
hosts_inventory = "hosts"
playbook_init = "site.yaml"
"#;

    #[test]
    fn minimal_config_gets_defaults() {
        let cfg = ShedConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(cfg.repo_path, PathBuf::from("/opt/shed/repo"));
        assert_eq!(cfg.repo_branch, "main");
        assert_eq!(cfg.prometheus_bind_addr, "::");
        assert_eq!(cfg.automation_binary, "ansible-playbook");
        assert_eq!(cfg.start_splay, 0);
        assert!(!cfg.show_diff);
        assert!(cfg.repo_key.is_none());
        assert!(cfg.log_dir.is_none());
        assert!(cfg.vault_pass_file.is_none());
        assert_eq!(cfg.interval_duration(), Duration::from_secs(3600));
        assert_eq!(cfg.entry_point(), PathBuf::from("/opt/shed/repo/site.yaml"));
    }

    #[test]
    fn legacy_key_names_are_accepted() {
        let raw = r#"
[ansible_shed]
repo_path = "/repo"
repo_url = "https://example.com/infra.git"
interval = 5
port = 9000
ansible_playbook_binary = "/usr/bin/ansible-playbook"
ansible_hosts_inventory = "inventory/hosts"
ansible_playbook_init = "init.yaml"
ansible_limit = "web"
ansible_tags = "base"
ansible_skip_tags = "slow"
"#;
        let cfg = ShedConfig::from_toml_str(raw).unwrap();
        assert_eq!(cfg.automation_binary, "/usr/bin/ansible-playbook");
        assert_eq!(cfg.hosts_inventory, "inventory/hosts");
        assert_eq!(cfg.playbook_init, "init.yaml");
        assert_eq!(cfg.limit.as_deref(), Some("web"));
        assert_eq!(cfg.tags.as_deref(), Some("base"));
        assert_eq!(cfg.skip_tags.as_deref(), Some("slow"));
    }

    #[test]
    fn blank_optional_values_become_none() {
        let raw = format!("{MINIMAL}limit = \"\"\ntags = \"  \"\nvault_pass_file = \"\"\nlog_dir = \"\"\n");
        let cfg = ShedConfig::from_toml_str(&raw).unwrap();
        assert!(cfg.limit.is_none());
        assert!(cfg.tags.is_none());
        assert!(cfg.vault_pass_file.is_none());
        assert!(cfg.log_dir.is_none());
    }

    #[test]
    fn other_tables_are_ignored() {
        let raw = format!("[other]\nfoo = 1\n{MINIMAL}");
        assert!(ShedConfig::from_toml_str(&raw).is_ok());
    }

    #[test]
    fn missing_section_is_rejected() {
        let err = ShedConfig::from_toml_str("[something_else]\ninterval = 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingSection(SHED_CONFIG_SECTION)));
    }

    #[test]
    fn missing_required_key_is_rejected() {
        let raw = MINIMAL.replace("port = 12345\n", "");
        let err = ShedConfig::from_toml_str(&raw).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "got {err:?}");
        assert!(err.to_string().contains("port"));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let raw = MINIMAL.replace("interval = 60", "interval = 0");
        let err = ShedConfig::from_toml_str(&raw).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "interval", .. }));
    }

    #[test]
    fn syntax_error_is_parse_error() {
        let err = ShedConfig::from_toml_str("[ansible_shed\nrepo_path=").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = ShedConfig::load(Path::new("/nonexistent/ansible_shed.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
