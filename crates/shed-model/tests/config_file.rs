use std::{fs, path::Path, time::Duration};

use shed_model::{ConfigError, ShedConfig};

#[test]
fn shipped_sample_config_loads() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../ansible_shed.toml");
    let cfg = ShedConfig::load(&path).unwrap();

    assert_eq!(cfg.interval_duration(), Duration::from_secs(3600));
    assert_eq!(cfg.port, 12345);
    assert_eq!(cfg.start_splay, 120);
    assert_eq!(cfg.playbook_init, "site.yaml");
    assert!(cfg.repo_key.is_some());
    assert!(cfg.vault_pass_file.is_none());
}

#[test]
fn edits_are_visible_on_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shed.toml");
    let body = |interval: u64| {
        format!(
            "[ansible_shed]\nrepo_path = \"{}\"\nrepo_url = \"git@example.com:x.git\"\n\
             interval = {interval}\nport = 1234\nhosts_inventory = \"hosts\"\nplaybook_init = \"site.yaml\"\n",
            dir.path().join("repo").display()
        )
    };

    fs::write(&path, body(60)).unwrap();
    assert_eq!(ShedConfig::load(&path).unwrap().interval, 60);

    fs::write(&path, body(15)).unwrap();
    assert_eq!(ShedConfig::load(&path).unwrap().interval, 15);

    fs::write(&path, "not = [valid").unwrap();
    assert!(matches!(ShedConfig::load(&path), Err(ConfigError::Parse(_))));
}
