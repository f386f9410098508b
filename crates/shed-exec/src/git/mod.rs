use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process::Stdio,
};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use shed_core::{RepoSync, SyncError};
use shed_model::ShedConfig;

use crate::{
    error::{ExecError, ExecResult},
    util::{cmd_program, exit_code},
};

/// Keeps the working copy on the configured branch using the `git` CLI.
///
/// A working copy is considered healthy while its entry playbook exists; otherwise the
/// directory is discarded and cloned again.
#[derive(Clone, Debug)]
pub struct GitRepoSync {
    program: String,
}

impl GitRepoSync {
    pub fn new() -> Self {
        Self {
            program: "git".to_string(),
        }
    }

    /// Use another `git` executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    async fn update(&self, config: &ShedConfig) -> ExecResult<()> {
        let branch = config.repo_branch.as_str();
        info!(
            target: "shed.exec.git",
            repo = %config.repo_path.display(),
            branch,
            "updating working copy"
        );
        self.git(config, Some(&config.repo_path), ["fetch", "origin", branch])
            .await?;
        let upstream = format!("origin/{branch}");
        self.git(
            config,
            Some(&config.repo_path),
            ["merge", "--ff-only", upstream.as_str()],
        )
        .await
    }

    async fn fresh_clone(&self, config: &ShedConfig) -> ExecResult<()> {
        let repo = &config.repo_path;
        if tokio::fs::try_exists(repo).await.unwrap_or(false) {
            warn!(
                target: "shed.exec.git",
                repo = %repo.display(),
                entry_point = %config.playbook_init,
                "entry playbook missing; discarding working copy"
            );
            tokio::fs::remove_dir_all(repo).await?;
        }
        tokio::fs::create_dir_all(repo).await?;

        info!(
            target: "shed.exec.git",
            url = %config.repo_url,
            repo = %repo.display(),
            branch = %config.repo_branch,
            "cloning repository"
        );
        let args: [&OsStr; 5] = [
            "clone".as_ref(),
            "--branch".as_ref(),
            config.repo_branch.as_ref(),
            config.repo_url.as_ref(),
            repo.as_os_str(),
        ];
        self.git(config, None, args).await
    }

    async fn git<I, S>(&self, config: &ShedConfig, cwd: Option<&Path>, args: I) -> ExecResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<S> = args.into_iter().collect();
        let command = std::iter::once(self.program.clone())
            .chain(args.iter().map(|a| a.as_ref().to_string_lossy().into_owned()))
            .collect::<Vec<_>>()
            .join(" ");

        let mut cmd = cmd_program(&self.program, &args);
        if let Some(cwd) = cwd {
            cmd.current_dir(cwd);
        }
        if let Some(key) = &config.repo_key {
            cmd.env("GIT_SSH_COMMAND", ssh_command(key));
        }
        cmd.stdin(Stdio::null());

        debug!(target: "shed.exec.git", %command, "spawn");
        let output = cmd
            .output()
            .await
            .map_err(|e| ExecError::Spawn(format!("{}: {e}", self.program)))?;

        if !output.status.success() {
            return Err(ExecError::NonZeroExit {
                command,
                code: exit_code(&output.status),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

impl Default for GitRepoSync {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RepoSync for GitRepoSync {
    async fn ensure_and_update(&self, config: &ShedConfig) -> Result<(), SyncError> {
        let entry_point: PathBuf = config.entry_point();
        let healthy = tokio::fs::try_exists(&entry_point).await.unwrap_or(false);
        let res = if healthy {
            self.update(config).await
        } else {
            self.fresh_clone(config).await
        };
        res.map_err(SyncError::from)
    }
}

/// Value for `GIT_SSH_COMMAND` selecting the deploy key.
pub fn ssh_command(key: &Path) -> String {
    format!("ssh -i {}", key.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ssh_command_uses_key() {
        assert_eq!(
            ssh_command(Path::new("/etc/ansible_shed/deploy_key")),
            "ssh -i /etc/ansible_shed/deploy_key"
        );
    }
}
