use std::{
    io,
    path::{Path, PathBuf},
};

use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

/// File name of the staged vault password inside the working copy.
pub const VAULT_PASS_DEST: &str = ".vault_pass";

/// Copy the vault password into the working copy, readable by the owner only.
///
/// Never fails the run: an unset or absent source is skipped, other errors are logged.
pub async fn stage_vault_pass(source: Option<&Path>, repo_path: &Path) -> Option<PathBuf> {
    let Some(source) = source else {
        debug!("no vault password configured");
        return None;
    };

    let secret = match tokio::fs::read(source).await {
        Ok(secret) => secret,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(source = %source.display(), "vault password file not found; skipping");
            return None;
        }
        Err(e) => {
            warn!(source = %source.display(), error = %e, "failed to read vault password");
            return None;
        }
    };

    let dest = repo_path.join(VAULT_PASS_DEST);
    match write_private(&dest, &secret).await {
        Ok(()) => {
            debug!(dest = %dest.display(), "vault password staged");
            Some(dest)
        }
        Err(e) => {
            warn!(dest = %dest.display(), error = %e, "failed to stage vault password");
            None
        }
    }
}

/// Write `contents` to a freshly created `dest`.
///
/// Whatever sits at `dest` is unlinked first and the new file is created exclusively,
/// so a symlink planted in the working copy is replaced, never followed.
async fn write_private(dest: &Path, contents: &[u8]) -> io::Result<()> {
    match tokio::fs::remove_file(dest).await {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    let mut opts = tokio::fs::OpenOptions::new();
    opts.write(true).create_new(true);
    #[cfg(unix)]
    opts.mode(0o600);

    let mut file = opts.open(dest).await?;
    // umask may have cleared owner bits at creation
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))
            .await?;
    }
    file.write_all(contents).await?;
    file.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stages_secret_into_repo() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("vault_pass.txt");
        let repo = tmp.path().join("repo");
        std::fs::create_dir(&repo).unwrap();
        std::fs::write(&source, "s3cret\n").unwrap();

        let dest = stage_vault_pass(Some(&source), &repo).await.unwrap();
        assert_eq!(dest, repo.join(VAULT_PASS_DEST));
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "s3cret\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn staged_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("vault_pass.txt");
        std::fs::write(&source, "s3cret").unwrap();
        let stale = tmp.path().join(VAULT_PASS_DEST);
        std::fs::write(&stale, "old").unwrap();
        std::fs::set_permissions(&stale, std::fs::Permissions::from_mode(0o644)).unwrap();

        let dest = stage_vault_pass(Some(&source), tmp.path()).await.unwrap();
        let mode = std::fs::metadata(&dest).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "s3cret");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinked_destination_is_replaced_not_followed() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("vault_pass.txt");
        std::fs::write(&source, "s3cret").unwrap();
        let outside = tmp.path().join("outside.txt");
        std::fs::write(&outside, "untouched").unwrap();
        std::fs::set_permissions(&outside, std::fs::Permissions::from_mode(0o644)).unwrap();
        let repo = tmp.path().join("repo");
        std::fs::create_dir(&repo).unwrap();
        std::os::unix::fs::symlink(&outside, repo.join(VAULT_PASS_DEST)).unwrap();

        let dest = stage_vault_pass(Some(&source), &repo).await.unwrap();

        let meta = std::fs::symlink_metadata(&dest).unwrap();
        assert!(meta.file_type().is_file());
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
        assert_eq!(std::fs::read_to_string(&dest).unwrap(), "s3cret");
        assert_eq!(std::fs::read_to_string(&outside).unwrap(), "untouched");
        let outside_mode = std::fs::metadata(&outside).unwrap().permissions().mode();
        assert_eq!(outside_mode & 0o777, 0o644);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn directory_at_destination_is_reported_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("vault_pass.txt");
        std::fs::write(&source, "s3cret").unwrap();
        std::fs::create_dir(tmp.path().join(VAULT_PASS_DEST)).unwrap();

        assert!(stage_vault_pass(Some(&source), tmp.path()).await.is_none());
        assert!(tmp.path().join(VAULT_PASS_DEST).is_dir());
    }

    #[tokio::test]
    async fn unset_source_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(stage_vault_pass(None, tmp.path()).await.is_none());
        assert!(!tmp.path().join(VAULT_PASS_DEST).exists());
    }

    #[tokio::test]
    async fn missing_source_is_tolerated() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("does-not-exist");
        assert!(stage_vault_pass(Some(&source), tmp.path()).await.is_none());
        assert!(!tmp.path().join(VAULT_PASS_DEST).exists());
    }
}
