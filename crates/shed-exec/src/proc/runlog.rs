use std::{
    io,
    path::{Path, PathBuf},
};

use time::{OffsetDateTime, UtcOffset, macros::format_description};
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::warn;

/// Pointer to the most recent run log, kept next to the logs.
pub const LATEST_LOG: &str = "latest.log";

/// `ansible_shed_run_<YYYYmmddHHMMSS>.log`
pub fn run_log_name(at: OffsetDateTime) -> String {
    let stamp = at
        .format(format_description!(
            "[year][month][day][hour][minute][second]"
        ))
        .unwrap_or_else(|_| at.unix_timestamp().to_string());
    format!("ansible_shed_run_{stamp}.log")
}

fn local_now() -> OffsetDateTime {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetDateTime::now_utc().to_offset(offset)
}

/// Per-run log file receiving playbook output as it is produced.
#[derive(Debug)]
pub struct RunLog {
    path: PathBuf,
    file: Option<File>,
}

impl RunLog {
    /// Create `dir` if needed and open a new timestamped log inside it.
    pub async fn create(dir: &Path) -> io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(run_log_name(local_now()));
        let file = File::create(&path).await?;
        Ok(Self {
            path,
            file: Some(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one line; after a write error the log is abandoned for this run.
    pub async fn write_line(&mut self, line: &str) {
        let Some(file) = self.file.as_mut() else {
            return;
        };
        if let Err(e) = file.write_all(line.as_bytes()).await {
            warn!(log = %self.path.display(), error = %e, "run log write failed; output is no longer logged");
            self.file = None;
        }
    }

    pub async fn finish(mut self) {
        if let Some(mut file) = self.file.take() {
            if let Err(e) = file.flush().await {
                warn!(log = %self.path.display(), error = %e, "run log flush failed");
            }
        }
    }
}

/// Point `<dir>/latest.log` at `target` by swapping in a fresh symlink.
///
/// Failures are logged only; the run goes on without the pointer.
pub async fn update_latest_link(dir: &Path, target: &Path) {
    if let Err(e) = swap_link(dir, target).await {
        warn!(dir = %dir.display(), error = %e, "failed to update {LATEST_LOG}");
    }
}

#[cfg(unix)]
async fn swap_link(dir: &Path, target: &Path) -> io::Result<()> {
    // relative to the link itself, so the log directory can be moved
    let target = target.file_name().map(Path::new).unwrap_or(target);
    let tmp = dir.join(format!(".{LATEST_LOG}.tmp"));
    let _ = tokio::fs::remove_file(&tmp).await;
    tokio::fs::symlink(target, &tmp).await?;
    tokio::fs::rename(&tmp, dir.join(LATEST_LOG)).await
}

#[cfg(not(unix))]
async fn swap_link(_dir: &Path, _target: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symlinks are only maintained on unix",
    ))
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn name_is_second_resolution_timestamp() {
        let at = datetime!(2024-03-07 04:05:09 UTC);
        assert_eq!(run_log_name(at), "ansible_shed_run_20240307040509.log");
    }

    #[tokio::test]
    async fn create_makes_the_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested/logs");

        let mut log = RunLog::create(&dir).await.unwrap();
        log.write_line("PLAY [all]\n").await;
        log.write_line("ok: [h1]\n").await;
        let path = log.path().to_path_buf();
        log.finish().await;

        assert!(path.starts_with(&dir));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "PLAY [all]\nok: [h1]\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn latest_link_follows_newest_log() {
        let tmp = tempfile::tempdir().unwrap();
        let first = tmp.path().join("ansible_shed_run_20240101000000.log");
        let second = tmp.path().join("ansible_shed_run_20240101010000.log");
        std::fs::write(&first, "one").unwrap();
        std::fs::write(&second, "two").unwrap();

        update_latest_link(tmp.path(), &first).await;
        let latest = tmp.path().join(LATEST_LOG);
        assert_eq!(std::fs::read_to_string(&latest).unwrap(), "one");

        update_latest_link(tmp.path(), &second).await;
        assert_eq!(std::fs::read_to_string(&latest).unwrap(), "two");
        assert_eq!(
            std::fs::read_link(&latest).unwrap(),
            PathBuf::from("ansible_shed_run_20240101010000.log")
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn blocked_latest_link_is_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join(LATEST_LOG)).unwrap();
        std::fs::create_dir(tmp.path().join(LATEST_LOG).join("keep")).unwrap();
        let log = tmp.path().join("ansible_shed_run_20240101000000.log");
        std::fs::write(&log, "x").unwrap();

        update_latest_link(tmp.path(), &log).await;
        assert!(tmp.path().join(LATEST_LOG).is_dir());
    }
}
