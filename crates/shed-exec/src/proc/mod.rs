mod invocation;
pub use invocation::Invocation;

pub mod runlog;
pub mod vault;

use std::{process::Stdio, time::Instant};

use async_trait::async_trait;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    sync::mpsc,
};
use tracing::{debug, info, trace, warn};

use shed_core::{Runner, RunnerError};
use shed_model::{RunResult, ShedConfig};

use crate::{
    error::{ExecError, ExecResult},
    util::exit_code,
};
use runlog::{RunLog, update_latest_link};
use vault::stage_vault_pass;

/// Lines in flight between the pipe readers and the collector.
const LINE_BUFFER: usize = 256;

/// Runs the configured automation binary against the working copy.
///
/// Stdout and stderr are interleaved in arrival order into the captured output and,
/// when `log_dir` is set, into a timestamped run log.
pub struct PlaybookRunner {
    name: &'static str,
}

impl PlaybookRunner {
    pub fn new() -> Self {
        Self { name: "playbook" }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    async fn execute(&self, config: &ShedConfig) -> ExecResult<RunResult> {
        let invocation = Invocation::from_config(config);
        if invocation.program.is_empty() {
            return Err(ExecError::MissingProgram);
        }

        stage_vault_pass(config.vault_pass_file.as_deref(), &config.repo_path).await;

        let mut log = match &config.log_dir {
            Some(dir) => match RunLog::create(dir).await {
                Ok(log) => Some(log),
                Err(e) => {
                    warn!(target: "shed.exec.proc", dir = %dir.display(), error = %e, "cannot open run log; output is kept in memory only");
                    None
                }
            },
            None => None,
        };

        info!(target: "shed.exec.proc", command = %invocation, cwd = %invocation.cwd.display(), "running playbook");
        let started = Instant::now();

        let mut cmd = invocation.command();
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| ExecError::Spawn(format!("{}: {e}", invocation.program)))?;

        if let (Some(dir), Some(log)) = (&config.log_dir, &log) {
            update_latest_link(dir, log.path()).await;
        }

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| ExecError::Io("stdout was not captured".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ExecError::Io("stderr was not captured".into()))?;

        let (tx, mut rx) = mpsc::channel::<String>(LINE_BUFFER);
        let read_stdout = tokio::spawn(pump_lines(stdout, tx.clone()));
        let read_stderr = tokio::spawn(pump_lines(stderr, tx));

        let mut output = String::new();
        while let Some(line) = rx.recv().await {
            trace!(target: "shed.exec.proc.out", line = line.trim_end());
            if let Some(log) = log.as_mut() {
                log.write_line(&line).await;
            }
            output.push_str(&line);
        }

        for reader in [read_stdout, read_stderr] {
            match reader.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(target: "shed.exec.proc", error = %e, "output pipe read failed"),
                Err(e) => warn!(target: "shed.exec.proc", error = %e, "output reader task failed"),
            }
        }

        let status = child.wait().await?;
        let duration = started.elapsed();
        if let Some(log) = log {
            log.finish().await;
        }

        let returncode = exit_code(&status);
        debug!(target: "shed.exec.proc", returncode, run_time_s = duration.as_secs(), "playbook exited");
        Ok(RunResult {
            returncode,
            output,
            duration,
        })
    }
}

impl Default for PlaybookRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Runner for PlaybookRunner {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn run(&self, config: &ShedConfig) -> Result<RunResult, RunnerError> {
        self.execute(config).await.map_err(RunnerError::from)
    }
}

/// Forward whole lines (newline kept) until EOF or the collector goes away.
async fn pump_lines<R>(reader: R, tx: mpsc::Sender<String>) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }
        if tx.send(String::from_utf8_lossy(&buf).into_owned()).await.is_err() {
            return Ok(());
        }
    }
}
