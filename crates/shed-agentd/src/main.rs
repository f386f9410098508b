//! ansible-shed: runs the automation tool on an interval and exports its play recap.
//!
//! ```text
//! ansible-shed --config /etc/ansible_shed.toml --log-format json
//! ```

mod cli;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::{error, info};

use shed_core::{MetricStore, Scheduler};
use shed_exec::prelude::{GitRepoSync, PlaybookRunner};
use shed_model::ShedConfig;
use shed_observe::logger_init;
use shed_prometheus::{PrometheusMetrics, bind, router, run_updater, serve};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logger_init(&cli.logger_config()).context("initializing logger")?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %cli.config.display(),
        "ansible-shed starting"
    );

    let config = ShedConfig::load(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;

    let metrics = PrometheusMetrics::new().context("building gauge registry")?;
    let listener = bind(&config.prometheus_bind_addr, config.port)
        .await
        .context("starting exporter")?;

    let store = MetricStore::new();
    let updater = tokio::spawn(run_updater(metrics.clone(), store.clone()));
    let mut server = tokio::spawn(serve(listener, router(metrics)));
    let mut scheduler = tokio::spawn(
        Scheduler::new(
            cli.config.clone(),
            GitRepoSync::new(),
            PlaybookRunner::new(),
            store,
        )
        .run(),
    );

    let outcome = tokio::select! {
        res = &mut scheduler => stopped("scheduler", res),
        res = &mut server => stopped("exporter", res),
        sig = tokio::signal::ctrl_c() => {
            sig.context("listening for ctrl-c")?;
            info!("interrupted; shutting down");
            Ok(())
        }
    };

    updater.abort();
    server.abort();
    scheduler.abort();
    if let Err(e) = &outcome {
        error!(error = %format!("{e:#}"), "ansible-shed stopped");
    }
    outcome
}

type TaskOutcome<E> = Result<Result<(), E>, tokio::task::JoinError>;

/// A long-running task returned; any return is a failure.
fn stopped<E>(task: &'static str, res: TaskOutcome<E>) -> anyhow::Result<()>
where
    E: std::error::Error + Send + Sync + 'static,
{
    match res {
        Ok(Ok(())) => bail!("{task} exited unexpectedly"),
        Ok(Err(e)) => Err(e).with_context(|| format!("{task} failed")),
        Err(e) => Err(e).with_context(|| format!("{task} task panicked or was cancelled")),
    }
}
