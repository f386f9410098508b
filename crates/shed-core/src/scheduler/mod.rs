//! The run cycle: reload config, sync the repo, run the playbook, parse, publish, sleep.

mod timing;
pub use timing::{sleep_duration, splay_delay, splay_delay_with};

use std::{path::PathBuf, sync::Arc, time::Duration};

use rand::{SeedableRng, rngs::StdRng};
use shed_model::{ConfigError, FAILED_RUN_RETURNCODE, LAST_RUN_TIME, ShedConfig};
use tokio::time::Instant;
use tracing::{Level, debug, error, info, instrument, warn};

use crate::{
    error::CoreError,
    parser::parse_output,
    runner::{RepoSync, Runner},
    store::MetricStore,
    unix_now,
};

/// Sleep used when no configuration was ever loaded.
const UNCONFIGURED_RETRY: Duration = Duration::from_secs(60);

/// Summary of one successful cycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleReport {
    pub cycle: u64,
    pub returncode: i32,
    pub hosts: usize,
    pub warnings: usize,
    pub run_time: Duration,
}

/// Drives repeated sync/run/parse cycles and publishes into a [`MetricStore`].
///
/// The only writer of its store. A failing cycle is logged and followed by the
/// next one; only a config that cannot be loaded at startup stops the loop.
pub struct Scheduler<S, R> {
    config_path: PathBuf,
    sync: S,
    runner: R,
    store: MetricStore,
    config: Option<Arc<ShedConfig>>,
    cycle: u64,
    splay_seed: Option<u64>,
}

impl<S, R> Scheduler<S, R>
where
    S: RepoSync,
    R: Runner,
{
    pub fn new(config_path: impl Into<PathBuf>, sync: S, runner: R, store: MetricStore) -> Self {
        Self {
            config_path: config_path.into(),
            sync,
            runner,
            store,
            config: None,
            cycle: 0,
            splay_seed: None,
        }
    }

    /// Draw the start splay from a seeded generator instead of the thread RNG.
    pub fn with_splay_seed(mut self, seed: u64) -> Self {
        self.splay_seed = Some(seed);
        self
    }

    /// Configuration snapshot used by the most recent cycle.
    pub fn config(&self) -> Option<&Arc<ShedConfig>> {
        self.config.as_ref()
    }

    /// Number of cycles started so far.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn store(&self) -> &MetricStore {
        &self.store
    }

    /// Run forever.
    ///
    /// Returns only when the configuration cannot be loaded before the first cycle.
    pub async fn run(mut self) -> Result<(), CoreError> {
        let config = self.reload_config().await?;
        info!(
            config = %self.config_path.display(),
            runner = self.runner.name(),
            interval_min = config.interval,
            "scheduler starting"
        );

        let splay = match self.splay_seed {
            Some(seed) => splay_delay_with(&mut StdRng::seed_from_u64(seed), config.start_splay),
            None => splay_delay(config.start_splay),
        };
        if !splay.is_zero() {
            info!(splay_s = splay.as_secs(), "waiting for the start splay");
            tokio::time::sleep(splay).await;
        }

        loop {
            let started = Instant::now();

            match self.run_cycle().await {
                Ok(report) => info!(
                    cycle = report.cycle,
                    returncode = report.returncode,
                    hosts = report.hosts,
                    run_time_s = report.run_time.as_secs(),
                    "cycle completed"
                ),
                Err(e) => error!(cycle = self.cycle, step = e.step(), error = %e, "cycle failed"),
            }

            let elapsed = started.elapsed();
            let interval = self.interval();
            let sleep = sleep_duration(interval, elapsed);
            if elapsed > interval {
                warn!(
                    cycle = self.cycle,
                    elapsed_s = elapsed.as_secs(),
                    interval_s = interval.as_secs(),
                    "cycle overran its interval; starting the next one now"
                );
            }
            self.log_stats();
            info!(
                cycle = self.cycle,
                elapsed_s = elapsed.as_secs(),
                sleep_s = sleep.as_secs(),
                "sleeping until next cycle"
            );
            tokio::time::sleep(sleep).await;
        }
    }

    /// Execute one cycle.
    ///
    /// On sync or run failure the store gets a failure return code so scrapes show
    /// the cycle did not produce fresh counters.
    #[instrument(level = "debug", skip(self), fields(cycle = self.cycle + 1))]
    pub async fn run_cycle(&mut self) -> Result<CycleReport, CoreError> {
        self.cycle += 1;

        let config = self.reload_config().await?;
        self.sync_repo(&config).await?;

        debug!(runner = self.runner.name(), "starting playbook run");
        let result = match self.runner.run(&config).await {
            Ok(result) => result,
            Err(e) => {
                self.store.record_failure(FAILED_RUN_RETURNCODE, unix_now());
                return Err(e.into());
            }
        };

        let parsed = parse_output(&result.output, result.returncode);
        for warning in &parsed.warnings {
            warn!(cycle = self.cycle, %warning, "unparsable recap token");
        }
        let report = CycleReport {
            cycle: self.cycle,
            returncode: result.returncode,
            hosts: parsed.host_count(),
            warnings: parsed.warnings.len(),
            run_time: result.duration,
        };

        let mut metrics = parsed.metrics;
        metrics.insert(LAST_RUN_TIME.to_string(), result.duration.as_secs() as i64);
        self.store.merge_run(metrics);

        Ok(report)
    }

    /// Sleep that would follow a cycle which took `elapsed`, under the current config.
    pub fn next_sleep(&self, elapsed: Duration) -> Duration {
        sleep_duration(self.interval(), elapsed)
    }

    fn interval(&self) -> Duration {
        self.config
            .as_ref()
            .map(|c| c.interval_duration())
            .unwrap_or(UNCONFIGURED_RETRY)
    }

    async fn reload_config(&mut self) -> Result<Arc<ShedConfig>, ConfigError> {
        let raw = tokio::fs::read_to_string(&self.config_path)
            .await
            .map_err(|source| ConfigError::Read {
                path: self.config_path.clone(),
                source,
            })?;
        let config = Arc::new(ShedConfig::from_toml_str(&raw)?);
        self.config = Some(Arc::clone(&config));
        Ok(config)
    }

    async fn sync_repo(&self, config: &ShedConfig) -> Result<(), CoreError> {
        let Err(e) = self.sync.ensure_and_update(config).await else {
            return Ok(());
        };

        let entry_point = config.entry_point();
        if tokio::fs::try_exists(&entry_point).await.unwrap_or(false) {
            warn!(
                cycle = self.cycle,
                error = %e,
                entry_point = %entry_point.display(),
                "repo sync failed; running against the existing working copy"
            );
            return Ok(());
        }

        self.store.record_failure(FAILED_RUN_RETURNCODE, unix_now());
        Err(e.into())
    }

    fn log_stats(&self) {
        if !tracing::enabled!(Level::DEBUG) {
            return;
        }
        match serde_json::to_string_pretty(&self.store.snapshot()) {
            Ok(stats) => debug!("stats:\n{stats}"),
            Err(e) => debug!(error = %e, "failed to serialize stats"),
        }
    }
}
