//! Prometheus exposition for the play recap counters.
//!
//! [`PrometheusMetrics`] mirrors a [`shed_core::MetricStore`] snapshot into a gauge registry,
//! [`run_updater`] keeps it current on every freshness signal, and [`router`] serves it.
//!
//! ## Metrics
//! - `ansible_last_run_returncode` - Gauge, `-1` when the last cycle could not run
//! - `ansible_last_run_time` - Gauge, seconds spent in the last run
//! - `ansible_stats_last_updated` - Gauge, unix time of the last publication
//! - `ansible_{ok,changed,unreachable,failed,skipped,rescued,ignored}{hostname}` - Gauge
//!
//! ## Example
//! ```rust,ignore
//! let metrics = PrometheusMetrics::new()?;
//! tokio::spawn(run_updater(metrics.clone(), store.clone()));
//! let listener = bind("::", 12345).await?;
//! serve(listener, router(metrics)).await?;
//! ```

mod backend;
pub use backend::{ApplyReport, PrometheusMetrics};

mod error;
pub use error::ExpositionError;

mod http;
pub use http::{bind, router, serve};

mod updater;
pub use updater::run_updater;
