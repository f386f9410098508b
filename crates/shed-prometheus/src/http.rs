use axum::{
    Router,
    extract::State,
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::get,
};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::{backend::PrometheusMetrics, error::ExpositionError};

/// Build the exporter router.
///
/// Routes:
/// - GET /metrics - Prometheus text format
/// - GET /healthz - liveness
pub fn router(metrics: PrometheusMetrics) -> Router {
    Router::new()
        .route("/metrics", get(metrics_handler))
        .route("/healthz", get(healthz))
        .with_state(metrics)
}

/// Bind the exporter listener; `addr` may be an IP literal or a hostname.
pub async fn bind(addr: &str, port: u16) -> Result<TcpListener, ExpositionError> {
    let listener = TcpListener::bind((addr, port))
        .await
        .map_err(|source| ExpositionError::Bind {
            addr: format!("{addr}:{port}"),
            source,
        })?;
    if let Ok(local) = listener.local_addr() {
        info!(%local, "exporter listening");
    }
    Ok(listener)
}

pub async fn serve(listener: TcpListener, router: Router) -> Result<(), ExpositionError> {
    axum::serve(listener, router)
        .await
        .map_err(ExpositionError::Serve)
}

/// GET /metrics
async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> Response {
    match metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(CONTENT_TYPE, prometheus::TEXT_FORMAT)],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// GET /healthz
async fn healthz() -> &'static str {
    "ok"
}
