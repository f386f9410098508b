use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExpositionError {
    #[error("registry: {0}")]
    Registry(#[from] prometheus::Error),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("http server: {0}")]
    Serve(#[source] std::io::Error),
}
