use bnet_core::{NetworkError, QueryError};
use thiserror::Error;

/// Errors from sampling and batch inference.
///
/// A failing worker aborts the whole batch: partial counts from the other
/// workers are discarded, never reduced on their own.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("worker {worker} failed: {source}")]
    Worker {
        worker: usize,
        #[source]
        source: NetworkError,
    },

    #[error("could not build worker pool: {0}")]
    Pool(String),

    #[error("unknown sampling algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
}
