//! Network assembly and solver errors.

use lf_core::LfError;
use thiserror::Error;

pub type SolverResult<T> = Result<T, SolverError>;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Unknown bus name '{name}'")]
    UnknownBus { name: String },

    #[error("Unknown bus index {index}")]
    UnknownBusIndex { index: usize },

    #[error("Bus index {index} already used by '{existing}'")]
    DuplicateBusIndex { index: usize, existing: String },

    #[error("Load flow did not converge: {message}")]
    ConvergenceFailed { message: String },

    #[error("Solver program not found: {0}")]
    NotFound(String),

    #[error("Solver execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Solver timed out after {0} seconds")]
    Timeout(u64),

    #[error("Malformed solver results: {0}")]
    MalformedResults(String),

    #[error(transparent)]
    Core(#[from] LfError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
