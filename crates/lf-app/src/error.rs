//! Error types for the lf-app service layer.

use std::path::PathBuf;

/// Application error type wrapping the backend crates' errors for the CLI.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Project error: {0}")]
    Project(String),

    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Project validation failed: {0}")]
    Validation(String),

    #[error("Topology error: {0}")]
    Topology(String),

    #[error("Component error: {0}")]
    Component(String),

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for lf-app operations.
pub type AppResult<T> = Result<T, AppError>;

// Conversions from backend error types
impl From<lf_project::ProjectError> for AppError {
    fn from(err: lf_project::ProjectError) -> Self {
        match err {
            lf_project::ProjectError::Validation(e) => AppError::Validation(e.to_string()),
            other => AppError::Project(other.to_string()),
        }
    }
}

impl From<lf_topology::TopologyError> for AppError {
    fn from(err: lf_topology::TopologyError) -> Self {
        AppError::Topology(err.to_string())
    }
}

impl From<lf_components::ComponentError> for AppError {
    fn from(err: lf_components::ComponentError) -> Self {
        match err {
            lf_components::ComponentError::Topology(e) => AppError::Topology(e.to_string()),
            lf_components::ComponentError::Solver(e) => AppError::Solver(e.to_string()),
            other => AppError::Component(other.to_string()),
        }
    }
}

impl From<lf_solver::SolverError> for AppError {
    fn from(err: lf_solver::SolverError) -> Self {
        AppError::Solver(err.to_string())
    }
}

impl From<lf_results::ResultsError> for AppError {
    fn from(err: lf_results::ResultsError) -> Self {
        AppError::Results(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_topology::{Point, TopologyError};

    #[test]
    fn component_errors_keep_their_category() {
        let err: AppError = lf_components::ComponentError::from(TopologyError::UnresolvedBus {
            point: Point::new(3, 4),
        })
        .into();
        assert!(matches!(err, AppError::Topology(_)));

        let err: AppError = lf_components::ComponentError::NoBusDigits {
            name: "Feeder".into(),
        }
        .into();
        assert!(matches!(err, AppError::Component(_)));
    }

    #[test]
    fn unknown_bus_is_a_solver_error() {
        let err: AppError = lf_solver::SolverError::UnknownBus {
            name: "Bus9".into(),
        }
        .into();
        assert!(err.to_string().contains("Bus9"));
    }
}
