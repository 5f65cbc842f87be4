//! Error types for parameter extraction.

use std::path::PathBuf;

use lf_core::LfError;
use lf_solver::SolverError;
use lf_topology::TopologyError;
use thiserror::Error;

/// Errors raised while turning schematic components into network records.
#[derive(Error, Debug)]
pub enum ComponentError {
    #[error("Component '{component}' has no parameter '{key}'")]
    MissingParameter { component: String, key: &'static str },

    #[error("Component '{component}' parameter '{key}' is not a number: '{raw}'")]
    InvalidQuantity {
        component: String,
        key: &'static str,
        raw: String,
    },

    #[error("Component '{component}' has no port '{port}'")]
    MissingPort { component: String, port: &'static str },

    #[error("Component '{component}' has definition '{tag}', which is not a {expected}")]
    WrongDefinition {
        component: String,
        tag: &'static str,
        expected: &'static str,
    },

    #[error("Bus name '{name}' contains no digits to derive an index from")]
    NoBusDigits { name: String },

    #[error("No RXB or matrix line constants found for '{name}'")]
    AmbiguousLineData { name: String },

    #[error("Malformed line report for '{name}': {what}")]
    MalformedLineData { name: String, what: String },

    #[error("Branch '{name}' not found in node map")]
    UnknownBranch { name: String },

    #[error("Node label '{label}' not found in node map")]
    UnknownNodeLabel { label: String },

    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Override sheet {path}: {message}")]
    Overrides { path: PathBuf, message: String },

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Solver(#[from] SolverError),
}

pub type ComponentResult<T> = Result<T, ComponentError>;

impl ComponentError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ComponentError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<LfError> for ComponentError {
    fn from(e: LfError) -> Self {
        ComponentError::Solver(SolverError::Core(e))
    }
}
