//! Load-flow solver seam.

use serde::{Deserialize, Serialize};

use crate::error::SolverResult;
use crate::network::Network;

/// Initial guess for the Newton iteration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InitMode {
    #[default]
    Auto,
    Flat,
    Dc,
    Results,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerFlowOptions {
    pub init: InitMode,
    /// `None` lets the solver pick its own limit.
    pub max_iteration: Option<u32>,
    pub enforce_q_lims: bool,
    pub calculate_voltage_angles: bool,
}

impl Default for PowerFlowOptions {
    fn default() -> Self {
        Self {
            init: InitMode::Auto,
            max_iteration: None,
            enforce_q_lims: false,
            calculate_voltage_angles: true,
        }
    }
}

/// A load-flow backend.
///
/// On success the implementation stores its result tables on the network via
/// [`Network::set_results`]. A non-converged solve is an error, never retried.
pub trait PowerFlowSolver {
    fn run_pf(&self, network: &mut Network, options: &PowerFlowOptions) -> SolverResult<()>;
}
