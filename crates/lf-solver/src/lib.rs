//! lf-solver: solver-ready network model and the load-flow solver seam.
//!
//! The network tables follow the pandapower element layout (`bus`, `line`,
//! `trafo`, `load`, `gen`, `ext_grid`, `shunt`) so that a pandapower-compatible
//! backend can consume them directly. Solving itself happens behind
//! [`PowerFlowSolver`]; [`CommandSolver`] runs an external program.

pub mod command;
pub mod error;
pub mod network;
pub mod solver;

pub use command::CommandSolver;
pub use error::{SolverError, SolverResult};
pub use network::*;
pub use solver::{InitMode, PowerFlowOptions, PowerFlowSolver};
