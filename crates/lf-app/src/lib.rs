//! Shared application service layer for the load-flow bridge.
//!
//! Centralizes the run pipeline (schematic in, solved network and written-back
//! schematic out), topology inspection and override template creation so the
//! CLI stays a thin front end.

pub mod error;
pub mod progress;
pub mod project_service;
pub mod run_service;
pub mod template_service;

// Re-export key types for convenience
pub use error::{AppError, AppResult};
pub use progress::{RunProgressEvent, RunStage};
pub use project_service::{
    PortBinding, TopologyReport, build_topology, electrical_ports, inspect_topology, load_canvas,
    load_config, validate_project,
};
pub use run_service::{
    RunContext, RunRequest, RunResponse, RunTiming, build_dir, power_flow_options, run,
    run_on_canvas, run_with_progress,
};
pub use template_service::{create_template, template_names};
