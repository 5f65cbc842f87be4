//! Load-flow run pipeline.
//!
//! One run: build the schematic (optionally), resolve its topology, extract
//! every component into a fresh network, export the inputs, solve, export
//! the results, write generator operating points back and save.

use std::path::{Path, PathBuf};
use std::time::Instant;

use lf_components::{
    BusDef, CapacitorDef, ExtractContext, ExtractSettings, GeneratorDef, LineDef, LoadDef,
    NetworkElement, OverrideBook, TransformerDef, extract_all,
};
use lf_project::{Definition, RunConfig, SchematicCanvas, SchematicComponent};
use lf_results::{ExportManifest, ExportStage, RESULT_DIR, ResultStore};
use lf_solver::{InitMode, Network, PowerFlowOptions, PowerFlowSolver};
use lf_topology::{BusConflict, TopologyGraph};
use tracing::{info, warn};

use crate::error::AppResult;
use crate::progress::{RunProgressEvent, RunStage};
use crate::project_service;

/// Request to execute a run on a schematic file.
pub struct RunRequest<'a> {
    pub schematic_path: &'a Path,
    pub config: RunConfig,
    /// Command that rebuilds the schematic project when `build_before_run` is set.
    pub build_command: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct RunTiming {
    pub extract_time_s: f64,
    pub solve_time_s: f64,
    pub total_time_s: f64,
}

#[derive(Debug, Clone)]
pub struct RunResponse {
    /// Solved network, results attached.
    pub network: Network,
    /// Manifest of the final result export, if exporting is enabled.
    pub export: Option<ExportManifest>,
    /// Generators whose parameters were written back.
    pub written_back: Vec<String>,
    pub conflicts: Vec<BusConflict>,
    pub timing: RunTiming,
}

/// All mutable state of one run. Created per run and dropped at its end.
pub struct RunContext {
    pub topology: TopologyGraph,
    pub overrides: OverrideBook,
    pub network: Network,
    pub settings: ExtractSettings,
}

impl RunContext {
    pub fn new(canvas: &dyn SchematicCanvas, config: &RunConfig) -> AppResult<Self> {
        let override_dir = canvas.project_dir().join(&config.override_dir);
        Ok(Self {
            topology: project_service::build_topology(canvas),
            overrides: OverrideBook::load(&override_dir)?,
            network: Network::new(config.frequency_hz),
            settings: ExtractSettings {
                frequency_hz: config.frequency_hz,
                slack_bus: config.slack_bus.clone(),
                similar_bus_indices: config.similar_bus_indices,
                build_dir: build_dir(canvas, config),
            },
        })
    }

    pub fn extractor(&mut self) -> ExtractContext<'_> {
        ExtractContext::new(
            &mut self.topology,
            &self.overrides,
            &mut self.network,
            &self.settings,
        )
    }
}

/// `<project dir>/<project name>.<gf42|gf46>`
pub fn build_dir(canvas: &dyn SchematicCanvas, config: &RunConfig) -> PathBuf {
    canvas.project_dir().join(format!(
        "{}.{}",
        canvas.project_name(),
        config.compiler.folder_extension()
    ))
}

/// Solver options for a run configuration. Voltage angles are always calculated.
pub fn power_flow_options(config: &RunConfig) -> PowerFlowOptions {
    let init = match config.init {
        lf_project::InitMode::Auto => InitMode::Auto,
        lf_project::InitMode::Flat => InitMode::Flat,
        lf_project::InitMode::Dc => InitMode::Dc,
        lf_project::InitMode::Results => InitMode::Results,
    };
    PowerFlowOptions {
        init,
        max_iteration: config.max_iteration.as_option(),
        enforce_q_lims: config.enforce_q_lims,
        calculate_voltage_angles: true,
    }
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent::stage(
            stage,
            started.elapsed().as_secs_f64(),
            message,
        ));
    }
}

/// Run the pipeline on a schematic file.
pub fn run(request: &RunRequest, solver: &dyn PowerFlowSolver) -> AppResult<RunResponse> {
    run_with_progress(request, solver, None)
}

/// Run the pipeline on a schematic file and stream stage events.
pub fn run_with_progress(
    request: &RunRequest,
    solver: &dyn PowerFlowSolver,
    progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let mut canvas = project_service::load_canvas(request.schematic_path)?;
    if let Some(command) = &request.build_command {
        canvas = canvas.with_build_command(command.clone());
    }
    run_on_canvas(&mut canvas, &request.config, solver, progress_cb)
}

/// Run the pipeline on an open canvas.
pub fn run_on_canvas(
    canvas: &mut dyn SchematicCanvas,
    config: &RunConfig,
    solver: &dyn PowerFlowSolver,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();

    if config.build_before_run {
        emit_progress(&mut progress_cb, RunStage::BuildingProject, started, None);
        canvas.build()?;
    }

    emit_progress(&mut progress_cb, RunStage::BuildingTopology, started, None);
    let mut ctx = RunContext::new(canvas, config)?;
    extract_network(canvas, &mut ctx, &mut progress_cb, started)?;
    let extract_time_s = started.elapsed().as_secs_f64();

    let store = if config.export_results {
        Some(ResultStore::new(canvas.project_dir().join(RESULT_DIR))?)
    } else {
        None
    };

    if let Some(store) = &store {
        emit_progress(&mut progress_cb, RunStage::ExportingInputs, started, None);
        store.export(&ctx.network, ExportStage::BeforeSolve)?;
    }

    emit_progress(&mut progress_cb, RunStage::Solving, started, None);
    let solve_start = Instant::now();
    solver.run_pf(&mut ctx.network, &power_flow_options(config))?;
    let solve_time_s = solve_start.elapsed().as_secs_f64();
    info!(solve_time_s, "load flow converged");

    let export = match &store {
        Some(store) => {
            emit_progress(&mut progress_cb, RunStage::ExportingResults, started, None);
            Some(store.export(&ctx.network, ExportStage::AfterSolve)?)
        }
        None => None,
    };

    emit_progress(&mut progress_cb, RunStage::WritingBack, started, None);
    let written_back = write_back(canvas, &ctx.network)?;

    emit_progress(&mut progress_cb, RunStage::Saving, started, None);
    canvas.save()?;

    let timing = RunTiming {
        extract_time_s,
        solve_time_s,
        total_time_s: started.elapsed().as_secs_f64(),
    };
    emit_progress(
        &mut progress_cb,
        RunStage::Completed,
        started,
        Some(format!("{:.3}s", timing.total_time_s)),
    );

    Ok(RunResponse {
        network: ctx.network,
        export,
        written_back,
        conflicts: ctx.topology.conflicts().to_vec(),
        timing,
    })
}

fn extract_network(
    canvas: &dyn SchematicCanvas,
    ctx: &mut RunContext,
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    started: Instant,
) -> AppResult<()> {
    let mut extractor = ctx.extractor();
    let of = |definitions: &[Definition]| components_of(canvas, definitions);

    emit_progress(progress_cb, RunStage::CreatingBuses, started, None);
    extract_all::<BusDef>(&mut extractor, &of(&[Definition::Bus]))?;

    emit_progress(progress_cb, RunStage::CreatingLines, started, None);
    extract_all::<LineDef>(&mut extractor, &of(&[Definition::TLine, Definition::Cable]))?;

    emit_progress(progress_cb, RunStage::CreatingCapacitors, started, None);
    extract_all::<CapacitorDef>(&mut extractor, &of(&[Definition::Capacitor]))?;

    emit_progress(progress_cb, RunStage::CreatingLoads, started, None);
    extract_all::<LoadDef>(&mut extractor, &of(&[Definition::FixedLoad]))?;

    emit_progress(progress_cb, RunStage::CreatingTransformers, started, None);
    extract_all::<TransformerDef>(&mut extractor, &of(&[Definition::Transformer]))?;

    emit_progress(progress_cb, RunStage::CreatingGenerators, started, None);
    extract_all::<GeneratorDef>(
        &mut extractor,
        &of(&[Definition::Source3, Definition::Source3Pu]),
    )?;

    Ok(())
}

fn components_of<'c>(
    canvas: &'c dyn SchematicCanvas,
    definitions: &[Definition],
) -> Vec<&'c SchematicComponent> {
    definitions
        .iter()
        .flat_map(|d| canvas.components(*d))
        .collect()
}

/// Write each source's solved operating point onto its schematic parameters.
fn write_back(canvas: &mut dyn SchematicCanvas, network: &Network) -> AppResult<Vec<String>> {
    let mut updates = Vec::new();
    for definition in [Definition::Source3, Definition::Source3Pu] {
        for comp in canvas.components(definition) {
            let def = GeneratorDef::try_from(comp)?;
            let Some(op) = network.gen_operating_point(def.name()) else {
                warn!(name = def.name(), "no load-flow result for source");
                continue;
            };
            updates.push((comp.id, def.name().to_string(), def.writeback_parameters(&op)?));
        }
    }

    let mut written = Vec::with_capacity(updates.len());
    for (id, name, params) in updates {
        canvas.set_parameters(id, &params)?;
        written.push(name);
    }
    Ok(written)
}
