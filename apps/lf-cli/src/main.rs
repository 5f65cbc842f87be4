use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use lf_app::{
    AppError, AppResult, RunProgressEvent, RunRequest, RunStage, RunTiming, project_service,
    run_service, template_service,
};
use lf_project::{Compiler, InitMode, MaxIteration, RunConfig};
use lf_solver::CommandSolver;

#[derive(Parser)]
#[command(name = "lf-cli")]
#[command(about = "Load flow for PSCAD schematics via a pandapower-compatible solver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that every electrical port resolves to a bus
    Validate {
        /// Path to the schematic YAML file
        schematic_path: PathBuf,
    },
    /// Print the buses found in a schematic and what is connected to them
    Topology {
        /// Path to the schematic YAML file
        schematic_path: PathBuf,
    },
    /// Write empty override sheets for a schematic
    Template {
        /// Path to the schematic YAML file
        schematic_path: PathBuf,
        /// Run configuration YAML (for the override directory)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Extract the network, run the load flow and write generator set points back
    Run(RunArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Path to the schematic YAML file
    schematic_path: PathBuf,
    /// Run configuration YAML; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// System frequency in Hz
    #[arg(long)]
    frequency: Option<f64>,
    /// Name of the bus whose generator becomes the external grid
    #[arg(long)]
    slack_bus: Option<String>,
    /// Solver start point: auto, flat, dc or results
    #[arg(long)]
    init: Option<InitMode>,
    /// Iteration cap, or "auto"
    #[arg(long)]
    max_iteration: Option<MaxIteration>,
    /// Respect generator reactive power limits
    #[arg(long)]
    enforce_q_lims: bool,
    /// Use the digits in bus names as bus indices (true or false)
    #[arg(long)]
    similar_bus_indices: Option<bool>,
    /// Do not write the network tables to loadflow_result/
    #[arg(long)]
    no_export: bool,
    /// Rebuild the schematic project before extracting
    #[arg(long)]
    build: bool,
    /// Command used for the rebuild (whitespace separated)
    #[arg(long)]
    build_command: Option<String>,
    /// Compiler folder to read build output from: gf42 or gf46
    #[arg(long)]
    compiler: Option<Compiler>,
    /// Load-flow program, invoked as `<solver> [args...] network.json results.json`
    #[arg(long, default_value = "pandapower-runpf")]
    solver: String,
    /// Extra argument passed to the solver program (repeatable)
    #[arg(long = "solver-arg", allow_hyphen_values = true)]
    solver_args: Vec<String>,
    /// Solver timeout in seconds
    #[arg(long, default_value_t = 120)]
    timeout: u64,
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { schematic_path } => cmd_validate(&schematic_path),
        Commands::Topology { schematic_path } => cmd_topology(&schematic_path),
        Commands::Template {
            schematic_path,
            config,
        } => cmd_template(&schematic_path, config.as_deref()),
        Commands::Run(args) => cmd_run(args),
    }
}

fn cmd_validate(schematic_path: &Path) -> AppResult<()> {
    println!("Validating schematic: {}", schematic_path.display());
    let canvas = project_service::load_canvas(schematic_path)?;
    let report = project_service::validate_project(&canvas)?;
    println!(
        "✓ Schematic is valid ({} buses, {} nodes)",
        report.buses.len(),
        report.node_count
    );
    for conflict in &report.conflicts {
        println!(
            "  warning: buses {} are connected at {}, using '{}'",
            conflict.names.join(", "),
            conflict.at,
            conflict.chosen
        );
    }
    Ok(())
}

fn cmd_topology(schematic_path: &Path) -> AppResult<()> {
    let canvas = project_service::load_canvas(schematic_path)?;
    let report = project_service::inspect_topology(&canvas);

    println!(
        "Topology: {} nodes, {} edges",
        report.node_count, report.edge_count
    );
    if report.buses.is_empty() {
        println!("No buses found in schematic");
    }
    for (bus, ports) in &report.buses {
        println!("  {}:", bus);
        for port in ports {
            println!(
                "    {} {}.{} at {}",
                port.definition.tag(),
                port.component,
                port.port,
                port.point
            );
        }
    }
    if !report.unresolved.is_empty() {
        println!("Unresolved ports:");
        for (port, reason) in &report.unresolved {
            println!("  {}.{} at {}: {}", port.component, port.port, port.point, reason);
        }
    }
    for conflict in &report.conflicts {
        println!(
            "Conflict at {}: {} (using '{}')",
            conflict.at,
            conflict.names.join(", "),
            conflict.chosen
        );
    }
    Ok(())
}

fn cmd_template(schematic_path: &Path, config_path: Option<&Path>) -> AppResult<()> {
    let canvas = project_service::load_canvas(schematic_path)?;
    let config = project_service::load_config(config_path)?;
    let written = template_service::create_template(&canvas, &config)?;
    println!("✓ Wrote {} override sheets", written.len());
    for path in written {
        println!("  {}", path.display());
    }
    Ok(())
}

fn cmd_run(args: RunArgs) -> AppResult<()> {
    let config = run_config(&args)?;
    println!(
        "Running load flow for: {} (slack bus '{}', {} Hz)",
        args.schematic_path.display(),
        config.slack_bus,
        config.frequency_hz
    );

    let build_command = args
        .build_command
        .as_deref()
        .map(|cmd| cmd.split_whitespace().map(str::to_string).collect::<Vec<_>>())
        .filter(|cmd| !cmd.is_empty());

    let work_dir = args
        .schematic_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let solver = CommandSolver::new(&args.solver, work_dir)
        .with_args(args.solver_args.clone())
        .with_timeout(args.timeout);

    let request = RunRequest {
        schematic_path: &args.schematic_path,
        config,
        build_command,
    };

    let mut last_emit = Instant::now();
    let mut last_stage = None;
    let response = run_service::run_with_progress(
        &request,
        &solver,
        Some(&mut |event| {
            let emit_now = last_stage != Some(event.stage) || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                last_stage = Some(event.stage);
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    println!("✓ Load flow converged");
    let sizes = response.network.table_sizes();
    for (table, count) in &sizes {
        println!("  {:<9} {}", table, count);
    }
    if let Some(manifest) = &response.export {
        println!("  Results written at {}", manifest.timestamp);
    }
    if !response.written_back.is_empty() {
        println!("  Written back: {}", response.written_back.join(", "));
    }
    for conflict in &response.conflicts {
        println!(
            "  warning: buses {} are connected at {}, using '{}'",
            conflict.names.join(", "),
            conflict.at,
            conflict.chosen
        );
    }

    print_timing_summary(&response.timing);
    Ok(())
}

fn run_config(args: &RunArgs) -> AppResult<RunConfig> {
    let mut config = project_service::load_config(args.config.as_deref())?;
    if let Some(frequency) = args.frequency {
        if !(frequency.is_finite() && frequency > 0.0) {
            return Err(AppError::InvalidInput(format!(
                "frequency must be positive, got {frequency}"
            )));
        }
        config.frequency_hz = frequency;
    }
    if let Some(slack_bus) = &args.slack_bus {
        config.slack_bus = slack_bus.clone();
    }
    if let Some(init) = args.init {
        config.init = init;
    }
    if let Some(max_iteration) = args.max_iteration {
        config.max_iteration = max_iteration;
    }
    if let Some(compiler) = args.compiler {
        config.compiler = compiler;
    }
    config.enforce_q_lims |= args.enforce_q_lims;
    if let Some(similar) = args.similar_bus_indices {
        config.similar_bus_indices = similar;
    }
    config.build_before_run |= args.build;
    if args.no_export {
        config.export_results = false;
    }
    Ok(config)
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(100));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    let spinner = ['|', '/', '-', '\\'];
    let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
    let mut line = format!(
        "\r{} {}  elapsed={:.2}s",
        spinner[spin_idx],
        stage_label(event.stage),
        event.elapsed_wall_s
    );
    if let Some(msg) = &event.message {
        line.push_str(&format!("  {}", msg));
    }
    print!("{}", line);
    let _ = io::stdout().flush();
}

fn stage_label(stage: RunStage) -> &'static str {
    match stage {
        RunStage::BuildingProject => "Building project",
        RunStage::BuildingTopology => "Building topology",
        RunStage::CreatingBuses => "Creating buses",
        RunStage::CreatingLines => "Creating lines",
        RunStage::CreatingCapacitors => "Creating capacitors",
        RunStage::CreatingLoads => "Creating loads",
        RunStage::CreatingTransformers => "Creating transformers",
        RunStage::CreatingGenerators => "Creating generators",
        RunStage::ExportingInputs => "Exporting inputs",
        RunStage::Solving => "Solving",
        RunStage::ExportingResults => "Exporting results",
        RunStage::WritingBack => "Writing back",
        RunStage::Saving => "Saving schematic",
        RunStage::Completed => "Completed",
    }
}

fn print_timing_summary(timing: &RunTiming) {
    let total = timing.total_time_s.max(1.0e-12);
    let extract_pct = 100.0 * timing.extract_time_s / total;
    let solve_pct = 100.0 * timing.solve_time_s / total;

    println!("\nTiming summary:");
    println!(
        "  Extract: {:.3}s ({:.1}%)",
        timing.extract_time_s, extract_pct
    );
    println!("  Solve:   {:.3}s ({:.1}%)", timing.solve_time_s, solve_pct);
    println!("  Total:   {:.3}s", timing.total_time_s);
}
