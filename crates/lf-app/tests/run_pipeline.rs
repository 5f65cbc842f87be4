//! Integration tests for the full load-flow run.

mod common;

use common::{DivergingSolver, FixedSolver, project, schematic_dir};
use lf_app::{AppError, RunProgressEvent, RunRequest, RunStage, run, run_with_progress};
use lf_project::{RunConfig, load_schematic};
use lf_results::{ExportStage, RESULT_DIR, ResultStore};

fn request(path: &std::path::Path) -> RunRequest<'_> {
    RunRequest {
        schematic_path: path,
        config: RunConfig::default(),
        build_command: None,
    }
}

fn param(path: &std::path::Path, id: u64, key: &str) -> String {
    let doc = load_schematic(path).unwrap();
    let comp = doc.components.iter().find(|c| c.id == id).unwrap();
    comp.parameters[key].clone()
}

#[test]
fn feeder_runs_end_to_end() {
    let path = project("lf_app_feeder_run");
    let response = run(&request(&path), &FixedSolver).unwrap();

    let net = &response.network;
    assert_eq!(net.table_sizes()["bus"], 2);
    assert_eq!(net.line.len(), 1);
    assert_eq!(net.shunt.len(), 1);
    assert_eq!(net.load.len(), 1);
    assert_eq!(net.trafo.len(), 1);
    assert_eq!(net.gens.len(), 1);
    assert_eq!(net.ext_grid.len(), 1);
    assert!(net.results.is_some());
    assert!(response.conflicts.is_empty());

    // z_base = 13.8² / 100 ohm
    let z_base = 13.8 * 13.8 / 100.0;
    assert!((net.line[0].r_ohm_per_km - 0.01 * z_base / 2.0).abs() < 1e-9);
    assert_eq!((net.line[0].to_bus, net.line[0].from_bus), (2, 1));
    assert_eq!(net.trafo[0].vector_group, "Dyn11");
    assert_eq!(net.ext_grid[0].bus, 1);

    let mut written = response.written_back.clone();
    written.sort();
    assert_eq!(written, vec!["G2".to_string(), "Grid".to_string()]);
}

#[test]
fn sources_written_back_and_saved() {
    let path = project("lf_app_feeder_writeback");
    run(&request(&path), &FixedSolver).unwrap();

    // G2: p = 0.4 pu of 0.5 MVA = 0.2 MW, q = 0.1 Mvar
    assert_eq!(param(&path, 51, "Pinit"), "0.4");
    assert_eq!(param(&path, 51, "Qinit"), "0.2");
    assert_eq!(param(&path, 51, "Ph"), "-1");
    assert_eq!(param(&path, 51, "Es"), "0.48");

    // Grid: 2.0 MW / 0.5 Mvar on a 100 MVA base, setpoints kept
    assert_eq!(param(&path, 50, "Pinit"), "0.02");
    assert_eq!(param(&path, 50, "Qinit"), "0.005");
    assert_eq!(param(&path, 50, "PhT"), "0");
    assert_eq!(param(&path, 50, "Vpu"), "1");
}

#[test]
fn results_exported_after_solve() {
    let path = project("lf_app_feeder_export");
    let response = run(&request(&path), &FixedSolver).unwrap();

    let manifest = response.export.unwrap();
    assert_eq!(manifest.stage, ExportStage::AfterSolve);
    assert_eq!(manifest.tables["res_bus"], 2);

    let store = ResultStore::new(schematic_dir(&path).join(RESULT_DIR)).unwrap();
    assert_eq!(store.load_manifest().unwrap(), manifest);
}

#[test]
fn export_can_be_disabled() {
    let path = project("lf_app_feeder_no_export");
    let mut req = request(&path);
    req.config.export_results = false;
    let response = run(&req, &FixedSolver).unwrap();
    assert!(response.export.is_none());
    assert!(!schematic_dir(&path).join(RESULT_DIR).exists());
}

#[test]
fn stages_reported_in_pipeline_order() {
    let path = project("lf_app_feeder_progress");
    let mut events: Vec<RunProgressEvent> = Vec::new();
    run_with_progress(
        &request(&path),
        &FixedSolver,
        Some(&mut |event| events.push(event)),
    )
    .unwrap();

    let stages: Vec<RunStage> = events.iter().map(|e| e.stage).collect();
    assert_eq!(
        stages,
        vec![
            RunStage::BuildingTopology,
            RunStage::CreatingBuses,
            RunStage::CreatingLines,
            RunStage::CreatingCapacitors,
            RunStage::CreatingLoads,
            RunStage::CreatingTransformers,
            RunStage::CreatingGenerators,
            RunStage::ExportingInputs,
            RunStage::Solving,
            RunStage::ExportingResults,
            RunStage::WritingBack,
            RunStage::Saving,
            RunStage::Completed,
        ]
    );
    assert!(events.windows(2).all(|w| w[0].elapsed_wall_s <= w[1].elapsed_wall_s));
}

#[test]
fn divergence_keeps_input_export_and_leaves_schematic_untouched() {
    let path = project("lf_app_feeder_diverges");
    let err = run(&request(&path), &DivergingSolver).unwrap_err();
    assert!(matches!(err, AppError::Solver(_)));
    assert!(err.to_string().contains("mismatch"));

    let store = ResultStore::new(schematic_dir(&path).join(RESULT_DIR)).unwrap();
    assert_eq!(
        store.load_manifest().unwrap().stage,
        ExportStage::BeforeSolve
    );
    assert_eq!(param(&path, 51, "Pinit"), "0.4 [pu]");
}

#[test]
fn override_sheets_applied() {
    let path = project("lf_app_feeder_overrides");
    let dir = schematic_dir(&path).join("man_input");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("gen.csv"), "Name,Bus,max_q_mvar,min_q_mvar\nG2,,0.3,-0.3\n").unwrap();
    std::fs::write(dir.join("line.csv"), "Name,max_i_ka\nTL1,0.4\n").unwrap();

    let response = run(&request(&path), &FixedSolver).unwrap();
    let net = &response.network;
    assert_eq!(net.gens[0].max_q_mvar, Some(0.3));
    assert_eq!(net.gens[0].min_q_mvar, Some(-0.3));
    assert_eq!(net.line[0].max_i_ka, 0.4);
}

#[test]
fn unknown_slack_bus_fails_before_solving() {
    let path = project("lf_app_feeder_bad_slack");
    let mut req = request(&path);
    req.config.slack_bus = "Bus9".into();
    let err = run(&req, &FixedSolver).unwrap_err();
    assert!(err.to_string().contains("Bus9"));
    assert!(!schematic_dir(&path).join(RESULT_DIR).exists());
}

#[test]
fn missing_build_folder_is_reported() {
    let path = project("lf_app_feeder_gf42");
    let mut req = request(&path);
    req.config.compiler = lf_project::Compiler::Gfortran42;
    let err = run(&req, &FixedSolver).unwrap_err();
    assert!(matches!(err, AppError::Component(_)));
    assert!(err.to_string().contains("feeder.gf42"));
}
