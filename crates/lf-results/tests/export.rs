use lf_results::{ExportStage, RESULT_DIR, ResultStore};
use lf_solver::{Bus, Line, Load, Network, PowerFlowResults, ResBus, ResLine, ResPower};

fn network() -> Network {
    let mut net = Network::new(50.0);
    net.create_bus("Bus1", 20.0, Some(1)).unwrap();
    net.create_bus("Bus2", 20.0, Some(2)).unwrap();
    net.create_line(Line {
        name: "TL1".into(),
        from_bus: 1,
        to_bus: 2,
        length_km: 3.0,
        r_ohm_per_km: 0.1,
        x_ohm_per_km: 0.3,
        c_nf_per_km: 10.0,
        max_i_ka: 1e9,
        type_: "ol".into(),
        in_service: true,
    })
    .unwrap();
    net.create_load(Load {
        name: "42".into(),
        bus: 2,
        p_mw: 1.5,
        q_mvar: 0.3,
        in_service: true,
    })
    .unwrap();
    net
}

fn store(name: &str) -> ResultStore {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    ResultStore::for_schematic(&dir.join("grid.yaml")).unwrap()
}

#[test]
fn inputs_written_before_solve() {
    let store = store("lf_results_before");
    let manifest = store.export(&network(), ExportStage::BeforeSolve).unwrap();

    assert_eq!(manifest.stage, ExportStage::BeforeSolve);
    assert_eq!(manifest.tables["bus"], 2);
    assert_eq!(manifest.tables["line"], 1);
    assert_eq!(manifest.tables["gen"], 0);
    assert!(!manifest.tables.contains_key("res_bus"));
    assert!(store.root_dir().ends_with(RESULT_DIR));

    let buses: Vec<Bus> = store.read_table("bus").unwrap();
    assert_eq!(buses[1].name, "Bus2");
    let lines: Vec<Line> = store.read_table("line").unwrap();
    assert_eq!(lines[0].type_, "ol");
    assert_eq!(store.load_manifest().unwrap(), manifest);
}

#[test]
fn results_added_after_solve_and_cleared_on_rerun() {
    let store = store("lf_results_after");
    let mut net = network();
    net.set_results(PowerFlowResults {
        res_bus: vec![
            ResBus {
                vm_pu: 1.0,
                va_degree: 0.0,
                p_mw: -1.5,
                q_mvar: -0.3,
            },
            ResBus {
                vm_pu: 0.98,
                va_degree: -1.2,
                p_mw: 1.5,
                q_mvar: 0.3,
            },
        ],
        res_line: vec![ResLine::default()],
        res_load: vec![ResPower {
            p_mw: 1.5,
            q_mvar: 0.3,
        }],
        ..PowerFlowResults::default()
    })
    .unwrap();

    let manifest = store.export(&net, ExportStage::AfterSolve).unwrap();
    assert_eq!(manifest.tables["res_bus"], 2);
    let res_bus: Vec<ResBus> = store.read_table("res_bus").unwrap();
    assert_eq!(res_bus[1].vm_pu, 0.98);

    store.export(&network(), ExportStage::BeforeSolve).unwrap();
    assert!(!store.table_path("res_bus").exists());
    assert!(store.table_path("bus").exists());
}
