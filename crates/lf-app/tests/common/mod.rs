//! Shared fixtures: a two-bus feeder schematic with its build folder.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use lf_project::{Definition, SCHEMA_VERSION, SchematicComponent, SchematicDoc, save_schematic};
use lf_solver::{
    Network, PowerFlowOptions, PowerFlowResults, PowerFlowSolver, ResBus, ResGen, ResLine,
    ResPower, ResTrafo, SolverError, SolverResult,
};
use lf_topology::Point;

pub const DTA: &str = "\
! Local Node Voltages
  NT_1    0.0  // Bus1(1)
  NT_2    0.0  // Bus2(1)
! Local Branch Data
! TL1
 2  0
 NT_2  NT_0  0.1
 NT_1  NT_0  0.1
";

pub const TL1_OUT: &str = "\
 LOAD FLOW RXB FORMATTED DATA @ 60.0 Hz:
 ---------------------------------------

 Base of Per-Unit Quantities:  13.8 kV(L-L),  100.0 MVA

 Positive Sequence
 -----------------
 Resistance Rsq [pu]:      0.0100
 Reactance Xsq [pu]:       0.0500
 Susceptance Bsq [pu]:     0.0010
";

pub fn p(x: i64, y: i64) -> Point {
    Point::new(x, y)
}

pub fn comp(
    definition: Definition,
    id: u64,
    location: Point,
    vertices: &[Point],
    params: &[(&str, &str)],
    ports: &[(&str, Point)],
) -> SchematicComponent {
    SchematicComponent {
        id,
        definition,
        location,
        vertices: vertices.to_vec(),
        ports: ports.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
        parameters: params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
    }
}

/// Bus1 (13.8 kV, slack) and Bus2 (0.48 kV) joined by transformer T1 and
/// line TL1; load 30, capacitor 40 and source G2 on Bus2; grid source on Bus1.
pub fn feeder_doc() -> SchematicDoc {
    let origin = Point::default();
    SchematicDoc {
        version: SCHEMA_VERSION,
        name: "feeder".to_string(),
        components: vec![
            comp(
                Definition::Bus,
                1,
                p(0, 0),
                &[p(0, 0), p(0, 10)],
                &[("Name", "Bus1"), ("BaseKV", "13.8 [kV]")],
                &[],
            ),
            comp(
                Definition::Bus,
                2,
                p(100, 0),
                &[p(0, 0), p(0, 10)],
                &[("Name", "Bus2"), ("BaseKV", "0.48 [kV]")],
                &[],
            ),
            comp(Definition::Wire, 3, p(0, 0), &[p(0, 5), p(20, 5)], &[], &[]),
            comp(Definition::Wire, 4, p(100, 0), &[p(0, 5), p(-20, 5)], &[], &[]),
            comp(
                Definition::Transformer,
                20,
                origin,
                &[],
                &[
                    ("Name", "T1"),
                    ("Tmva", "1.0 [MVA]"),
                    ("V1", "13.8 [kV]"),
                    ("V2", "0.48 [kV]"),
                    ("YD1", "1"),
                    ("YD2", "0"),
                    ("Tap", "1"),
                    ("Lead", "1"),
                    ("CuL", "0.01 [pu]"),
                    ("Xl", "0.05 [pu]"),
                    ("NLL", "0.001 [pu]"),
                    ("Im1", "0.5 [%]"),
                ],
                &[("N1", p(20, 5)), ("N2", p(80, 5))],
            ),
            comp(
                Definition::TLine,
                10,
                origin,
                &[],
                &[("Name", "TL1"), ("Length", "2.0 [km]")],
                &[],
            ),
            comp(
                Definition::FixedLoad,
                30,
                origin,
                &[],
                &[("PO", "0.1 [MW]"), ("QO", "0.03 [MVAR]")],
                &[("IA", p(100, 8))],
            ),
            comp(
                Definition::Capacitor,
                40,
                origin,
                &[],
                &[("C", "100.0 [uF]")],
                &[("A", p(100, 9))],
            ),
            comp(
                Definition::Source3Pu,
                50,
                origin,
                &[],
                &[
                    ("Name", "Grid"),
                    ("Pinit", "0.0"),
                    ("Vpu", "1.0"),
                    ("PhT", "0.0 [deg]"),
                    ("Sbase", "100.0 [MVA]"),
                ],
                &[("N", p(0, 2))],
            ),
            comp(
                Definition::Source3,
                51,
                origin,
                &[],
                &[
                    ("Name", "G2"),
                    ("Vm", "0.48 [kV]"),
                    ("MVA", "0.5 [MVA]"),
                    ("Pinit", "0.4 [pu]"),
                    ("Es", "0.48 [kV]"),
                    ("Ph", "0.0 [deg]"),
                ],
                &[("N3", p(100, 2))],
            ),
        ],
    }
}

/// Fresh project directory holding `feeder.yaml` and its `feeder.gf46` build folder.
pub fn project(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(name);
    let _ = std::fs::remove_dir_all(&dir);
    let build = dir.join("feeder.gf46");
    std::fs::create_dir_all(&build).unwrap();
    std::fs::write(build.join("main.dta"), DTA).unwrap();
    std::fs::write(build.join("TL1.out"), TL1_OUT).unwrap();

    let path = dir.join("feeder.yaml");
    save_schematic(&path, &feeder_doc()).unwrap();
    path
}

pub fn schematic_dir(path: &Path) -> &Path {
    path.parent().unwrap()
}

/// Solver stand-in producing a fixed, aligned set of result tables.
pub struct FixedSolver;

impl PowerFlowSolver for FixedSolver {
    fn run_pf(&self, network: &mut Network, _options: &PowerFlowOptions) -> SolverResult<()> {
        let results = PowerFlowResults {
            res_bus: network
                .bus
                .iter()
                .map(|_| ResBus {
                    vm_pu: 1.0,
                    ..ResBus::default()
                })
                .collect(),
            res_line: vec![ResLine::default(); network.line.len()],
            res_trafo: vec![ResTrafo::default(); network.trafo.len()],
            res_load: network
                .load
                .iter()
                .map(|l| ResPower {
                    p_mw: l.p_mw,
                    q_mvar: l.q_mvar,
                })
                .collect(),
            res_gen: network
                .gens
                .iter()
                .map(|g| ResGen {
                    p_mw: g.p_mw,
                    q_mvar: 0.1,
                    va_degree: -1.0,
                    vm_pu: g.vm_pu,
                })
                .collect(),
            res_ext_grid: network
                .ext_grid
                .iter()
                .map(|_| ResPower {
                    p_mw: 2.0,
                    q_mvar: 0.5,
                })
                .collect(),
            res_shunt: vec![ResPower::default(); network.shunt.len()],
        };
        network.set_results(results)
    }
}

/// Solver stand-in that never converges.
pub struct DivergingSolver;

impl PowerFlowSolver for DivergingSolver {
    fn run_pf(&self, _network: &mut Network, _options: &PowerFlowOptions) -> SolverResult<()> {
        Err(SolverError::ConvergenceFailed {
            message: "mismatch 1.2e3 after 10 iterations".to_string(),
        })
    }
}
