//! Network element and result tables.

use std::collections::BTreeMap;

use lf_core::ensure_finite;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SolverError, SolverResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    pub index: usize,
    pub name: String,
    pub vn_kv: f64,
    pub in_service: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub name: String,
    pub from_bus: usize,
    pub to_bus: usize,
    pub length_km: f64,
    pub r_ohm_per_km: f64,
    pub x_ohm_per_km: f64,
    pub c_nf_per_km: f64,
    pub max_i_ka: f64,
    /// `"ol"` overhead line or `"cs"` cable.
    #[serde(rename = "type")]
    pub type_: String,
    pub in_service: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transformer {
    pub name: String,
    pub hv_bus: usize,
    pub lv_bus: usize,
    pub sn_mva: f64,
    pub vn_hv_kv: f64,
    pub vn_lv_kv: f64,
    pub vk_percent: f64,
    pub vkr_percent: f64,
    pub pfe_kw: f64,
    pub i0_percent: f64,
    pub shift_degree: f64,
    pub vector_group: String,
    /// `"hv"`, `"lv"` or none.
    pub tap_side: Option<String>,
    pub tap_pos: Option<f64>,
    pub tap_neutral: Option<f64>,
    pub tap_step_percent: Option<f64>,
    pub tap_step_degree: Option<f64>,
    pub in_service: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Load {
    pub name: String,
    pub bus: usize,
    pub p_mw: f64,
    pub q_mvar: f64,
    pub in_service: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gen {
    pub name: String,
    pub bus: usize,
    pub p_mw: f64,
    pub vm_pu: f64,
    pub max_q_mvar: Option<f64>,
    pub min_q_mvar: Option<f64>,
    pub in_service: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtGrid {
    pub name: String,
    pub bus: usize,
    pub vm_pu: f64,
    pub va_degree: f64,
    pub max_q_mvar: Option<f64>,
    pub min_q_mvar: Option<f64>,
    pub in_service: bool,
}

/// Shunt element; `q_mvar > 0` absorbs reactive power, so capacitors are negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shunt {
    pub name: String,
    pub bus: usize,
    pub p_mw: f64,
    pub q_mvar: f64,
    pub vn_kv: f64,
    pub step: u32,
    pub in_service: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResBus {
    pub vm_pu: f64,
    pub va_degree: f64,
    pub p_mw: f64,
    pub q_mvar: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResLine {
    pub p_from_mw: f64,
    pub q_from_mvar: f64,
    pub p_to_mw: f64,
    pub q_to_mvar: f64,
    pub pl_mw: f64,
    pub ql_mvar: f64,
    pub i_ka: f64,
    pub loading_percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResTrafo {
    pub p_hv_mw: f64,
    pub q_hv_mvar: f64,
    pub p_lv_mw: f64,
    pub q_lv_mvar: f64,
    pub pl_mw: f64,
    pub ql_mvar: f64,
    pub loading_percent: f64,
}

/// Result row for loads and shunts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResPower {
    pub p_mw: f64,
    pub q_mvar: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResGen {
    pub p_mw: f64,
    pub q_mvar: f64,
    pub va_degree: f64,
    pub vm_pu: f64,
}

/// Result tables, row-aligned with the element tables of the solved network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerFlowResults {
    pub res_bus: Vec<ResBus>,
    pub res_line: Vec<ResLine>,
    pub res_trafo: Vec<ResTrafo>,
    pub res_load: Vec<ResPower>,
    pub res_gen: Vec<ResGen>,
    pub res_ext_grid: Vec<ResPower>,
    pub res_shunt: Vec<ResPower>,
}

/// Generator operating point read back after a solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenOperatingPoint {
    pub p_mw: f64,
    pub q_mvar: f64,
    pub vm_pu: f64,
    pub va_degree: f64,
}

/// A solver-ready network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub f_hz: f64,
    pub sn_mva: f64,
    pub bus: Vec<Bus>,
    pub line: Vec<Line>,
    pub trafo: Vec<Transformer>,
    pub load: Vec<Load>,
    #[serde(rename = "gen")]
    pub gens: Vec<Gen>,
    pub ext_grid: Vec<ExtGrid>,
    pub shunt: Vec<Shunt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<PowerFlowResults>,
}

impl Network {
    /// Empty network at the given system frequency.
    pub fn new(f_hz: f64) -> Self {
        Self {
            f_hz,
            sn_mva: 1.0,
            ..Self::default()
        }
    }

    /// Add a bus. With `index = None` the next free index is used.
    pub fn create_bus(
        &mut self,
        name: impl Into<String>,
        vn_kv: f64,
        index: Option<usize>,
    ) -> SolverResult<usize> {
        let name = name.into();
        ensure_finite(vn_kv, "bus vn_kv")?;

        let index = match index {
            Some(index) => {
                if let Some(existing) = self.bus(index) {
                    return Err(SolverError::DuplicateBusIndex {
                        index,
                        existing: existing.name.clone(),
                    });
                }
                index
            }
            None => self.bus.iter().map(|b| b.index + 1).max().unwrap_or(0),
        };

        debug!(%name, index, vn_kv, "bus created");
        self.bus.push(Bus {
            index,
            name,
            vn_kv,
            in_service: true,
        });
        Ok(index)
    }

    pub fn bus(&self, index: usize) -> Option<&Bus> {
        self.bus.iter().find(|b| b.index == index)
    }

    /// Index of the bus called `name`.
    pub fn bus_index(&self, name: &str) -> SolverResult<usize> {
        self.bus
            .iter()
            .find(|b| b.name == name)
            .map(|b| b.index)
            .ok_or_else(|| SolverError::UnknownBus {
                name: name.to_string(),
            })
    }

    pub fn create_line(&mut self, line: Line) -> SolverResult<usize> {
        self.check_bus(line.from_bus)?;
        self.check_bus(line.to_bus)?;
        ensure_finite(line.r_ohm_per_km, "line r_ohm_per_km")?;
        ensure_finite(line.x_ohm_per_km, "line x_ohm_per_km")?;
        ensure_finite(line.c_nf_per_km, "line c_nf_per_km")?;
        ensure_finite(line.length_km, "line length_km")?;
        self.line.push(line);
        Ok(self.line.len() - 1)
    }

    pub fn create_transformer(&mut self, trafo: Transformer) -> SolverResult<usize> {
        self.check_bus(trafo.hv_bus)?;
        self.check_bus(trafo.lv_bus)?;
        ensure_finite(trafo.sn_mva, "trafo sn_mva")?;
        ensure_finite(trafo.vn_hv_kv, "trafo vn_hv_kv")?;
        ensure_finite(trafo.vn_lv_kv, "trafo vn_lv_kv")?;
        ensure_finite(trafo.vk_percent, "trafo vk_percent")?;
        ensure_finite(trafo.vkr_percent, "trafo vkr_percent")?;
        ensure_finite(trafo.pfe_kw, "trafo pfe_kw")?;
        ensure_finite(trafo.i0_percent, "trafo i0_percent")?;
        ensure_finite(trafo.shift_degree, "trafo shift_degree")?;
        self.trafo.push(trafo);
        Ok(self.trafo.len() - 1)
    }

    pub fn create_load(&mut self, load: Load) -> SolverResult<usize> {
        self.check_bus(load.bus)?;
        ensure_finite(load.p_mw, "load p_mw")?;
        ensure_finite(load.q_mvar, "load q_mvar")?;
        self.load.push(load);
        Ok(self.load.len() - 1)
    }

    pub fn create_gen(&mut self, generator: Gen) -> SolverResult<usize> {
        self.check_bus(generator.bus)?;
        ensure_finite(generator.p_mw, "gen p_mw")?;
        ensure_finite(generator.vm_pu, "gen vm_pu")?;
        self.gens.push(generator);
        Ok(self.gens.len() - 1)
    }

    pub fn create_ext_grid(&mut self, ext_grid: ExtGrid) -> SolverResult<usize> {
        self.check_bus(ext_grid.bus)?;
        ensure_finite(ext_grid.vm_pu, "ext_grid vm_pu")?;
        ensure_finite(ext_grid.va_degree, "ext_grid va_degree")?;
        self.ext_grid.push(ext_grid);
        Ok(self.ext_grid.len() - 1)
    }

    pub fn create_shunt(&mut self, shunt: Shunt) -> SolverResult<usize> {
        self.check_bus(shunt.bus)?;
        ensure_finite(shunt.p_mw, "shunt p_mw")?;
        ensure_finite(shunt.q_mvar, "shunt q_mvar")?;
        ensure_finite(shunt.vn_kv, "shunt vn_kv")?;
        self.shunt.push(shunt);
        Ok(self.shunt.len() - 1)
    }

    /// Row counts per element table, keyed by table name.
    pub fn table_sizes(&self) -> BTreeMap<&'static str, usize> {
        BTreeMap::from([
            ("bus", self.bus.len()),
            ("line", self.line.len()),
            ("trafo", self.trafo.len()),
            ("load", self.load.len()),
            ("gen", self.gens.len()),
            ("ext_grid", self.ext_grid.len()),
            ("shunt", self.shunt.len()),
        ])
    }

    /// Solved operating point of the generator or external grid called `name`.
    ///
    /// Generators report their own results. External grids report P/Q from
    /// the solve and keep their voltage setpoint.
    pub fn gen_operating_point(&self, name: &str) -> Option<GenOperatingPoint> {
        let results = self.results.as_ref()?;

        if let Some(pos) = self.gens.iter().position(|g| g.name == name) {
            let res = results.res_gen.get(pos)?;
            return Some(GenOperatingPoint {
                p_mw: res.p_mw,
                q_mvar: res.q_mvar,
                vm_pu: res.vm_pu,
                va_degree: res.va_degree,
            });
        }

        let pos = self.ext_grid.iter().position(|g| g.name == name)?;
        let res = results.res_ext_grid.get(pos)?;
        let grid = &self.ext_grid[pos];
        Some(GenOperatingPoint {
            p_mw: res.p_mw,
            q_mvar: res.q_mvar,
            vm_pu: grid.vm_pu,
            va_degree: grid.va_degree,
        })
    }

    /// Attach results after checking they line up with the element tables.
    pub fn set_results(&mut self, results: PowerFlowResults) -> SolverResult<()> {
        let expected = [
            ("res_bus", results.res_bus.len(), self.bus.len()),
            ("res_line", results.res_line.len(), self.line.len()),
            ("res_trafo", results.res_trafo.len(), self.trafo.len()),
            ("res_load", results.res_load.len(), self.load.len()),
            ("res_gen", results.res_gen.len(), self.gens.len()),
            ("res_ext_grid", results.res_ext_grid.len(), self.ext_grid.len()),
            ("res_shunt", results.res_shunt.len(), self.shunt.len()),
        ];
        for (table, got, want) in expected {
            if got != want {
                return Err(SolverError::MalformedResults(format!(
                    "{table} has {got} rows, network has {want}"
                )));
            }
        }
        self.results = Some(results);
        Ok(())
    }

    fn check_bus(&self, index: usize) -> SolverResult<()> {
        match self.bus(index) {
            Some(_) => Ok(()),
            None => Err(SolverError::UnknownBusIndex { index }),
        }
    }
}
