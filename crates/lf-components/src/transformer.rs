//! Two-winding three-phase transformers.
//!
//! The schematic describes windings 1 and 2; the network wants HV and LV
//! sides. The side with the higher rated voltage is HV (ties go to side 1)
//! and the winding connections, tap side and ports are swapped to match.

use lf_project::SchematicComponent;
use lf_solver::Transformer;
use lf_topology::Point;

use crate::common::{port, quantity, text};
use crate::error::{ComponentError, ComponentResult};
use crate::extract::ExtractContext;
use crate::traits::{NetworkElement, Placement, Table};

/// Winding connection; `YD = "0"` is grounded star, anything else delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    GroundedStar,
    Delta,
}

impl Winding {
    pub fn from_code(code: &str) -> Self {
        if code.trim() == "0" {
            Winding::GroundedStar
        } else {
            Winding::Delta
        }
    }

    /// HV-side notation.
    pub fn upper(self) -> &'static str {
        match self {
            Winding::GroundedStar => "YN",
            Winding::Delta => "D",
        }
    }

    /// LV-side notation.
    pub fn lower(self) -> &'static str {
        match self {
            Winding::GroundedStar => "yn",
            Winding::Delta => "d",
        }
    }
}

/// Which schematic winding carries the tap changer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapWinding {
    One,
    Two,
    None,
}

impl TapWinding {
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some("1") => TapWinding::One,
            Some("2") => TapWinding::Two,
            _ => TapWinding::None,
        }
    }
}

/// Append the clock number for `lead` and return the phase shift in degrees.
pub fn vector_group_with_shift(base: &str, lead: &str) -> (String, f64) {
    let (hour, shift) = match (base, lead.trim()) {
        ("YNd", "1") => ("1", 30.0),
        ("YNd", "2") => ("11", -30.0),
        ("Dyn", "1") => ("11", -30.0),
        ("Dyn", "2") => ("1", 30.0),
        _ => ("0", 0.0),
    };
    (format!("{base}{hour}"), shift)
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransformerDef {
    pub name: String,
    pub sn_mva: f64,
    pub v1_kv: f64,
    pub v2_kv: f64,
    pub winding1: Winding,
    pub winding2: Winding,
    pub tap: TapWinding,
    pub lead: String,
    /// Copper losses (pu).
    pub cul_pu: f64,
    /// Leakage reactance (pu).
    pub xl_pu: f64,
    /// No-load losses (pu).
    pub nll_pu: f64,
    /// Magnetising current (%).
    pub im1_percent: f64,
    pub n1: Point,
    pub n2: Point,
}

/// HV/LV view of a transformer.
#[derive(Debug, Clone, PartialEq)]
pub struct Orientation {
    pub hv_port: Point,
    pub lv_port: Point,
    pub vn_hv_kv: f64,
    pub vn_lv_kv: f64,
    pub vector_group: String,
    pub shift_degree: f64,
    pub tap_side: Option<&'static str>,
}

impl TransformerDef {
    pub fn orientation(&self) -> Orientation {
        let side2_hv = self.v1_kv < self.v2_kv;

        let (hv_port, lv_port, vn_hv_kv, vn_lv_kv, hv_winding, lv_winding) = if side2_hv {
            (self.n2, self.n1, self.v2_kv, self.v1_kv, self.winding2, self.winding1)
        } else {
            (self.n1, self.n2, self.v1_kv, self.v2_kv, self.winding1, self.winding2)
        };

        let tap_side = match (self.tap, side2_hv) {
            (TapWinding::One, false) | (TapWinding::Two, true) => Some("hv"),
            (TapWinding::One, true) | (TapWinding::Two, false) => Some("lv"),
            (TapWinding::None, _) => None,
        };

        let base = format!("{}{}", hv_winding.upper(), lv_winding.lower());
        let (vector_group, shift_degree) = vector_group_with_shift(&base, &self.lead);

        Orientation {
            hv_port,
            lv_port,
            vn_hv_kv,
            vn_lv_kv,
            vector_group,
            shift_degree,
            tap_side,
        }
    }

    pub fn vkr_percent(&self) -> f64 {
        self.cul_pu * 100.0
    }

    pub fn vk_percent(&self) -> f64 {
        self.xl_pu * 100.0
    }

    /// No-load losses in kW: pu of rated power times MVA rating.
    pub fn pfe_kw(&self) -> f64 {
        self.nll_pu * self.sn_mva * 1000.0
    }
}

impl TryFrom<&SchematicComponent> for TransformerDef {
    type Error = ComponentError;

    fn try_from(comp: &SchematicComponent) -> ComponentResult<Self> {
        Ok(Self {
            name: comp.display_name(),
            sn_mva: quantity(comp, "Tmva")?,
            v1_kv: quantity(comp, "V1")?,
            v2_kv: quantity(comp, "V2")?,
            winding1: Winding::from_code(text(comp, "YD1")?),
            winding2: Winding::from_code(text(comp, "YD2")?),
            tap: TapWinding::from_code(comp.param("Tap")),
            lead: comp.param("Lead").unwrap_or_default().trim().to_string(),
            cul_pu: quantity(comp, "CuL")?,
            xl_pu: quantity(comp, "Xl")?,
            nll_pu: quantity(comp, "NLL")?,
            im1_percent: quantity(comp, "Im1")?,
            n1: port(comp, "N1")?,
            n2: port(comp, "N2")?,
        })
    }
}

impl NetworkElement for TransformerDef {
    fn name(&self) -> &str {
        &self.name
    }

    fn add_to(&self, ctx: &mut ExtractContext<'_>) -> ComponentResult<Placement> {
        let o = self.orientation();
        let ov = ctx.overrides.trafo.get(&self.name).cloned().unwrap_or_default();

        let hv_bus = ctx.bus_at(ov.hv_bus.as_deref(), o.hv_port)?;
        let lv_bus = ctx.bus_at(ov.lv_bus.as_deref(), o.lv_port)?;

        let index = ctx.network.create_transformer(Transformer {
            name: self.name.clone(),
            hv_bus,
            lv_bus,
            sn_mva: self.sn_mva,
            vn_hv_kv: o.vn_hv_kv,
            vn_lv_kv: o.vn_lv_kv,
            vk_percent: self.vk_percent(),
            vkr_percent: self.vkr_percent(),
            pfe_kw: self.pfe_kw(),
            i0_percent: self.im1_percent,
            shift_degree: o.shift_degree,
            vector_group: o.vector_group,
            tap_side: o.tap_side.map(str::to_string),
            tap_pos: ov.tap_pos,
            tap_neutral: ov.tap_neutral,
            tap_step_percent: ov.tap_step_percent,
            tap_step_degree: ov.tap_step_degree,
            in_service: true,
        })?;
        Ok(Placement::new(Table::Trafo, index))
    }
}
