//! Line/cable constants from the solver's `<name>.out` report.
//!
//! Two report layouts are understood:
//! - RXB: a `LOAD FLOW RXB FORMATTED DATA @ f Hz:` block giving per-unit
//!   positive-sequence R, X and B on a stated kV/MVA base;
//! - matrix: `SERIES IMPEDANCE MATRIX (Z) [ohms/m]:` and
//!   `SHUNT ADMITTANCE MATRIX (Y) [mhos/m]:` blocks whose first entry is the
//!   `re,im` pair used for the line.

use std::f64::consts::TAU;

use lf_core::units::electrical::{base_impedance, susceptance_to_capacitance};
use lf_core::units::{Capacitance, Conductance, hz, kv, mva, to_nanofarads, to_ohms};
use uom::si::electrical_conductance::siemens;

use crate::error::{ComponentError, ComponentResult};

const RXB_HEADER: &str = "LOAD FLOW RXB FORMATTED DATA";
const POSITIVE_SEQUENCE: &str = "Positive Sequence";
const SERIES_Z_HEADER: &str = "SERIES IMPEDANCE MATRIX (Z) [ohms/m]:";
const SHUNT_Y_HEADER: &str = "SHUNT ADMITTANCE MATRIX (Y) [mhos/m]:";
const SEQUENCE_HEADER: &str = "SEQUENCE COMPONENT DATA @";

/// Lines after a `Positive Sequence` heading searched for its R/X/B rows.
const SEQUENCE_BLOCK_SPAN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LineConstants {
    /// Per-unit positive-sequence data.
    Rxb {
        frequency_hz: f64,
        base_kv: f64,
        base_mva: f64,
        r_pu: f64,
        x_pu: f64,
        b_pu: f64,
    },
    /// First entries of the per-metre Z and Y matrices.
    Matrix {
        frequency_hz: Option<f64>,
        r_ohm_per_m: f64,
        x_ohm_per_m: f64,
        b_mho_per_m: f64,
    },
}

/// Solver-ready per-km series and shunt parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineParameters {
    pub r_ohm_per_km: f64,
    pub x_ohm_per_km: f64,
    pub c_nf_per_km: f64,
}

impl LineConstants {
    /// Convert to per-km values for a line of `length_km`.
    ///
    /// `run_frequency_hz` is used for matrix data whose report states no frequency.
    pub fn per_km(&self, length_km: f64, run_frequency_hz: f64) -> LineParameters {
        match *self {
            LineConstants::Rxb {
                frequency_hz,
                base_kv,
                base_mva,
                r_pu,
                x_pu,
                b_pu,
            } => {
                let z_base = base_impedance(kv(base_kv), mva(base_mva));
                let c = susceptance_to_capacitance(b_pu, z_base, hz(frequency_hz));
                LineParameters {
                    r_ohm_per_km: r_pu * to_ohms(z_base) / length_km,
                    x_ohm_per_km: x_pu * to_ohms(z_base) / length_km,
                    c_nf_per_km: to_nanofarads(c) / length_km,
                }
            }
            LineConstants::Matrix {
                frequency_hz,
                r_ohm_per_m,
                x_ohm_per_m,
                b_mho_per_m,
            } => {
                let f = hz(frequency_hz.unwrap_or(run_frequency_hz));
                let b_per_km = Conductance::new::<siemens>(b_mho_per_m * 1e3);
                let c: Capacitance = b_per_km / (f * TAU);
                LineParameters {
                    r_ohm_per_km: r_ohm_per_m * 1e3,
                    x_ohm_per_km: x_ohm_per_m * 1e3,
                    c_nf_per_km: to_nanofarads(c),
                }
            }
        }
    }
}

/// Parse the report text of line `name`.
pub fn parse_line_report(name: &str, text: &str) -> ComponentResult<LineConstants> {
    let lines: Vec<&str> = text.lines().collect();
    let malformed = |what: &str| ComponentError::MalformedLineData {
        name: name.to_string(),
        what: what.to_string(),
    };

    if let Some(at) = lines.iter().position(|l| l.contains(RXB_HEADER)) {
        let frequency_hz = frequency_after_at(lines[at]).ok_or_else(|| malformed("RXB frequency"))?;
        let (base_kv, base_mva) = lines
            .get(at + 3)
            .and_then(|l| parse_base(l))
            .ok_or_else(|| malformed("per-unit base"))?;

        let seq = lines[at..]
            .iter()
            .position(|l| l.trim() == POSITIVE_SEQUENCE)
            .map(|p| at + p)
            .ok_or_else(|| malformed("positive sequence block"))?;
        let block = &lines[seq + 1..lines.len().min(seq + 1 + SEQUENCE_BLOCK_SPAN)];
        let field = |label: &str| {
            block
                .iter()
                .find(|l| l.contains(label))
                .and_then(|l| value_after_colon(l))
                .ok_or_else(|| malformed(label))
        };

        return Ok(LineConstants::Rxb {
            frequency_hz,
            base_kv,
            base_mva,
            r_pu: field("Rsq")?,
            x_pu: field("Xsq")?,
            b_pu: field("Bsq")?,
        });
    }

    let Some(z_at) = lines.iter().position(|l| l.trim() == SERIES_Z_HEADER) else {
        return Err(ComponentError::AmbiguousLineData {
            name: name.to_string(),
        });
    };
    let (r_ohm_per_m, x_ohm_per_m) = lines
        .get(z_at + 1)
        .and_then(|l| first_complex(l))
        .ok_or_else(|| malformed("series impedance entry"))?;
    let (_, b_mho_per_m) = lines
        .iter()
        .position(|l| l.trim() == SHUNT_Y_HEADER)
        .and_then(|y_at| lines.get(y_at + 1))
        .and_then(|l| first_complex(l))
        .ok_or_else(|| malformed("shunt admittance entry"))?;
    let frequency_hz = lines
        .iter()
        .find(|l| l.contains(SEQUENCE_HEADER))
        .and_then(|l| frequency_after_at(l));

    Ok(LineConstants::Matrix {
        frequency_hz,
        r_ohm_per_m,
        x_ohm_per_m,
        b_mho_per_m,
    })
}

/// `"... @ 60.0 Hz:"` -> 60.0
fn frequency_after_at(line: &str) -> Option<f64> {
    let (_, tail) = line.split_once('@')?;
    let value = tail.split("Hz").next()?;
    value.trim().parse().ok()
}

/// `"Base of Per-Unit Quantities: 230.0 kV(L-L), 100.0 MVA"` -> (230.0, 100.0)
fn parse_base(line: &str) -> Option<(f64, f64)> {
    let (_, tail) = line.split_once(':')?;
    let (kv_part, mva_part) = tail.split_once(',')?;
    let kv = kv_part.replace("kV(L-L)", "").trim().parse().ok()?;
    let mva = mva_part.replace("MVA", "").trim().parse().ok()?;
    Some((kv, mva))
}

/// `"Resistance Rsq [pu]:  0.00123"` -> 0.00123
fn value_after_colon(line: &str) -> Option<f64> {
    let (_, value) = line.rsplit_once(':')?;
    value.trim().parse().ok()
}

/// First `re,im` pair of a matrix row such as `" 0.1E-04, 0.3E-03   0.2E-05,0.1E-03"`.
fn first_complex(line: &str) -> Option<(f64, f64)> {
    let (head, tail) = line.split_once(',')?;
    let re = head.split_whitespace().last()?.parse().ok()?;
    let im = tail.split_whitespace().next()?.trim_end_matches(',').parse().ok()?;
    Some((re, im))
}
