//! Core trait for extracted network elements.

use std::fmt;

use crate::error::ComponentResult;
use crate::extract::ExtractContext;

/// Network table an element was written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Bus,
    Line,
    Trafo,
    Load,
    Gen,
    ExtGrid,
    Shunt,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Table::Bus => "bus",
            Table::Line => "line",
            Table::Trafo => "trafo",
            Table::Load => "load",
            Table::Gen => "gen",
            Table::ExtGrid => "ext_grid",
            Table::Shunt => "shunt",
        };
        f.write_str(name)
    }
}

/// Where an element landed: its table and row (for buses, the bus index).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub table: Table,
    pub index: usize,
}

impl Placement {
    pub fn new(table: Table, index: usize) -> Self {
        Self { table, index }
    }
}

/// A typed component record that can add itself to the network.
///
/// Records are parsed from the raw parameter dictionary up front, so a
/// record that exists has well-formed numbers. `add_to` resolves buses
/// (overrides first, then topology), merges overrides and writes the row.
pub trait NetworkElement {
    /// Component name used for override lookup and the network record.
    fn name(&self) -> &str;

    fn add_to(&self, ctx: &mut ExtractContext<'_>) -> ComponentResult<Placement>;
}
