//! lf-components: schematic components to network records.
//!
//! Each supported component type has a typed record (`BusDef`,
//! `TransformerDef`, `LoadDef`, `GeneratorDef`, `LineDef`, `CapacitorDef`)
//! parsed from the raw parameter dictionary with `TryFrom`. Records implement
//! [`NetworkElement`] and add themselves to a [`lf_solver::Network`] through
//! an [`ExtractContext`], which resolves buses from the topology graph and
//! applies the manual override book.
//!
//! Text scraping of simulation build output lives in [`line_data`]
//! (`<line>.out` reports) and [`node_map`] (`main.dta`).

pub mod bus;
pub mod capacitor;
pub mod common;
pub mod error;
pub mod extract;
pub mod generator;
pub mod line;
pub mod line_data;
pub mod load;
pub mod node_map;
pub mod overrides;
pub mod traits;
pub mod transformer;

#[cfg(test)]
mod testing;

// Re-exports
pub use bus::BusDef;
pub use capacitor::CapacitorDef;
pub use error::{ComponentError, ComponentResult};
pub use extract::{ExtractContext, ExtractSettings, NODE_MAP_FILE, extract_all};
pub use generator::{GeneratorDef, GeneratorModel};
pub use line::{DEFAULT_MAX_I_KA, LineDef, LineKind};
pub use line_data::{LineConstants, LineParameters, parse_line_report};
pub use load::LoadDef;
pub use node_map::NodeMap;
pub use overrides::{
    CapBankOverride, GenOverride, LineOverride, LoadOverride, OverrideBook, OverrideRow,
    OverrideTable, TemplateNames, TrafoOverride, write_template,
};
pub use traits::{NetworkElement, Placement, Table};
pub use transformer::{TapWinding, TransformerDef, Winding};
