//! Per-run extraction context.
//!
//! Holds everything a [`NetworkElement`] needs while writing itself into the
//! network: the resolved topology, the override book, the build folder and
//! the run settings. The `main.dta` node map is read on first use.

use std::path::PathBuf;

use lf_project::SchematicComponent;
use lf_solver::Network;
use lf_topology::{Point, TopologyGraph};
use tracing::{debug, info};

use crate::error::{ComponentError, ComponentResult};
use crate::line_data::{LineConstants, parse_line_report};
use crate::node_map::NodeMap;
use crate::overrides::OverrideBook;
use crate::traits::{NetworkElement, Placement};

pub const NODE_MAP_FILE: &str = "main.dta";

/// Run settings the extractors depend on.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractSettings {
    pub frequency_hz: f64,
    /// Bus whose generator becomes the external grid.
    pub slack_bus: String,
    /// Take bus indices from the digits of bus names.
    pub similar_bus_indices: bool,
    /// Simulation build folder holding `main.dta` and `<line>.out` reports.
    pub build_dir: PathBuf,
}

pub struct ExtractContext<'a> {
    pub topology: &'a mut TopologyGraph,
    pub overrides: &'a OverrideBook,
    pub network: &'a mut Network,
    pub settings: &'a ExtractSettings,
    node_map: Option<NodeMap>,
}

impl<'a> ExtractContext<'a> {
    pub fn new(
        topology: &'a mut TopologyGraph,
        overrides: &'a OverrideBook,
        network: &'a mut Network,
        settings: &'a ExtractSettings,
    ) -> Self {
        Self {
            topology,
            overrides,
            network,
            settings,
            node_map: None,
        }
    }

    /// Use an already parsed node map instead of reading `main.dta`.
    pub fn with_node_map(mut self, node_map: NodeMap) -> Self {
        self.node_map = Some(node_map);
        self
    }

    /// Bus name for a port: the manual name when given, else the topology.
    pub fn bus_name(&mut self, manual: Option<&str>, port: Point) -> ComponentResult<String> {
        match manual.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => Ok(name.to_string()),
            None => Ok(self.topology.get_bus(port)?),
        }
    }

    /// Network bus index for a port, honouring a manual bus name.
    pub fn bus_at(&mut self, manual: Option<&str>, port: Point) -> ComponentResult<usize> {
        let name = self.bus_name(manual, port)?;
        Ok(self.network.bus_index(&name)?)
    }

    pub fn slack_bus_index(&self) -> ComponentResult<usize> {
        Ok(self.network.bus_index(&self.settings.slack_bus)?)
    }

    /// Bus indices at the branch's first and second node labels.
    pub fn branch_buses(&mut self, name: &str) -> ComponentResult<(usize, usize)> {
        let (first, second) = self.node_map()?.branch_buses(name)?;
        Ok((
            self.network.bus_index(&first)?,
            self.network.bus_index(&second)?,
        ))
    }

    /// Parsed constants from `<build_dir>/<name>.out`.
    pub fn line_report(&self, name: &str) -> ComponentResult<LineConstants> {
        let path = self.settings.build_dir.join(format!("{name}.out"));
        let text = std::fs::read_to_string(&path).map_err(|e| ComponentError::io(&path, e))?;
        parse_line_report(name, &text)
    }

    fn node_map(&mut self) -> ComponentResult<&NodeMap> {
        if self.node_map.is_none() {
            let path = self.settings.build_dir.join(NODE_MAP_FILE);
            debug!(path = %path.display(), "reading node map");
            self.node_map = Some(NodeMap::load(&path)?);
        }
        Ok(self.node_map.get_or_insert_with(NodeMap::default))
    }
}

/// Parse every component as `T` and add it to the network, in order.
pub fn extract_all<T>(
    ctx: &mut ExtractContext<'_>,
    components: &[&SchematicComponent],
) -> ComponentResult<Vec<Placement>>
where
    T: for<'c> TryFrom<&'c SchematicComponent, Error = ComponentError> + NetworkElement,
{
    let mut placed = Vec::with_capacity(components.len());
    for comp in components {
        let element = T::try_from(*comp)?;
        let placement = element.add_to(ctx)?;
        debug!(
            name = element.name(),
            table = %placement.table,
            index = placement.index,
            "element added"
        );
        placed.push(placement);
    }
    if !placed.is_empty() {
        info!(count = placed.len(), "components extracted");
    }
    Ok(placed)
}
