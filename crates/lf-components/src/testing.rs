//! Shared fixtures for unit tests.

use std::collections::BTreeMap;

use lf_project::{Definition, SchematicComponent};
use lf_solver::Network;
use lf_topology::{Point, TopologyGraph};

use crate::extract::{ExtractContext, ExtractSettings};
use crate::node_map::NodeMap;
use crate::overrides::OverrideBook;

pub struct Fixture {
    pub topology: TopologyGraph,
    pub overrides: OverrideBook,
    pub network: Network,
    pub settings: ExtractSettings,
    pub node_map: Option<NodeMap>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self {
            topology: TopologyGraph::new(),
            overrides: OverrideBook::default(),
            network: Network::new(60.0),
            settings: ExtractSettings {
                frequency_hz: 60.0,
                slack_bus: "Bus1".to_string(),
                similar_bus_indices: true,
                build_dir: std::env::temp_dir().join("lf_components_missing_build"),
            },
            node_map: None,
        }
    }
}

impl Fixture {
    /// Fixture with buses tagged at the given points, indexed by their digits.
    pub fn with_buses(buses: &[(&str, f64, Point)]) -> Self {
        let mut fx = Self::default();
        for (name, vn_kv, at) in buses {
            fx.topology.add_tagged_node(*at, name);
            let index = lf_core::digits_index(name);
            fx.network.create_bus(*name, *vn_kv, index).unwrap();
        }
        fx
    }

    pub fn context(&mut self) -> ExtractContext<'_> {
        let node_map = self.node_map.clone();
        let ctx = ExtractContext::new(
            &mut self.topology,
            &self.overrides,
            &mut self.network,
            &self.settings,
        );
        match node_map {
            Some(map) => ctx.with_node_map(map),
            None => ctx,
        }
    }
}

pub fn component(
    definition: Definition,
    id: u64,
    parameters: &[(&str, &str)],
    ports: &[(&str, Point)],
) -> SchematicComponent {
    SchematicComponent {
        id,
        definition,
        location: Point::default(),
        vertices: vec![],
        ports: ports
            .iter()
            .map(|(name, at)| (name.to_string(), *at))
            .collect::<BTreeMap<_, _>>(),
        parameters: parameters
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    }
}
