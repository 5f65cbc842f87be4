//! Schematic loading, topology resolution and inspection.

use std::collections::BTreeMap;
use std::path::Path;

use lf_project::{
    Definition, DocumentCanvas, ProjectError, RunConfig, SchematicCanvas, SchematicComponent,
};
use lf_topology::{BusConflict, Point, TopologyBuilder, TopologyGraph};
use tracing::debug;

use crate::error::{AppError, AppResult};

/// One component port and where it sits on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct PortBinding {
    pub component: String,
    pub definition: Definition,
    pub port: String,
    pub point: Point,
}

/// Outcome of resolving every electrical port against the topology.
#[derive(Debug, Clone, Default)]
pub struct TopologyReport {
    pub node_count: usize,
    pub edge_count: usize,
    /// Bus name -> ports resolved onto it.
    pub buses: BTreeMap<String, Vec<PortBinding>>,
    /// Ports that resolve to no bus, with the reason.
    pub unresolved: Vec<(PortBinding, String)>,
    pub conflicts: Vec<BusConflict>,
}

/// Load and validate a schematic snapshot.
pub fn load_canvas(path: &Path) -> AppResult<DocumentCanvas> {
    Ok(DocumentCanvas::open(path)?)
}

/// Load a run configuration, or the defaults when no file is given.
pub fn load_config(path: Option<&Path>) -> AppResult<RunConfig> {
    let Some(path) = path else {
        return Ok(RunConfig::default());
    };
    lf_project::load_config(path).map_err(|err| match err {
        ProjectError::Io(source) => AppError::ConfigRead {
            path: path.to_path_buf(),
            source,
        },
        other => AppError::InvalidInput(format!("Failed to parse config YAML: {}", other)),
    })
}

/// Build the bus-tagged connectivity graph of the canvas.
pub fn build_topology(canvas: &dyn SchematicCanvas) -> TopologyGraph {
    let mut builder = TopologyBuilder::new();

    for wire in canvas.components(Definition::Wire) {
        builder.add_wire(wire.location, &wire.vertices);
    }
    for meter in canvas.components(Definition::Multimeter) {
        if let (Some(a), Some(b)) = (meter.port("A"), meter.port("B")) {
            builder.add_bridge(a, b);
        }
    }
    for bus in canvas.components(Definition::Bus) {
        let name = bus.param("Name").map(str::trim).unwrap_or_default();
        builder.add_bus(name, bus.location, &bus.vertices);
    }
    for pin in canvas.components(Definition::Pin) {
        builder.add_pin(pin.location);
    }

    builder.build()
}

/// Ports whose bus is read from the topology graph.
///
/// Lines and cables are absent: their terminals come from the build output.
pub fn electrical_ports(canvas: &dyn SchematicCanvas) -> Vec<PortBinding> {
    let mut ports = Vec::new();
    let mut push = |comp: &SchematicComponent, port: &str| {
        if let Some(point) = comp.port(port) {
            ports.push(PortBinding {
                component: comp.display_name(),
                definition: comp.definition,
                port: port.to_string(),
                point,
            });
        }
    };

    for comp in canvas.components(Definition::Transformer) {
        push(comp, "N1");
        push(comp, "N2");
    }
    for comp in canvas.components(Definition::FixedLoad) {
        push(comp, "IA");
    }
    for comp in canvas.components(Definition::Source3) {
        push(comp, "N3");
    }
    for comp in canvas.components(Definition::Source3Pu) {
        push(comp, "N");
    }
    for comp in canvas.components(Definition::Capacitor) {
        let port = if comp.port("A").is_some() { "A" } else { "B" };
        push(comp, port);
    }
    ports
}

/// Resolve every electrical port and group the ports by bus.
pub fn inspect_topology(canvas: &dyn SchematicCanvas) -> TopologyReport {
    let mut graph = build_topology(canvas);
    let mut report = TopologyReport::default();

    for binding in electrical_ports(canvas) {
        match graph.get_bus(binding.point) {
            Ok(bus) => report.buses.entry(bus).or_default().push(binding),
            Err(e) => report.unresolved.push((binding, e.to_string())),
        }
    }

    report.node_count = graph.node_count();
    report.edge_count = graph.edge_count();
    report.conflicts = graph.conflicts().to_vec();
    debug!(
        buses = report.buses.len(),
        unresolved = report.unresolved.len(),
        "topology inspected"
    );
    report
}

/// Topology check on top of schema validation: every electrical port must reach a bus.
pub fn validate_project(canvas: &dyn SchematicCanvas) -> AppResult<TopologyReport> {
    let report = inspect_topology(canvas);
    if let Some((binding, reason)) = report.unresolved.first() {
        return Err(AppError::Validation(format!(
            "{} port(s) not connected to a bus; first: '{}' port {}: {}",
            report.unresolved.len(),
            binding.component,
            binding.port,
            reason
        )));
    }
    Ok(report)
}
