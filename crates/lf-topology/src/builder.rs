//! Topology builder: schematic geometry in, bus-tagged graph out.

use tracing::debug;

use crate::graph::TopologyGraph;
use crate::point::Point;

#[derive(Debug, Clone)]
struct Wire {
    location: Point,
    vertices: Vec<Point>,
}

#[derive(Debug, Clone)]
struct BusSymbol {
    name: String,
    ends: (Point, Point),
}

/// Builder collecting the drawn geometry of one canvas.
///
/// Geometry is recorded in any order with the `add_*` methods; `build()` then
/// resolves it in a fixed sequence:
/// 1. wires and measurement bridges become edges
/// 2. each bus symbol is tagged, spliced onto the wiring and propagated
/// 3. every still-untagged node is spliced onto the edges covering it
/// 4. junction pins are attached
#[derive(Debug, Default)]
pub struct TopologyBuilder {
    wires: Vec<Wire>,
    bridges: Vec<(Point, Point)>,
    buses: Vec<BusSymbol>,
    pins: Vec<Point>,
}

impl TopologyBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an orthogonal wire; `vertices` are relative to `location`.
    pub fn add_wire(&mut self, location: Point, vertices: &[Point]) -> &mut Self {
        self.wires.push(Wire {
            location,
            vertices: vertices.to_vec(),
        });
        self
    }

    /// Add a measurement bridge shorting ports `a` and `b`.
    pub fn add_bridge(&mut self, a: Point, b: Point) -> &mut Self {
        self.bridges.push((a, b));
        self
    }

    /// Add a bus symbol whose span runs from `location` to `location + vertices[1]`.
    ///
    /// A symbol with fewer than two vertices is a zero-length span at `location`.
    pub fn add_bus(
        &mut self,
        name: impl Into<String>,
        location: Point,
        vertices: &[Point],
    ) -> &mut Self {
        let other = vertices.get(1).map_or(location, |v| location + *v);
        self.buses.push(BusSymbol {
            name: name.into(),
            ends: (location.min(other), location.max(other)),
        });
        self
    }

    /// Add a junction pin.
    pub fn add_pin(&mut self, location: Point) -> &mut Self {
        self.pins.push(location);
        self
    }

    /// Resolve the collected geometry into a connectivity graph.
    pub fn build(self) -> TopologyGraph {
        let mut graph = TopologyGraph::new();

        for wire in &self.wires {
            for pair in wire.vertices.windows(2) {
                graph.add_edge(wire.location + pair[0], wire.location + pair[1]);
            }
        }

        for &(a, b) in &self.bridges {
            graph.add_edge(a, b);
        }

        for bus in &self.buses {
            let (lo, hi) = bus.ends;
            graph.add_tagged_node(lo, &bus.name);
            graph.add_tagged_node(hi, &bus.name);
            graph.add_edge(lo, hi);
            graph.splice(lo, hi);
            graph.propagate(lo);
        }

        // Wire ends resting on an edge without sharing a vertex with it.
        for point in graph.points() {
            if graph.bus_name(point) == Some("") {
                graph.splice(point, point);
            }
        }

        for &pin in &self.pins {
            graph.attach_pin(pin);
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            components = graph.component_count(),
            conflicts = graph.conflicts().len(),
            "topology built"
        );
        graph
    }
}
