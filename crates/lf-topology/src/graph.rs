//! Bus-tagged connectivity graph.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::{Bfs, EdgeRef};
use tracing::{debug, warn};

use crate::error::{TopologyError, TopologyResult};
use crate::point::Point;

/// A wiring vertex and the bus it belongs to (empty while unresolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub point: Point,
    pub bus_name: String,
}

/// Several bus symbols ended up in one connected component.
///
/// The lexicographically smallest name wins; the others are kept here for reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusConflict {
    pub names: Vec<String>,
    pub chosen: String,
    pub at: Point,
}

/// Undirected connectivity graph keyed by grid point.
///
/// Invariants:
/// - one node per point
/// - no self-loops and no parallel edges
/// - every edge is horizontal or vertical when built from Manhattan wiring
#[derive(Debug, Clone, Default)]
pub struct TopologyGraph {
    graph: UnGraph<Node, ()>,
    lookup: HashMap<Point, NodeIndex>,
    conflicts: Vec<BusConflict>,
}

impl TopologyGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, point: Point) -> bool {
        self.lookup.contains_key(&point)
    }

    /// Bus name stored at `point`, if the point is a node. May be empty.
    pub fn bus_name(&self, point: Point) -> Option<&str> {
        self.lookup
            .get(&point)
            .map(|&idx| self.graph[idx].bus_name.as_str())
    }

    /// All node points, sorted.
    pub fn points(&self) -> Vec<Point> {
        let mut points: Vec<Point> = self.lookup.keys().copied().collect();
        points.sort_unstable();
        points
    }

    /// All edges as sorted point pairs, sorted.
    pub fn edges(&self) -> Vec<(Point, Point)> {
        let mut edges: Vec<(Point, Point)> = self
            .graph
            .edge_references()
            .map(|e| {
                let a = self.graph[e.source()].point;
                let b = self.graph[e.target()].point;
                (a.min(b), a.max(b))
            })
            .collect();
        edges.sort_unstable();
        edges
    }

    /// Bus conflicts recorded during propagation.
    pub fn conflicts(&self) -> &[BusConflict] {
        &self.conflicts
    }

    /// Number of connected components.
    pub fn component_count(&self) -> usize {
        petgraph::algo::connected_components(&self.graph)
    }

    /// Points grouped by their bus name; unresolved points are grouped under `""`.
    pub fn buses(&self) -> BTreeMap<String, Vec<Point>> {
        let mut buses: BTreeMap<String, Vec<Point>> = BTreeMap::new();
        for node in self.graph.node_weights() {
            buses
                .entry(node.bus_name.clone())
                .or_default()
                .push(node.point);
        }
        for points in buses.values_mut() {
            points.sort_unstable();
        }
        buses
    }

    /// Get or create the node at `point`. Existing nodes keep their bus name.
    pub fn add_node(&mut self, point: Point) -> NodeIndex {
        if let Some(&idx) = self.lookup.get(&point) {
            return idx;
        }
        let idx = self.graph.add_node(Node {
            point,
            bus_name: String::new(),
        });
        self.lookup.insert(point, idx);
        idx
    }

    /// Get or create the node at `point` and tag it with `bus_name`.
    pub fn add_tagged_node(&mut self, point: Point, bus_name: &str) -> NodeIndex {
        let idx = self.add_node(point);
        self.graph[idx].bus_name = bus_name.to_string();
        idx
    }

    /// Connect two points, creating untagged nodes as needed.
    ///
    /// Returns `true` if a new edge was inserted. Zero-length edges are ignored.
    pub fn add_edge(&mut self, a: Point, b: Point) -> bool {
        if a == b {
            self.add_node(a);
            return false;
        }
        let ia = self.add_node(a);
        let ib = self.add_node(b);
        if self.graph.find_edge(ia, ib).is_some() {
            return false;
        }
        self.graph.add_edge(ia, ib, ());
        true
    }

    /// Splice the span `p1..p2` onto every existing edge it touches.
    ///
    /// For a vertical edge at `x` with `x` inside the span's x range and `p1.y`
    /// inside the edge's y range, the splice point is `(x, p1.y)`. Horizontal
    /// edges are handled symmetrically with `(p1.x, y)`. Each splice point is
    /// wired to both edge endpoints and to `p1`, then bus identity is
    /// propagated from it.
    ///
    /// Only edges present before the call are considered. Returns the number of
    /// edges inserted, so a repeated call returns 0.
    pub fn splice(&mut self, p1: Point, p2: Point) -> usize {
        let snapshot = self.edges();
        let mut inserted = 0;

        for (a, b) in snapshot {
            let Some(at) = splice_point(a, b, p1, p2) else {
                continue;
            };

            self.add_node(at);
            for target in [a, b, p1] {
                if self.add_edge(at, target) {
                    inserted += 1;
                }
            }
            self.propagate(at);
        }

        inserted
    }

    /// Wire a junction pin into every edge passing through it and resolve its bus.
    pub fn attach_pin(&mut self, point: Point) {
        self.add_node(point);
        self.splice(point, point);
        self.propagate(point);
    }

    /// Give every node in the seed's connected component the same bus name.
    ///
    /// The winner is the lexicographically smallest non-empty name present; if
    /// none is present the component stays (or becomes) unresolved. Returns the
    /// assigned name, or `None` if `seed` is not a node.
    pub fn propagate(&mut self, seed: Point) -> Option<String> {
        let &start = self.lookup.get(&seed)?;

        let mut members = Vec::new();
        let mut names = BTreeSet::new();
        let mut bfs = Bfs::new(&self.graph, start);
        while let Some(idx) = bfs.next(&self.graph) {
            let name = &self.graph[idx].bus_name;
            if !name.is_empty() {
                names.insert(name.clone());
            }
            members.push(idx);
        }

        let chosen = names.first().cloned().unwrap_or_default();
        if names.len() > 1 {
            self.record_conflict(names, &chosen, seed);
        }

        for idx in members {
            self.graph[idx].bus_name.clone_from(&chosen);
        }
        Some(chosen)
    }

    /// Resolve the bus at `point`, splicing it onto the wiring if it is not yet a node.
    pub fn get_bus(&mut self, point: Point) -> TopologyResult<String> {
        if !self.contains(point) {
            debug!(%point, "bus lookup miss, splicing onto wiring");
            self.splice(point, point);
        }

        match self.bus_name(point) {
            None => Err(TopologyError::LocationNotFound { point }),
            Some("") => Err(TopologyError::UnresolvedBus { point }),
            Some(name) => Ok(name.to_string()),
        }
    }

    fn record_conflict(&mut self, names: BTreeSet<String>, chosen: &str, at: Point) {
        let names: Vec<String> = names.into_iter().collect();
        if self.conflicts.iter().any(|c| c.names == names) {
            return;
        }
        warn!(
            ?names,
            chosen,
            %at,
            "multiple bus symbols share one connected wiring component"
        );
        self.conflicts.push(BusConflict {
            names,
            chosen: chosen.to_string(),
            at,
        });
    }
}

/// Where the span `p1..p2` meets the edge `a-b`, if it does.
fn splice_point(a: Point, b: Point, p1: Point, p2: Point) -> Option<Point> {
    if a.x == b.x {
        // vertical edge
        let x = a.x;
        let crosses = p1.x.min(p2.x) <= x && x <= p1.x.max(p2.x);
        let covers = a.y.min(b.y) <= p1.y && p1.y <= a.y.max(b.y);
        (crosses && covers).then_some(Point::new(x, p1.y))
    } else if a.y == b.y {
        // horizontal edge
        let y = a.y;
        let crosses = p1.y.min(p2.y) <= y && y <= p1.y.max(p2.y);
        let covers = a.x.min(b.x) <= p1.x && p1.x <= a.x.max(b.x);
        (crosses && covers).then_some(Point::new(p1.x, y))
    } else {
        None
    }
}
