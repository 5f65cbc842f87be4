//! lf-topology: electrical connectivity recovered from schematic geometry.
//!
//! Provides:
//! - Grid points and the bus-tagged connectivity graph
//! - Splicing of points onto existing axis-aligned edges
//! - Bus identity propagation and lazy bus lookup
//! - A builder that turns wires, bridges, bus symbols and pins into a graph
//!
//! # Example
//!
//! ```
//! use lf_topology::{Point, TopologyBuilder};
//!
//! let mut builder = TopologyBuilder::new();
//! builder.add_bus("Bus1", Point::new(0, 0), &[Point::new(0, 0), Point::new(0, 100)]);
//! builder.add_wire(Point::new(0, 50), &[Point::new(0, 0), Point::new(40, 0)]);
//! let mut graph = builder.build();
//!
//! assert_eq!(graph.get_bus(Point::new(40, 50)).unwrap(), "Bus1");
//! assert_eq!(graph.get_bus(Point::new(20, 50)).unwrap(), "Bus1");
//! ```

pub mod builder;
pub mod error;
pub mod graph;
pub mod point;

pub use builder::TopologyBuilder;
pub use error::{TopologyError, TopologyResult};
pub use graph::{BusConflict, Node, TopologyGraph};
pub use point::Point;
