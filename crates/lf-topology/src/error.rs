//! Topology lookup errors.

use thiserror::Error;

use crate::Point;

pub type TopologyResult<T> = Result<T, TopologyError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// The point is neither a graph node nor covered by any edge.
    #[error("No wiring found at location {point}")]
    LocationNotFound { point: Point },

    /// The point is wired, but its component never reached a bus symbol.
    #[error("Location {point} is not connected to any bus")]
    UnresolvedBus { point: Point },
}
