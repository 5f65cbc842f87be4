//! lf-core: shared foundation for the load-flow bridge.
//!
//! Contains:
//! - units (uom SI electrical types + constructors)
//! - numeric (Real, finiteness checks, schematic quantity parsing)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

pub use error::{LfError, LfResult};
pub use numeric::*;
pub use units::*;
