//! Shared utilities: unit parsing and parameter/topology validation.

pub mod units;
pub mod validation;

pub use units::{parse_capacity, parse_delay, BufferUnit, CapacityUnit, TimeUnit, UnitError};
pub use validation::validate_datacenter_topology;
