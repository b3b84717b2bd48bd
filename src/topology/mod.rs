//! Graph data model.
//!
//! This module contains the generic labeled graph and the datacenter
//! specialisation that the generators populate.

pub mod types;
pub mod graph;
pub mod datacenter;

// Re-export key types for easier access
pub use types::{AttrValue, Attributes, EdgeAttrs, Layer, LinkKind, NodeAttrs, NodeId, NodeType};
pub use graph::{Edge, GraphError, Node, Topology};
pub use datacenter::DatacenterTopology;
