//! # dctopo - Datacenter network topology generators
//!
//! This library builds the classic datacenter interconnects as annotated
//! graphs that network simulators and analysis tools can consume.
//!
//! ## Overview
//!
//! Every generator takes a few integer parameters, validates them, and
//! returns a [`DatacenterTopology`]: an undirected graph whose nodes are
//! typed as switches or servers. Node identifiers are dense integers
//! assigned in a fixed order, so the same parameters always produce the
//! same graph.
//!
//! ## Key Features
//!
//! - **Fat-tree**: k-ary fat-tree with `k` pods and `(k/2)^2` core switches
//! - **Two-tier**: core/edge mesh with dedicated servers per edge switch
//! - **Three-tier**: core/aggregation mesh above a strict edge hierarchy
//! - **BCube**: server-centric BCube(n, k) with per-node addresses
//! - **Link annotation**: constant capacities, delays, weights and buffers
//!   with units recorded in graph metadata
//! - **Serialization**: GML and JSON
//!
//! ## Architecture
//!
//! - `topology`: graph model (`Topology`, `DatacenterTopology`, attributes)
//! - `generators`: the four topology generators
//! - `links`: link annotation
//! - `gml`: GML reader and writer
//! - `config` / `config_loader`: YAML job files
//! - `orchestrator`: build, annotate, check and write a job
//! - `error`: parameter errors
//! - `utils`: units and validation helpers
//!
//! ## Example Usage
//!
//! ```rust
//! use dctopo::{fat_tree, NodeType};
//!
//! let topology = fat_tree(4)?;
//! assert_eq!(topology.number_of_switches(), 20);
//! assert_eq!(topology.number_of_servers(), 16);
//!
//! for server in topology.servers() {
//!     assert_eq!(topology.node_type(server), Some(NodeType::Server));
//!     assert_eq!(topology.degree(server), 1);
//! }
//! # Ok::<(), dctopo::TopologyError>(())
//! ```
//!
//! ## Configuration Format
//!
//! The `dctopo` binary also runs YAML job files:
//!
//! ```yaml
//! general:
//!   log_level: info
//! topology:
//!   type: bcube
//!   n: 4
//!   k: 1
//! links:
//!   capacity: "10Gbps"
//!   delay: "2ms"
//! output:
//!   path: "bcube.gml"
//! ```
//!
//! ## Error Handling
//!
//! Generators return [`TopologyError`], which names the offending
//! parameter. File and configuration handling returns
//! `color_eyre::eyre::Result` with context attached.

pub mod config;
pub mod config_loader;
pub mod error;
pub mod generators;
pub mod gml;
pub mod links;
pub mod orchestrator;
pub mod topology;
pub mod utils;

pub use error::{Constraint, TopologyError};
pub use generators::{bcube, fat_tree, three_tier, two_tier};
pub use topology::{
    AttrValue, DatacenterTopology, EdgeAttrs, Layer, LinkKind, NodeAttrs, NodeId, NodeType,
    Topology,
};
