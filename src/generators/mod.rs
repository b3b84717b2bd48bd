//! Datacenter topology generators.
//!
//! Each generator validates its parameters, then builds a complete
//! [`DatacenterTopology`] in one pass. Generators share no state and assign
//! node identifiers densely from zero, so identical parameters always give
//! identical graphs.
//!
//! - `fat_tree`: k-ary fat-tree with `k` pods
//! - `two_tier`: core/edge mesh with servers under each edge switch
//! - `three_tier`: core/aggregation mesh over a strict edge hierarchy
//! - `bcube`: BCube(n, k) server-centric topology

pub mod bcube;
pub mod fat_tree;
pub mod three_tier;
pub mod two_tier;

pub use bcube::bcube;
pub use fat_tree::fat_tree;
pub use three_tier::three_tier;
pub use two_tier::two_tier;

use log::info;

use crate::topology::DatacenterTopology;

/// Log the shape of a freshly generated topology
fn log_summary(topology: &DatacenterTopology) {
    info!(
        "Generated {}: {} switches, {} servers, {} links",
        topology.name().unwrap_or("topology"),
        topology.number_of_switches(),
        topology.number_of_servers(),
        topology.number_of_edges()
    );
}
