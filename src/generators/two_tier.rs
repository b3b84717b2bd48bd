//! Two-tier (core/edge) topology generator.

use log::info;

use crate::error::TopologyError;
use crate::topology::{DatacenterTopology, EdgeAttrs, Layer, LinkKind, NodeAttrs, NodeId};
use crate::utils::validation::{largest_parameter, require_addressable, require_positive};

/// Build a two-tier topology.
///
/// Every core switch connects to every edge switch, and each edge switch
/// connects to `n_servers` servers of its own. Core switches take ids
/// `0..n_core`, edge switches follow, then servers grouped by edge switch.
///
/// # Arguments
/// * `n_core` - Number of core switches
/// * `n_edge` - Number of edge switches
/// * `n_servers` - Servers attached to each edge switch
///
/// All three must be positive.
pub fn two_tier(
    n_core: i64,
    n_edge: i64,
    n_servers: i64,
) -> Result<DatacenterTopology, TopologyError> {
    let cores = require_positive("n_core", n_core)?;
    let edges = require_positive("n_edge", n_edge)?;
    let per_edge = require_positive("n_servers", n_servers)?;
    let node_count = edges
        .checked_mul(per_edge)
        .and_then(|servers| servers.checked_add(cores)?.checked_add(edges));
    let (culprit, value) =
        largest_parameter(&[("n_core", n_core), ("n_edge", n_edge), ("n_servers", n_servers)]);
    require_addressable(culprit, value, node_count)?;

    info!(
        "Generating two-tier topology (n_core={}, n_edge={}, n_servers={})",
        cores, edges, per_edge
    );

    let mut topology = DatacenterTopology::new();
    topology.set_name(format!("two_tier_topology({},{},{})", cores, edges, per_edge));

    let edge_range = cores..cores + edges;
    for core in 0..cores {
        topology.add_switch(NodeId::from_index(core), NodeAttrs::in_layer(Layer::Core));
    }
    for edge in edge_range.clone() {
        topology.add_switch(NodeId::from_index(edge), NodeAttrs::in_layer(Layer::Edge));
    }

    for core in 0..cores {
        for edge in edge_range.clone() {
            topology.add_edge(
                NodeId::from_index(core),
                NodeId::from_index(edge),
                EdgeAttrs::of_kind(LinkKind::CoreEdge),
            )?;
        }
    }

    let mut next = cores + edges;
    for edge in edge_range {
        for _ in 0..per_edge {
            let server = NodeId::from_index(next);
            topology.add_server(server, NodeAttrs::in_layer(Layer::Leaf));
            topology.add_edge(
                NodeId::from_index(edge),
                server,
                EdgeAttrs::of_kind(LinkKind::EdgeLeaf),
            )?;
            next += 1;
        }
    }

    super::log_summary(&topology);
    Ok(topology)
}
