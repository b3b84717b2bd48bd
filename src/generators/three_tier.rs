//! Three-tier (core/aggregation/edge) topology generator.

use log::info;

use crate::error::TopologyError;
use crate::topology::{DatacenterTopology, EdgeAttrs, Layer, LinkKind, NodeAttrs, NodeId};
use crate::utils::validation::{largest_parameter, require_addressable, require_positive};

/// Build a three-tier topology.
///
/// Core and aggregation switches form a full bipartite mesh. Each
/// aggregation switch owns `n_edge_per_agg` edge switches and each edge
/// switch owns `n_servers_per_edge` servers; nothing below the aggregation
/// tier is shared. Edge switches and servers carry the index of their
/// aggregation switch as `pod`.
///
/// Identifiers: core `0..n_core`, aggregation next, then edge switches
/// grouped by aggregation switch, then servers grouped by edge switch.
pub fn three_tier(
    n_core: i64,
    n_agg: i64,
    n_edge_per_agg: i64,
    n_servers_per_edge: i64,
) -> Result<DatacenterTopology, TopologyError> {
    let cores = require_positive("n_core", n_core)?;
    let aggs = require_positive("n_agg", n_agg)?;
    let edges_per_agg = require_positive("n_edge_per_agg", n_edge_per_agg)?;
    let servers_per_edge = require_positive("n_servers_per_edge", n_servers_per_edge)?;
    let node_count = aggs.checked_mul(edges_per_agg).and_then(|edges| {
        edges
            .checked_mul(servers_per_edge)?
            .checked_add(edges)?
            .checked_add(aggs)?
            .checked_add(cores)
    });
    let (culprit, value) = largest_parameter(&[
        ("n_core", n_core),
        ("n_agg", n_agg),
        ("n_edge_per_agg", n_edge_per_agg),
        ("n_servers_per_edge", n_servers_per_edge),
    ]);
    require_addressable(culprit, value, node_count)?;

    info!(
        "Generating three-tier topology \
         (n_core={}, n_agg={}, n_edge_per_agg={}, n_servers_per_edge={})",
        cores, aggs, edges_per_agg, servers_per_edge
    );

    let mut topology = DatacenterTopology::new();
    topology.set_name(format!(
        "three_tier_topology({},{},{},{})",
        cores, aggs, edges_per_agg, servers_per_edge
    ));

    let agg_start = cores;
    let edge_start = agg_start + aggs;
    let n_edges = aggs * edges_per_agg;
    let server_start = edge_start + n_edges;

    for core in 0..cores {
        topology.add_switch(NodeId::from_index(core), NodeAttrs::in_layer(Layer::Core));
    }
    for agg in 0..aggs {
        topology.add_switch(
            NodeId::from_index(agg_start + agg),
            NodeAttrs::in_layer(Layer::Aggregation).with_pod(agg),
        );
    }
    for edge in 0..n_edges {
        topology.add_switch(
            NodeId::from_index(edge_start + edge),
            NodeAttrs::in_layer(Layer::Edge).with_pod(edge / edges_per_agg),
        );
    }
    for server in 0..n_edges * servers_per_edge {
        let pod = server / servers_per_edge / edges_per_agg;
        topology.add_server(
            NodeId::from_index(server_start + server),
            NodeAttrs::in_layer(Layer::Leaf).with_pod(pod),
        );
    }

    for core in 0..cores {
        for agg in 0..aggs {
            topology.add_edge(
                NodeId::from_index(core),
                NodeId::from_index(agg_start + agg),
                EdgeAttrs::of_kind(LinkKind::CoreAggregation),
            )?;
        }
    }
    for edge in 0..n_edges {
        let agg = agg_start + edge / edges_per_agg;
        topology.add_edge(
            NodeId::from_index(agg),
            NodeId::from_index(edge_start + edge),
            EdgeAttrs::of_kind(LinkKind::AggregationEdge),
        )?;
    }
    for server in 0..n_edges * servers_per_edge {
        let edge = edge_start + server / servers_per_edge;
        topology.add_edge(
            NodeId::from_index(edge),
            NodeId::from_index(server_start + server),
            EdgeAttrs::of_kind(LinkKind::EdgeLeaf),
        )?;
    }

    super::log_summary(&topology);
    Ok(topology)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_tier_counts() {
        let topology = three_tier(10, 20, 5, 6).unwrap();
        assert_eq!(topology.number_of_nodes(), 10 + 20 + 20 * 5 + 20 * 5 * 6);
        assert_eq!(topology.number_of_servers(), 20 * 5 * 6);
        assert_eq!(topology.number_of_switches(), 10 + 20 + 20 * 5);
        assert_eq!(topology.number_of_edges(), 10 * 20 + 20 * 5 + 20 * 5 * 6);
    }

    #[test]
    fn test_three_tier_params() {
        let cases = [
            ((0, 10, 12, 20), "n_core"),
            ((10, 0, 12, 20), "n_agg"),
            ((12, 10, 0, 20), "n_edge_per_agg"),
            ((12, 10, 10, 0), "n_servers_per_edge"),
            ((-1, 10, 12, 20), "n_core"),
            ((10, -1, 12, 20), "n_agg"),
            ((12, 10, -1, 20), "n_edge_per_agg"),
            ((12, 10, 10, -1), "n_servers_per_edge"),
        ];
        for ((core, agg, edge, servers), param) in cases {
            let err = three_tier(core, agg, edge, servers).unwrap_err();
            assert!(err.is_invalid_parameter());
            assert_eq!(err.parameter(), Some(param));
        }
    }

    #[test]
    fn test_too_large_blames_the_largest_parameter() {
        let cases = [
            ((5_000_000_000, 1, 1, 1), "n_core"),
            ((1, 5_000_000_000, 1, 1), "n_agg"),
            ((1, 1, 5_000_000_000, 1), "n_edge_per_agg"),
            ((1, 1, 1, 5_000_000_000), "n_servers_per_edge"),
        ];
        for ((core, agg, edge, servers), param) in cases {
            let err = three_tier(core, agg, edge, servers).unwrap_err();
            assert_eq!(err.parameter(), Some(param));
            assert_eq!(
                err,
                TopologyError::invalid(param, 5_000_000_000, crate::error::Constraint::TooLarge)
            );
        }
    }

    #[test]
    fn test_edge_switches_have_a_single_owner() {
        let (cores, aggs, edges_per_agg, servers_per_edge) = (2, 3, 4, 2);
        let topology = three_tier(cores, aggs, edges_per_agg, servers_per_edge).unwrap();

        for node in topology.iter_nodes() {
            let neighbors = topology.neighbors(node.id);
            match node.attrs.layer {
                Some(Layer::Core) => assert_eq!(neighbors.len(), aggs as usize),
                Some(Layer::Aggregation) => {
                    assert_eq!(neighbors.len(), (cores + edges_per_agg) as usize)
                }
                Some(Layer::Edge) => {
                    let uplinks: Vec<_> = neighbors
                        .iter()
                        .filter(|&&id| topology.node(id).unwrap().layer == Some(Layer::Aggregation))
                        .collect();
                    assert_eq!(uplinks.len(), 1);
                    assert_eq!(topology.node(*uplinks[0]).unwrap().pod, node.attrs.pod);
                    assert_eq!(neighbors.len(), 1 + servers_per_edge as usize);
                }
                Some(Layer::Leaf) => {
                    assert_eq!(neighbors.len(), 1);
                    assert_eq!(topology.node(neighbors[0]).unwrap().pod, node.attrs.pod);
                }
                None => panic!("node {} has no layer", node.id),
            }
        }
    }
}
