//! k-ary fat-tree generator.
//!
//! Node identifiers are laid out as follows, for `h = k/2`:
//!
//! ```text
//! 0 .. h*h                      core switches
//! h*h + p*k .. + h              aggregation switches of pod p
//! h*h + p*k + h .. + h          edge switches of pod p
//! h*h + k*k ..                  servers, h per edge switch, in edge order
//! ```

use log::{debug, info};

use crate::error::TopologyError;
use crate::topology::{DatacenterTopology, EdgeAttrs, Layer, LinkKind, NodeAttrs, NodeId};
use crate::utils::validation::{require_addressable, require_even};

/// Build a k-ary fat-tree.
///
/// The topology has `k` pods, each with `k/2` aggregation and `k/2` edge
/// switches in a full bipartite mesh, `(k/2)^2` core switches, and `k/2`
/// servers under every edge switch. Core switch `c` connects to aggregation
/// switch `c / (k/2)` of every pod.
///
/// # Arguments
/// * `k` - Switch radix; must be a positive even integer
///
/// # Examples
/// ```
/// use dctopo::generators::fat_tree;
///
/// let topology = fat_tree(8)?;
/// assert_eq!(topology.number_of_nodes(), 208);
/// assert!(fat_tree(11).is_err());
/// # Ok::<(), dctopo::TopologyError>(())
/// ```
pub fn fat_tree(k: i64) -> Result<DatacenterTopology, TopologyError> {
    let radix = require_even("k", k)?;
    let half = radix / 2;
    let node_count = half
        .checked_mul(half)
        .and_then(|core| radix.checked_mul(radix)?.checked_add(core))
        .and_then(|switches| radix.checked_mul(half)?.checked_mul(half)?.checked_add(switches));
    require_addressable("k", k, node_count)?;

    info!("Generating fat-tree topology (k={})", radix);

    let mut topology = DatacenterTopology::new();
    topology.set_name(format!("fat_tree_topology({})", radix));

    let n_core = half * half;
    for core in 0..n_core {
        topology.add_switch(NodeId::from_index(core), NodeAttrs::in_layer(Layer::Core));
    }

    // Pods: aggregation switches first, then edge switches, then the mesh
    for pod in 0..radix {
        let agg_start = n_core + pod * radix;
        let edge_start = agg_start + half;
        for agg in agg_start..edge_start {
            topology.add_switch(
                NodeId::from_index(agg),
                NodeAttrs::in_layer(Layer::Aggregation).with_pod(pod),
            );
        }
        for edge in edge_start..edge_start + half {
            topology.add_switch(
                NodeId::from_index(edge),
                NodeAttrs::in_layer(Layer::Edge).with_pod(pod),
            );
        }
        for agg in agg_start..edge_start {
            for edge in edge_start..edge_start + half {
                topology.add_edge(
                    NodeId::from_index(agg),
                    NodeId::from_index(edge),
                    EdgeAttrs::of_kind(LinkKind::AggregationEdge),
                )?;
            }
        }
        debug!(
            "Pod {}: aggregation {}..{}, edge {}..{}",
            pod,
            agg_start,
            edge_start,
            edge_start,
            edge_start + half
        );
    }

    for core in 0..n_core {
        for pod in 0..radix {
            let agg = n_core + pod * radix + core / half;
            topology.add_edge(
                NodeId::from_index(core),
                NodeId::from_index(agg),
                EdgeAttrs::of_kind(LinkKind::CoreAggregation),
            )?;
        }
    }

    let mut next = n_core + radix * radix;
    for pod in 0..radix {
        let edge_start = n_core + pod * radix + half;
        for edge in edge_start..edge_start + half {
            for _ in 0..half {
                let server = NodeId::from_index(next);
                topology.add_server(server, NodeAttrs::in_layer(Layer::Leaf).with_pod(pod));
                topology.add_edge(
                    NodeId::from_index(edge),
                    server,
                    EdgeAttrs::of_kind(LinkKind::EdgeLeaf),
                )?;
                next += 1;
            }
        }
    }

    super::log_summary(&topology);
    Ok(topology)
}
