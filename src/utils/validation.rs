//! Parameter and topology validation utilities.
//!
//! Every generator checks its parameters through the functions in this
//! module before creating a single node, so the error messages are the same
//! whichever generator rejects a value.

use std::collections::HashSet;

use crate::error::{Constraint, TopologyError};
use crate::topology::{DatacenterTopology, NodeType};

fn to_usize(name: &'static str, value: i64) -> Result<usize, TopologyError> {
    usize::try_from(value).map_err(|_| TopologyError::invalid(name, value, Constraint::TooLarge))
}

/// Require `value > 0`
///
/// # Arguments
/// * `name` - Parameter name reported in the error
/// * `value` - Value supplied by the caller
///
/// # Returns
/// * `Ok(usize)` with the validated value
/// * `Err(TopologyError::InvalidParameter)` with constraint `Positive`
///
/// # Examples
/// ```
/// use dctopo::utils::validation::require_positive;
///
/// assert_eq!(require_positive("n_core", 4), Ok(4));
/// assert!(require_positive("n_core", 0).is_err());
/// assert!(require_positive("n_core", -3).is_err());
/// ```
pub fn require_positive(name: &'static str, value: i64) -> Result<usize, TopologyError> {
    if value <= 0 {
        return Err(TopologyError::invalid(name, value, Constraint::Positive));
    }
    to_usize(name, value)
}

/// Require a positive even value
///
/// # Examples
/// ```
/// use dctopo::utils::validation::require_even;
///
/// assert_eq!(require_even("k", 8), Ok(8));
/// assert!(require_even("k", 0).is_err());
/// assert!(require_even("k", 11).is_err());
/// ```
pub fn require_even(name: &'static str, value: i64) -> Result<usize, TopologyError> {
    if value <= 0 || value % 2 != 0 {
        return Err(TopologyError::invalid(name, value, Constraint::Even));
    }
    to_usize(name, value)
}

/// Require `value >= min` where `min` is non-negative
///
/// # Examples
/// ```
/// use dctopo::utils::validation::require_at_least;
///
/// assert_eq!(require_at_least("k", 0, 0), Ok(0));
/// assert!(require_at_least("n", 0, 1).is_err());
/// ```
pub fn require_at_least(name: &'static str, value: i64, min: i64) -> Result<usize, TopologyError> {
    if value < min {
        return Err(TopologyError::invalid(name, value, Constraint::AtLeast(min)));
    }
    to_usize(name, value)
}

/// Require that a generator's node count is known and fits in a `NodeId`.
///
/// `node_count` is `None` when computing it overflowed; the error is then
/// attributed to parameter `name` with its raw `value`.
pub fn require_addressable(
    name: &'static str,
    value: i64,
    node_count: Option<usize>,
) -> Result<usize, TopologyError> {
    match node_count {
        Some(count) if u32::try_from(count).is_ok() => Ok(count),
        _ => Err(TopologyError::invalid(name, value, Constraint::TooLarge)),
    }
}

/// Pick the parameter to blame when a node count is too large: the one
/// with the largest value, the first of them on a tie.
///
/// # Examples
/// ```
/// use dctopo::utils::validation::largest_parameter;
///
/// let params = [("n_core", 5_000_000_000), ("n_edge", 1), ("n_servers", 1)];
/// assert_eq!(largest_parameter(&params), ("n_core", 5_000_000_000));
/// ```
pub fn largest_parameter(params: &[(&'static str, i64)]) -> (&'static str, i64) {
    params
        .iter()
        .copied()
        .fold(None, |best: Option<(&'static str, i64)>, param| match best {
            Some(best) if best.1 >= param.1 => Some(best),
            _ => Some(param),
        })
        .unwrap_or(("", 0))
}

/// Validate the structure of a datacenter topology
///
/// Checks for:
/// - Edges referencing nodes that are not in the graph
/// - Server-to-server links (servers only attach to switches)
/// - Isolated nodes when the topology has more than one node
///
/// # Returns
/// * `Ok(())` if validation succeeds
/// * `Err(String)` with an error message if validation fails
pub fn validate_datacenter_topology(topology: &DatacenterTopology) -> Result<(), String> {
    let node_ids: HashSet<_> = topology.nodes().collect();

    for edge in topology.edges() {
        for endpoint in [edge.source, edge.target] {
            if !node_ids.contains(&endpoint) {
                return Err(format!("Edge references non-existent node: {}", endpoint));
            }
        }
        if topology.node_type(edge.source) == Some(NodeType::Server)
            && topology.node_type(edge.target) == Some(NodeType::Server)
        {
            return Err(format!(
                "Servers {} and {} are linked directly",
                edge.source, edge.target
            ));
        }
    }

    if topology.number_of_nodes() > 1 {
        if let Some(isolated) = topology.nodes().find(|&id| topology.degree(id) == 0) {
            return Err(format!("Node {} has no links - network is disconnected", isolated));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{EdgeAttrs, NodeAttrs, NodeId};

    #[test]
    fn test_require_positive() {
        assert_eq!(require_positive("n", 1), Ok(1));
        assert_eq!(
            require_positive("n", 0),
            Err(TopologyError::invalid("n", 0, Constraint::Positive))
        );
        assert_eq!(
            require_positive("n", -1),
            Err(TopologyError::invalid("n", -1, Constraint::Positive))
        );
    }

    #[test]
    fn test_require_even() {
        assert_eq!(require_even("k", 2), Ok(2));
        for bad in [0, -1, -2, 11] {
            assert_eq!(
                require_even("k", bad),
                Err(TopologyError::invalid("k", bad, Constraint::Even))
            );
        }
    }

    #[test]
    fn test_require_at_least() {
        assert_eq!(require_at_least("k", 3, 0), Ok(3));
        assert_eq!(
            require_at_least("k", -1, 0),
            Err(TopologyError::invalid("k", -1, Constraint::AtLeast(0)))
        );
    }

    #[test]
    fn test_require_addressable() {
        assert_eq!(require_addressable("k", 4, Some(36)), Ok(36));
        assert_eq!(
            require_addressable("k", 4, None),
            Err(TopologyError::invalid("k", 4, Constraint::TooLarge))
        );
        let too_many = u32::MAX as usize + 1;
        assert!(require_addressable("n", 70_000, Some(too_many)).is_err());
    }

    #[test]
    fn test_largest_parameter() {
        assert_eq!(largest_parameter(&[("a", 1), ("b", 9), ("c", 3)]), ("b", 9));
        assert_eq!(largest_parameter(&[("a", 7), ("b", 7)]), ("a", 7));
    }

    #[test]
    fn test_validate_datacenter_topology() {
        let mut topology = DatacenterTopology::new();
        topology.add_switch(NodeId(0), NodeAttrs::default());
        topology.add_server(NodeId(1), NodeAttrs::default());
        topology.add_server(NodeId(2), NodeAttrs::default());
        topology.add_edge(NodeId(0), NodeId(1), EdgeAttrs::default()).unwrap();

        // Node 2 is isolated
        assert!(validate_datacenter_topology(&topology).is_err());

        topology.add_edge(NodeId(0), NodeId(2), EdgeAttrs::default()).unwrap();
        assert!(validate_datacenter_topology(&topology).is_ok());

        topology.add_edge(NodeId(1), NodeId(2), EdgeAttrs::default()).unwrap();
        assert!(validate_datacenter_topology(&topology).is_err());
    }
}
