//! Datacenter topology: an undirected graph whose nodes are typed as
//! switches, servers or other devices.

use serde::{Deserialize, Serialize};
use std::ops::Deref;

use super::graph::{GraphError, Topology};
use super::types::{Attributes, EdgeAttrs, NodeAttrs, NodeId, NodeType};

/// Undirected topology whose every node carries a [`NodeType`].
///
/// Read access to the underlying graph goes through `Deref`. Mutation is
/// limited to adding typed nodes and edges, and to annotating attributes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Topology", into = "Topology")]
pub struct DatacenterTopology {
    graph: Topology,
}

impl DatacenterTopology {
    pub fn new() -> Self {
        DatacenterTopology {
            graph: Topology::undirected(),
        }
    }

    /// Add a node with the given role. See [`Topology::add_node`].
    pub fn add_node(&mut self, id: NodeId, node_type: NodeType, mut attrs: NodeAttrs) -> bool {
        attrs.node_type = Some(node_type);
        self.graph.add_node(id, attrs)
    }

    pub fn add_switch(&mut self, id: NodeId, attrs: NodeAttrs) -> bool {
        self.add_node(id, NodeType::Switch, attrs)
    }

    pub fn add_server(&mut self, id: NodeId, attrs: NodeAttrs) -> bool {
        self.add_node(id, NodeType::Server, attrs)
    }

    pub fn add_edge(&mut self, u: NodeId, v: NodeId, attrs: EdgeAttrs) -> Result<(), GraphError> {
        self.graph.add_edge(u, v, attrs)
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.graph.set_name(name);
    }

    /// Nodes of the given role, in insertion order
    pub fn nodes_of_type(&self, node_type: NodeType) -> Vec<NodeId> {
        self.graph
            .iter_nodes()
            .filter(|node| node.attrs.node_type == Some(node_type))
            .map(|node| node.id)
            .collect()
    }

    pub fn switches(&self) -> Vec<NodeId> {
        self.nodes_of_type(NodeType::Switch)
    }

    pub fn servers(&self) -> Vec<NodeId> {
        self.nodes_of_type(NodeType::Server)
    }

    pub fn number_of_switches(&self) -> usize {
        self.count_of_type(NodeType::Switch)
    }

    pub fn number_of_servers(&self) -> usize {
        self.count_of_type(NodeType::Server)
    }

    fn count_of_type(&self, node_type: NodeType) -> usize {
        self.graph
            .iter_nodes()
            .filter(|node| node.attrs.node_type == Some(node_type))
            .count()
    }

    /// Role of a node, if it exists
    pub fn node_type(&self, id: NodeId) -> Option<NodeType> {
        self.graph.node(id).and_then(|attrs| attrs.node_type)
    }

    pub fn node_attrs_mut(&mut self, id: NodeId) -> Option<&mut NodeAttrs> {
        self.graph.node_attrs_mut(id)
    }

    pub fn edge_attrs_mut(&mut self, u: NodeId, v: NodeId) -> Option<&mut EdgeAttrs> {
        self.graph.edge_attrs_mut(u, v)
    }

    pub fn edges_mut(&mut self) -> impl Iterator<Item = (NodeId, NodeId, &mut EdgeAttrs)> {
        self.graph.edges_mut()
    }

    pub fn metadata_mut(&mut self) -> &mut Attributes {
        self.graph.metadata_mut()
    }

    pub fn as_topology(&self) -> &Topology {
        &self.graph
    }

    pub fn into_topology(self) -> Topology {
        self.graph
    }
}

impl Deref for DatacenterTopology {
    type Target = Topology;

    fn deref(&self) -> &Self::Target {
        &self.graph
    }
}

impl TryFrom<Topology> for DatacenterTopology {
    type Error = GraphError;

    /// Accept an undirected graph whose nodes all carry a role.
    fn try_from(graph: Topology) -> Result<Self, Self::Error> {
        if graph.is_directed() {
            return Err(GraphError::Directed);
        }
        if let Some(node) = graph.iter_nodes().find(|node| node.attrs.node_type.is_none()) {
            return Err(GraphError::MissingNodeType(node.id));
        }
        Ok(DatacenterTopology { graph })
    }
}

impl From<DatacenterTopology> for Topology {
    fn from(topology: DatacenterTopology) -> Self {
        topology.graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_views_keep_insertion_order() {
        let mut topology = DatacenterTopology::new();
        let switches = [1, 2, 3].map(NodeId);
        let servers = [4, 5, 6, 7].map(NodeId);
        let others = [8, 9].map(NodeId);

        for id in switches {
            topology.add_switch(id, NodeAttrs::default());
        }
        for id in servers {
            topology.add_server(id, NodeAttrs::default());
        }
        for id in others {
            topology.add_node(id, NodeType::Other, NodeAttrs::default());
        }

        assert_eq!(topology.switches(), switches.to_vec());
        assert_eq!(topology.servers(), servers.to_vec());
        assert_eq!(topology.number_of_switches(), 3);
        assert_eq!(topology.number_of_servers(), 4);
        assert_eq!(topology.nodes_of_type(NodeType::Other), others.to_vec());
        assert_eq!(topology.number_of_nodes(), 9);
    }

    #[test]
    fn test_views_reflect_live_node_set() {
        let mut topology = DatacenterTopology::new();
        topology.add_server(NodeId(10), NodeAttrs::default());
        assert_eq!(topology.number_of_servers(), 1);

        // Re-adding with a different role updates the views
        topology.add_switch(NodeId(10), NodeAttrs::default());
        assert_eq!(topology.number_of_servers(), 0);
        assert_eq!(topology.switches(), vec![NodeId(10)]);
        assert_eq!(topology.node_type(NodeId(10)), Some(NodeType::Switch));
    }

    #[test]
    fn test_try_from_topology() {
        let mut graph = Topology::undirected();
        graph.add_node(NodeId(0), NodeAttrs::default());
        assert_eq!(
            DatacenterTopology::try_from(graph.clone()),
            Err(GraphError::MissingNodeType(NodeId(0)))
        );

        graph.node_attrs_mut(NodeId(0)).unwrap().node_type = Some(NodeType::Switch);
        let topology = DatacenterTopology::try_from(graph).unwrap();
        assert_eq!(topology.number_of_switches(), 1);

        assert_eq!(
            DatacenterTopology::try_from(Topology::directed()),
            Err(GraphError::Directed)
        );
    }
}
