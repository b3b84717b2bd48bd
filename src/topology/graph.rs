//! Generic labeled graph.
//!
//! A single graph type covers both directed and undirected topologies.
//! Undirected graphs store one edge per unordered pair and expose it in
//! both directions through [`Topology::arcs`]. Nodes and edges keep their
//! insertion order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::types::{Attributes, EdgeAttrs, NodeAttrs, NodeId};

/// Errors raised when a structural graph invariant would be violated
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("edge {0} -- {1} already exists")]
    DuplicateEdge(NodeId, NodeId),

    #[error("self loop on node {0} is not allowed")]
    SelfLoop(NodeId),

    #[error("node {0} has no type attribute")]
    MissingNodeType(NodeId),

    #[error("datacenter topologies must be undirected")]
    Directed,
}

/// A node together with its attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(flatten)]
    pub attrs: NodeAttrs,
}

/// An edge together with its attributes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(flatten)]
    pub attrs: EdgeAttrs,
}

impl Edge {
    /// Endpoints as a tuple
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.source, self.target)
    }
}

/// Serialized shape of a [`Topology`]; indices are rebuilt on load.
#[derive(Serialize, Deserialize)]
struct TopologyData {
    directed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    metadata: Attributes,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

/// Labeled graph with optional direction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TopologyData", into = "TopologyData")]
pub struct Topology {
    directed: bool,
    name: Option<String>,
    metadata: Attributes,
    nodes: Vec<Node>,
    node_index: HashMap<NodeId, usize>,
    edges: Vec<Edge>,
    edge_index: HashMap<(NodeId, NodeId), usize>,
    successors: HashMap<NodeId, Vec<NodeId>>,
    // Only populated for directed graphs
    predecessors: HashMap<NodeId, Vec<NodeId>>,
}

impl Topology {
    pub fn new(directed: bool) -> Self {
        Topology {
            directed,
            ..Default::default()
        }
    }

    pub fn undirected() -> Self {
        Self::new(false)
    }

    pub fn directed() -> Self {
        Self::new(true)
    }

    pub fn is_directed(&self) -> bool {
        self.directed
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Graph-level attributes (unit annotations and the like)
    pub fn metadata(&self) -> &Attributes {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Attributes {
        &mut self.metadata
    }

    /// Add a node, or merge `attrs` into an existing one.
    ///
    /// Returns `true` if the node was new. An existing node keeps its
    /// position in the node order.
    pub fn add_node(&mut self, id: NodeId, attrs: NodeAttrs) -> bool {
        if let Some(&pos) = self.node_index.get(&id) {
            self.nodes[pos].attrs.merge(attrs);
            return false;
        }
        self.node_index.insert(id, self.nodes.len());
        self.nodes.push(Node { id, attrs });
        true
    }

    /// Add an edge between two existing nodes.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId, attrs: EdgeAttrs) -> Result<(), GraphError> {
        if u == v {
            return Err(GraphError::SelfLoop(u));
        }
        for endpoint in [u, v] {
            if !self.node_index.contains_key(&endpoint) {
                return Err(GraphError::UnknownNode(endpoint));
            }
        }
        let key = self.edge_key(u, v);
        if self.edge_index.contains_key(&key) {
            return Err(GraphError::DuplicateEdge(u, v));
        }

        self.edge_index.insert(key, self.edges.len());
        self.edges.push(Edge {
            source: u,
            target: v,
            attrs,
        });
        self.successors.entry(u).or_default().push(v);
        if self.directed {
            self.predecessors.entry(v).or_default().push(u);
        } else {
            self.successors.entry(v).or_default().push(u);
        }
        Ok(())
    }

    fn edge_key(&self, u: NodeId, v: NodeId) -> (NodeId, NodeId) {
        if self.directed || u <= v {
            (u, v)
        } else {
            (v, u)
        }
    }

    pub fn has_node(&self, id: NodeId) -> bool {
        self.node_index.contains_key(&id)
    }

    pub fn has_edge(&self, u: NodeId, v: NodeId) -> bool {
        self.edge_index.contains_key(&self.edge_key(u, v))
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeAttrs> {
        self.node_index.get(&id).map(|&pos| &self.nodes[pos].attrs)
    }

    pub fn node_attrs_mut(&mut self, id: NodeId) -> Option<&mut NodeAttrs> {
        let pos = *self.node_index.get(&id)?;
        Some(&mut self.nodes[pos].attrs)
    }

    pub fn edge(&self, u: NodeId, v: NodeId) -> Option<&EdgeAttrs> {
        self.edge_index
            .get(&self.edge_key(u, v))
            .map(|&pos| &self.edges[pos].attrs)
    }

    pub fn edge_attrs_mut(&mut self, u: NodeId, v: NodeId) -> Option<&mut EdgeAttrs> {
        let pos = *self.edge_index.get(&self.edge_key(u, v))?;
        Some(&mut self.edges[pos].attrs)
    }

    /// Node identifiers in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.iter().map(|node| node.id)
    }

    /// Nodes with their attributes, in insertion order
    pub fn iter_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Edges as stored, in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter()
    }

    /// Mutable access to edge attributes; endpoints stay fixed.
    pub fn edges_mut(&mut self) -> impl Iterator<Item = (NodeId, NodeId, &mut EdgeAttrs)> {
        self.edges
            .iter_mut()
            .map(|edge| (edge.source, edge.target, &mut edge.attrs))
    }

    /// Every traversable direction of every edge.
    ///
    /// A directed graph yields each stored pair once; an undirected graph
    /// yields `(u, v)` followed by `(v, u)`.
    pub fn arcs(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        let mirrored = !self.directed;
        self.edges.iter().flat_map(move |edge| {
            let reverse = mirrored.then_some((edge.target, edge.source));
            std::iter::once((edge.source, edge.target)).chain(reverse)
        })
    }

    /// Neighbors of an undirected node, or successors of a directed one
    pub fn neighbors(&self, id: NodeId) -> &[NodeId] {
        self.successors.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Predecessors of a directed node; same as `neighbors` when undirected
    pub fn predecessors(&self, id: NodeId) -> &[NodeId] {
        if self.directed {
            self.predecessors.get(&id).map(Vec::as_slice).unwrap_or(&[])
        } else {
            self.neighbors(id)
        }
    }

    /// Number of edges incident to `id`
    pub fn degree(&self, id: NodeId) -> usize {
        if self.directed {
            self.neighbors(id).len() + self.predecessors(id).len()
        } else {
            self.neighbors(id).len()
        }
    }

    pub fn number_of_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn number_of_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl TryFrom<TopologyData> for Topology {
    type Error = GraphError;

    fn try_from(data: TopologyData) -> Result<Self, Self::Error> {
        let mut topology = Topology::new(data.directed);
        topology.name = data.name;
        topology.metadata = data.metadata;
        for node in data.nodes {
            topology.add_node(node.id, node.attrs);
        }
        for edge in data.edges {
            topology.add_edge(edge.source, edge.target, edge.attrs)?;
        }
        Ok(topology)
    }
}

impl From<Topology> for TopologyData {
    fn from(topology: Topology) -> Self {
        TopologyData {
            directed: topology.directed,
            name: topology.name,
            metadata: topology.metadata,
            nodes: topology.nodes,
            edges: topology.edges,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::types::{AttrValue, LinkKind, NodeType};

    fn n(id: u32) -> NodeId {
        NodeId(id)
    }

    fn path_graph(directed: bool) -> Topology {
        let mut topology = Topology::new(directed);
        for id in 0..3 {
            topology.add_node(n(id), NodeAttrs::default());
        }
        topology.add_edge(n(0), n(1), EdgeAttrs::default()).unwrap();
        topology.add_edge(n(1), n(2), EdgeAttrs::default()).unwrap();
        topology
    }

    #[test]
    fn test_undirected_edges_are_stored_once() {
        let topology = path_graph(false);
        assert_eq!(topology.number_of_edges(), 2);
        assert!(topology.has_edge(n(1), n(0)));
        assert_eq!(
            topology.arcs().collect::<Vec<_>>(),
            vec![(n(0), n(1)), (n(1), n(0)), (n(1), n(2)), (n(2), n(1))]
        );
        assert_eq!(topology.neighbors(n(1)), &[n(0), n(2)]);
        assert_eq!(topology.degree(n(1)), 2);
    }

    #[test]
    fn test_directed_edges_keep_orientation() {
        let mut topology = path_graph(true);
        assert!(topology.has_edge(n(0), n(1)));
        assert!(!topology.has_edge(n(1), n(0)));
        assert_eq!(topology.arcs().count(), 2);
        assert_eq!(topology.neighbors(n(1)), &[n(2)]);
        assert_eq!(topology.predecessors(n(1)), &[n(0)]);
        assert_eq!(topology.degree(n(1)), 2);

        // The reverse direction is a distinct edge
        topology.add_edge(n(1), n(0), EdgeAttrs::default()).unwrap();
        assert_eq!(topology.number_of_edges(), 3);
    }

    #[test]
    fn test_edge_invariants() {
        let mut topology = path_graph(false);
        assert_eq!(
            topology.add_edge(n(1), n(0), EdgeAttrs::default()),
            Err(GraphError::DuplicateEdge(n(1), n(0)))
        );
        assert_eq!(
            topology.add_edge(n(2), n(2), EdgeAttrs::default()),
            Err(GraphError::SelfLoop(n(2)))
        );
        assert_eq!(
            topology.add_edge(n(0), n(9), EdgeAttrs::default()),
            Err(GraphError::UnknownNode(n(9)))
        );
        assert_eq!(topology.number_of_edges(), 2);
    }

    #[test]
    fn test_add_existing_node_merges_and_keeps_order() {
        let mut topology = path_graph(false);
        let mut attrs = NodeAttrs::default();
        attrs.node_type = Some(NodeType::Server);
        assert!(!topology.add_node(n(0), attrs));

        assert_eq!(topology.nodes().collect::<Vec<_>>(), vec![n(0), n(1), n(2)]);
        assert_eq!(topology.node(n(0)).unwrap().node_type, Some(NodeType::Server));
    }

    #[test]
    fn test_attribute_annotation() {
        let mut topology = path_graph(false);
        topology
            .edge_attrs_mut(n(1), n(0))
            .unwrap()
            .extra
            .insert("weight".to_string(), AttrValue::Float(2.0));
        topology
            .metadata_mut()
            .insert("capacity_unit".to_string(), AttrValue::from("Mbps"));
        for (_, _, attrs) in topology.edges_mut() {
            attrs.kind = Some(LinkKind::CoreEdge);
        }

        let edge = topology.edge(n(0), n(1)).unwrap();
        assert_eq!(edge.extra.get("weight"), Some(&AttrValue::Float(2.0)));
        assert_eq!(edge.kind, Some(LinkKind::CoreEdge));
        assert_eq!(
            topology.metadata().get("capacity_unit"),
            Some(&AttrValue::from("Mbps"))
        );
    }

    #[test]
    fn test_json_round_trip_rebuilds_indices() {
        let mut topology = path_graph(false);
        topology.set_name("path");
        let json = serde_json::to_string(&topology).unwrap();
        let loaded: Topology = serde_json::from_str(&json).unwrap();

        assert_eq!(loaded, topology);
        assert_eq!(loaded.name(), Some("path"));
        assert_eq!(loaded.neighbors(n(1)), &[n(0), n(2)]);
    }

    #[test]
    fn test_json_with_dangling_edge_is_rejected() {
        let json = r#"{
            "directed": false,
            "nodes": [{"id": 0}],
            "edges": [{"source": 0, "target": 1}]
        }"#;
        assert!(serde_json::from_str::<Topology>(json).is_err());
    }
}
