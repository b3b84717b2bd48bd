//! Node, edge and attribute types.
//!
//! Attributes the generators themselves rely on are typed fields
//! (`node_type`, `layer`, `pod`, `level`, `address`, `kind`). Anything a
//! downstream collaborator attaches later (capacities, delays, application
//! stacks) goes into the open `extra` map.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Opaque node identifier.
///
/// Generators assign identifiers densely from zero in a fixed order, so two
/// calls with the same parameters yield identical graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Build an identifier from a dense index.
    ///
    /// Callers must have checked that `index` fits in a `u32`; generators do
    /// this during parameter validation.
    pub(crate) fn from_index(index: usize) -> Self {
        NodeId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for NodeId {
    fn from(value: u32) -> Self {
        NodeId(value)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a node inside a datacenter topology (the `type` attribute).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Switch,
    Server,
    /// Reserved for nodes added outside the generators
    Other,
}

impl NodeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Switch => "switch",
            NodeType::Server => "server",
            NodeType::Other => "other",
        }
    }
}

impl FromStr for NodeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "switch" => Ok(NodeType::Switch),
            // "host" is what several topology files call a server
            "server" | "host" => Ok(NodeType::Server),
            "other" => Ok(NodeType::Other),
            _ => Err(format!("unknown node type '{}'", s)),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tier of a node in a hierarchical topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Core,
    Aggregation,
    Edge,
    /// Servers hanging off edge switches
    Leaf,
}

impl Layer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layer::Core => "core",
            Layer::Aggregation => "aggregation",
            Layer::Edge => "edge",
            Layer::Leaf => "leaf",
        }
    }
}

impl FromStr for Layer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "core" => Ok(Layer::Core),
            "aggregation" => Ok(Layer::Aggregation),
            "edge" => Ok(Layer::Edge),
            "leaf" => Ok(Layer::Leaf),
            _ => Err(format!("unknown layer '{}'", s)),
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which pair of tiers a link joins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    CoreAggregation,
    AggregationEdge,
    CoreEdge,
    EdgeLeaf,
    /// Server to switch link in a BCube
    Bcube,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::CoreAggregation => "core_aggregation",
            LinkKind::AggregationEdge => "aggregation_edge",
            LinkKind::CoreEdge => "core_edge",
            LinkKind::EdgeLeaf => "edge_leaf",
            LinkKind::Bcube => "bcube",
        }
    }
}

impl FromStr for LinkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "core_aggregation" => Ok(LinkKind::CoreAggregation),
            "aggregation_edge" => Ok(LinkKind::AggregationEdge),
            "core_edge" => Ok(LinkKind::CoreEdge),
            "edge_leaf" => Ok(LinkKind::EdgeLeaf),
            "bcube" => Ok(LinkKind::Bcube),
            _ => Err(format!("unknown link kind '{}'", s)),
        }
    }
}

impl fmt::Display for LinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value stored in an open attribute map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl AttrValue {
    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Int(v) => Some(*v as f64),
            AttrValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Bool(v) => write!(f, "{}", v),
            AttrValue::Int(v) => write!(f, "{}", v),
            AttrValue::Float(v) => write!(f, "{}", v),
            AttrValue::Str(v) => f.write_str(v),
        }
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Int(value)
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        AttrValue::Float(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Str(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Str(value)
    }
}

/// Open string-keyed attribute map.
pub type Attributes = BTreeMap<String, AttrValue>;

/// Attributes attached to a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeAttrs {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<NodeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer: Option<Layer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<usize>,
    /// Coordinate address, digit `i` at index `i`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: Attributes,
}

impl NodeAttrs {
    pub fn in_layer(layer: Layer) -> Self {
        NodeAttrs {
            layer: Some(layer),
            ..Default::default()
        }
    }

    pub fn with_pod(mut self, pod: usize) -> Self {
        self.pod = Some(pod);
        self
    }

    pub fn with_level(mut self, level: usize) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_address(mut self, address: Vec<usize>) -> Self {
        self.address = Some(address);
        self
    }

    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn merge(&mut self, other: NodeAttrs) {
        if other.node_type.is_some() {
            self.node_type = other.node_type;
        }
        if other.layer.is_some() {
            self.layer = other.layer;
        }
        if other.pod.is_some() {
            self.pod = other.pod;
        }
        if other.level.is_some() {
            self.level = other.level;
        }
        if other.address.is_some() {
            self.address = other.address;
        }
        self.extra.extend(other.extra);
    }
}

/// Attributes attached to an edge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<LinkKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<usize>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: Attributes,
}

impl EdgeAttrs {
    pub fn of_kind(kind: LinkKind) -> Self {
        EdgeAttrs {
            kind: Some(kind),
            ..Default::default()
        }
    }

    pub fn with_level(mut self, level: usize) -> Self {
        self.level = Some(level);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_parsing() {
        assert_eq!("switch".parse::<NodeType>(), Ok(NodeType::Switch));
        assert_eq!("server".parse::<NodeType>(), Ok(NodeType::Server));
        assert_eq!("host".parse::<NodeType>(), Ok(NodeType::Server));
        assert_eq!("other".parse::<NodeType>(), Ok(NodeType::Other));
        assert!("router".parse::<NodeType>().is_err());
    }

    #[test]
    fn test_link_kind_names_round_trip() {
        for kind in [
            LinkKind::CoreAggregation,
            LinkKind::AggregationEdge,
            LinkKind::CoreEdge,
            LinkKind::EdgeLeaf,
            LinkKind::Bcube,
        ] {
            assert_eq!(kind.as_str().parse::<LinkKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let mut attrs = NodeAttrs::in_layer(Layer::Edge).with_pod(3);
        attrs.node_type = Some(NodeType::Switch);

        let mut update = NodeAttrs::default();
        update.extra.insert("rack".to_string(), AttrValue::from("r12"));
        update.level = Some(1);
        attrs.merge(update);

        assert_eq!(attrs.node_type, Some(NodeType::Switch));
        assert_eq!(attrs.layer, Some(Layer::Edge));
        assert_eq!(attrs.pod, Some(3));
        assert_eq!(attrs.level, Some(1));
        assert_eq!(attrs.extra.get("rack"), Some(&AttrValue::from("r12")));
    }

    #[test]
    fn test_attr_value_json_shapes() {
        let values: Vec<AttrValue> = serde_json::from_str(r#"[true, 3, 2.5, "x"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                AttrValue::Bool(true),
                AttrValue::Int(3),
                AttrValue::Float(2.5),
                AttrValue::Str("x".to_string()),
            ]
        );
        assert_eq!(values[1].as_f64(), Some(3.0));
        assert_eq!(values[3].as_str(), Some("x"));
    }

    #[test]
    fn test_node_attrs_serialize_type_key() {
        let mut attrs = NodeAttrs::in_layer(Layer::Core);
        attrs.node_type = Some(NodeType::Switch);
        let json = serde_json::to_value(&attrs).unwrap();
        assert_eq!(json["type"], "switch");
        assert_eq!(json["layer"], "core");
        assert!(json.get("pod").is_none());
    }
}
