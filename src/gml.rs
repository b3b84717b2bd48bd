//! GML reading and writing for topologies.
//!
//! Output layout:
//!
//! ```text
//! graph [
//!   directed 0
//!   name "fat_tree_topology(4)"
//!   capacity_unit "Gbps"
//!   node [
//!     id 0
//!     type "switch"
//!     layer "core"
//!   ]
//!   edge [
//!     source 0
//!     target 4
//!     kind "core_aggregation"
//!     capacity 10.0
//!   ]
//! ]
//! ```
//!
//! Addresses are written as dotted digit strings (`"0.1.1"`). Booleans are
//! the bare words `true` and `false`. Graph attributes other than
//! `directed` and `name` become metadata. Unknown nested blocks are skipped
//! so files produced by other tools still load.

use color_eyre::eyre::{eyre, Result, WrapErr};
use log::debug;
use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::topology::{
    AttrValue, Attributes, EdgeAttrs, Layer, LinkKind, NodeAttrs, NodeId, NodeType, Topology,
};

/// Token types for GML parsing
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Identifier(String),
    Number(String),
    String(String),
    LeftBracket,
    RightBracket,
    Eof,
}

struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
}

impl Lexer {
    fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();
        Self {
            input: chars,
            position: 0,
            current_char,
        }
    }

    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if !ch.is_whitespace() {
                break;
            }
            self.advance();
        }
    }

    // Comments run from '#' to end of line
    fn skip_comment(&mut self) {
        while let Some(ch) = self.current_char {
            if ch == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn read_string(&mut self) -> Result<String> {
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char {
            match ch {
                '"' => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance();
                    if let Some(escaped) = self.current_char {
                        match escaped {
                            'n' => result.push('\n'),
                            't' => result.push('\t'),
                            '\\' => result.push('\\'),
                            '"' => result.push('"'),
                            other => {
                                result.push('\\');
                                result.push(other);
                            }
                        }
                        self.advance();
                    }
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(eyre!("Unterminated string literal"))
    }

    fn read_word(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char {
            if ch.is_alphanumeric() || matches!(ch, '_' | '.' | '-' | '+') {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn next_token(&mut self) -> Result<Token> {
        loop {
            self.skip_whitespace();
            return match self.current_char {
                None => Ok(Token::Eof),
                Some('#') => {
                    self.skip_comment();
                    continue;
                }
                Some('[') => {
                    self.advance();
                    Ok(Token::LeftBracket)
                }
                Some(']') => {
                    self.advance();
                    Ok(Token::RightBracket)
                }
                Some('"') => Ok(Token::String(self.read_string()?)),
                Some(ch) if ch.is_alphabetic() || ch == '_' => {
                    Ok(Token::Identifier(self.read_word()))
                }
                Some(ch) if ch.is_ascii_digit() || matches!(ch, '-' | '+' | '.') => {
                    Ok(Token::Number(self.read_word()))
                }
                Some(ch) => Err(eyre!("Unexpected character: '{}'", ch)),
            };
        }
    }
}

/// Parsed GML value before it is mapped onto topology types
#[derive(Debug, Clone, PartialEq)]
enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Word(String),
    List(Vec<(String, Value)>),
}

impl Value {
    fn describe(&self) -> String {
        match self {
            Value::Int(v) => v.to_string(),
            Value::Float(v) => v.to_string(),
            Value::Str(v) | Value::Word(v) => v.clone(),
            Value::List(_) => "[...]".to_string(),
        }
    }

    fn into_attr(self) -> Option<AttrValue> {
        match self {
            Value::Int(v) => Some(AttrValue::Int(v)),
            Value::Float(v) => Some(AttrValue::Float(v)),
            Value::Str(v) => Some(AttrValue::Str(v)),
            Value::Word(w) => Some(match w.as_str() {
                "true" => AttrValue::Bool(true),
                "false" => AttrValue::Bool(false),
                _ => AttrValue::Str(w),
            }),
            Value::List(_) => None,
        }
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            Value::Str(v) | Value::Word(v) => Some(v),
            _ => None,
        }
    }
}

struct Parser {
    lexer: Lexer,
    current_token: Token,
}

impl Parser {
    fn new(mut lexer: Lexer) -> Result<Self> {
        let current_token = lexer.next_token()?;
        Ok(Self {
            lexer,
            current_token,
        })
    }

    fn advance(&mut self) -> Result<()> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn parse_value(&mut self) -> Result<Value> {
        let value = match &self.current_token {
            Token::LeftBracket => {
                self.advance()?;
                let items = self.parse_list()?;
                return match self.current_token {
                    Token::RightBracket => {
                        self.advance()?;
                        Ok(Value::List(items))
                    }
                    _ => Err(eyre!("Expected ']', found {:?}", self.current_token)),
                };
            }
            Token::Number(text) => parse_number(text)?,
            Token::String(text) => Value::Str(text.clone()),
            Token::Identifier(word) => Value::Word(word.clone()),
            other => return Err(eyre!("Expected value, found {:?}", other)),
        };
        self.advance()?;
        Ok(value)
    }

    /// Key/value pairs up to the closing bracket or end of input
    fn parse_list(&mut self) -> Result<Vec<(String, Value)>> {
        let mut items = Vec::new();
        loop {
            match &self.current_token {
                Token::RightBracket | Token::Eof => return Ok(items),
                Token::Identifier(key) => {
                    let key = key.clone();
                    self.advance()?;
                    let value = self.parse_value()?;
                    items.push((key, value));
                }
                other => return Err(eyre!("Expected attribute name, found {:?}", other)),
            }
        }
    }
}

fn parse_number(text: &str) -> Result<Value> {
    if let Ok(v) = text.parse::<i64>() {
        return Ok(Value::Int(v));
    }
    text.parse::<f64>()
        .map(Value::Float)
        .map_err(|_| eyre!("Invalid number: {}", text))
}

fn expect_usize(key: &str, value: &Value) -> Result<usize> {
    match value {
        Value::Int(v) => usize::try_from(*v)
            .map_err(|_| eyre!("Attribute '{}' must be non-negative, got {}", key, v)),
        other => Err(eyre!("Attribute '{}' must be an integer, got {}", key, other.describe())),
    }
}

fn expect_node_id(key: &str, value: &Value) -> Result<NodeId> {
    let id = expect_usize(key, value)?;
    u32::try_from(id)
        .map(NodeId)
        .map_err(|_| eyre!("Node id {} is out of range", id))
}

fn expect_list(key: &str, value: Value) -> Result<Vec<(String, Value)>> {
    match value {
        Value::List(items) => Ok(items),
        other => Err(eyre!("'{}' must be a [ ... ] block, got {}", key, other.describe())),
    }
}

fn expect_parsed<T: std::str::FromStr>(key: &str, value: &Value) -> Result<T> {
    value
        .as_text()
        .and_then(|text| text.parse().ok())
        .ok_or_else(|| eyre!("Invalid value for '{}': {}", key, value.describe()))
}

/// Parse a dotted digit string such as "0.1.1". The empty string is the
/// empty address.
pub fn parse_address(text: &str) -> Option<Vec<usize>> {
    if text.is_empty() {
        return Some(Vec::new());
    }
    text.split('.').map(|digit| digit.parse().ok()).collect()
}

pub fn format_address(address: &[usize]) -> String {
    address
        .iter()
        .map(usize::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

fn insert_extra(extra: &mut Attributes, key: String, value: Value) {
    match value.into_attr() {
        Some(attr) => {
            extra.insert(key, attr);
        }
        None => debug!("Skipping nested GML attribute '{}'", key),
    }
}

fn node_from_gml(items: Vec<(String, Value)>) -> Result<(NodeId, NodeAttrs)> {
    let mut id = None;
    let mut attrs = NodeAttrs::default();

    for (key, value) in items {
        match key.as_str() {
            "id" => id = Some(expect_node_id(&key, &value)?),
            "type" => attrs.node_type = Some(expect_parsed::<NodeType>(&key, &value)?),
            "layer" => attrs.layer = Some(expect_parsed::<Layer>(&key, &value)?),
            "pod" => attrs.pod = Some(expect_usize(&key, &value)?),
            "level" => attrs.level = Some(expect_usize(&key, &value)?),
            "address" => {
                let address = value
                    .as_text()
                    .and_then(parse_address)
                    .ok_or_else(|| eyre!("Invalid address: {}", value.describe()))?;
                attrs.address = Some(address);
            }
            _ => insert_extra(&mut attrs.extra, key, value),
        }
    }

    let id = id.ok_or_else(|| eyre!("Node missing required 'id' attribute"))?;
    Ok((id, attrs))
}

fn edge_from_gml(items: Vec<(String, Value)>) -> Result<(NodeId, NodeId, EdgeAttrs)> {
    let mut source = None;
    let mut target = None;
    let mut attrs = EdgeAttrs::default();

    for (key, value) in items {
        match key.as_str() {
            "source" => source = Some(expect_node_id(&key, &value)?),
            "target" => target = Some(expect_node_id(&key, &value)?),
            "kind" => attrs.kind = Some(expect_parsed::<LinkKind>(&key, &value)?),
            "level" => attrs.level = Some(expect_usize(&key, &value)?),
            _ => insert_extra(&mut attrs.extra, key, value),
        }
    }

    let source = source.ok_or_else(|| eyre!("Edge missing required 'source' attribute"))?;
    let target = target.ok_or_else(|| eyre!("Edge missing required 'target' attribute"))?;
    Ok((source, target, attrs))
}

fn graph_from_gml(items: Vec<(String, Value)>) -> Result<Topology> {
    let mut directed = false;
    let mut name = None;
    let mut metadata = Attributes::new();
    let mut nodes = Vec::new();
    let mut edges = Vec::new();

    for (key, value) in items {
        match key.as_str() {
            "node" => nodes.push(node_from_gml(expect_list(&key, value)?)?),
            "edge" => edges.push(edge_from_gml(expect_list(&key, value)?)?),
            "directed" => {
                directed = match value {
                    Value::Int(0) => false,
                    Value::Int(1) => true,
                    other => {
                        return Err(eyre!("Invalid value for 'directed': {}", other.describe()))
                    }
                }
            }
            "name" | "label" if matches!(value, Value::Str(_)) => {
                name = value.as_text().map(str::to_string);
            }
            _ => insert_extra(&mut metadata, key, value),
        }
    }

    let mut topology = Topology::new(directed);
    if let Some(name) = name {
        topology.set_name(name);
    }
    *topology.metadata_mut() = metadata;

    let mut seen = HashSet::new();
    for (id, attrs) in nodes {
        if !seen.insert(id) {
            return Err(eyre!("Duplicate node ID: {}", id));
        }
        topology.add_node(id, attrs);
    }
    for (source, target, attrs) in edges {
        topology
            .add_edge(source, target, attrs)
            .wrap_err_with(|| format!("Invalid edge {} -- {}", source, target))?;
    }
    Ok(topology)
}

/// Parse a GML document into a topology.
///
/// Top-level entries other than `graph` (for example `Creator`) are ignored.
pub fn parse_gml(input: &str) -> Result<Topology> {
    let mut parser = Parser::new(Lexer::new(input))?;
    let items = parser.parse_list()?;
    if parser.current_token != Token::Eof {
        return Err(eyre!("Unexpected ']' at top level"));
    }

    let graph = items
        .into_iter()
        .find_map(|(key, value)| match (key.as_str(), value) {
            ("graph", Value::List(items)) => Some(items),
            _ => None,
        })
        .ok_or_else(|| eyre!("No 'graph' block found"))?;
    graph_from_gml(graph)
}

/// Read a topology from a GML file
pub fn read_gml_file(path: &Path) -> Result<Topology> {
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read GML file '{}'", path.display()))?;
    parse_gml(&content).wrap_err_with(|| format!("Failed to parse GML file '{}'", path.display()))
}

fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for ch in text.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

fn format_attr(value: &AttrValue) -> String {
    match value {
        AttrValue::Bool(v) => v.to_string(),
        AttrValue::Int(v) => v.to_string(),
        // Debug keeps a fractional part so the value reads back as a float
        AttrValue::Float(v) => format!("{:?}", v),
        AttrValue::Str(v) => quote(v),
    }
}

// Keys the reader maps onto typed fields or graph structure
const GRAPH_KEYS: &[&str] = &["directed", "name", "label", "node", "edge"];
const NODE_KEYS: &[&str] = &["id", "type", "layer", "pod", "level", "address"];
const EDGE_KEYS: &[&str] = &["source", "target", "kind", "level"];

/// A key the lexer reads back as a single identifier
fn is_gml_key(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(ch) if ch.is_ascii_alphabetic() || ch == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

fn write_extra(
    out: &mut String,
    indent: &str,
    extra: &Attributes,
    reserved: &[&str],
) -> Result<()> {
    for (key, value) in extra {
        if reserved.contains(&key.as_str()) {
            return Err(eyre!("Attribute '{}' collides with a built-in GML key", key));
        }
        if !is_gml_key(key) {
            return Err(eyre!("Attribute '{}' is not a valid GML key", key));
        }
        let _ = writeln!(out, "{}{} {}", indent, key, format_attr(value));
    }
    Ok(())
}

/// Render a topology as GML text.
///
/// Fails if an `extra` or metadata key would not read back as the same
/// attribute: a key the reader treats specially (`id`, `source`, `type`,
/// ...) or one that is not a plain identifier.
pub fn to_gml(topology: &Topology) -> Result<String> {
    let mut out = String::from("graph [\n");
    let _ = writeln!(out, "  directed {}", u8::from(topology.is_directed()));
    if let Some(name) = topology.name() {
        let _ = writeln!(out, "  name {}", quote(name));
    }
    write_extra(&mut out, "  ", topology.metadata(), GRAPH_KEYS)
        .wrap_err("Cannot write graph metadata")?;

    for node in topology.iter_nodes() {
        out.push_str("  node [\n");
        let _ = writeln!(out, "    id {}", node.id);
        let attrs = &node.attrs;
        if let Some(node_type) = attrs.node_type {
            let _ = writeln!(out, "    type {}", quote(node_type.as_str()));
        }
        if let Some(layer) = attrs.layer {
            let _ = writeln!(out, "    layer {}", quote(layer.as_str()));
        }
        if let Some(pod) = attrs.pod {
            let _ = writeln!(out, "    pod {}", pod);
        }
        if let Some(level) = attrs.level {
            let _ = writeln!(out, "    level {}", level);
        }
        if let Some(address) = &attrs.address {
            let _ = writeln!(out, "    address {}", quote(&format_address(address)));
        }
        write_extra(&mut out, "    ", &attrs.extra, NODE_KEYS)
            .wrap_err_with(|| format!("Cannot write node {}", node.id))?;
        out.push_str("  ]\n");
    }

    for edge in topology.edges() {
        out.push_str("  edge [\n");
        let _ = writeln!(out, "    source {}", edge.source);
        let _ = writeln!(out, "    target {}", edge.target);
        if let Some(kind) = edge.attrs.kind {
            let _ = writeln!(out, "    kind {}", quote(kind.as_str()));
        }
        if let Some(level) = edge.attrs.level {
            let _ = writeln!(out, "    level {}", level);
        }
        write_extra(&mut out, "    ", &edge.attrs.extra, EDGE_KEYS)
            .wrap_err_with(|| format!("Cannot write edge {} -- {}", edge.source, edge.target))?;
        out.push_str("  ]\n");
    }

    out.push_str("]\n");
    Ok(out)
}

/// Write a topology to a GML file
pub fn write_gml_file(topology: &Topology, path: &Path) -> Result<()> {
    fs::write(path, to_gml(topology)?)
        .wrap_err_with(|| format!("Failed to write GML file '{}'", path.display()))
}
