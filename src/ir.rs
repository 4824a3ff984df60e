use serde::{Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::layout::text::measure_label;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Group a node belongs to.
///
/// `Unassigned` and `Full` are the two sentinels; `Label` only comes from a
/// manual override whose text is not a group number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum GroupLabel {
    #[default]
    Unassigned,
    Full,
    Group(u32),
    Label(String),
}

impl GroupLabel {
    /// Parses the `Group` column of an imported roster. Only a whole positive
    /// integer becomes a group id; everything else falls back to a sentinel.
    pub fn parse_field(raw: &str) -> Self {
        let value = raw.trim();
        if value.eq_ignore_ascii_case("full") {
            return Self::Full;
        }
        match parse_group_id(value) {
            Some(id) => Self::Group(id),
            None => Self::Unassigned,
        }
    }

    /// Parses text typed by a user reassigning a node by hand.
    pub fn parse_manual(raw: &str) -> Self {
        let value = raw.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("none") {
            return Self::Unassigned;
        }
        if value.eq_ignore_ascii_case("full") {
            return Self::Full;
        }
        match parse_group_id(value) {
            Some(id) => Self::Group(id),
            None => Self::Label(value.to_string()),
        }
    }

    pub fn group_id(&self) -> Option<u32> {
        match self {
            Self::Group(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::Unassigned | Self::Full)
    }
}

fn parse_group_id(value: &str) -> Option<u32> {
    let digits = value.strip_prefix('+').unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|id| *id > 0)
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl fmt::Display for GroupLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unassigned => f.write_str("None"),
            Self::Full => f.write_str("Full"),
            Self::Group(id) => write!(f, "{id}"),
            Self::Label(label) => f.write_str(label),
        }
    }
}

impl Serialize for GroupLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub group: GroupLabel,
    pub position: Point,
    pub size: Size,
}

impl Node {
    pub fn contains(&self, point: Point) -> bool {
        let half_w = self.size.width / 2.0;
        let half_h = self.size.height / 2.0;
        point.x >= self.position.x - half_w
            && point.x <= self.position.x + half_w
            && point.y >= self.position.y - half_h
            && point.y <= self.position.y + half_h
    }
}

/// Unordered pair; `a < b` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Edge {
    pub a: NodeId,
    pub b: NodeId,
}

impl Edge {
    pub fn new(x: NodeId, y: NodeId) -> Self {
        if x <= y { Self { a: x, b: y } } else { Self { a: y, b: x } }
    }

    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.a == node {
            Some(self.b)
        } else if self.b == node {
            Some(self.a)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    order: Vec<NodeId>,
    edges: Vec<Edge>,
    edge_set: HashSet<Edge>,
    adjacency: Vec<Vec<NodeId>>,
    // Lowercased, trimmed name -> node.
    by_name: HashMap<String, NodeId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node, or returns the existing one when the name is already
    /// taken (names compare case-insensitively).
    pub fn add_node(&mut self, name: &str, group: GroupLabel) -> NodeId {
        let key = name_key(name);
        if let Some(existing) = self.by_name.get(&key) {
            return *existing;
        }
        let id = NodeId(self.nodes.len());
        if !key.is_empty() {
            self.by_name.insert(key, id);
        }
        self.nodes.push(Node {
            name: name.to_string(),
            group,
            position: Point::default(),
            size: measure_label(name),
        });
        self.order.push(id);
        self.adjacency.push(Vec::new());
        id
    }

    /// Adds the undirected edge `a -- b`. Returns `false` for self edges,
    /// unknown ids and pairs that are already connected.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        if a == b || a.0 >= self.nodes.len() || b.0 >= self.nodes.len() {
            return false;
        }
        let edge = Edge::new(a, b);
        if !self.edge_set.insert(edge) {
            return false;
        }
        self.edges.push(edge);
        self.adjacency[a.0].push(b);
        self.adjacency[b.0].push(a);
        true
    }

    pub fn remove_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        let edge = Edge::new(a, b);
        if !self.edge_set.remove(&edge) {
            return false;
        }
        self.edges.retain(|candidate| *candidate != edge);
        self.adjacency[a.0].retain(|n| *n != b);
        self.adjacency[b.0].retain(|n| *n != a);
        true
    }

    /// Connects two nodes, or disconnects them when already connected.
    /// Returns whether the pair is connected afterwards.
    pub fn toggle_edge(&mut self, a: NodeId, b: NodeId) -> bool {
        if self.remove_edge(a, b) {
            false
        } else {
            self.add_edge(a, b)
        }
    }

    pub fn find_node_by_name(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(&name_key(name)).copied()
    }

    pub fn neighbors(&self, node: NodeId) -> &[NodeId] {
        self.adjacency.get(node.0).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_connected(&self, a: NodeId, b: NodeId) -> bool {
        a != b && self.edge_set.contains(&Edge::new(a, b))
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn set_group(&mut self, id: NodeId, group: GroupLabel) {
        self.nodes[id.0].group = group;
    }

    /// Node ids in display order.
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    /// Replaces the display order. Returns `false` and keeps the current
    /// order unless `order` lists every node exactly once.
    pub fn set_order(&mut self, order: Vec<NodeId>) -> bool {
        if order.len() != self.nodes.len() {
            return false;
        }
        let mut seen = vec![false; self.nodes.len()];
        for id in &order {
            match seen.get_mut(id.0) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        self.order = order;
        true
    }

    /// Nodes in display order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> + '_ {
        self.order.iter().map(|id| (*id, &self.nodes[id.0]))
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
