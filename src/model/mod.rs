mod fields;

use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::fmt;

use eframe::egui::{Vec2, vec2};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::GraphError;
use crate::util::phyllotaxis_position;

pub use fields::{NodeField, value_number, value_text};

/// Keys owned by the engine; dropped from incoming attribute bags.
const ENGINE_KEYS: [&str; 10] = [
    "x", "y", "vx", "vy", "fx", "fy", "index", "degree", "showText", "show_text",
];

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Node as delivered by a data source, before the engine takes ownership.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawNode {
    pub id: String,
    #[serde(default)]
    pub rank: Option<Value>,
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl RawNode {
    pub fn new(id: impl Into<String>, rank: impl Into<Value>) -> Self {
        Self {
            id: id.into(),
            rank: Some(rank.into()),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_owned(), value.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEdge {
    pub source: String,
    pub target: String,
}

impl RawEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    pub rank: Option<f64>,
    pub position: Vec2,
    pub velocity: Vec2,
    pub fx: Option<f32>,
    pub fy: Option<f32>,
    pub degree: usize,
    pub show_text: bool,
    pub attributes: Map<String, Value>,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, position: Vec2) -> Self {
        Self {
            id: id.into(),
            rank: None,
            position,
            velocity: Vec2::ZERO,
            fx: None,
            fy: None,
            degree: 0,
            show_text: false,
            attributes: Map::new(),
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.fx.is_some() || self.fy.is_some()
    }

    pub fn pin_at_current_position(&mut self) {
        self.fx = Some(self.position.x);
        self.fy = Some(self.position.y);
    }

    pub fn unpin(&mut self) {
        self.fx = None;
        self.fy = None;
    }

    pub fn attribute(&self, field: NodeField) -> Option<&Value> {
        field
            .attribute_keys()
            .iter()
            .find_map(|key| self.attributes.get(*key))
    }

    /// Text form of a field; `index` is the node's position in its container.
    pub fn field_text(&self, field: NodeField, index: usize) -> Option<String> {
        match field {
            NodeField::Rank => self.rank.map(crate::util::format_number),
            NodeField::Id => Some(self.id.to_string()),
            NodeField::Index => Some(index.to_string()),
            _ => self.attribute(field).and_then(value_text),
        }
    }

    pub fn numeric_field(&self, field: NodeField) -> Option<f64> {
        match field {
            NodeField::Rank => self.rank,
            NodeField::Id | NodeField::Index => None,
            _ => self.attribute(field).and_then(value_number),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
}

impl Edge {
    pub fn touches(&self, id: &str) -> bool {
        self.source.as_str() == id || self.target.as_str() == id
    }

    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source.as_str() == a && self.target.as_str() == b)
            || (self.source.as_str() == b && self.target.as_str() == a)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadReport {
    pub node_count: usize,
    pub edge_count: usize,
    pub rejected: Vec<GraphError>,
}

#[derive(Clone, Debug)]
pub struct RemovedNode {
    pub node: Node,
    pub edges: Vec<Edge>,
}

#[derive(Clone, Debug, Default)]
pub struct GraphModel {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index_by_id: HashMap<NodeId, usize>,
}

impl GraphModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the graph with copies of `raw_nodes` and `raw_edges`.
    /// Nodes without coordinates are spread around `center`.
    pub fn load(&mut self, raw_nodes: &[RawNode], raw_edges: &[RawEdge], center: Vec2) -> LoadReport {
        let mut rejected = Vec::new();
        let mut nodes = Vec::with_capacity(raw_nodes.len());
        let mut index_by_id = HashMap::with_capacity(raw_nodes.len());

        for raw in raw_nodes {
            let id = NodeId::new(raw.id.clone());
            if index_by_id.contains_key(&id) {
                warn!("dropping node with duplicate id {id}");
                rejected.push(GraphError::DuplicateNodeId(id.to_string()));
                continue;
            }

            let rank = raw.rank.as_ref().and_then(value_number);
            if rank.is_none() {
                warn!("node {id} has no numeric rank ({:?})", raw.rank);
            }

            let mut attributes = raw.attributes.clone();
            for key in ENGINE_KEYS {
                attributes.remove(key);
            }

            let position = match (raw.x, raw.y) {
                (Some(x), Some(y)) if x.is_finite() && y.is_finite() => vec2(x, y),
                _ => phyllotaxis_position(center, nodes.len()),
            };

            let mut node = Node::new(id.clone(), position);
            node.rank = rank;
            node.attributes = attributes;
            index_by_id.insert(id, nodes.len());
            nodes.push(node);
        }

        let mut edges: Vec<Edge> = Vec::with_capacity(raw_edges.len());
        let mut seen_pairs: HashSet<(NodeId, NodeId)> = HashSet::with_capacity(raw_edges.len());
        for raw in raw_edges {
            let (Some(&source_index), Some(&target_index)) = (
                index_by_id.get(raw.source.as_str()),
                index_by_id.get(raw.target.as_str()),
            ) else {
                warn!(
                    "dropping edge {} -> {}: endpoint not found",
                    raw.source, raw.target
                );
                rejected.push(GraphError::UnresolvedEdge {
                    source_id: raw.source.clone(),
                    target_id: raw.target.clone(),
                });
                continue;
            };

            if source_index == target_index {
                warn!("dropping self loop on {}", raw.source);
                rejected.push(GraphError::SelfLoop(raw.source.clone()));
                continue;
            }

            let source = nodes[source_index].id.clone();
            let target = nodes[target_index].id.clone();
            let key = if source <= target {
                (source.clone(), target.clone())
            } else {
                (target.clone(), source.clone())
            };
            if !seen_pairs.insert(key) {
                warn!("dropping duplicate edge {source} -> {target}");
                rejected.push(GraphError::DuplicateEdge {
                    source_id: source.to_string(),
                    target_id: target.to_string(),
                });
                continue;
            }

            edges.push(Edge { source, target });
        }

        self.nodes = nodes;
        self.edges = edges;
        self.index_by_id = index_by_id;
        self.recompute_degree();

        debug!(
            "loaded {} nodes and {} edges ({} rejected)",
            self.nodes.len(),
            self.edges.len(),
            rejected.len()
        );

        LoadReport {
            node_count: self.nodes.len(),
            edge_count: self.edges.len(),
            rejected,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.index_by_id.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        let index = self.index_of(id)?;
        self.nodes.get_mut(index)
    }

    pub fn has_edge_between(&self, a: &str, b: &str) -> bool {
        self.edges.iter().any(|edge| edge.connects(a, b))
    }

    pub fn recompute_degree(&mut self) {
        for node in &mut self.nodes {
            node.degree = 0;
        }
        for edge in &self.edges {
            if let Some(&source) = self.index_by_id.get(&edge.source) {
                self.nodes[source].degree += 1;
            }
            if let Some(&target) = self.index_by_id.get(&edge.target) {
                self.nodes[target].degree += 1;
            }
        }
    }

    /// Edges as `(source_index, target_index)` into [`GraphModel::nodes`].
    pub fn edge_indices(&self) -> Vec<(usize, usize)> {
        self.edges
            .iter()
            .filter_map(|edge| {
                Some((
                    *self.index_by_id.get(&edge.source)?,
                    *self.index_by_id.get(&edge.target)?,
                ))
            })
            .collect()
    }

    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.contains_node(node.id.as_str()) {
            return Err(GraphError::DuplicateNodeId(node.id.to_string()));
        }

        self.index_by_id.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    pub fn add_edge(&mut self, source: &str, target: &str) -> Result<(), GraphError> {
        let (Some(source_index), Some(target_index)) = (self.index_of(source), self.index_of(target))
        else {
            return Err(GraphError::UnresolvedEdge {
                source_id: source.to_owned(),
                target_id: target.to_owned(),
            });
        };

        if source_index == target_index {
            return Err(GraphError::SelfLoop(source.to_owned()));
        }

        if self.has_edge_between(source, target) {
            return Err(GraphError::DuplicateEdge {
                source_id: source.to_owned(),
                target_id: target.to_owned(),
            });
        }

        self.edges.push(Edge {
            source: self.nodes[source_index].id.clone(),
            target: self.nodes[target_index].id.clone(),
        });
        self.nodes[source_index].degree += 1;
        self.nodes[target_index].degree += 1;
        Ok(())
    }

    pub fn update_attribute(&mut self, id: &str, key: &str, value: Value) -> Result<(), GraphError> {
        let Some(node) = self.node_mut(id) else {
            return Err(GraphError::UnknownNode(id.to_owned()));
        };

        match key {
            "id" => Err(GraphError::ImmutableAttribute(key.to_owned())),
            "rank" => {
                let rank = value_number(&value).ok_or_else(|| GraphError::InvalidRank {
                    id: id.to_owned(),
                    value: value.to_string(),
                })?;
                node.rank = Some(rank);
                Ok(())
            }
            _ => match node.attributes.get_mut(key) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(GraphError::UnknownAttribute {
                    id: id.to_owned(),
                    key: key.to_owned(),
                }),
            },
        }
    }

    /// Removes a node and every edge touching it. Incident edges are taken out
    /// while the node is still indexed; the container is reindexed afterwards.
    pub fn remove_node(&mut self, id: &str) -> Result<RemovedNode, GraphError> {
        let Some(index) = self.index_of(id) else {
            return Err(GraphError::UnknownNode(id.to_owned()));
        };

        let node_id = self.nodes[index].id.clone();
        let (removed_edges, kept_edges): (Vec<Edge>, Vec<Edge>) = std::mem::take(&mut self.edges)
            .into_iter()
            .partition(|edge| edge.touches(node_id.as_str()));
        self.edges = kept_edges;

        let node = self.nodes.remove(index);
        self.reindex();
        self.recompute_degree();

        Ok(RemovedNode {
            node,
            edges: removed_edges,
        })
    }

    pub fn remove_edge(&mut self, source: &str, target: &str) -> Result<Edge, GraphError> {
        let Some(position) = self
            .edges
            .iter()
            .position(|edge| edge.source.as_str() == source && edge.target.as_str() == target)
        else {
            return Err(GraphError::UnknownEdge {
                source_id: source.to_owned(),
                target_id: target.to_owned(),
            });
        };

        let edge = self.edges.remove(position);
        self.recompute_degree();
        Ok(edge)
    }

    fn reindex(&mut self) {
        self.index_by_id.clear();
        for (index, node) in self.nodes.iter().enumerate() {
            self.index_by_id.insert(node.id.clone(), index);
        }
    }
}
