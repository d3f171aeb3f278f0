//! Statement relationship graph
//!
//! A typed, undirected multigraph over the statements of a normalized
//! policy. Nodes are statement indices; edges carry one of four
//! relationship types. Edges are stored once in an edge list and indexed
//! under both endpoints, so directional and undirected views come from the
//! same storage. Edge list order is the emission order of [`build`] and is
//! load-bearing: patch IDs are numbered from it.

mod build;
mod serialize;

pub use build::build;
pub use serialize::serialize;

use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeType {
    Redundant,
    MergeableAction,
    MergeableResource,
    DenyAllowOverlap,
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Redundant => "Redundant",
            EdgeType::MergeableAction => "MergeableAction",
            EdgeType::MergeableResource => "MergeableResource",
            EdgeType::DenyAllowOverlap => "DenyAllowOverlap",
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub index: usize,
    pub fingerprint: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeMeta {
    pub overlapping_actions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub edge_type: EdgeType,
    pub meta: EdgeMeta,
}

#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    adjacency: HashMap<usize, Vec<usize>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node: Node) {
        self.adjacency.entry(node.index).or_default();
        self.nodes.push(node);
    }

    pub fn add_edge(&mut self, edge: Edge) {
        let edge_idx = self.edges.len();
        self.adjacency.entry(edge.from).or_default().push(edge_idx);
        // Reverse lookup for the undirected view.
        self.adjacency.entry(edge.to).or_default().push(edge_idx);
        self.edges.push(edge);
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edges_of_type(&self, edge_type: EdgeType) -> Vec<&Edge> {
        self.edges.iter().filter(|e| e.edge_type == edge_type).collect()
    }

    /// Edges whose `from` endpoint is `node` (the directional view).
    pub fn edges_from(&self, node: usize) -> Vec<&Edge> {
        self.adjacency
            .get(&node)
            .into_iter()
            .flatten()
            .map(|&idx| &self.edges[idx])
            .filter(|e| e.from == node)
            .collect()
    }

    /// All edges touching `node`, each reported once.
    pub fn edges_involving(&self, node: usize) -> Vec<&Edge> {
        let mut seen = vec![false; self.edges.len()];
        let mut result = Vec::new();
        for &idx in self.adjacency.get(&node).into_iter().flatten() {
            if !seen[idx] {
                seen[idx] = true;
                result.push(&self.edges[idx]);
            }
        }
        result
    }

    /// Distinct nodes adjacent to `node`, ascending.
    pub fn neighbors(&self, node: usize) -> Vec<usize> {
        let mut result: Vec<usize> = self
            .edges_involving(node)
            .iter()
            .map(|e| if e.from == node { e.to } else { e.from })
            .collect();
        result.sort_unstable();
        result.dedup();
        result
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Direction-insensitive edge lookup.
    pub fn has_edge(&self, from: usize, to: usize, edge_type: EdgeType) -> bool {
        self.adjacency
            .get(&from)
            .into_iter()
            .flatten()
            .map(|&idx| &self.edges[idx])
            .any(|e| {
                e.edge_type == edge_type
                    && ((e.from == from && e.to == to) || (e.from == to && e.to == from))
            })
    }
}
