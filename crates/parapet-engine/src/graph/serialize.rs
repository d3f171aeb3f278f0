//! Wire serialization of the relationship graph

use parapet_core::types::{GraphData, GraphEdge, GraphNode, Policy, Statement, StringOrList};

use super::{Edge, EdgeType, Graph};

pub fn serialize(graph: &Graph, policy: &Policy) -> GraphData {
    let nodes = policy
        .statement
        .iter()
        .enumerate()
        .map(|(i, stmt)| GraphNode {
            index: i,
            label: statement_label(i, stmt),
            effect: stmt.effect,
        })
        .collect();

    let edges = graph
        .edges()
        .iter()
        .map(|e| GraphEdge {
            from: e.from,
            to: e.to,
            edge_type: e.edge_type.to_string(),
            label: edge_label(e),
        })
        .collect();

    GraphData { nodes, edges }
}

fn statement_label(index: usize, stmt: &Statement) -> String {
    let action = summarize(&stmt.action, &stmt.not_action);
    let resource = summarize(&stmt.resource, &stmt.not_resource);
    format!("S{}: {} {} on {}", index, stmt.effect, action, resource)
}

/// First item of `list` (falling back to `fallback`), suffixed with the
/// count of remaining items; `*` when both are empty.
fn summarize(list: &StringOrList, fallback: &StringOrList) -> String {
    let items = if list.is_empty() { fallback } else { list };
    match items.first() {
        None => "*".to_string(),
        Some(first) if items.len() == 1 => first.to_string(),
        Some(first) => format!("{} +{}", first, items.len() - 1),
    }
}

fn edge_label(edge: &Edge) -> String {
    match edge.edge_type {
        EdgeType::Redundant => "Duplicate".to_string(),
        EdgeType::MergeableAction => "Merge actions".to_string(),
        EdgeType::MergeableResource => "Merge resources".to_string(),
        EdgeType::DenyAllowOverlap => {
            if edge.meta.overlapping_actions.is_empty() {
                "Deny/Allow overlap".to_string()
            } else {
                format!("Overlap: {}", edge.meta.overlapping_actions.join(", "))
            }
        }
    }
}
