//! Redundant statement detection

use parapet_core::types::{Finding, Policy, Severity};

use crate::graph::{self, EdgeType, Graph};

pub fn detect_redundant(policy: &Policy) -> Vec<Finding> {
    from_graph(&graph::build(policy))
}

pub(super) fn from_graph(graph: &Graph) -> Vec<Finding> {
    graph
        .edges_of_type(EdgeType::Redundant)
        .into_iter()
        .map(|e| Finding {
            severity: Severity::Medium,
            title: "Redundant statements".to_string(),
            explanation: "Two statements are identical and one can be removed.".to_string(),
            evidence: format!("Statements {} and {} are identical", e.from, e.to),
            statement_indices: vec![e.from, e.to],
        })
        .collect()
}
