//! Merge candidate detection

use parapet_core::types::{Finding, Policy, Severity};

use crate::graph::{self, EdgeType, Graph};

pub fn detect_merge_candidates(policy: &Policy) -> Vec<Finding> {
    from_graph(&graph::build(policy))
}

pub(super) fn from_graph(graph: &Graph) -> Vec<Finding> {
    let mut findings = Vec::new();

    for e in graph.edges_of_type(EdgeType::MergeableAction) {
        findings.push(Finding {
            severity: Severity::Low,
            title: "Merge candidates (same resources)".to_string(),
            explanation: "These statements share the same Effect, Resources, Conditions and \
                          Principal. Their Actions can be merged into one statement."
                .to_string(),
            evidence: format!("Statements {} and {} can merge Actions", e.from, e.to),
            statement_indices: vec![e.from, e.to],
        });
    }

    for e in graph.edges_of_type(EdgeType::MergeableResource) {
        findings.push(Finding {
            severity: Severity::Low,
            title: "Merge candidates (same actions)".to_string(),
            explanation: "These statements share the same Effect, Actions, Conditions and \
                          Principal. Their Resources can be merged into one statement."
                .to_string(),
            evidence: format!("Statements {} and {} can merge Resources", e.from, e.to),
            statement_indices: vec![e.from, e.to],
        });
    }

    findings
}
