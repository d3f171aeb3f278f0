//! Deny/Allow action overlap detection

use parapet_core::types::{Finding, Policy, Severity};

use crate::graph::{self, EdgeType, Graph};

pub fn detect_deny_allow_overlap(policy: &Policy) -> Vec<Finding> {
    from_graph(&graph::build(policy))
}

pub(super) fn from_graph(graph: &Graph) -> Vec<Finding> {
    let mut findings = Vec::new();

    for e in graph.edges_of_type(EdgeType::DenyAllowOverlap) {
        for action in &e.meta.overlapping_actions {
            findings.push(Finding {
                severity: Severity::High,
                title: "Deny/Allow overlap".to_string(),
                explanation: format!(
                    "Action {:?} is both allowed and denied. The Deny will take precedence, \
                     but this may indicate a misconfiguration.",
                    action
                ),
                evidence: format!(
                    "Action {:?} in Allow statement {} and Deny statement {}",
                    action, e.from, e.to
                ),
                statement_indices: vec![e.from, e.to],
            });
        }
    }

    findings
}
