//! Defect detectors
//!
//! Five independent detectors over a normalized policy. Each is a pure
//! `&Policy -> Vec<Finding>`; the graph-derived ones accept a prebuilt
//! graph through `analyze_with` so the aggregate builds it once.

mod denyoverlap;
mod mergeable;
mod negative;
mod redundant;
mod wildcards;

pub use denyoverlap::detect_deny_allow_overlap;
pub use mergeable::detect_merge_candidates;
pub use negative::detect_negative_elements;
pub use redundant::detect_redundant;
pub use wildcards::detect_wildcard_overuse;

use parapet_core::types::{Finding, Policy};

use crate::graph::{self, Graph};

/// Run every detector and return the findings sorted by severity
/// descending, stable within a severity.
pub fn analyze(policy: &Policy) -> Vec<Finding> {
    let graph = graph::build(policy);
    analyze_with(policy, &graph)
}

/// Same as [`analyze`], consuming an already-built relationship graph.
pub fn analyze_with(policy: &Policy, graph: &Graph) -> Vec<Finding> {
    let mut findings = Vec::new();
    findings.extend(redundant::from_graph(graph));
    findings.extend(mergeable::from_graph(graph));
    findings.extend(wildcards::detect_wildcard_overuse(policy));
    findings.extend(negative::detect_negative_elements(policy));
    findings.extend(denyoverlap::from_graph(graph));

    findings.sort_by(|a, b| b.severity.cmp(&a.severity));
    findings
}
