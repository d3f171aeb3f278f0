//! Analysis report types
//!
//! Findings, scores, patches, and the HTTP request/response aggregates.

use serde::Serialize;

use super::policy::{Effect, Policy};

/// Finding severity, ordered so that `High` sorts above `Medium` above `Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A single diagnostic about a policy
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub severity: Severity,
    pub title: String,
    pub explanation: String,
    pub evidence: String,
    pub statement_indices: Vec<usize>,
}

/// One factor of the risk score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub label: String,
    pub value: String,
    pub score: u32,
}

/// Letter rank derived from the total score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Rank {
    A,
    B,
    C,
    D,
    F,
}

/// Weighted risk score with its per-factor breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub score: u32,
    pub rank: Rank,
    pub breakdown: Vec<ScoreBreakdown>,
}

/// The rewrite a patch performs. Indices refer to the normalized policy the
/// patch was derived from; `apply` fails with `PatchInapplicable` when an
/// index is out of range at apply time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOp {
    RemoveStatement { remove: usize },
    MergeActions { into: usize, from: usize },
    MergeResources { into: usize, from: usize },
}

/// A named, selectable rewrite of the policy
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Patch {
    pub id: String,
    pub title: String,
    pub impact: String,
    pub diff_preview: String,
    #[serde(skip)]
    pub op: PatchOp,
}

/// A statement node in the serialized relationship graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphNode {
    pub index: usize,
    pub label: String,
    pub effect: Effect,
}

/// A relationship edge in the serialized graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphEdge {
    pub from: usize,
    pub to: usize,
    #[serde(rename = "type")]
    pub edge_type: String,
    pub label: String,
}

/// Wire form of the relationship graph
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// Response body of `POST /analyze`
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    pub original: Policy,
    pub normalized: Policy,
    pub score: ScoreResult,
    pub findings: Vec<Finding>,
    pub suggestions: Vec<Patch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph: Option<GraphData>,
}

/// Decoded body of `POST /apply`
#[derive(Debug, Clone)]
pub struct ApplyRequest {
    pub policy: Policy,
    pub patch_ids: Vec<String>,
}

/// Response body of `POST /apply`
#[derive(Debug, Clone, Serialize)]
pub struct ApplyResponse {
    pub simplified: Policy,
    pub score: ScoreResult,
    pub findings: Vec<Finding>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Severity::High).unwrap(), r#""high""#);
    }

    #[test]
    fn test_patch_serializes_without_op() {
        let patch = Patch {
            id: "dedup-0".to_string(),
            title: "Remove redundant statement 1".to_string(),
            impact: "Removes 1 duplicate statement".to_string(),
            diff_preview: String::new(),
            op: PatchOp::RemoveStatement { remove: 1 },
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json["id"], "dedup-0");
        assert!(json.get("op").is_none());
        assert!(json.get("diffPreview").is_some());
    }

    #[test]
    fn test_finding_uses_camel_case_indices() {
        let finding = Finding {
            severity: Severity::Medium,
            title: "Redundant statements".to_string(),
            explanation: String::new(),
            evidence: String::new(),
            statement_indices: vec![0, 1],
        };
        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["statementIndices"], serde_json::json!([0, 1]));
    }
}
