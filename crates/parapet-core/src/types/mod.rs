//! Core types for Parapet

pub mod policy;
pub mod report;

pub use policy::{Condition, Effect, Policy, Principal, Statement, StringOrList};
pub use report::{
    AnalyzeResponse, ApplyRequest, ApplyResponse, Finding, GraphData, GraphEdge, GraphNode, Patch,
    PatchOp, Rank, ScoreBreakdown, ScoreResult, Severity,
};
