//! Simplification patches
//!
//! Derives applyable rewrites from the relationship graph: one dedup patch
//! per Redundant edge, one merge patch per mergeable edge. Patch IDs are
//! numbered in edge-emission order. Indices captured in a patch refer to
//! the policy the patches were derived from; a patch whose indices have
//! fallen out of range by apply time is skipped, never failing the batch.

use std::collections::{BTreeSet, HashSet};

use tracing::warn;

use parapet_core::error::{Error, Result};
use parapet_core::types::{Patch, PatchOp, Policy, StringOrList};

use crate::diff;
use crate::graph::{self, EdgeType, Graph};

/// Derive the full patch list for a policy.
pub fn suggest(policy: &Policy) -> Vec<Patch> {
    let graph = graph::build(policy);
    suggest_with(policy, &graph)
}

/// Same as [`suggest`], consuming an already-built relationship graph.
pub fn suggest_with(policy: &Policy, graph: &Graph) -> Vec<Patch> {
    let mut patches = remove_redundant(policy, graph);
    patches.extend(merge_statements(graph));
    patches
}

/// Apply the selected subset of `patches` to a copy of `policy`, in the
/// order the patches were produced. Inapplicable patches are skipped.
pub fn apply(policy: &Policy, patches: &[Patch], selected_ids: &[String]) -> Policy {
    let selected: HashSet<&str> = selected_ids.iter().map(String::as_str).collect();

    let mut result = policy.clone();
    for patch in patches {
        if !selected.contains(patch.id.as_str()) {
            continue;
        }
        match apply_patch(patch, &result) {
            Ok(next) => result = next,
            Err(e) => warn!(patch = %patch.id, "skipping patch: {}", e),
        }
    }

    result
}

/// Apply a single patch, returning a fresh policy.
pub fn apply_patch(patch: &Patch, policy: &Policy) -> Result<Policy> {
    let len = policy.statement.len();

    match patch.op {
        PatchOp::RemoveStatement { remove } => {
            if remove >= len {
                return Err(Error::PatchInapplicable(patch.id.clone()));
            }
            let mut cp = policy.clone();
            cp.statement.remove(remove);
            Ok(cp)
        }
        PatchOp::MergeActions { into, from } => {
            if into >= len || from >= len {
                return Err(Error::PatchInapplicable(patch.id.clone()));
            }
            let mut cp = policy.clone();
            cp.statement[into].action =
                union_lists(&cp.statement[into].action, &cp.statement[from].action);
            cp.statement.remove(from);
            Ok(cp)
        }
        PatchOp::MergeResources { into, from } => {
            if into >= len || from >= len {
                return Err(Error::PatchInapplicable(patch.id.clone()));
            }
            let mut cp = policy.clone();
            cp.statement[into].resource =
                union_lists(&cp.statement[into].resource, &cp.statement[from].resource);
            cp.statement.remove(from);
            Ok(cp)
        }
    }
}

/// Replace each patch's preview with the unified diff of `normalized`
/// against the patched result.
pub fn render_previews(normalized: &Policy, patches: &mut [Patch]) {
    for patch in patches.iter_mut() {
        if let Ok(result) = apply_patch(patch, normalized) {
            if let Ok(preview) = diff::unified("normalized", normalized, "simplified", &result) {
                patch.diff_preview = preview;
            }
        }
    }
}

fn remove_redundant(policy: &Policy, graph: &Graph) -> Vec<Patch> {
    graph
        .edges_of_type(EdgeType::Redundant)
        .into_iter()
        .enumerate()
        .map(|(k, e)| {
            let remove = e.to;
            Patch {
                id: format!("dedup-{}", k),
                title: format!("Remove redundant statement {}", remove),
                impact: "Removes 1 duplicate statement".to_string(),
                diff_preview: remove_preview(policy, remove),
                op: PatchOp::RemoveStatement { remove },
            }
        })
        .collect()
}

fn merge_statements(graph: &Graph) -> Vec<Patch> {
    let mut patches = Vec::new();
    let mut counter = 0;

    for e in graph.edges_of_type(EdgeType::MergeableAction) {
        patches.push(Patch {
            id: format!("merge-{}", counter),
            title: format!("Merge actions of statements {} and {}", e.from, e.to),
            impact: "Combines 2 statements into 1 by merging Actions".to_string(),
            diff_preview: merge_preview(e.from, e.to, "actions"),
            op: PatchOp::MergeActions {
                into: e.from,
                from: e.to,
            },
        });
        counter += 1;
    }

    for e in graph.edges_of_type(EdgeType::MergeableResource) {
        patches.push(Patch {
            id: format!("merge-{}", counter),
            title: format!("Merge resources of statements {} and {}", e.from, e.to),
            impact: "Combines 2 statements into 1 by merging Resources".to_string(),
            diff_preview: merge_preview(e.from, e.to, "resources"),
            op: PatchOp::MergeResources {
                into: e.from,
                from: e.to,
            },
        });
        counter += 1;
    }

    patches
}

fn union_lists(a: &StringOrList, b: &StringOrList) -> StringOrList {
    let merged: BTreeSet<String> = a.iter().chain(b.iter()).cloned().collect();
    merged.into_iter().collect()
}

fn remove_preview(policy: &Policy, index: usize) -> String {
    let rendered = serde_json::to_string_pretty(&policy.statement[index]).unwrap_or_default();
    format!("- Statement {}:\n- {}", index, rendered)
}

fn merge_preview(into: usize, from: usize, field: &str) -> String {
    format!(
        "Merge {} from statement {} into statement {}, remove statement {}",
        field, from, into, from
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer;
    use parapet_core::types::Statement;

    fn policy_with(statements: Vec<Statement>) -> Policy {
        Policy {
            version: "2012-10-17".to_string(),
            id: None,
            statement: statements,
        }
    }

    fn duplicate_policy() -> Policy {
        policy_with(vec![
            Statement::allow().with_actions(["s3:GetObject"]).with_resources(["*"]),
            Statement::allow().with_actions(["s3:GetObject"]).with_resources(["*"]),
        ])
    }

    #[test]
    fn test_suggest_redundant() {
        let patches = suggest(&duplicate_policy());
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].id, "dedup-0");
        assert_eq!(patches[0].op, PatchOp::RemoveStatement { remove: 1 });
    }

    #[test]
    fn test_suggest_merge_actions() {
        let p = policy_with(vec![
            Statement::allow()
                .with_actions(["s3:GetObject"])
                .with_resources(["arn:aws:s3:::bucket/*"]),
            Statement::allow()
                .with_actions(["s3:PutObject"])
                .with_resources(["arn:aws:s3:::bucket/*"]),
        ]);

        let patches = suggest(&p);
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].id, "merge-0");
        assert_eq!(patches[0].op, PatchOp::MergeActions { into: 0, from: 1 });
    }

    #[test]
    fn test_suggest_merge_resources() {
        let p = policy_with(vec![
            Statement::allow()
                .with_actions(["s3:GetObject"])
                .with_resources(["arn:aws:s3:::bucket-a/*"]),
            Statement::allow()
                .with_actions(["s3:GetObject"])
                .with_resources(["arn:aws:s3:::bucket-b/*"]),
        ]);

        let patches = suggest(&p);
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].op, PatchOp::MergeResources { into: 0, from: 1 });
    }

    #[test]
    fn test_suggest_nothing() {
        let p = policy_with(vec![Statement::allow()
            .with_actions(["s3:GetObject"])
            .with_resources(["arn:aws:s3:::bucket/*"])]);

        assert!(suggest(&p).is_empty());
    }

    #[test]
    fn test_apply_remove_redundant() {
        let p = duplicate_policy();
        let patches = suggest(&p);

        let result = apply(&p, &patches, &["dedup-0".to_string()]);
        assert_eq!(result.statement.len(), 1);
    }

    #[test]
    fn test_apply_merge_actions_sorted_union() {
        let p = policy_with(vec![
            Statement::allow()
                .with_actions(["s3:PutObject"])
                .with_resources(["arn:aws:s3:::bucket/*"]),
            Statement::allow()
                .with_actions(["s3:GetObject"])
                .with_resources(["arn:aws:s3:::bucket/*"]),
        ]);

        let patches = suggest(&p);
        let result = apply(&p, &patches, &["merge-0".to_string()]);
        assert_eq!(result.statement.len(), 1);
        assert_eq!(
            result.statement[0].action.as_slice(),
            ["s3:GetObject", "s3:PutObject"]
        );
    }

    #[test]
    fn test_apply_does_not_mutate_original() {
        let p = duplicate_policy();
        let patches = suggest(&p);

        let _ = apply(&p, &patches, &["dedup-0".to_string()]);
        assert_eq!(p.statement.len(), 2);
    }

    #[test]
    fn test_apply_without_selection_is_identity() {
        let p = duplicate_policy();
        let patches = suggest(&p);

        let result = apply(&p, &patches, &[]);
        assert_eq!(result.statement.len(), 2);
    }

    #[test]
    fn test_apply_skips_unknown_ids() {
        let p = duplicate_policy();
        let patches = suggest(&p);

        let result = apply(&p, &patches, &["merge-7".to_string()]);
        assert_eq!(result.statement.len(), 2);
    }

    #[test]
    fn test_inapplicable_patch_is_skipped() {
        let p = duplicate_policy();
        let stale = Patch {
            id: "dedup-9".to_string(),
            title: String::new(),
            impact: String::new(),
            diff_preview: String::new(),
            op: PatchOp::RemoveStatement { remove: 5 },
        };

        let result = apply(&p, &[stale], &["dedup-9".to_string()]);
        assert_eq!(result.statement.len(), 2);
    }

    #[test]
    fn test_apply_patch_reports_inapplicable() {
        let p = duplicate_policy();
        let stale = Patch {
            id: "dedup-9".to_string(),
            title: String::new(),
            impact: String::new(),
            diff_preview: String::new(),
            op: PatchOp::RemoveStatement { remove: 5 },
        };

        match apply_patch(&stale, &p) {
            Err(Error::PatchInapplicable(id)) => assert_eq!(id, "dedup-9"),
            other => panic!("expected PatchInapplicable, got {other:?}"),
        }
    }

    #[test]
    fn test_applying_patches_never_grows_the_policy() {
        let p = policy_with(vec![
            Statement::allow().with_actions(["s3:GetObject"]).with_resources(["*"]),
            Statement::allow().with_actions(["s3:GetObject"]).with_resources(["*"]),
            Statement::allow()
                .with_actions(["s3:PutObject"])
                .with_resources(["arn:aws:s3:::bucket/*"]),
            Statement::allow()
                .with_actions(["s3:ListBucket"])
                .with_resources(["arn:aws:s3:::bucket/*"]),
        ]);

        let patches = suggest(&p);
        assert!(!patches.is_empty());
        let all_ids: Vec<String> = patches.iter().map(|pt| pt.id.clone()).collect();

        let simplified = apply(&p, &patches, &all_ids);
        assert!(simplified.statement.len() <= p.statement.len());
        assert!(analyzer::analyze(&simplified).len() <= analyzer::analyze(&p).len());
    }

    #[test]
    fn test_render_previews_produces_unified_diffs() {
        let p = duplicate_policy();
        let mut patches = suggest(&p);

        render_previews(&p, &mut patches);
        assert!(patches[0].diff_preview.starts_with("--- normalized\n+++ simplified\n"));
        assert!(patches[0].diff_preview.contains("-"));
    }
}
