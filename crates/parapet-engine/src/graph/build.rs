//! Graph construction
//!
//! Single pass over a normalized policy: one node per statement with a
//! canonical-JSON fingerprint, pairwise redundancy/merge edges, then the
//! Deny/Allow overlap pass. Fingerprints are a shortcut for structural
//! equality; identical fingerprints mean identical canonical JSON.

use sha2::{Digest, Sha256};
use std::collections::HashSet;

use parapet_core::types::{Effect, Policy, Statement};

use super::{Edge, EdgeMeta, EdgeType, Graph, Node};
use crate::matcher::{has_wildcard, overlaps};

pub fn build(policy: &Policy) -> Graph {
    let mut g = Graph::new();

    for (i, stmt) in policy.statement.iter().enumerate() {
        g.add_node(Node {
            index: i,
            fingerprint: fingerprint(stmt),
        });
    }

    for i in 0..policy.statement.len() {
        for j in i + 1..policy.statement.len() {
            add_relationship_edges(&mut g, policy, i, j);
        }
    }

    add_deny_allow_edges(&mut g, policy);

    g
}

fn fingerprint(stmt: &Statement) -> String {
    let data = serde_json::to_vec(stmt).unwrap_or_default();
    let hash = Sha256::digest(&data);
    hex::encode(&hash[..8])
}

fn add_relationship_edges(g: &mut Graph, policy: &Policy, i: usize, j: usize) {
    let a = &policy.statement[i];
    let b = &policy.statement[j];

    if g.nodes()[i].fingerprint == g.nodes()[j].fingerprint {
        g.add_edge(Edge {
            from: i,
            to: j,
            edge_type: EdgeType::Redundant,
            meta: EdgeMeta::default(),
        });
        return;
    }

    if a.effect != b.effect {
        return;
    }
    if a.condition != b.condition {
        return;
    }
    if a.principal != b.principal {
        return;
    }

    if a.resource == b.resource && a.action != b.action {
        g.add_edge(Edge {
            from: i,
            to: j,
            edge_type: EdgeType::MergeableAction,
            meta: EdgeMeta::default(),
        });
    }

    if a.action == b.action && a.resource != b.resource {
        g.add_edge(Edge {
            from: i,
            to: j,
            edge_type: EdgeType::MergeableResource,
            meta: EdgeMeta::default(),
        });
    }
}

struct ActionSource<'a> {
    action: &'a str,
    index: usize,
}

fn add_deny_allow_edges(g: &mut Graph, policy: &Policy) {
    let mut allows: Vec<ActionSource> = Vec::new();
    let mut denies: Vec<ActionSource> = Vec::new();

    for (i, stmt) in policy.statement.iter().enumerate() {
        for action in &stmt.action {
            let source = ActionSource {
                action: action.as_str(),
                index: i,
            };
            match stmt.effect {
                Effect::Allow => allows.push(source),
                Effect::Deny => denies.push(source),
            }
        }
    }

    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    for deny in &denies {
        for allow in &allows {
            if !overlaps(deny.action, allow.action) {
                continue;
            }
            if !seen.insert((allow.index, deny.index)) {
                continue;
            }

            let overlapping = collect_overlapping_actions(
                &policy.statement[allow.index],
                &policy.statement[deny.index],
            );
            g.add_edge(Edge {
                from: allow.index,
                to: deny.index,
                edge_type: EdgeType::DenyAllowOverlap,
                meta: EdgeMeta {
                    overlapping_actions: overlapping,
                },
            });
        }
    }
}

/// The deduplicated actions an Allow/Deny statement pair disputes. When
/// exactly one side of an overlapping pattern pair is a wildcard glob, the
/// literal side names the overlap; otherwise the allow side does.
fn collect_overlapping_actions(allow: &Statement, deny: &Statement) -> Vec<String> {
    let mut result = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for a in &allow.action {
        for d in &deny.action {
            if !overlaps(a, d) {
                continue;
            }
            let reported = if has_wildcard(a) && !has_wildcard(d) {
                d.as_str()
            } else {
                a.as_str()
            };
            if seen.insert(reported) {
                result.push(reported.to_string());
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use parapet_core::types::Statement;

    fn policy_with(statements: Vec<Statement>) -> Policy {
        Policy {
            version: "2012-10-17".to_string(),
            id: None,
            statement: statements,
        }
    }

    fn stmt(effect: Effect, actions: &[&str], resources: &[&str]) -> Statement {
        let base = match effect {
            Effect::Allow => Statement::allow(),
            Effect::Deny => Statement::deny(),
        };
        base.with_actions(actions.iter().copied())
            .with_resources(resources.iter().copied())
    }

    #[test]
    fn test_build_redundant_statements() {
        let p = policy_with(vec![
            stmt(Effect::Allow, &["s3:GetObject"], &["*"]),
            stmt(Effect::Allow, &["s3:GetObject"], &["*"]),
        ]);

        let g = build(&p);
        assert_eq!(g.node_count(), 2);

        let edges = g.edges_of_type(EdgeType::Redundant);
        assert_eq!(edges.len(), 1);
        assert_eq!((edges[0].from, edges[0].to), (0, 1));
    }

    #[test]
    fn test_redundant_skips_merge_checks() {
        let p = policy_with(vec![
            stmt(Effect::Allow, &["s3:GetObject"], &["*"]),
            stmt(Effect::Allow, &["s3:GetObject"], &["*"]),
        ]);

        let g = build(&p);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn test_build_mergeable_actions() {
        let p = policy_with(vec![
            stmt(Effect::Allow, &["s3:GetObject"], &["*"]),
            stmt(Effect::Allow, &["s3:PutObject"], &["*"]),
        ]);

        let g = build(&p);
        assert_eq!(g.edges_of_type(EdgeType::MergeableAction).len(), 1);
        assert_eq!(g.edges_of_type(EdgeType::MergeableResource).len(), 0);
    }

    #[test]
    fn test_build_mergeable_resources() {
        let p = policy_with(vec![
            stmt(Effect::Allow, &["s3:GetObject"], &["arn:aws:s3:::bucket-a/*"]),
            stmt(Effect::Allow, &["s3:GetObject"], &["arn:aws:s3:::bucket-b/*"]),
        ]);

        let g = build(&p);
        assert_eq!(g.edges_of_type(EdgeType::MergeableResource).len(), 1);
    }

    #[test]
    fn test_no_merge_across_effects() {
        let p = policy_with(vec![
            stmt(Effect::Allow, &["s3:GetObject"], &["*"]),
            stmt(Effect::Deny, &["s3:PutObject"], &["*"]),
        ]);

        let g = build(&p);
        assert!(g.edges_of_type(EdgeType::MergeableAction).is_empty());
        assert!(g.edges_of_type(EdgeType::MergeableResource).is_empty());
    }

    #[test]
    fn test_no_merge_when_conditions_differ() {
        let mut condition = parapet_core::types::Condition::new();
        let mut kvs = std::collections::BTreeMap::new();
        kvs.insert("aws:SourceIp".to_string(), ["10.0.0.1"].into_iter().collect());
        condition.insert("IpAddress".to_string(), kvs);

        let p = policy_with(vec![
            stmt(Effect::Allow, &["s3:GetObject"], &["*"]).with_condition(condition),
            stmt(Effect::Allow, &["s3:PutObject"], &["*"]),
        ]);

        let g = build(&p);
        assert!(g.edges_of_type(EdgeType::MergeableAction).is_empty());
    }

    #[test]
    fn test_deny_allow_overlap_literal() {
        let p = policy_with(vec![
            stmt(Effect::Allow, &["s3:GetObject"], &["*"]),
            stmt(Effect::Deny, &["s3:GetObject"], &["*"]),
        ]);

        let g = build(&p);
        let edges = g.edges_of_type(EdgeType::DenyAllowOverlap);
        assert_eq!(edges.len(), 1);
        assert_eq!((edges[0].from, edges[0].to), (0, 1));
        assert_eq!(edges[0].meta.overlapping_actions, ["s3:GetObject"]);
    }

    #[test]
    fn test_deny_allow_overlap_wildcard_reports_literal() {
        let p = policy_with(vec![
            stmt(Effect::Allow, &["s3:*"], &["*"]),
            stmt(Effect::Deny, &["s3:DeleteObject"], &["*"]),
        ]);

        let g = build(&p);
        let edges = g.edges_of_type(EdgeType::DenyAllowOverlap);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].meta.overlapping_actions, ["s3:DeleteObject"]);
    }

    #[test]
    fn test_deny_allow_one_edge_per_statement_pair() {
        let p = policy_with(vec![
            stmt(Effect::Allow, &["s3:GetObject", "s3:PutObject"], &["*"]),
            stmt(Effect::Deny, &["s3:GetObject", "s3:PutObject"], &["*"]),
        ]);

        let g = build(&p);
        let edges = g.edges_of_type(EdgeType::DenyAllowOverlap);
        assert_eq!(edges.len(), 1);
        assert_eq!(
            edges[0].meta.overlapping_actions,
            ["s3:GetObject", "s3:PutObject"]
        );
    }

    #[test]
    fn test_no_overlap_edge_for_disjoint_actions() {
        let p = policy_with(vec![
            stmt(Effect::Allow, &["s3:GetObject"], &["*"]),
            stmt(Effect::Deny, &["ec2:TerminateInstances"], &["*"]),
        ]);

        let g = build(&p);
        assert!(g.edges_of_type(EdgeType::DenyAllowOverlap).is_empty());
    }

    #[test]
    fn test_fingerprints_differ_for_different_statements() {
        let p = policy_with(vec![
            stmt(Effect::Allow, &["s3:GetObject"], &["*"]),
            stmt(Effect::Allow, &["s3:PutObject"], &["*"]),
        ]);

        let g = build(&p);
        assert_ne!(g.nodes()[0].fingerprint, g.nodes()[1].fingerprint);
        assert_eq!(g.nodes()[0].fingerprint.len(), 16);
    }

    #[test]
    fn test_fingerprint_equality_matches_redundant_edges() {
        let p = policy_with(vec![
            stmt(Effect::Allow, &["s3:GetObject"], &["*"]),
            stmt(Effect::Allow, &["s3:GetObject"], &["*"]),
            stmt(Effect::Allow, &["s3:PutObject"], &["*"]),
        ]);

        let g = build(&p);
        for i in 0..g.node_count() {
            for j in i + 1..g.node_count() {
                let same = g.nodes()[i].fingerprint == g.nodes()[j].fingerprint;
                assert_eq!(same, g.has_edge(i, j, EdgeType::Redundant));
            }
        }
    }
}
