//! Risk scoring
//!
//! Five factors, each worth at most 20 points, summed and clamped to 100.
//! The Deny/Allow factor counts literal action equality only; the glob
//! overlap oracle is deliberately not consulted here, so the score stays
//! stable under pattern rewrites that the detectors would still flag.

use std::collections::HashSet;

use parapet_core::types::{Effect, Policy, Rank, ScoreBreakdown, ScoreResult};

pub fn score(policy: &Policy) -> ScoreResult {
    let breakdown = vec![
        statement_count(policy),
        wildcard_action_pct(policy),
        wildcard_resource_pct(policy),
        negative_statements(policy),
        deny_allow_overlap(policy),
    ];

    let total: u32 = breakdown.iter().map(|f| f.score).sum();
    let total = total.min(100);

    ScoreResult {
        score: total,
        rank: rank_from_score(total),
        breakdown,
    }
}

fn rank_from_score(score: u32) -> Rank {
    match score {
        0..=20 => Rank::A,
        21..=40 => Rank::B,
        41..=60 => Rank::C,
        61..=80 => Rank::D,
        _ => Rank::F,
    }
}

fn statement_count(policy: &Policy) -> ScoreBreakdown {
    let n = policy.statement.len();
    let points = match n {
        0..=5 => 0,
        6..=10 => 5,
        11..=20 => 10,
        21..=50 => 15,
        _ => 20,
    };

    ScoreBreakdown {
        label: "Statement count".to_string(),
        value: format!("{} statements", n),
        score: points,
    }
}

fn wildcard_action_pct(policy: &Policy) -> ScoreBreakdown {
    wildcard_pct(policy, "Wildcard actions", |p| {
        p.statement.iter().filter(|s| s.action.contains("*")).count()
    })
}

fn wildcard_resource_pct(policy: &Policy) -> ScoreBreakdown {
    wildcard_pct(policy, "Wildcard resources", |p| {
        p.statement.iter().filter(|s| s.resource.contains("*")).count()
    })
}

fn wildcard_pct(policy: &Policy, label: &str, count: impl Fn(&Policy) -> usize) -> ScoreBreakdown {
    let total = policy.statement.len();
    if total == 0 {
        return ScoreBreakdown {
            label: label.to_string(),
            value: "0%".to_string(),
            score: 0,
        };
    }

    let count = count(policy);
    let pct = count * 100 / total;
    ScoreBreakdown {
        label: label.to_string(),
        value: format!("{}% ({}/{} statements)", pct, count, total),
        score: pct_to_score(pct),
    }
}

fn pct_to_score(pct: usize) -> u32 {
    match pct {
        0 => 0,
        1..=9 => 5,
        10..=24 => 10,
        25..=49 => 15,
        _ => 20,
    }
}

fn negative_statements(policy: &Policy) -> ScoreBreakdown {
    let mut count = 0u32;
    for stmt in &policy.statement {
        if !stmt.not_action.is_empty() {
            count += 1;
        }
        if !stmt.not_resource.is_empty() {
            count += 1;
        }
    }

    ScoreBreakdown {
        label: "Negative statements (NotAction/NotResource)".to_string(),
        value: format!("{} occurrences", count),
        score: (count * 5).min(20),
    }
}

fn deny_allow_overlap(policy: &Policy) -> ScoreBreakdown {
    let allow_actions: HashSet<&str> = policy
        .statement
        .iter()
        .filter(|s| s.effect == Effect::Allow)
        .flat_map(|s| s.action.iter().map(String::as_str))
        .collect();

    let mut overlap_count = 0u32;
    for stmt in &policy.statement {
        if stmt.effect != Effect::Deny {
            continue;
        }
        for action in &stmt.action {
            if allow_actions.contains(action.as_str()) {
                overlap_count += 1;
            }
        }
    }

    ScoreBreakdown {
        label: "Deny/Allow overlap".to_string(),
        value: format!("{} overlapping actions", overlap_count),
        score: (overlap_count * 5).min(20),
    }
}
