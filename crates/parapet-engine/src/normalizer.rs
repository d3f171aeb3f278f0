//! Policy normalization
//!
//! Produces the deterministic canonical form every downstream component
//! works on: string lists sorted and deduplicated, principal member lists
//! likewise, and statements stable-sorted by (Effect, first action). The
//! input policy is never mutated; statement indices are re-assigned by the
//! final ordering and identify statements everywhere downstream.

use parapet_core::types::{Condition, Policy, Principal, Statement, StringOrList};

/// Normalize a policy into a fresh canonical copy.
pub fn normalize(policy: &Policy) -> Policy {
    let mut statements: Vec<Statement> = policy.statement.iter().map(normalize_statement).collect();
    sort_statements(&mut statements);

    Policy {
        version: policy.version.clone(),
        id: policy.id.clone(),
        statement: statements,
    }
}

fn normalize_statement(stmt: &Statement) -> Statement {
    Statement {
        sid: stmt.sid.clone(),
        effect: stmt.effect,
        principal: stmt.principal.as_ref().map(normalize_principal),
        not_principal: stmt.not_principal.as_ref().map(normalize_principal),
        action: dedup_sorted(&stmt.action),
        not_action: dedup_sorted(&stmt.not_action),
        resource: dedup_sorted(&stmt.resource),
        not_resource: dedup_sorted(&stmt.not_resource),
        condition: stmt.condition.as_ref().map(normalize_condition),
    }
}

fn normalize_principal(principal: &Principal) -> Principal {
    match principal {
        Principal::Wildcard => Principal::Wildcard,
        Principal::Members(members) => Principal::Members(
            members
                .iter()
                .map(|(key, values)| (key.clone(), dedup_sorted(values)))
                .collect(),
        ),
    }
}

fn normalize_condition(condition: &Condition) -> Condition {
    condition
        .iter()
        .map(|(operator, kvs)| {
            let kvs = kvs
                .iter()
                .map(|(key, values)| (key.clone(), dedup_sorted(values)))
                .collect();
            (operator.clone(), kvs)
        })
        .collect()
}

fn dedup_sorted(list: &StringOrList) -> StringOrList {
    let mut items = list.as_slice().to_vec();
    items.sort();
    items.dedup();
    StringOrList::new(items)
}

fn sort_statements(statements: &mut [Statement]) {
    statements.sort_by(|a, b| {
        a.effect
            .cmp(&b.effect)
            .then_with(|| first_action(a).cmp(first_action(b)))
    });
}

fn first_action(stmt: &Statement) -> &str {
    stmt.action
        .first()
        .or_else(|| stmt.not_action.first())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use parapet_core::types::{Effect, Statement};

    fn policy_with(statements: Vec<Statement>) -> Policy {
        Policy {
            version: "2012-10-17".to_string(),
            id: None,
            statement: statements,
        }
    }

    #[test]
    fn test_sorts_and_dedups_lists() {
        let p = policy_with(vec![Statement::allow()
            .with_actions(["s3:PutObject", "s3:GetObject", "s3:GetObject"])
            .with_resources(["*"])]);

        let n = normalize(&p);
        assert_eq!(
            n.statement[0].action.as_slice(),
            ["s3:GetObject", "s3:PutObject"]
        );
    }

    #[test]
    fn test_orders_statements_by_effect_then_action() {
        let p = policy_with(vec![
            Statement::deny().with_actions(["s3:DeleteObject"]).with_resources(["*"]),
            Statement::allow().with_actions(["s3:PutObject"]).with_resources(["*"]),
            Statement::allow().with_actions(["s3:GetObject"]).with_resources(["*"]),
        ]);

        let n = normalize(&p);
        assert_eq!(n.statement[0].effect, Effect::Allow);
        assert_eq!(n.statement[0].action.as_slice(), ["s3:GetObject"]);
        assert_eq!(n.statement[1].action.as_slice(), ["s3:PutObject"]);
        assert_eq!(n.statement[2].effect, Effect::Deny);
    }

    #[test]
    fn test_falls_back_to_not_action_for_ordering() {
        let p = policy_with(vec![
            Statement::allow().with_not_actions(["s3:PutObject"]).with_resources(["*"]),
            Statement::allow().with_actions(["s3:GetObject"]).with_resources(["*"]),
        ]);

        let n = normalize(&p);
        assert_eq!(n.statement[0].action.as_slice(), ["s3:GetObject"]);
        assert_eq!(n.statement[1].not_action.as_slice(), ["s3:PutObject"]);
    }

    #[test]
    fn test_normalizes_principal_and_condition_values() {
        let mut members = std::collections::BTreeMap::new();
        members.insert(
            "AWS".to_string(),
            ["arn:b", "arn:a", "arn:a"].into_iter().collect(),
        );

        let mut condition = Condition::new();
        let mut kvs = std::collections::BTreeMap::new();
        kvs.insert("aws:SourceIp".to_string(), ["10.0.0.2", "10.0.0.1"].into_iter().collect());
        condition.insert("IpAddress".to_string(), kvs);

        let p = policy_with(vec![Statement::allow()
            .with_actions(["s3:GetObject"])
            .with_resources(["*"])
            .with_principal(Principal::Members(members))
            .with_condition(condition)]);

        let n = normalize(&p);
        match n.statement[0].principal.as_ref().unwrap() {
            Principal::Members(m) => assert_eq!(m["AWS"].as_slice(), ["arn:a", "arn:b"]),
            other => panic!("expected members, got {other:?}"),
        }
        let c = n.statement[0].condition.as_ref().unwrap();
        assert_eq!(
            c["IpAddress"]["aws:SourceIp"].as_slice(),
            ["10.0.0.1", "10.0.0.2"]
        );
    }

    #[test]
    fn test_does_not_mutate_input() {
        let p = policy_with(vec![
            Statement::deny().with_actions(["z", "a"]).with_resources(["*"]),
            Statement::allow().with_actions(["b"]).with_resources(["*"]),
        ]);
        let before = p.clone();

        let _ = normalize(&p);
        assert_eq!(p, before);
    }

    #[test]
    fn test_idempotent() {
        let p = policy_with(vec![
            Statement::deny().with_actions(["s3:DeleteObject", "s3:AbortMultipartUpload"]).with_resources(["*"]),
            Statement::allow().with_actions(["s3:PutObject", "s3:GetObject"]).with_resources(["b", "a"]),
        ]);

        let once = normalize(&p);
        let twice = normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_stable_for_equal_keys() {
        let first = Statement::allow()
            .with_sid("first")
            .with_actions(["s3:GetObject"])
            .with_resources(["a"]);
        let second = Statement::allow()
            .with_sid("second")
            .with_actions(["s3:GetObject"])
            .with_resources(["b"]);
        let p = policy_with(vec![first, second]);

        let n = normalize(&p);
        assert_eq!(n.statement[0].sid.as_deref(), Some("first"));
        assert_eq!(n.statement[1].sid.as_deref(), Some("second"));
    }
}
