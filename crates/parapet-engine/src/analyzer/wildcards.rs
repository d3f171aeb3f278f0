//! Wildcard over-use detection

use parapet_core::types::{Finding, Policy, Severity};

pub fn detect_wildcard_overuse(policy: &Policy) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (i, stmt) in policy.statement.iter().enumerate() {
        let wildcard_action = stmt.action.contains("*");
        let wildcard_resource = stmt.resource.contains("*");

        if wildcard_action && wildcard_resource {
            findings.push(Finding {
                severity: Severity::High,
                title: "Full wildcard statement".to_string(),
                explanation: "Both Action and Resource are wildcards. This grants unrestricted \
                              access."
                    .to_string(),
                evidence: format!("Statement {} has Action=* and Resource=*", i),
                statement_indices: vec![i],
            });
        } else if wildcard_action {
            findings.push(Finding {
                severity: Severity::Medium,
                title: "Wildcard action".to_string(),
                explanation: "Action is a wildcard. This grants all actions on the specified \
                              resources."
                    .to_string(),
                evidence: format!("Statement {} has Action=*", i),
                statement_indices: vec![i],
            });
        } else if wildcard_resource {
            findings.push(Finding {
                severity: Severity::Medium,
                title: "Wildcard resource".to_string(),
                explanation: "Resource is a wildcard. The specified actions apply to all \
                              resources."
                    .to_string(),
                evidence: format!("Statement {} has Resource=*", i),
                statement_indices: vec![i],
            });
        }
    }

    findings
}
