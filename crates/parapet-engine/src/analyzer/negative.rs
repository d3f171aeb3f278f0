//! Negative element (NotAction/NotResource) detection

use parapet_core::types::{Finding, Policy, Severity};

pub fn detect_negative_elements(policy: &Policy) -> Vec<Finding> {
    let mut findings = Vec::new();

    for (i, stmt) in policy.statement.iter().enumerate() {
        if !stmt.not_action.is_empty() {
            findings.push(Finding {
                severity: Severity::Medium,
                title: "Usage of NotAction".to_string(),
                explanation: "NotAction inverts the action match. This is error-prone and can \
                              unintentionally grant broad permissions."
                    .to_string(),
                evidence: format!("Statement {} uses NotAction", i),
                statement_indices: vec![i],
            });
        }
        if !stmt.not_resource.is_empty() {
            findings.push(Finding {
                severity: Severity::Medium,
                title: "Usage of NotResource".to_string(),
                explanation: "NotResource inverts the resource match. This is error-prone and \
                              can unintentionally expose resources."
                    .to_string(),
                evidence: format!("Statement {} uses NotResource", i),
                statement_indices: vec![i],
            });
        }
    }

    findings
}
