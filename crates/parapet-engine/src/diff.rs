//! Unified diff between two policy renderings
//!
//! Both policies are pretty-printed (2-space indent, model key order) and
//! the line sequences aligned by longest common subsequence. Backtracking
//! prefers an added line over a removed one when the LCS table ties that
//! way, which yields the conventional remove-then-add hunk shape.

use parapet_core::error::{Error, Result};
use parapet_core::types::Policy;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DiffOp {
    Equal,
    Add,
    Remove,
}

struct DiffLine<'a> {
    op: DiffOp,
    text: &'a str,
}

/// Render a unified diff of two policies under the given labels.
pub fn unified(label1: &str, p1: &Policy, label2: &str, p2: &Policy) -> Result<String> {
    let rendered1 = serde_json::to_string_pretty(p1)
        .map_err(|e| Error::Internal(format!("marshal {}: {}", label1, e)))?;
    let rendered2 = serde_json::to_string_pretty(p2)
        .map_err(|e| Error::Internal(format!("marshal {}: {}", label2, e)))?;

    let lines1: Vec<&str> = rendered1.lines().collect();
    let lines2: Vec<&str> = rendered2.lines().collect();

    let mut output = String::new();
    output.push_str(&format!("--- {}\n", label1));
    output.push_str(&format!("+++ {}\n", label2));

    for line in diff_lines(&lines1, &lines2) {
        let prefix = match line.op {
            DiffOp::Equal => ' ',
            DiffOp::Remove => '-',
            DiffOp::Add => '+',
        };
        output.push(prefix);
        output.push_str(line.text);
        output.push('\n');
    }

    Ok(output)
}

fn diff_lines<'a>(a: &[&'a str], b: &[&'a str]) -> Vec<DiffLine<'a>> {
    let (n, m) = (a.len(), b.len());

    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in 1..=n {
        for j in 1..=m {
            lcs[i][j] = if a[i - 1] == b[j - 1] {
                lcs[i - 1][j - 1] + 1
            } else {
                lcs[i - 1][j].max(lcs[i][j - 1])
            };
        }
    }

    let mut result = Vec::new();
    let (mut i, mut j) = (n, m);
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && a[i - 1] == b[j - 1] {
            result.push(DiffLine {
                op: DiffOp::Equal,
                text: a[i - 1],
            });
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || lcs[i][j - 1] > lcs[i - 1][j]) {
            result.push(DiffLine {
                op: DiffOp::Add,
                text: b[j - 1],
            });
            j -= 1;
        } else {
            result.push(DiffLine {
                op: DiffOp::Remove,
                text: a[i - 1],
            });
            i -= 1;
        }
    }

    result.reverse();
    result
}
