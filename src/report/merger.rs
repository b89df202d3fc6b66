use std::collections::HashSet;

use crate::report::finding::Finding;

/// Deduplicate and sort findings.
///
/// Dedup is by deterministic ID; all detectors are deterministic, so
/// duplicate IDs carry identical payloads and keeping the first is safe.
/// The sort makes output order independent of chunk evaluation order.
pub fn merge_findings(mut findings: Vec<Finding>) -> Vec<Finding> {
    let mut seen = HashSet::new();
    findings.retain(|f| seen.insert(f.id.clone()));

    // Severity (critical first), then file path, then line
    findings.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.file_path.cmp(&b.file_path))
            .then_with(|| a.start_line.cmp(&b.start_line))
    });

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::finding::Severity;

    fn finding(rule: &str, path: &str, line: usize, severity: Severity) -> Finding {
        Finding {
            id: Finding::generate_id(rule, path, line),
            rule: rule.to_string(),
            severity,
            title: "t".to_string(),
            description: "d".to_string(),
            file_path: path.to_string(),
            start_line: line,
            end_line: line,
            recommendation: "r".to_string(),
        }
    }

    #[test]
    fn duplicates_collapse_to_one() {
        let merged = merge_findings(vec![
            finding("eval", "src/x.js", 12, Severity::High),
            finding("eval", "src/x.js", 12, Severity::High),
        ]);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn sorted_by_severity_then_path_then_line() {
        let merged = merge_findings(vec![
            finding("secret", "b.py", 3, Severity::Medium),
            finding("eval", "b.py", 9, Severity::High),
            finding("eval", "a.js", 1, Severity::High),
        ]);
        let order: Vec<_> = merged.iter().map(|f| f.file_path.as_str()).collect();
        assert_eq!(order, vec!["a.js", "b.py", "b.py"]);
        assert_eq!(merged[2].severity, Severity::Medium);
    }
}
