use regex::Regex;

use crate::report::finding::Severity;
use crate::rules::PatternRule;

/// Hardcoded-secret heuristic: a secret-sounding keyword within 60
/// characters of a long quoted token literal.
pub(crate) fn hardcoded_secret_rule() -> PatternRule {
    PatternRule {
        id: "secret",
        title: "Suspicious hardcoded secret",
        description: "Credentials in code may leak.",
        recommendation: "Move to env vars/secret manager.",
        severity: Severity::High,
        pattern: Regex::new(r#"(AWS|SECRET|PASSWORD|TOKEN|API[_-]?KEY)[^\n]{0,60}['"][A-Za-z0-9_\-]{12,}['"]"#)
            .unwrap(),
        path_gate: None,
    }
}
