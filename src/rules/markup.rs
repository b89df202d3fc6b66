use regex::Regex;
use tracing::debug;

use crate::report::finding::{Finding, Severity};
use crate::rules::{build_finding, line_of, PatternRule, Rule, RuleContext};

/// Raw HTML injection in React-style UI components.
pub(crate) fn dangerous_html_rule() -> PatternRule {
    PatternRule {
        id: "dangerous-html",
        title: "dangerouslySetInnerHTML usage",
        description: "Inner HTML can cause XSS if unsanitized.",
        recommendation: "Sanitize or avoid raw HTML.",
        severity: Severity::Medium,
        pattern: Regex::new(r"dangerouslySetInnerHTML\s*=\s*\{").unwrap(),
        path_gate: Some(Regex::new(r"\.(jsx?|tsx?)$").unwrap()),
    }
}

/// yaml.load() in Python without a SafeLoader anywhere in the file.
///
/// The safe-mode qualifier is checked file-wide, not per line: a loader
/// variable defined earlier still counts. One finding at the first call.
pub struct YamlLoadRule {
    path_gate: Regex,
    call: Regex,
    safe: Regex,
}

impl YamlLoadRule {
    pub fn new() -> Self {
        YamlLoadRule {
            path_gate: Regex::new(r"\.py$").unwrap(),
            call: Regex::new(r"yaml\.load\s*\(").unwrap(),
            safe: Regex::new(r"Loader\s*=\s*SafeLoader").unwrap(),
        }
    }
}

impl Default for YamlLoadRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for YamlLoadRule {
    fn id(&self) -> &'static str {
        "py-yaml-load"
    }

    fn describe(&self) -> &'static str {
        "yaml.load without SafeLoader in Python files"
    }

    fn check(&self, ctx: &RuleContext) -> Vec<Finding> {
        if !self.path_gate.is_match(ctx.path) {
            return Vec::new();
        }
        let Some(m) = self.call.find(ctx.text) else {
            return Vec::new();
        };
        if self.safe.is_match(ctx.text) {
            return Vec::new();
        }

        let line = line_of(ctx.text, m.start());
        debug!(rule = "py-yaml-load", path = ctx.path, line, "match");
        vec![build_finding(
            "py-yaml-load",
            "yaml.load without SafeLoader",
            Severity::High,
            "Unsafe YAML load can execute arbitrary objects.",
            "Use yaml.safe_load or specify Loader=SafeLoader.",
            ctx.path,
            line,
        )]
    }
}
