pub mod exec;
pub mod markup;
pub mod secrets;

use rayon::prelude::*;
use regex::Regex;
use tracing::debug;

use crate::engine::Chunk;
use crate::report::finding::{Finding, Severity};

/// Everything a detector may look at for one chunk.
pub struct RuleContext<'a> {
    pub repo: &'a str,
    pub commit: &'a str,
    pub path: &'a str,
    pub text: &'a str,
}

/// A stateless detector. Rules are independent: they must not depend on
/// evaluation order or on other rules' output, which keeps the registry
/// open for extension and chunk evaluation parallelizable.
pub trait Rule: Send + Sync {
    /// Stable rule identifier, e.g. "eval"
    fn id(&self) -> &'static str;

    /// Short description of what this rule looks for
    fn describe(&self) -> &'static str;

    /// Run the rule against one chunk and return findings
    fn check(&self, ctx: &RuleContext) -> Vec<Finding>;
}

/// Registry of all available rules, in registration order.
pub fn all_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(exec::eval_rule()),
        Box::new(exec::ChildProcessRule::new()),
        Box::new(markup::dangerous_html_rule()),
        Box::new(secrets::hardcoded_secret_rule()),
        Box::new(markup::YamlLoadRule::new()),
        Box::new(exec::subprocess_shell_rule()),
        Box::new(exec::go_exec_rule()),
    ]
}

/// Run every rule on every chunk and concatenate the results.
///
/// Chunks are evaluated in parallel; rule independence guarantees the
/// outcome matches sequential evaluation. Dedup happens downstream in the
/// merger.
pub fn evaluate(repo: &str, commit: &str, chunks: &[Chunk]) -> Vec<Finding> {
    let rules = all_rules();

    chunks
        .par_iter()
        .flat_map_iter(|chunk| {
            let ctx = RuleContext {
                repo,
                commit,
                path: &chunk.path,
                text: &chunk.text,
            };
            let mut findings = Vec::new();
            for rule in &rules {
                findings.extend(rule.check(&ctx));
            }
            findings
        })
        .collect()
}

/// 1-based line number of a byte offset, counting line breaks in the prefix.
pub(crate) fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

pub(crate) fn build_finding(
    rule: &'static str,
    title: &'static str,
    severity: Severity,
    description: &'static str,
    recommendation: &'static str,
    path: &str,
    line: usize,
) -> Finding {
    Finding {
        id: Finding::generate_id(rule, path, line),
        rule: rule.to_string(),
        severity,
        title: title.to_string(),
        description: description.to_string(),
        file_path: path.to_string(),
        start_line: line,
        end_line: line,
        recommendation: recommendation.to_string(),
    }
}

/// A detector driven by one fixed pattern, optionally gated on the file
/// path. Covers every rule that needs no secondary condition.
pub(crate) struct PatternRule {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub recommendation: &'static str,
    pub severity: Severity,
    pub pattern: Regex,
    pub path_gate: Option<Regex>,
}

impl Rule for PatternRule {
    fn id(&self) -> &'static str {
        self.id
    }

    fn describe(&self) -> &'static str {
        self.description
    }

    fn check(&self, ctx: &RuleContext) -> Vec<Finding> {
        if let Some(gate) = &self.path_gate {
            if !gate.is_match(ctx.path) {
                return Vec::new();
            }
        }

        let mut findings = Vec::new();
        for m in self.pattern.find_iter(ctx.text) {
            let line = line_of(ctx.text, m.start());
            debug!(rule = self.id, path = ctx.path, line, "match");
            findings.push(build_finding(
                self.id,
                self.title,
                self.severity,
                self.description,
                self.recommendation,
                ctx.path,
                line,
            ));
        }
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(path: &str, text: &str) -> Chunk {
        Chunk {
            path: path.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn line_numbers_are_one_based() {
        let text = "a\nb\nc";
        assert_eq!(line_of(text, 0), 1);
        assert_eq!(line_of(text, 2), 2);
        assert_eq!(line_of(text, 4), 3);
    }

    #[test]
    fn crlf_line_endings_count_correctly() {
        let text = "a\r\nb\r\nc";
        assert_eq!(line_of(text, 6), 3);
    }

    #[test]
    fn registry_ids_are_unique() {
        let rules = all_rules();
        let mut ids: Vec<_> = rules.iter().map(|r| r.id()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), rules.len());
    }

    #[test]
    fn evaluate_concatenates_across_chunks() {
        let chunks = vec![
            chunk("src/a.js", "eval(x)\n"),
            chunk("src/b.js", "eval(y)\n"),
        ];
        let findings = evaluate("o/r", "abc", &chunks);
        assert_eq!(findings.len(), 2);
        assert!(findings.iter().all(|f| f.rule == "eval"));
    }

    #[test]
    fn evaluate_is_deterministic() {
        let chunks = vec![
            chunk("src/a.js", "eval(x)\nconst p = require('child_process');\np.exec(cmd);\n"),
            chunk("src/b.py", "import yaml\nyaml.load(f)\n"),
        ];
        let mut a = evaluate("o/r", "abc", &chunks);
        let mut b = evaluate("o/r", "abc", &chunks);
        a.sort_by(|x, y| x.id.cmp(&y.id));
        b.sort_by(|x, y| x.id.cmp(&y.id));
        let ids_a: Vec<_> = a.iter().map(|f| f.id.clone()).collect();
        let ids_b: Vec<_> = b.iter().map(|f| f.id.clone()).collect();
        assert_eq!(ids_a, ids_b);
    }
}
