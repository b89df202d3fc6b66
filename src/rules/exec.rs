use regex::Regex;
use tracing::debug;

use crate::report::finding::{Finding, Severity};
use crate::rules::{build_finding, line_of, PatternRule, Rule, RuleContext};

/// Dynamic code execution via eval(), any language.
pub(crate) fn eval_rule() -> PatternRule {
    PatternRule {
        id: "eval",
        title: "Use of eval()",
        description: "eval() executes arbitrary code.",
        recommendation: "Avoid eval; use safe parsing or explicit logic.",
        severity: Severity::High,
        pattern: Regex::new(r"\beval\s*\(").unwrap(),
        path_gate: None,
    }
}

/// Python subprocess invocation with shell=True.
pub(crate) fn subprocess_shell_rule() -> PatternRule {
    PatternRule {
        id: "py-subprocess-shell",
        title: "subprocess shell=True",
        description: "shell=True may allow injection.",
        recommendation: "Avoid shell=True; pass argv list and validate inputs.",
        severity: Severity::High,
        pattern: Regex::new(r"(?i)subprocess\.(call|run|Popen)\s*\([^)]*shell\s*=\s*True").unwrap(),
        path_gate: Some(Regex::new(r"\.py$").unwrap()),
    }
}

/// OS process spawning in Go sources.
pub(crate) fn go_exec_rule() -> PatternRule {
    PatternRule {
        id: "go-exec",
        title: "exec.Command usage",
        description: "Spawning processes can be risky.",
        recommendation: "Validate args; avoid shell; consider libraries or context timeouts.",
        severity: Severity::High,
        pattern: Regex::new(r"\bexec\.Command\s*\(").unwrap(),
        path_gate: Some(Regex::new(r"\.go$").unwrap()),
    }
}

/// child_process spawn APIs, gated on the module actually being imported.
/// Without the import gate, `exec(` alone is far too noisy.
pub struct ChildProcessRule {
    import: Regex,
    call: Regex,
}

impl ChildProcessRule {
    pub fn new() -> Self {
        ChildProcessRule {
            import: Regex::new(r#"require\(\s*['"]child_process['"]\s*\)|from\s+['"]child_process['"]"#)
                .unwrap(),
            call: Regex::new(r"\b(child_process\.)?(exec|spawn|execFile|fork)\s*\(").unwrap(),
        }
    }
}

impl Default for ChildProcessRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for ChildProcessRule {
    fn id(&self) -> &'static str {
        "childproc"
    }

    fn describe(&self) -> &'static str {
        "Child process execution in files importing child_process"
    }

    fn check(&self, ctx: &RuleContext) -> Vec<Finding> {
        if !self.import.is_match(ctx.text) {
            return Vec::new();
        }

        let mut findings = Vec::new();
        for m in self.call.find_iter(ctx.text) {
            let line = line_of(ctx.text, m.start());
            debug!(rule = "childproc", path = ctx.path, line, "match");
            findings.push(build_finding(
                "childproc",
                "Child process execution",
                Severity::High,
                "Shelling out can be risky.",
                "Validate/escape args; prefer library calls; use execFile with argv.",
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

    fn ctx<'a>(path: &'a str, text: &'a str) -> RuleContext<'a> {
        RuleContext {
            repo: "o/r",
            commit: "abc",
            path,
            text,
        }
    }

    #[test]
    fn eval_fires_at_the_matching_line() {
        let text = "const a = 1;\neval(userInput);\n";
        let findings = eval_rule().check(&ctx("src/x.js", text));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].start_line, 2);
        assert_eq!(findings[0].end_line, 2);
        assert_eq!(findings[0].severity, Severity::High);
    }

    #[test]
    fn eval_ignores_identifiers_containing_eval() {
        let findings = eval_rule().check(&ctx("src/x.js", "retrieval(x);\n"));
        assert!(findings.is_empty());
    }

    #[test]
    fn childproc_requires_the_import() {
        let rule = ChildProcessRule::new();
        let without = "exec('ls');\n";
        assert!(rule.check(&ctx("src/run.js", without)).is_empty());

        let with = "const cp = require('child_process');\ncp.exec('ls');\n";
        let findings = rule.check(&ctx("src/run.js", with));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].start_line, 2);
    }

    #[test]
    fn subprocess_shell_gated_to_python() {
        let rule = subprocess_shell_rule();
        let text = "subprocess.run(cmd, shell=True)\n";
        assert_eq!(rule.check(&ctx("tool.py", text)).len(), 1);
        assert!(rule.check(&ctx("tool.js", text)).is_empty());
        assert!(rule
            .check(&ctx("tool.py", "subprocess.run(['ls'])\n"))
            .is_empty());
    }

    #[test]
    fn go_exec_gated_to_go() {
        let rule = go_exec_rule();
        let text = "cmd := exec.Command(\"sh\", \"-c\", input)\n";
        assert_eq!(rule.check(&ctx("cmd/main.go", text)).len(), 1);
        assert!(rule.check(&ctx("cmd/main.py", text)).is_empty());
    }
}
