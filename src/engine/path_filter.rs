use regex::Regex;

/// Pure path-eligibility predicate for the scan pipeline.
///
/// A path is eligible when it avoids the build/dependency/VCS directory
/// denylist, avoids the binary/lockfile extension denylist, carries a known
/// source or config extension, and (in strict mode) falls under a source
/// directory allowlist. No filesystem access; string checks only.
pub struct PathFilter {
    deny_dirs: Regex,
    deny_ext: Regex,
    allow_ext: Regex,
    allow_dirs: Regex,
    strict_dirs: bool,
}

impl PathFilter {
    pub fn new(strict_dirs: bool) -> Self {
        PathFilter {
            deny_dirs: Regex::new(
                r"(?i)(^|/)(node_modules|\.git|\.next|dist|build|out|coverage|vendor|target|__pycache__)(/|$)",
            )
            .unwrap(),
            deny_ext: Regex::new(r"(?i)\.(png|jpe?g|gif|pdf|svg|ico|bmp|exe|dll|lock|map)$")
                .unwrap(),
            allow_ext: Regex::new(
                r"(?i)\.(ts|tsx|js|jsx|mjs|cjs|py|go|rb|java|cs|php|rs|scala|kt|swift|sql|c|cc|cpp|h|hpp|vue|svelte|sh|bash|yaml|yml|toml|ini|cfg)$",
            )
            .unwrap(),
            allow_dirs: Regex::new(
                r"(?i)(^|/)(src|app|lib|server|cli|scripts|cmd|internal|pkg|services|packages/[^/]+/(src|lib)|examples|\.github/actions/src)(/|$)",
            )
            .unwrap(),
            strict_dirs,
        }
    }

    /// All four checks must pass; ordering is short-circuit only.
    pub fn eligible(&self, path: &str) -> bool {
        if self.deny_dirs.is_match(path) || self.deny_ext.is_match(path) {
            return false;
        }
        if !self.allow_ext.is_match(path) {
            return false;
        }
        if self.strict_dirs && !self.allow_dirs.is_match(path) {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn denies_dependency_directories() {
        let filter = PathFilter::new(false);
        assert!(!filter.eligible("node_modules/foo.ts"));
        assert!(!filter.eligible("a/node_modules/foo.ts"));
        assert!(!filter.eligible(".git/config.ts"));
        assert!(!filter.eligible("pkg/vendor/x.go"));
        assert!(!filter.eligible("target/debug/main.rs"));
        assert!(!filter.eligible("app/__pycache__/mod.py"));
    }

    #[test]
    fn denies_binary_and_lockfile_extensions() {
        let filter = PathFilter::new(false);
        assert!(!filter.eligible("src/app.png"));
        assert!(!filter.eligible("docs/guide.pdf"));
        assert!(!filter.eligible("Cargo.lock"));
        assert!(!filter.eligible("dist2/bundle.js.map"));
    }

    #[test]
    fn allows_known_source_extensions() {
        let filter = PathFilter::new(false);
        assert!(filter.eligible("src/app.ts"));
        assert!(filter.eligible("main.go"));
        assert!(filter.eligible("deploy/config.yaml"));
        assert!(filter.eligible("Setup.PY"));
        assert!(!filter.eligible("README.md"));
        assert!(!filter.eligible("Makefile"));
    }

    #[test]
    fn strict_mode_requires_directory_allowlist() {
        let strict = PathFilter::new(true);
        assert!(strict.eligible("src/app.ts"));
        assert!(strict.eligible("packages/web/src/index.tsx"));
        assert!(!strict.eligible("random/app.ts"));

        let loose = PathFilter::new(false);
        assert!(loose.eligible("random/app.ts"));
    }

    #[test]
    fn is_total_over_odd_inputs() {
        let filter = PathFilter::new(true);
        for path in ["", "/", "..", "a//b.ts", "ünïcode/päth.py", "no_extension"] {
            // Must terminate and return a bool; no panics.
            let _ = filter.eligible(path);
        }
    }
}
