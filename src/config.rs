use tracing::debug;

use crate::error::ScanError;

/// Which finding source evaluates the chunk batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FindingSource {
    /// Local rule registry (default; no credentials required)
    Rules,
    /// Hosted model via the Hugging Face inference API.
    /// Falls back to the rule registry if unusable.
    HuggingFace,
}

/// Scanner configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cap on eligible files attempted per scan
    pub max_files: usize,

    /// Per-file content truncation length in bytes
    pub max_bytes_per_file: usize,

    /// Require paths to fall under the directory allowlist
    pub strict_dirs: bool,

    /// Finding source selector
    pub finding_source: FindingSource,

    /// Hugging Face inference API token
    pub hf_api_key: Option<String>,

    /// Hugging Face model identifier
    pub hf_model: String,

    /// GitHub API token (raises rate limits; optional)
    pub github_token: Option<String>,

    /// GitHub API base URL (overridable for GitHub Enterprise)
    pub github_api_base: String,
}

fn default_max_files() -> usize {
    80
}

fn default_max_bytes_per_file() -> usize {
    120_000
}

fn default_hf_model() -> String {
    "Qwen/Qwen2.5-Coder-1.5B-Instruct".to_string()
}

fn default_github_api_base() -> String {
    "https://api.github.com".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_files: default_max_files(),
            max_bytes_per_file: default_max_bytes_per_file(),
            strict_dirs: false,
            finding_source: FindingSource::Rules,
            hf_api_key: None,
            hf_model: default_hf_model(),
            github_token: None,
            github_api_base: default_github_api_base(),
        }
    }
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ScanError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an injected lookup. Tests pass a map here
    /// instead of mutating process-global state.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ScanError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_files = parse_usize(&lookup, "MAX_FILES", default_max_files())?;
        let max_bytes_per_file =
            parse_usize(&lookup, "MAX_BYTES_PER_FILE", default_max_bytes_per_file())?;

        let strict_dirs = lookup("SCAN_STRICT_DIRS")
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        let finding_source = match lookup("FINDING_SOURCE").as_deref() {
            None | Some("rules") => FindingSource::Rules,
            Some("hf") => FindingSource::HuggingFace,
            Some(other) => {
                return Err(ScanError::Config(format!(
                    "FINDING_SOURCE must be 'rules' or 'hf', got {:?}",
                    other
                )))
            }
        };

        let config = Config {
            max_files,
            max_bytes_per_file,
            strict_dirs,
            finding_source,
            hf_api_key: lookup("HUGGINGFACE_API_KEY").filter(|v| !v.is_empty()),
            hf_model: lookup("HF_MODEL").unwrap_or_else(default_hf_model),
            github_token: lookup("GITHUB_TOKEN").filter(|v| !v.is_empty()),
            github_api_base: lookup("GITHUB_API_BASE").unwrap_or_else(default_github_api_base),
        };

        debug!(
            max_files = config.max_files,
            max_bytes_per_file = config.max_bytes_per_file,
            strict_dirs = config.strict_dirs,
            "configuration loaded"
        );

        Ok(config)
    }
}

fn parse_usize<F>(lookup: &F, key: &str, default: usize) -> Result<usize, ScanError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| ScanError::Config(format!("{} must be an integer, got {:?}", key, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.max_files, 80);
        assert_eq!(config.max_bytes_per_file, 120_000);
        assert!(!config.strict_dirs);
        assert_eq!(config.finding_source, FindingSource::Rules);
    }

    #[test]
    fn overrides_are_read() {
        let lookup = lookup_from(&[
            ("MAX_FILES", "10"),
            ("SCAN_STRICT_DIRS", "TRUE"),
            ("FINDING_SOURCE", "hf"),
            ("HUGGINGFACE_API_KEY", "hf_x"),
        ]);
        let config = Config::from_lookup(lookup).unwrap();
        assert_eq!(config.max_files, 10);
        assert!(config.strict_dirs);
        assert_eq!(config.finding_source, FindingSource::HuggingFace);
        assert_eq!(config.hf_api_key.as_deref(), Some("hf_x"));
    }

    #[test]
    fn malformed_int_is_a_config_error() {
        let lookup = lookup_from(&[("MAX_FILES", "eighty")]);
        let err = Config::from_lookup(lookup).unwrap_err();
        assert!(matches!(err, ScanError::Config(_)));
    }

    #[test]
    fn unknown_finding_source_is_rejected() {
        let lookup = lookup_from(&[("FINDING_SOURCE", "oracle")]);
        assert!(Config::from_lookup(lookup).is_err());
    }
}
