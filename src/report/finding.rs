use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Severity level of a security finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            _ => Severity::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single security finding at a location in the scanned repository.
///
/// `file_path` is the path exactly as tree enumeration returned it,
/// relative to the repository root. Lines are 1-based and inclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Deterministic ID (hash-based), e.g. "RPB-a1b2c3d4e5f6"
    pub id: String,

    /// Rule that produced this finding, e.g. "eval"
    pub rule: String,

    /// Severity level
    pub severity: Severity,

    /// Short title
    pub title: String,

    /// Human-readable description
    pub description: String,

    /// Path relative to the repository root
    pub file_path: String,

    /// Starting line number (1-based)
    pub start_line: usize,

    /// Ending line number (1-based, inclusive; >= start_line)
    pub end_line: usize,

    /// Actionable recommendation
    pub recommendation: String,
}

impl Finding {
    /// Generate a deterministic ID from rule, file, and location.
    /// Identical detections across runs collapse to the same record.
    pub fn generate_id(rule: &str, file_path: &str, start_line: usize) -> String {
        let mut hasher = Sha256::new();
        hasher.update(rule.as_bytes());
        hasher.update(file_path.as_bytes());
        hasher.update(start_line.to_string().as_bytes());
        let hex = format!("{:x}", hasher.finalize());
        format!("RPB-{}", &hex[..12])
    }
}

/// Pipeline counters accumulated during one scan run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSummary {
    /// Files listed by tree enumeration (blobs only)
    pub files_enumerated: usize,
    /// Files surviving the path filter (before the file-count cap)
    pub files_considered: usize,
    /// Chunks actually submitted to the rule engine
    pub files_scanned: usize,
    /// Bytes of (truncated) content scanned
    pub bytes_scanned: usize,
    /// Per-file fetch failures that were skipped, not fatal
    pub errors: usize,
}

/// The unit of cached state: one immutable result per `(repo, commit)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// "owner/name"
    pub repo: String,

    /// Resolved commit hash the scan ran against
    pub commit: String,

    /// When the scan was performed (RFC 3339)
    pub scanned_at: String,

    /// Deduplicated findings, sorted by severity, path, line
    pub findings: Vec<Finding>,

    /// Pipeline counters
    pub summary: ScanSummary,
}

impl ScanResult {
    /// Check if there are findings at or above a severity threshold
    pub fn has_findings_at_or_above(&self, threshold: Severity) -> bool {
        self.findings.iter().any(|f| f.severity >= threshold)
    }
}

/// Cache key for a scan. Built from the *resolved* commit, never the loose
/// ref, so "HEAD" at different times cannot collide and two refs at the
/// same commit share one entry.
pub fn scan_key(repo: &str, commit: &str) -> String {
    format!("scan:{}@{}", repo, commit)
}
