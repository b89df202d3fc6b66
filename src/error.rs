use thiserror::Error;

/// Everything that can go wrong in a scan, split by remedy.
///
/// `RateLimit` is deliberately separate from `Resolution`: the fix for one
/// is "add a token or wait", for the other "check the repo/ref name".
#[derive(Debug, Error)]
pub enum ScanError {
    /// The repository or ref could not be resolved to a commit.
    #[error("failed to resolve {repo}@{git_ref}: {reason}")]
    Resolution {
        repo: String,
        git_ref: String,
        reason: String,
    },

    /// The upstream host is throttling us.
    #[error("GitHub API rate limit hit ({0}). Set GITHUB_TOKEN to raise the limit.")]
    RateLimit(String),

    /// A single file (or the tree listing) could not be retrieved.
    #[error("fetch failed for {path}: {reason}")]
    Fetch { path: String, reason: String },

    /// The aggregated result violated the output contract. Internal bug,
    /// not a user input problem; the result is never cached.
    #[error("scan result failed validation: {0}")]
    Validation(String),

    /// Malformed request or configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ScanError {
    pub fn fetch(path: impl AsRef<str>, reason: impl ToString) -> Self {
        ScanError::Fetch {
            path: path.as_ref().to_string(),
            reason: reason.to_string(),
        }
    }
}
