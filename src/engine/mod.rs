pub mod path_filter;

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::ScanError;
use crate::github::RepoHost;
use crate::llm;
use crate::report::finding::{ScanResult, ScanSummary};
use crate::report::merger;
use self::path_filter::PathFilter;

/// One bounded unit of work for the rule engine: a file path and its
/// (possibly truncated) text.
#[derive(Debug, Clone, Serialize)]
pub struct Chunk {
    pub path: String,
    pub text: String,
}

/// Output of the chunk assembly stage, counters included.
#[derive(Debug)]
pub struct ChunkBatch {
    pub chunks: Vec<Chunk>,
    pub files_enumerated: usize,
    pub files_considered: usize,
    pub bytes_scanned: usize,
    pub errors: usize,
}

/// The core scan pipeline. Orchestrates tree enumeration, path filtering,
/// budgeted content fetching, finding-source dispatch, and aggregation.
pub struct Scanner {
    host: Arc<dyn RepoHost>,
    config: Config,
    filter: PathFilter,
}

impl Scanner {
    pub fn new(host: Arc<dyn RepoHost>, config: Config) -> Self {
        let filter = PathFilter::new(config.strict_dirs);
        Scanner {
            host,
            config,
            filter,
        }
    }

    /// Enumerate, filter, fetch, and truncate under the file/byte budgets.
    ///
    /// The file-count cap turns an arbitrarily large repository into a
    /// bounded unit of work; files beyond the cap are simply not scanned.
    /// A per-file fetch failure bumps the error counter and the batch
    /// continues.
    pub async fn assemble_chunks(
        &self,
        owner: &str,
        name: &str,
        commit: &str,
    ) -> Result<ChunkBatch, ScanError> {
        let tree = self.host.list_tree(owner, name, commit).await?;
        let files_enumerated = tree.len();

        let candidates: Vec<&String> = tree.iter().filter(|p| self.filter.eligible(p)).collect();
        let files_considered = candidates.len();

        info!(
            files_enumerated,
            files_considered,
            cap = self.config.max_files,
            "tree filtered"
        );

        let mut chunks = Vec::new();
        let mut bytes_scanned = 0usize;
        let mut errors = 0usize;

        for path in candidates.into_iter().take(self.config.max_files) {
            match self.host.get_file(owner, name, path, commit).await {
                Ok(text) => {
                    let text = truncate_on_char_boundary(text, self.config.max_bytes_per_file);
                    if text.trim().is_empty() {
                        debug!(%path, "blank after trim, skipped");
                        continue;
                    }
                    bytes_scanned += text.len();
                    chunks.push(Chunk {
                        path: path.clone(),
                        text,
                    });
                }
                Err(e) => {
                    warn!(%path, error = %e, "fetch failed, skipping file");
                    errors += 1;
                }
            }
        }

        Ok(ChunkBatch {
            chunks,
            files_enumerated,
            files_considered,
            bytes_scanned,
            errors,
        })
    }

    /// Run the full pipeline for an already-resolved commit.
    pub async fn run(&self, repo: &str, commit: &str) -> Result<ScanResult, ScanError> {
        let (owner, name) = repo
            .split_once('/')
            .ok_or_else(|| ScanError::Config(format!("repo must be 'owner/name', got {repo:?}")))?;

        let batch = self.assemble_chunks(owner, name, commit).await?;
        info!(
            chunks = batch.chunks.len(),
            bytes = batch.bytes_scanned,
            errors = batch.errors,
            "chunks assembled"
        );

        let raw = llm::analyze_chunks(&self.config, repo, commit, &batch.chunks).await;
        let findings = merger::merge_findings(raw);
        info!(findings = findings.len(), "evaluation complete");

        Ok(ScanResult {
            repo: repo.to_string(),
            commit: commit.to_string(),
            scanned_at: chrono::Utc::now().to_rfc3339(),
            findings,
            summary: ScanSummary {
                files_enumerated: batch.files_enumerated,
                files_considered: batch.files_considered,
                files_scanned: batch.chunks.len(),
                bytes_scanned: batch.bytes_scanned,
                errors: batch.errors,
            },
        })
    }
}

/// Truncate to at most `max` bytes without splitting a UTF-8 sequence.
fn truncate_on_char_boundary(mut text: String, max: usize) -> String {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text.truncate(end);
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_is_exact_for_ascii() {
        let long = "a".repeat(500_000);
        assert_eq!(truncate_on_char_boundary(long, 120_000).len(), 120_000);
    }

    #[test]
    fn truncation_backs_off_mid_codepoint() {
        // 'é' is two bytes; a 4-byte limit lands inside the second 'é'.
        let text = "aéé".to_string();
        let cut = truncate_on_char_boundary(text, 4);
        assert_eq!(cut, "aé");
    }

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_on_char_boundary("abc".to_string(), 10), "abc");
    }
}
