use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use crate::config::Config;
use crate::error::ScanError;

/// The source-control host the pipeline reads from.
///
/// One seam for all upstream I/O: resolution, enumeration, and content.
/// Tests swap in an in-memory implementation.
#[async_trait]
pub trait RepoHost: Send + Sync {
    /// Resolve a loose ref (branch, tag, "HEAD") to an immutable commit hash.
    async fn resolve_commit(
        &self,
        owner: &str,
        name: &str,
        git_ref: &str,
    ) -> Result<String, ScanError>;

    /// List every tracked file path at a commit (blobs only), in one
    /// recursive request.
    async fn list_tree(
        &self,
        owner: &str,
        name: &str,
        sha: &str,
    ) -> Result<Vec<String>, ScanError>;

    /// Fetch the UTF-8 text of one file at one ref. Non-blob and
    /// content-less responses are empty text, not errors.
    async fn get_file(
        &self,
        owner: &str,
        name: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<String, ScanError>;
}

#[derive(Debug, Deserialize)]
struct CommitResponse {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct TreeResponse {
    #[serde(default)]
    tree: Vec<TreeEntry>,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    #[serde(default)]
    path: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

/// GitHub REST API client.
pub struct GitHubClient {
    http: reqwest::Client,
    base: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(config: &Config) -> Result<Self, ScanError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("repoprobe/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ScanError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(GitHubClient {
            http,
            base: config.github_api_base.trim_end_matches('/').to_string(),
            token: config.github_token.clone(),
        })
    }

    fn request(&self, url: &str) -> reqwest::RequestBuilder {
        let mut req = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        req
    }
}

fn is_rate_limited(status: StatusCode) -> bool {
    status == StatusCode::FORBIDDEN || status == StatusCode::TOO_MANY_REQUESTS
}

#[async_trait]
impl RepoHost for GitHubClient {
    async fn resolve_commit(
        &self,
        owner: &str,
        name: &str,
        git_ref: &str,
    ) -> Result<String, ScanError> {
        let url = format!("{}/repos/{}/{}/commits/{}", self.base, owner, name, git_ref);
        let repo = format!("{owner}/{name}");

        let response = self.request(&url).send().await.map_err(|e| {
            ScanError::Resolution {
                repo: repo.clone(),
                git_ref: git_ref.to_string(),
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        if is_rate_limited(status) {
            return Err(ScanError::RateLimit(format!("HTTP {status} resolving {repo}@{git_ref}")));
        }
        if !status.is_success() {
            return Err(ScanError::Resolution {
                repo,
                git_ref: git_ref.to_string(),
                reason: format!("HTTP {status}"),
            });
        }

        let commit: CommitResponse = response.json().await.map_err(|e| ScanError::Resolution {
            repo,
            git_ref: git_ref.to_string(),
            reason: e.to_string(),
        })?;

        debug!(%git_ref, sha = %commit.sha, "resolved commit");
        Ok(commit.sha)
    }

    async fn list_tree(
        &self,
        owner: &str,
        name: &str,
        sha: &str,
    ) -> Result<Vec<String>, ScanError> {
        let url = format!(
            "{}/repos/{}/{}/git/trees/{}?recursive=1",
            self.base, owner, name, sha
        );
        let label = format!("{owner}/{name} tree @{sha}");

        let response = self
            .request(&url)
            .send()
            .await
            .map_err(|e| ScanError::fetch(&label, e))?;

        let status = response.status();
        if is_rate_limited(status) {
            return Err(ScanError::RateLimit(format!("HTTP {status} listing {label}")));
        }
        if !status.is_success() {
            return Err(ScanError::fetch(&label, format!("HTTP {status}")));
        }

        let tree: TreeResponse = response
            .json()
            .await
            .map_err(|e| ScanError::fetch(&label, e))?;

        let paths: Vec<String> = tree
            .tree
            .into_iter()
            .filter(|e| e.kind.as_deref() == Some("blob"))
            .filter_map(|e| e.path)
            .collect();

        debug!(blobs = paths.len(), "tree enumerated");
        Ok(paths)
    }

    async fn get_file(
        &self,
        owner: &str,
        name: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<String, ScanError> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}?ref={}",
            self.base, owner, name, path, git_ref
        );

        let response = self
            .request(&url)
            .send()
            .await
            .map_err(|e| ScanError::fetch(path, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::fetch(path, format!("HTTP {status}")));
        }

        // A directory comes back as a JSON array; treat it as nothing to scan.
        let value: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ScanError::fetch(path, e))?;
        if value.is_array() {
            return Ok(String::new());
        }

        let content: ContentResponse =
            serde_json::from_value(value).map_err(|e| ScanError::fetch(path, e))?;

        let Some(encoded) = content.content else {
            return Ok(String::new());
        };
        if content.encoding.as_deref() != Some("base64") {
            return Ok(String::new());
        }

        // GitHub wraps base64 payloads at 60 columns.
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = BASE64
            .decode(compact.as_bytes())
            .map_err(|e| ScanError::fetch(path, e))?;

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
