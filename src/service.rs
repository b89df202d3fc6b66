use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::info;

use crate::cache::ScanStore;
use crate::config::Config;
use crate::engine::Scanner;
use crate::error::ScanError;
use crate::github::RepoHost;
use crate::report::finding::{scan_key, ScanResult};
use crate::report::validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Done,
    Pending,
}

/// Returned by `start_scan`: the key to poll with.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanTicket {
    pub key: String,
    pub status: ScanStatus,
}

/// Returned by `poll_scan`: a read-only view of cache state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    pub key: String,
    pub status: ScanStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ScanResult>,
}

/// The boundary the outside world calls: start a scan, poll for its
/// result, or fetch raw file content for display.
///
/// Scans are idempotent per `(repo, resolved commit)`. The
/// check-then-run-then-set sequence holds a per-key mutex, so concurrent
/// triggers for the same key execute the pipeline at most once; scans for
/// different keys proceed independently.
pub struct ScanService {
    host: Arc<dyn RepoHost>,
    store: Arc<dyn ScanStore>,
    config: Config,
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ScanService {
    pub fn new(host: Arc<dyn RepoHost>, store: Arc<dyn ScanStore>, config: Config) -> Self {
        ScanService {
            host,
            store,
            config,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Trigger a scan, or reuse the cached result for the resolved commit.
    pub async fn start_scan(
        &self,
        repo: &str,
        git_ref: Option<&str>,
    ) -> Result<ScanTicket, ScanError> {
        let (owner, name) = repo
            .split_once('/')
            .filter(|(o, n)| !o.is_empty() && !n.is_empty())
            .ok_or_else(|| ScanError::Config(format!("repo must be 'owner/name', got {repo:?}")))?;

        let git_ref = git_ref.unwrap_or("HEAD");
        let commit = self.host.resolve_commit(owner, name, git_ref).await?;
        let key = scan_key(repo, &commit);

        if self.store.get(&key).await.is_some() {
            info!(%key, "cache hit, skipping pipeline");
            return Ok(ScanTicket {
                key,
                status: ScanStatus::Done,
            });
        }

        let lock = {
            let mut in_flight = self.in_flight.lock().await;
            in_flight.entry(key.clone()).or_default().clone()
        };
        let _running = lock.lock().await;

        // A concurrent caller may have finished while we waited.
        if self.store.get(&key).await.is_some() {
            info!(%key, "populated while waiting, skipping pipeline");
            return Ok(ScanTicket {
                key,
                status: ScanStatus::Done,
            });
        }

        info!(%repo, %commit, "running scan pipeline");
        let scanner = Scanner::new(self.host.clone(), self.config.clone());
        let result = scanner.run(repo, &commit).await?;

        // A result that fails the output contract never reaches the cache.
        validate::check(&result)?;
        self.store.set(&key, result).await;

        Ok(ScanTicket {
            key,
            status: ScanStatus::Done,
        })
    }

    /// Read-only, side-effect-free cache lookup.
    pub async fn poll_scan(&self, key: &str) -> PollResponse {
        match self.store.get(key).await {
            Some(data) => PollResponse {
                key: key.to_string(),
                status: ScanStatus::Done,
                data: Some(data),
            },
            None => PollResponse {
                key: key.to_string(),
                status: ScanStatus::Pending,
                data: None,
            },
        }
    }

    /// Raw file content at a commit, for rendering code excerpts. Not part
    /// of the scanning pipeline.
    pub async fn fetch_file(
        &self,
        repo: &str,
        commit: &str,
        path: &str,
    ) -> Result<String, ScanError> {
        let (owner, name) = repo
            .split_once('/')
            .ok_or_else(|| ScanError::Config(format!("repo must be 'owner/name', got {repo:?}")))?;
        self.host.get_file(owner, name, path, commit).await
    }
}
