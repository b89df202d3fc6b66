use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::report::finding::ScanResult;

/// Keyed store for completed scan results.
///
/// The interface is async so a persistent backend (key-value store,
/// database) can replace the in-memory map without touching the pipeline.
/// Results are immutable once written; there is no eviction.
#[async_trait]
pub trait ScanStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<ScanResult>;
    async fn set(&self, key: &str, result: ScanResult);
}

/// Process-lifetime in-memory store.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<HashMap<String, ScanResult>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScanStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<ScanResult> {
        self.inner.read().await.get(key).cloned()
    }

    async fn set(&self, key: &str, result: ScanResult) {
        self.inner.write().await.insert(key.to_string(), result);
    }
}
