//! Time-bounded in-memory store for generated artifacts.
//!
//! Each stored collection lives for a fixed TTL and is evicted either by
//! the periodic sweeper or lazily on read. Entries for different keys
//! never block each other.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::error::CacheError;
use crate::packaging::GeneratedArtifacts;

pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// One cached generation result.
#[derive(Debug, Clone)]
pub struct StoredCollection {
    pub collection_name: String,
    pub stored_at: Instant,
    pub artifacts: GeneratedArtifacts,
}

impl StoredCollection {
    pub fn age(&self) -> Duration {
        self.stored_at.elapsed()
    }
}

/// Downloadable views of a stored collection, keyed by the `fileType`
/// path segment of the download endpoint.
pub fn file_for_download(
    stored: &StoredCollection,
    file_type: &str,
) -> Result<(String, String, &'static str), CacheError> {
    match file_type {
        "collection" => Ok((
            stored.artifacts.collection_file_name.clone(),
            stored.artifacts.collection.clone(),
            "application/json",
        )),
        "app" => Ok((
            GeneratedArtifacts::MOCK_SERVER_FILE.to_string(),
            stored.artifacts.mock_server.clone(),
            "application/javascript",
        )),
        "package" => Ok((
            GeneratedArtifacts::MANIFEST_FILE.to_string(),
            stored.artifacts.manifest.clone(),
            "application/json",
        )),
        "instructions" => Ok((
            GeneratedArtifacts::INSTRUCTIONS_FILE.to_string(),
            stored.artifacts.instructions.clone(),
            "text/markdown",
        )),
        other => Err(CacheError::UnknownFileType(other.to_string())),
    }
}

/// Storage boundary for generated artifacts, so the service does not care
/// where they live.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn insert(&self, collection_name: String, artifacts: GeneratedArtifacts) -> String;
    async fn get(&self, id: &str) -> Option<StoredCollection>;
    async fn remove(&self, id: &str) -> bool;
    async fn sweep_expired(&self) -> usize;
    async fn len(&self) -> usize;
}

/// Process-wide keyed store with per-entry TTL.
pub struct MemoryArtifactStore {
    entries: DashMap<String, StoredCollection>,
    ttl: Duration,
}

impl MemoryArtifactStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_expired(&self, stored: &StoredCollection) -> bool {
        stored.age() > self.ttl
    }
}

impl Default for MemoryArtifactStore {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn insert(&self, collection_name: String, artifacts: GeneratedArtifacts) -> String {
        let id = Uuid::new_v4().simple().to_string();
        self.entries.insert(
            id.clone(),
            StoredCollection {
                collection_name,
                stored_at: Instant::now(),
                artifacts,
            },
        );
        log::info!("Stored collection {} ({} total)", id, self.entries.len());
        id
    }

    async fn get(&self, id: &str) -> Option<StoredCollection> {
        let stored = self.entries.get(id)?.clone();
        if self.is_expired(&stored) {
            // Lazy eviction so reads between sweeps honor the TTL too.
            drop(self.entries.remove(id));
            return None;
        }
        Some(stored)
    }

    async fn remove(&self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    async fn sweep_expired(&self) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| self.is_expired(entry.value()))
            .map(|entry| entry.key().clone())
            .collect();
        for id in &expired {
            if let Some((_, stored)) = self.entries.remove(id) {
                log::info!(
                    "Evicted expired collection: {} (ID: {})",
                    stored.collection_name,
                    id
                );
            }
        }
        expired.len()
    }

    async fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Spawn the periodic sweeper. The handle is dropped by callers that want
/// the sweeper to live as long as the process.
pub fn spawn_sweeper(
    store: Arc<MemoryArtifactStore>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let evicted = store.sweep_expired().await;
            if evicted > 0 {
                log::info!("Cache sweep evicted {} collection(s)", evicted);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;
    use crate::packaging;

    fn artifacts() -> GeneratedArtifacts {
        packaging::generate(&GenerationConfig::new("Cache Test")).unwrap()
    }

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let store = MemoryArtifactStore::default();
        let id = store.insert("Cache Test".to_string(), artifacts()).await;
        assert_eq!(id.len(), 32);

        let stored = store.get(&id).await.expect("entry should be present");
        assert_eq!(stored.collection_name, "Cache Test");
        assert_eq!(store.len().await, 1);

        assert!(store.remove(&id).await);
        assert!(store.get(&id).await.is_none());
    }

    #[tokio::test]
    async fn expired_entries_are_rejected_on_read() {
        let store = MemoryArtifactStore::new(Duration::from_millis(10));
        let id = store.insert("Cache Test".to_string(), artifacts()).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(store.get(&id).await.is_none());
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn sweep_removes_only_expired_entries() {
        let store = MemoryArtifactStore::new(Duration::from_millis(50));
        let old = store.insert("Old".to_string(), artifacts()).await;
        tokio::time::sleep(Duration::from_millis(80)).await;
        let fresh = store.insert("Fresh".to_string(), artifacts()).await;

        assert_eq!(store.sweep_expired().await, 1);
        assert!(store.get(&old).await.is_none());
        assert!(store.get(&fresh).await.is_some());
    }

    #[tokio::test]
    async fn concurrent_inserts_do_not_collide() {
        let store = Arc::new(MemoryArtifactStore::default());
        let mut handles = Vec::new();
        for i in 0..16 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.insert(format!("C{}", i), artifacts()).await
            }));
        }
        let mut ids = std::collections::HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap());
        }
        assert_eq!(ids.len(), 16);
        assert_eq!(store.len().await, 16);
    }

    #[test]
    fn download_views_cover_the_four_file_types() {
        let stored = StoredCollection {
            collection_name: "Cache Test".to_string(),
            stored_at: Instant::now(),
            artifacts: artifacts(),
        };
        for file_type in ["collection", "app", "package", "instructions"] {
            let (name, content, mime) = file_for_download(&stored, file_type).unwrap();
            assert!(!name.is_empty());
            assert!(!content.is_empty());
            assert!(!mime.is_empty());
        }
        assert!(matches!(
            file_for_download(&stored, "tarball"),
            Err(CacheError::UnknownFileType(_))
        ));
    }
}
