//! Remote-first object store that degrades to a local directory

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::join_all;
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{GalleryError, Result};
use crate::storage::{ObjectStore, SuffixFilter};

/// Tries the remote backend first and retries every failed call on the
/// local backend.
///
/// A blob written while the remote is down lands only in the local
/// directory. It is served from there as long as the remote keeps
/// reporting it missing, but it is never copied back to the remote.
pub struct FallbackObjectStore {
    remote: Option<Arc<dyn ObjectStore>>,
    local: Arc<dyn ObjectStore>,
    // Held for the whole purge-then-put sequence of `replace_all_matching`
    replace_lock: Mutex<()>,
}

impl FallbackObjectStore {
    pub fn new(remote: Arc<dyn ObjectStore>, local: Arc<dyn ObjectStore>) -> Self {
        info!(
            "Object store: {} with {} fallback",
            remote.name(),
            local.name()
        );
        Self {
            remote: Some(remote),
            local,
            replace_lock: Mutex::new(()),
        }
    }

    /// Degraded mode with no remote configured
    pub fn local_only(local: Arc<dyn ObjectStore>) -> Self {
        info!("Object store: {} only (no remote configured)", local.name());
        Self {
            remote: None,
            local,
            replace_lock: Mutex::new(()),
        }
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    fn log_fallback(&self, remote: &dyn ObjectStore, op: &str, key: &str, error: &GalleryError) {
        match error {
            GalleryError::NotFound(_) => debug!(
                "{} {} {}: not found, trying {}",
                remote.name(),
                op,
                key,
                self.local.name()
            ),
            other => warn!(
                "{} {} {} failed, falling back to {}: {}",
                remote.name(),
                op,
                key,
                self.local.name(),
                other
            ),
        }
    }

    /// Store `key` after deleting every existing key accepted by `filter`
    /// from both backends, so at most one such blob survives.
    ///
    /// Concurrent calls on the same store are serialized. Failures while
    /// purging are logged and do not prevent the upload.
    pub async fn replace_all_matching(
        &self,
        filter: &SuffixFilter,
        key: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<()> {
        let _guard = self.replace_lock.lock().await;

        if let Some(remote) = &self.remote {
            purge(remote.as_ref(), filter).await;
        }
        purge(self.local.as_ref(), filter).await;

        self.put(key, content_type, data).await
    }
}

async fn purge(store: &dyn ObjectStore, filter: &SuffixFilter) {
    let keys = match store.list(filter).await {
        Ok(keys) => keys,
        Err(e) => {
            warn!("{}: could not list keys to replace: {}", store.name(), e);
            return;
        }
    };
    if keys.is_empty() {
        return;
    }

    let results = join_all(keys.iter().map(|key| store.delete(key))).await;
    for (key, result) in keys.iter().zip(results) {
        match result {
            Ok(()) => info!("{}: removed superseded {}", store.name(), key),
            Err(e) => warn!("{}: failed to remove superseded {}: {}", store.name(), key, e),
        }
    }
}

#[async_trait]
impl ObjectStore for FallbackObjectStore {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn put(&self, key: &str, content_type: &str, data: Bytes) -> Result<()> {
        if let Some(remote) = &self.remote {
            match remote.put(key, content_type, data.clone()).await {
                Ok(()) => return Ok(()),
                Err(e) => self.log_fallback(remote.as_ref(), "put", key, &e),
            }
        }
        self.local.put(key, content_type, data).await
    }

    async fn list(&self, filter: &SuffixFilter) -> Result<Vec<String>> {
        if let Some(remote) = &self.remote {
            match remote.list(filter).await {
                Ok(keys) => return Ok(keys),
                Err(e) => self.log_fallback(remote.as_ref(), "list", "keys", &e),
            }
        }
        self.local.list(filter).await
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        if let Some(remote) = &self.remote {
            match remote.get(key).await {
                Ok(data) => return Ok(data),
                Err(e) => self.log_fallback(remote.as_ref(), "get", key, &e),
            }
        }
        self.local.get(key).await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        if let Some(remote) = &self.remote {
            match remote.delete(key).await {
                Ok(()) => {
                    // Also drop any copy written during an outage
                    match self.local.delete(key).await {
                        Ok(()) | Err(GalleryError::NotFound(_)) => {}
                        Err(e) => warn!("{} delete {} failed after remote delete: {}", self.local.name(), key, e),
                    }
                    return Ok(());
                }
                Err(e) => self.log_fallback(remote.as_ref(), "delete", key, &e),
            }
        }
        self.local.delete(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::mock_store::MockOp;
    use crate::storage::{MediaKind, MockObjectStore};

    fn stores() -> (Arc<MockObjectStore>, Arc<MockObjectStore>, FallbackObjectStore) {
        let remote = Arc::new(MockObjectStore::new());
        let local = Arc::new(MockObjectStore::new());
        let store = FallbackObjectStore::new(remote.clone(), local.clone());
        (remote, local, store)
    }

    #[tokio::test]
    async fn test_healthy_remote_is_used_exclusively() {
        let (remote, local, store) = stores();
        store.put("a.png", "image/png", Bytes::from_static(b"a")).await.unwrap();

        assert!(remote.contains("a.png"));
        assert!(!local.contains("a.png"));
        assert_eq!(local.call_count(MockOp::Put), 0);
        assert_eq!(store.list(&SuffixFilter::any()).await.unwrap(), vec!["a.png"]);
    }

    #[tokio::test]
    async fn test_each_operation_falls_back() {
        let (remote, local, store) = stores();
        remote.fail(MockOp::Put);
        remote.fail(MockOp::List);
        remote.fail(MockOp::Delete);

        store.put("a.png", "image/png", Bytes::from_static(b"a")).await.unwrap();
        assert!(local.contains("a.png"));
        assert_eq!(store.list(&MediaKind::Image.filter()).await.unwrap(), vec!["a.png"]);

        // Remote reports NotFound, the local copy is served
        assert_eq!(store.get("a.png").await.unwrap(), Bytes::from_static(b"a"));

        store.delete("a.png").await.unwrap();
        assert!(!local.contains("a.png"));
    }

    #[tokio::test]
    async fn test_delete_also_clears_local_copy() {
        let (remote, local, store) = stores();
        local.put("a.png", "image/png", Bytes::from_static(b"a")).await.unwrap();
        remote.put("b.png", "image/png", Bytes::from_static(b"b")).await.unwrap();

        store.delete("a.png").await.unwrap();
        store.delete("b.png").await.unwrap();
        assert!(!local.contains("a.png"));
        assert!(!remote.contains("b.png"));
        assert!(store.get("a.png").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_local_delete_failure_after_remote_delete_is_logged_only() {
        let (remote, local, store) = stores();
        remote.put("a.png", "image/png", Bytes::new()).await.unwrap();
        local.fail(MockOp::Delete);

        store.delete("a.png").await.unwrap();
        assert!(!remote.contains("a.png"));
    }

    #[tokio::test]
    async fn test_error_when_both_backends_fail() {
        let remote = Arc::new(MockObjectStore::unreachable());
        let local = Arc::new(MockObjectStore::unreachable());
        let store = FallbackObjectStore::new(remote, local);
        assert!(store.put("a.png", "image/png", Bytes::new()).await.is_err());
        assert!(store.get("missing.png").await.is_err());
    }

    #[tokio::test]
    async fn test_local_only_never_touches_remote() {
        let local = Arc::new(MockObjectStore::new());
        let store = FallbackObjectStore::local_only(local.clone());
        assert!(!store.has_remote());
        store.put("a.mp3", "audio/mpeg", Bytes::from_static(b"x")).await.unwrap();
        assert!(local.contains("a.mp3"));
    }

    #[tokio::test]
    async fn test_replace_purges_both_backends() {
        let (remote, local, store) = stores();
        remote.put("old_1.mp3", "audio/mpeg", Bytes::new()).await.unwrap();
        remote.put("photo.png", "image/png", Bytes::new()).await.unwrap();
        local.put("stale_2.wav", "audio/wav", Bytes::new()).await.unwrap();

        store
            .replace_all_matching(&MediaKind::Audio.filter(), "new_3.m4a", "audio/mp4", Bytes::from_static(b"m4a"))
            .await
            .unwrap();

        assert_eq!(remote.list(&MediaKind::Audio.filter()).await.unwrap(), vec!["new_3.m4a"]);
        assert!(local.list(&MediaKind::Audio.filter()).await.unwrap().is_empty());
        assert!(remote.contains("photo.png"));
    }

    #[tokio::test]
    async fn test_replace_survives_purge_failures() {
        let (remote, _local, store) = stores();
        remote.put("old.mp3", "audio/mpeg", Bytes::new()).await.unwrap();
        remote.fail(MockOp::Delete);

        store
            .replace_all_matching(&MediaKind::Audio.filter(), "new.mp3", "audio/mpeg", Bytes::new())
            .await
            .unwrap();
        assert!(remote.contains("new.mp3"));
    }
}
