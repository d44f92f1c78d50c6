//! In-memory implementation of ObjectStore for testing
//!
//! Failures can be injected per operation to simulate an unreachable
//! remote bucket.

use async_trait::async_trait;
use bytes::Bytes;
use log::info;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{GalleryError, Result};
use crate::storage::{ObjectStore, SuffixFilter};

/// Operation selector for failure injection and call counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    Put,
    List,
    Get,
    Delete,
}

const ALL_OPS: [MockOp; 4] = [MockOp::Put, MockOp::List, MockOp::Get, MockOp::Delete];

#[derive(Debug, Clone)]
struct StoredObject {
    content_type: String,
    data: Bytes,
}

/// Mock implementation of ObjectStore for testing
#[derive(Default)]
pub struct MockObjectStore {
    // Ordered so listings come back sorted like an S3 bucket
    objects: Mutex<BTreeMap<String, StoredObject>>,
    failing: Mutex<HashSet<MockOp>>,
    calls: Mutex<HashMap<MockOp, usize>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every operation fails, like an unreachable endpoint
    pub fn unreachable() -> Self {
        let store = Self::new();
        for op in ALL_OPS {
            store.fail(op);
        }
        store
    }

    /// Make `op` fail until `recover` is called
    pub fn fail(&self, op: MockOp) {
        lock(&self.failing).insert(op);
    }

    pub fn recover(&self, op: MockOp) {
        lock(&self.failing).remove(&op);
    }

    pub fn recover_all(&self) {
        lock(&self.failing).clear();
    }

    /// Number of times `op` was attempted, failed attempts included
    pub fn call_count(&self, op: MockOp) -> usize {
        lock(&self.calls).get(&op).copied().unwrap_or(0)
    }

    pub fn contains(&self, key: &str) -> bool {
        lock(&self.objects).contains_key(key)
    }

    pub fn object_count(&self) -> usize {
        lock(&self.objects).len()
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        lock(&self.objects).get(key).map(|o| o.content_type.clone())
    }

    pub fn clear(&self) {
        lock(&self.objects).clear();
    }

    fn enter(&self, op: MockOp) -> Result<()> {
        *lock(&self.calls).entry(op).or_insert(0) += 1;
        if lock(&self.failing).contains(&op) {
            return Err(GalleryError::BackendUnavailable(format!(
                "Mock: injected {:?} failure",
                op
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn put(&self, key: &str, content_type: &str, data: Bytes) -> Result<()> {
        self.enter(MockOp::Put)?;
        info!("Mock: stored {} ({} bytes)", key, data.len());
        lock(&self.objects).insert(
            key.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                data,
            },
        );
        Ok(())
    }

    async fn list(&self, filter: &SuffixFilter) -> Result<Vec<String>> {
        self.enter(MockOp::List)?;
        Ok(lock(&self.objects)
            .keys()
            .filter(|key| filter.matches(key))
            .cloned()
            .collect())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        self.enter(MockOp::Get)?;
        lock(&self.objects)
            .get(key)
            .map(|o| o.data.clone())
            .ok_or_else(|| GalleryError::not_found(format!("Object {}", key)))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.enter(MockOp::Delete)?;
        lock(&self.objects).remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MediaKind;

    #[tokio::test]
    async fn test_mock_store_basic_operations() {
        let store = MockObjectStore::new();
        assert_eq!(store.object_count(), 0);

        store.put("b.png", "image/png", Bytes::from_static(b"png")).await.unwrap();
        store.put("a.mp3", "audio/mpeg", Bytes::from_static(b"mp3")).await.unwrap();

        assert!(store.contains("b.png"));
        assert_eq!(store.content_type("a.mp3").as_deref(), Some("audio/mpeg"));
        assert_eq!(store.get("b.png").await.unwrap(), Bytes::from_static(b"png"));
        assert_eq!(store.list(&SuffixFilter::any()).await.unwrap(), vec!["a.mp3", "b.png"]);
        assert_eq!(store.list(&MediaKind::Image.filter()).await.unwrap(), vec!["b.png"]);

        store.delete("b.png").await.unwrap();
        assert!(store.get("b.png").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_injected_failures_and_counters() {
        let store = MockObjectStore::new();
        store.fail(MockOp::Put);

        let err = store.put("a.png", "image/png", Bytes::new()).await.unwrap_err();
        assert!(matches!(err, GalleryError::BackendUnavailable(_)));
        assert!(!store.contains("a.png"));
        assert_eq!(store.call_count(MockOp::Put), 1);

        store.recover(MockOp::Put);
        store.put("a.png", "image/png", Bytes::new()).await.unwrap();
        assert_eq!(store.call_count(MockOp::Put), 2);
    }

    #[tokio::test]
    async fn test_unreachable_fails_everything() {
        let store = MockObjectStore::unreachable();
        assert!(store.list(&SuffixFilter::any()).await.is_err());
        assert!(store.get("x").await.is_err());
        assert!(store.delete("x").await.is_err());

        store.recover_all();
        assert!(store.list(&SuffixFilter::any()).await.unwrap().is_empty());
    }
}
