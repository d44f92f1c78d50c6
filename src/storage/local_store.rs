//! Local directory object storage implementation

use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, info};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{GalleryError, Result};
use crate::storage::{ObjectStore, SuffixFilter};

const TEMP_SUFFIX: &str = ".partial";

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Stores each blob as a plain file named by its key under `root`
///
/// The root directory is created on first write, so a store pointing at a
/// directory that does not exist yet lists as empty.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `key` to a file directly under the root
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty()
            || key == "."
            || key == ".."
            || key.contains('/')
            || key.contains('\\')
            || key.contains('\0')
        {
            return Err(GalleryError::invalid(format!("Invalid object key: {:?}", key)));
        }
        Ok(self.root.join(key))
    }

    async fn ensure_root(&self) -> Result<()> {
        if fs::metadata(&self.root).await.is_err() {
            fs::create_dir_all(&self.root).await?;
            info!("Created local object directory: {}", self.root.display());
        }
        Ok(())
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.root.join(format!(".{}.{}{}", key, n, TEMP_SUFFIX))
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn put(&self, key: &str, _content_type: &str, data: Bytes) -> Result<()> {
        let path = self.path_for(key)?;
        self.ensure_root().await?;

        // Readers only ever see the old file or the complete new one
        let temp = self.temp_path_for(key);
        let written = async {
            let mut file = fs::File::create(&temp).await?;
            file.write_all(&data).await?;
            file.sync_all().await?;
            fs::rename(&temp, &path).await
        }
        .await;
        if let Err(e) = written {
            let _ = fs::remove_file(&temp).await;
            return Err(e.into());
        }

        debug!("Local: stored {} ({} bytes)", key, data.len());
        Ok(())
    }

    async fn list(&self, filter: &SuffixFilter) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name.starts_with('.') && name.ends_with(TEMP_SUFFIX) {
                continue;
            }
            if filter.matches(&name) {
                keys.push(name);
            }
        }
        keys.sort();
        Ok(keys)
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(data) => {
                debug!("Local: read {} ({} bytes)", key, data.len());
                Ok(Bytes::from(data))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Err(GalleryError::not_found(format!("Object {}", key))),
            Err(e) => Err(e.into()),
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!("Local: deleted {}", key);
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MediaKind;
    use tempfile::TempDir;

    fn test_store() -> (LocalObjectStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = LocalObjectStore::new(dir.path().join("uploads"));
        (store, dir)
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let (store, _dir) = test_store();
        let data = Bytes::from_static(b"\x89PNG fake image");

        store.put("a.png", "image/png", data.clone()).await.unwrap();
        assert_eq!(store.get("a.png").await.unwrap(), data);

        store.delete("a.png").await.unwrap();
        assert!(store.get("a.png").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_root_created_on_first_put() {
        let (store, _dir) = test_store();
        assert!(!store.root().exists());
        assert!(store.list(&SuffixFilter::any()).await.unwrap().is_empty());

        store.put("first.jpg", "image/jpeg", Bytes::from_static(b"x")).await.unwrap();
        assert!(store.root().join("first.jpg").is_file());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let (store, _dir) = test_store();
        store.put("k.jpg", "image/jpeg", Bytes::from_static(b"old")).await.unwrap();
        store.put("k.jpg", "image/jpeg", Bytes::from_static(b"new")).await.unwrap();
        assert_eq!(store.get("k.jpg").await.unwrap(), Bytes::from_static(b"new"));
    }

    #[tokio::test]
    async fn test_list_filters_and_sorts() {
        let (store, _dir) = test_store();
        for key in ["b.png", "a.jpg", "song.mp3", "notes.txt", "c.WEBP"] {
            store.put(key, "application/octet-stream", Bytes::from_static(b"x")).await.unwrap();
        }
        std::fs::create_dir_all(store.root().join("nested.png")).unwrap();

        let images = store.list(&MediaKind::Image.filter()).await.unwrap();
        assert_eq!(images, vec!["a.jpg", "b.png", "c.WEBP"]);

        let audio = store.list(&MediaKind::Audio.filter()).await.unwrap();
        assert_eq!(audio, vec!["song.mp3"]);

        let all = store.list(&SuffixFilter::any()).await.unwrap();
        assert_eq!(all.len(), 5);
    }

    #[tokio::test]
    async fn test_delete_missing_is_noop() {
        let (store, _dir) = test_store();
        store.delete("never-existed.png").await.unwrap();
    }

    #[tokio::test]
    async fn test_rejects_path_traversal() {
        let (store, _dir) = test_store();
        let data = Bytes::from_static(b"x");
        for key in ["", ".", "..", "../escape.png", "dir/file.png", "dir\\file.png"] {
            let err = store.put(key, "image/png", data.clone()).await.unwrap_err();
            assert!(matches!(err, GalleryError::Invalid(_)), "key {:?} accepted", key);
        }
    }

    #[tokio::test]
    async fn test_no_partial_files_left_behind() {
        let (store, _dir) = test_store();
        store.put("a.png", "image/png", Bytes::from(vec![7u8; 4096])).await.unwrap();
        let names: Vec<_> = std::fs::read_dir(store.root())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["a.png".to_string()]);
    }
}
