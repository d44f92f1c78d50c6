//! Binary Object Storage Layer
//!
//! This module provides the object store abstraction used for gallery media.
//! Blobs are addressed by a normalized key and can live in an S3-compatible
//! bucket, in a local directory, or in memory (tests). `FallbackObjectStore`
//! composes a remote and a local backend so uploads keep working while the
//! remote is unreachable.

pub mod config;
pub mod fallback_store;
pub mod key;
pub mod local_store;
pub mod media;
pub mod mock_store;
pub mod remote_store;
pub mod sigv4;


use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

pub use fallback_store::FallbackObjectStore;
pub use local_store::LocalObjectStore;
pub use media::{MediaKind, SuffixFilter};
pub use mock_store::MockObjectStore;
pub use remote_store::RemoteObjectStore;

/// Trait defining the object storage interface
///
/// Keys are already normalized by the caller; stores never see raw upload
/// filenames. Implementations must be safe to share across request handlers.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Short backend name used in log lines
    fn name(&self) -> &'static str;

    /// Store a blob, overwriting any blob with the same key
    async fn put(&self, key: &str, content_type: &str, data: Bytes) -> Result<()>;

    /// List keys accepted by `filter`, in the backend's key order
    async fn list(&self, filter: &SuffixFilter) -> Result<Vec<String>>;

    /// Fetch a blob; `GalleryError::NotFound` when the key does not exist
    async fn get(&self, key: &str) -> Result<Bytes>;

    /// Delete a blob
    async fn delete(&self, key: &str) -> Result<()>;
}
