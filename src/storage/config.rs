//! Configuration for object storage backends

use crate::error::Result;
use crate::storage::{FallbackObjectStore, LocalObjectStore, MockObjectStore, ObjectStore, RemoteObjectStore};
use log::{info, warn};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;

/// Available object storage backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Remote bucket with local directory fallback
    Fallback,
    /// Local directory only
    Local,
    /// In-memory remote with local directory fallback
    Mock,
}

impl Default for StorageBackend {
    fn default() -> Self {
        StorageBackend::Fallback
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fallback" | "remote" | "s3" | "r2" => Ok(StorageBackend::Fallback),
            "local" => Ok(StorageBackend::Local),
            "mock" => Ok(StorageBackend::Mock),
            _ => Err(format!("Unknown storage backend: {}", s)),
        }
    }
}

/// Connection settings for the S3-compatible bucket
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            bucket: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            region: "us-east-1".to_string(),
            timeout_secs: 10,
        }
    }
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("endpoint", &self.endpoint)
            .field("bucket", &self.bucket)
            .field("access_key", &self.access_key)
            .field("region", &self.region)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl RemoteConfig {
    pub fn is_configured(&self) -> bool {
        !self.endpoint.trim().is_empty() && !self.bucket.trim().is_empty()
    }
}

/// Configuration for the gallery's object store
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub local_root: PathBuf,
    pub remote: RemoteConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            local_root: PathBuf::from("uploads"),
            remote: RemoteConfig::default(),
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl StorageConfig {
    /// Defaults overlaid with environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields from `STORAGE_BACKEND`, `UPLOAD_DIR` and the `S3_*`
    /// variables; invalid values are logged and ignored
    pub fn apply_env(&mut self) {
        if let Some(backend_str) = env_string("STORAGE_BACKEND") {
            match backend_str.parse::<StorageBackend>() {
                Ok(backend) => {
                    info!("Using storage backend from environment: {:?}", backend);
                    self.backend = backend;
                }
                Err(e) => warn!("Invalid storage backend in environment: {}. Using {:?}.", e, self.backend),
            }
        }
        if let Some(dir) = env_string("UPLOAD_DIR") {
            self.local_root = PathBuf::from(dir);
        }
        if let Some(endpoint) = env_string("S3_ENDPOINT") {
            self.remote.endpoint = endpoint;
        }
        if let Some(bucket) = env_string("S3_BUCKET") {
            self.remote.bucket = bucket;
        }
        if let Some(access_key) = env_string("S3_ACCESS_KEY") {
            self.remote.access_key = access_key;
        }
        if let Some(secret_key) = env_string("S3_SECRET_KEY") {
            self.remote.secret_key = secret_key;
        }
        if let Some(region) = env_string("S3_REGION") {
            self.remote.region = region;
        }
        if let Some(timeout) = env_string("S3_TIMEOUT_SECS") {
            match timeout.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.remote.timeout_secs = secs,
                _ => warn!("Invalid S3_TIMEOUT_SECS {:?}, keeping {}s", timeout, self.remote.timeout_secs),
            }
        }
    }

    /// Create the object store described by this configuration
    ///
    /// A missing remote endpoint or bucket degrades to local-only storage
    /// instead of failing startup.
    pub fn create_store(&self) -> Result<FallbackObjectStore> {
        let local: Arc<dyn ObjectStore> = Arc::new(LocalObjectStore::new(&self.local_root));
        match self.backend {
            StorageBackend::Local => Ok(FallbackObjectStore::local_only(local)),
            StorageBackend::Mock => Ok(FallbackObjectStore::new(Arc::new(MockObjectStore::new()), local)),
            StorageBackend::Fallback if !self.remote.is_configured() => {
                warn!("S3 endpoint or bucket not configured, storing media locally only");
                Ok(FallbackObjectStore::local_only(local))
            }
            StorageBackend::Fallback => {
                let remote = RemoteObjectStore::new(&self.remote)?;
                Ok(FallbackObjectStore::new(Arc::new(remote), local))
            }
        }
    }
}
