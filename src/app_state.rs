//! Application State Management
//!
//! This module provides the application state that contains all services
//! and their dependencies, following the dependency injection pattern.

use actix_web::web;
use log::info;
use std::path::Path;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::Result;
use crate::records::{CommentStore, LikeStore, MessageStore, UserStore};
use crate::service::{AccountService, GalleryService};
use crate::storage::{FallbackObjectStore, LocalObjectStore, MockObjectStore};

/// Application state containing all services and their dependencies
#[derive(Clone)]
pub struct AppState {
    pub gallery: Arc<GalleryService>,
    pub accounts: Arc<AccountService>,
    pub messages: Arc<MessageStore>,
    pub objects: Arc<FallbackObjectStore>,
    pub config: AppConfig,
}

impl AppState {
    /// Load `config.yaml` plus environment overrides and build the state
    pub fn new() -> Result<Self> {
        Self::from_config(AppConfig::load()?)
    }

    /// Create application state from configuration
    pub fn from_config(config: AppConfig) -> Result<Self> {
        info!("Initializing application state with configuration");
        let objects = Arc::new(config.storage.create_store()?);
        let state = Self::assemble(objects, config)?;
        info!("Application state initialized successfully");
        Ok(state)
    }

    /// Same service graph over an in-memory remote and directories under `dir`
    pub fn for_testing(dir: &Path) -> Result<(Self, Arc<MockObjectStore>)> {
        let mut config = AppConfig::default();
        config.storage.local_root = dir.join("uploads");
        config.records.data_dir = dir.join("data");
        config.uploads.profile_picture_dir = dir.join("profile-pictures");

        let remote = Arc::new(MockObjectStore::new());
        let local = Arc::new(LocalObjectStore::new(&config.storage.local_root));
        let objects = Arc::new(FallbackObjectStore::new(remote.clone(), local));
        Ok((Self::assemble(objects, config)?, remote))
    }

    fn assemble(objects: Arc<FallbackObjectStore>, config: AppConfig) -> Result<Self> {
        let data_dir = &config.records.data_dir;
        info!("Record collections in {}", data_dir.display());

        let comments = Arc::new(CommentStore::open(data_dir)?);
        let likes = Arc::new(LikeStore::open(data_dir)?);
        let users = Arc::new(UserStore::open(data_dir)?);
        let messages = Arc::new(MessageStore::open(data_dir)?);
        let pictures = Arc::new(LocalObjectStore::new(&config.uploads.profile_picture_dir));

        let gallery = Arc::new(GalleryService::new(
            objects.clone(),
            comments,
            likes,
            config.uploads.max_upload_bytes,
        ));
        let accounts = Arc::new(AccountService::new(
            users,
            pictures,
            config.uploads.max_profile_picture_bytes,
        ));

        Ok(Self {
            gallery,
            accounts,
            messages,
            objects,
            config,
        })
    }
}

/// Helper function to extract app state from Actix-web data
pub fn extract_app_state(data: &web::Data<AppState>) -> &AppState {
    data.as_ref()
}
