//! Photos, music, comments and likes

use bytes::Bytes;
use log::info;
use std::sync::Arc;

use crate::error::{GalleryError, Result};
use crate::records::{Comment, CommentStore, LikeStore, LikeToggle};
use crate::service::{validate_upload, MediaFile};
use crate::storage::key::normalize_key_now;
use crate::storage::{FallbackObjectStore, MediaKind, ObjectStore};

pub struct GalleryService {
    objects: Arc<FallbackObjectStore>,
    comments: Arc<CommentStore>,
    likes: Arc<LikeStore>,
    max_upload_bytes: usize,
}

impl GalleryService {
    pub fn new(
        objects: Arc<FallbackObjectStore>,
        comments: Arc<CommentStore>,
        likes: Arc<LikeStore>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            objects,
            comments,
            likes,
            max_upload_bytes,
        }
    }

    /// Store an image under a freshly normalized key and return the key
    pub async fn upload_photo(&self, file_name: &str, content_type: &str, data: Bytes) -> Result<String> {
        validate_upload(MediaKind::Image, content_type, &data, self.max_upload_bytes)?;
        let key = normalize_key_now(file_name);
        let size = data.len();
        self.objects.put(&key, content_type, data).await?;
        info!("Photo uploaded: {} ({} bytes)", key, size);
        Ok(key)
    }

    /// Store a music track, replacing whatever track existed before
    pub async fn upload_music(&self, file_name: &str, content_type: &str, data: Bytes) -> Result<String> {
        validate_upload(MediaKind::Audio, content_type, &data, self.max_upload_bytes)?;
        let key = normalize_key_now(file_name);
        let size = data.len();
        self.objects
            .replace_all_matching(&MediaKind::Audio.filter(), &key, content_type, data)
            .await?;
        info!("Music uploaded: {} ({} bytes)", key, size);
        Ok(key)
    }

    pub async fn list_images(&self) -> Result<Vec<String>> {
        self.objects.list(&MediaKind::Image.filter()).await
    }

    pub async fn list_music(&self) -> Result<Vec<String>> {
        let mut keys = self.objects.list(&MediaKind::Audio.filter()).await?;
        keys.sort();
        Ok(keys)
    }

    pub async fn fetch_media(&self, key: &str) -> Result<MediaFile> {
        let data = self.objects.get(key).await?;
        Ok(MediaFile::new(key, data))
    }

    /// Delete an image together with its comments and likes
    pub async fn delete_image(&self, key: &str) -> Result<()> {
        require_kind(MediaKind::Image, key)?;
        self.objects.delete(key).await?;
        let comments = self.comments.delete_all_by_photo(key)?;
        let likes = self.likes.delete_all_by_photo(key)?;
        info!("Photo deleted: {} ({} comments, {} likes)", key, comments, likes);
        Ok(())
    }

    pub async fn delete_music(&self, key: &str) -> Result<()> {
        require_kind(MediaKind::Audio, key)?;
        self.objects.delete(key).await?;
        info!("Music deleted: {}", key);
        Ok(())
    }

    pub fn add_comment(&self, photo_name: &str, comment_text: &str, author_name: &str) -> Result<Comment> {
        self.comments.add(photo_name, comment_text, author_name)
    }

    /// Newest first, as shown under a photo
    pub fn comments_for(&self, photo_name: &str) -> Vec<Comment> {
        self.comments.list_by_photo_newest_first(photo_name)
    }

    pub fn comment_count(&self, photo_name: &str) -> usize {
        self.comments.count_by_photo(photo_name)
    }

    pub fn delete_comment(&self, id: u64) -> Result<()> {
        self.comments.delete_by_id(id)
    }

    pub fn toggle_like(&self, photo_name: &str, user_name: &str) -> Result<LikeToggle> {
        self.likes.toggle(photo_name, user_name)
    }

    pub fn has_liked(&self, photo_name: &str, user_name: &str) -> bool {
        self.likes.has_liked(photo_name, user_name)
    }

    pub fn like_count(&self, photo_name: &str) -> usize {
        self.likes.count_by_photo(photo_name)
    }
}

fn require_kind(kind: MediaKind, key: &str) -> Result<()> {
    if kind.matches(key) {
        Ok(())
    } else {
        Err(GalleryError::invalid(format!("{} is not an {} file", key, kind)))
    }
}
