//! Record Storage Layer
//!
//! Small file-backed collections (comments, likes, users, messages) kept as
//! one JSON array per collection. `RecordStore` provides the generic
//! locked read-modify-write cycle; the domain stores add validation and
//! queries on top of it.

pub mod comment_store;
pub mod like_store;
pub mod message_store;
pub mod models;
pub mod record_store;
pub mod user_store;


use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{GalleryError, Result};

pub use comment_store::CommentStore;
pub use like_store::{LikeStore, LikeToggle};
pub use message_store::MessageStore;
pub use models::{Comment, Like, Message, NewUser, User, UserProfile};
pub use record_store::{Batch, RecordStore};
pub use user_store::UserStore;

/// An entry of a `RecordStore` collection
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    fn id(&self) -> u64;

    /// Assign the allocated id and creation time on insert
    fn stamp(&mut self, id: u64, now: DateTime<Utc>);
}

/// Trim `value`, failing with `Invalid` when nothing is left
pub(crate) fn required(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GalleryError::invalid(format!("{} is required", field)));
    }
    Ok(trimmed.to_string())
}
