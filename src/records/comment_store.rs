//! Photo comments (`comments.json`)

use log::info;
use std::path::Path;

use crate::error::{GalleryError, Result};
use crate::records::{required, Comment, RecordStore};

pub const MAX_COMMENT_CHARS: usize = 1000;

pub struct CommentStore {
    records: RecordStore<Comment>,
}

impl CommentStore {
    pub fn open(data_dir: &Path) -> Result<Self> {
        Ok(Self {
            records: RecordStore::open(data_dir.join("comments.json"))?,
        })
    }

    pub fn add(&self, photo_name: &str, comment_text: &str, author_name: &str) -> Result<Comment> {
        let photo_name = required("Photo name", photo_name)?;
        let comment_text = required("Comment text", comment_text)?;
        let author_name = required("Author name", author_name)?;
        if comment_text.chars().count() > MAX_COMMENT_CHARS {
            return Err(GalleryError::invalid(format!(
                "Comment text exceeds {} characters",
                MAX_COMMENT_CHARS
            )));
        }

        let comment = self.records.append(Comment::new(photo_name, comment_text, author_name))?;
        info!("Comment {} added to {} by {}", comment.id, comment.photo_name, comment.author_name);
        Ok(comment)
    }

    /// Comments on `photo_name`, oldest first
    pub fn list_by_photo(&self, photo_name: &str) -> Vec<Comment> {
        let photo_name = photo_name.trim();
        self.records.filter(|c| c.photo_name == photo_name)
    }

    pub fn list_by_photo_newest_first(&self, photo_name: &str) -> Vec<Comment> {
        let mut comments = self.list_by_photo(photo_name);
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        comments
    }

    pub fn count_by_photo(&self, photo_name: &str) -> usize {
        let photo_name = photo_name.trim();
        self.records.count(|c| c.photo_name == photo_name)
    }

    pub fn delete_by_id(&self, id: u64) -> Result<()> {
        match self.records.remove_where(|c| c.id == id)? {
            0 => Err(GalleryError::not_found(format!("Comment {}", id))),
            _ => {
                info!("Comment {} deleted", id);
                Ok(())
            }
        }
    }

    /// Cascade used when a photo is removed; returns how many were deleted
    pub fn delete_all_by_photo(&self, photo_name: &str) -> Result<usize> {
        let photo_name = photo_name.trim();
        let removed = self.records.remove_where(|c| c.photo_name == photo_name)?;
        if removed > 0 {
            info!("Deleted {} comments on {}", removed, photo_name);
        }
        Ok(removed)
    }
}
