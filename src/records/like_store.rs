//! Photo likes (`likes.json`)
//!
//! At most one like exists per (photo, user) pair. Every mutation checks the
//! current state and changes it inside the same collection transaction.

use log::info;
use serde::Serialize;
use std::path::Path;

use crate::error::Result;
use crate::records::{required, Like, RecordStore};

/// Outcome of `LikeStore::toggle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeToggle {
    pub liked: bool,
    pub count: usize,
}

pub struct LikeStore {
    records: RecordStore<Like>,
}

impl LikeStore {
    pub fn open(data_dir: &Path) -> Result<Self> {
        Ok(Self {
            records: RecordStore::open(data_dir.join("likes.json"))?,
        })
    }

    pub fn list_by_photo(&self, photo_name: &str) -> Vec<Like> {
        let photo_name = photo_name.trim();
        self.records.filter(|l| l.photo_name == photo_name)
    }

    pub fn count_by_photo(&self, photo_name: &str) -> usize {
        let photo_name = photo_name.trim();
        self.records.count(|l| l.photo_name == photo_name)
    }

    pub fn has_liked(&self, photo_name: &str, user_name: &str) -> bool {
        let (photo_name, user_name) = (photo_name.trim(), user_name.trim());
        self.records.find(|l| l.is_pair(photo_name, user_name)).is_some()
    }

    /// Like if not yet liked, otherwise unlike; returns the new state and
    /// the photo's resulting like count
    pub fn toggle(&self, photo_name: &str, user_name: &str) -> Result<LikeToggle> {
        let photo_name = required("Photo name", photo_name)?;
        let user_name = required("User name", user_name)?;

        let outcome = self.records.transact(|batch| {
            // Removing every match also heals duplicates left by older files
            let removed = batch.remove_where(|l| l.is_pair(&photo_name, &user_name));
            if removed == 0 {
                batch.insert(Like::new(photo_name.as_str(), user_name.as_str()));
            }
            Ok(LikeToggle {
                liked: removed == 0,
                count: batch.iter().filter(|l| l.photo_name == photo_name).count(),
            })
        })?;

        info!(
            "{} {} {} ({} likes)",
            user_name,
            if outcome.liked { "liked" } else { "unliked" },
            photo_name,
            outcome.count
        );
        Ok(outcome)
    }

    /// Idempotent like: returns the existing like when the pair is present
    pub fn like(&self, photo_name: &str, user_name: &str) -> Result<Like> {
        let photo_name = required("Photo name", photo_name)?;
        let user_name = required("User name", user_name)?;
        self.records.transact(|batch| {
            if let Some(existing) = batch.find(|l| l.is_pair(&photo_name, &user_name)) {
                return Ok(existing.clone());
            }
            Ok(batch.insert(Like::new(photo_name.as_str(), user_name.as_str())))
        })
    }

    /// Returns whether a like was removed
    pub fn unlike(&self, photo_name: &str, user_name: &str) -> Result<bool> {
        let photo_name = required("Photo name", photo_name)?;
        let user_name = required("User name", user_name)?;
        let removed = self.records.remove_where(|l| l.is_pair(&photo_name, &user_name))?;
        Ok(removed > 0)
    }

    pub fn delete_all_by_photo(&self, photo_name: &str) -> Result<usize> {
        let photo_name = photo_name.trim();
        let removed = self.records.remove_where(|l| l.photo_name == photo_name)?;
        if removed > 0 {
            info!("Deleted {} likes on {}", removed, photo_name);
        }
        Ok(removed)
    }
}
