//! Guestbook-style messages (`messages.json`)

use log::info;
use std::path::Path;

use crate::error::{GalleryError, Result};
use crate::records::{required, Message, RecordStore};

pub struct MessageStore {
    records: RecordStore<Message>,
}

impl MessageStore {
    pub fn open(data_dir: &Path) -> Result<Self> {
        Ok(Self {
            records: RecordStore::open(data_dir.join("messages.json"))?,
        })
    }

    pub fn create(&self, content: &str) -> Result<Message> {
        let content = required("Message content", content)?;
        let message = self.records.append(Message::new(content))?;
        info!("Message {} saved", message.id);
        Ok(message)
    }

    pub fn list_all(&self) -> Vec<Message> {
        self.records.load_all()
    }

    /// Most recently appended message
    pub fn latest(&self) -> Result<Message> {
        self.records
            .load_all()
            .pop()
            .ok_or_else(|| GalleryError::not_found("No messages"))
    }
}
