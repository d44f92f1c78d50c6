//! Service layer called by the HTTP glue
//!
//! `GalleryService` covers photos, music, comments and likes;
//! `AccountService` covers signup, login and profile pictures. Both return
//! plain values or a `GalleryError`, which the glue renders through its
//! `ResponseError` impl.

pub mod account_service;
pub mod gallery_service;

use actix_web::http::header::CONTENT_DISPOSITION;
use actix_web::HttpResponse;
use bytes::Bytes;

use crate::error::{GalleryError, Result};
use crate::storage::media::{content_type_for_key, inline_disposition};
use crate::storage::MediaKind;

pub use account_service::AccountService;
pub use gallery_service::GalleryService;

/// A stored blob ready to be served inline
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub key: String,
    pub content_type: &'static str,
    pub content_disposition: String,
    pub data: Bytes,
}

impl MediaFile {
    pub fn new(key: &str, data: Bytes) -> Self {
        Self {
            key: key.to_string(),
            content_type: content_type_for_key(key),
            content_disposition: inline_disposition(key),
            data,
        }
    }

    pub fn into_response(self) -> HttpResponse {
        HttpResponse::Ok()
            .content_type(self.content_type)
            .insert_header((CONTENT_DISPOSITION, self.content_disposition))
            .body(self.data)
    }
}

/// Reject uploads that are empty, too large or of the wrong media kind
pub(crate) fn validate_upload(kind: MediaKind, content_type: &str, data: &Bytes, max_bytes: usize) -> Result<()> {
    if data.is_empty() {
        return Err(GalleryError::invalid("Uploaded file is empty"));
    }
    if data.len() > max_bytes {
        return Err(GalleryError::invalid(format!(
            "File size {} exceeds the limit of {} bytes",
            data.len(),
            max_bytes
        )));
    }
    if !kind.accepts_content_type(content_type) {
        return Err(GalleryError::invalid(format!(
            "Only {} files are allowed, got {:?}",
            kind, content_type
        )));
    }
    Ok(())
}
