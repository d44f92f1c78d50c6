//! Media kinds, suffix allow-lists and content type inference

use std::fmt;

use crate::storage::key::{percent_encode, EncodeSet};

const IMAGE_SUFFIXES: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
const AUDIO_SUFFIXES: &[&str] = &["mp3", "wav", "m4a"];

/// Kind of media the gallery accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Audio,
}

impl MediaKind {
    pub fn suffixes(self) -> &'static [&'static str] {
        match self {
            MediaKind::Image => IMAGE_SUFFIXES,
            MediaKind::Audio => AUDIO_SUFFIXES,
        }
    }

    pub fn filter(self) -> SuffixFilter {
        SuffixFilter::new(self.suffixes())
    }

    /// Whether `key` ends with one of this kind's extensions
    pub fn matches(self, key: &str) -> bool {
        self.filter().matches(key)
    }

    /// Whether an upload's declared content type belongs to this kind
    pub fn accepts_content_type(self, content_type: &str) -> bool {
        let prefix = match self {
            MediaKind::Image => "image/",
            MediaKind::Audio => "audio/",
        };
        content_type.trim().to_ascii_lowercase().starts_with(prefix)
    }

    pub fn of_key(key: &str) -> Option<MediaKind> {
        [MediaKind::Image, MediaKind::Audio]
            .into_iter()
            .find(|kind| kind.matches(key))
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Audio => write!(f, "audio"),
        }
    }
}

/// Extension allow-list used by `ObjectStore::list`
///
/// An empty list accepts every key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuffixFilter {
    suffixes: &'static [&'static str],
}

impl SuffixFilter {
    pub const fn new(suffixes: &'static [&'static str]) -> Self {
        Self { suffixes }
    }

    pub const fn any() -> Self {
        Self { suffixes: &[] }
    }

    pub fn matches(&self, key: &str) -> bool {
        if self.suffixes.is_empty() {
            return true;
        }
        match extension(key) {
            Some(ext) => self.suffixes.iter().any(|s| s.eq_ignore_ascii_case(ext)),
            None => false,
        }
    }
}

fn extension(key: &str) -> Option<&str> {
    key.rfind('.').map(|idx| &key[idx + 1..]).filter(|ext| !ext.is_empty())
}

/// Content type served for a stored key, inferred from its extension
pub fn content_type_for_key(key: &str) -> &'static str {
    match extension(key).map(|ext| ext.to_ascii_lowercase()).as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("m4a") => "audio/mp4",
        _ => "image/jpeg",
    }
}

/// `Content-Disposition` value for serving a blob inline
pub fn inline_disposition(key: &str) -> String {
    format!("inline; filename=\"{}\"", percent_encode(key, EncodeSet::Form))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_matching_is_case_insensitive() {
        assert!(MediaKind::Image.matches("sunset_1700000000000.JPG"));
        assert!(MediaKind::Image.matches("a.webp"));
        assert!(MediaKind::Audio.matches("song.M4A"));
        assert!(!MediaKind::Image.matches("song.mp3"));
        assert!(!MediaKind::Audio.matches("notes.txt"));
        assert!(!MediaKind::Image.matches("png"));
        assert!(!MediaKind::Image.matches("trailing."));
    }

    #[test]
    fn test_any_filter_accepts_everything() {
        let filter = SuffixFilter::any();
        assert!(filter.matches("README"));
        assert!(filter.matches("x.bin"));
    }

    #[test]
    fn test_of_key() {
        assert_eq!(MediaKind::of_key("a.gif"), Some(MediaKind::Image));
        assert_eq!(MediaKind::of_key("a.wav"), Some(MediaKind::Audio));
        assert_eq!(MediaKind::of_key("a.pdf"), None);
    }

    #[test]
    fn test_content_type_acceptance() {
        assert!(MediaKind::Image.accepts_content_type("image/png"));
        assert!(MediaKind::Image.accepts_content_type("Image/JPEG"));
        assert!(!MediaKind::Image.accepts_content_type("audio/mpeg"));
        assert!(MediaKind::Audio.accepts_content_type("audio/mpeg"));
        assert!(!MediaKind::Audio.accepts_content_type("application/octet-stream"));
    }

    #[test]
    fn test_content_type_for_key() {
        assert_eq!(content_type_for_key("a.png"), "image/png");
        assert_eq!(content_type_for_key("a.PNG"), "image/png");
        assert_eq!(content_type_for_key("a.jpeg"), "image/jpeg");
        assert_eq!(content_type_for_key("a.mp3"), "audio/mpeg");
        assert_eq!(content_type_for_key("a.wav"), "audio/wav");
        assert_eq!(content_type_for_key("a.m4a"), "audio/mp4");
        assert_eq!(content_type_for_key("unknown"), "image/jpeg");
    }

    #[test]
    fn test_inline_disposition() {
        assert_eq!(
            inline_disposition("sunset_1.jpg"),
            "inline; filename=\"sunset_1.jpg\""
        );
        assert_eq!(inline_disposition("a b&c"), "inline; filename=\"a+b%26c\"");
    }
}
