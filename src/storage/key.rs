//! Object key normalization
//!
//! Upload filenames become store keys by collapsing whitespace runs to `_`,
//! dropping every character outside `[A-Za-z0-9._-]` (which also drops all
//! non-ASCII text) and inserting `_<unix millis>` before the extension.

use chrono::Utc;

/// Normalize `original` into a store key stamped with `timestamp_millis`
pub fn normalize_key(original: &str, timestamp_millis: i64) -> String {
    let cleaned = sanitize(original);
    let (base, extension) = split_extension(&cleaned);
    format!("{}_{}{}", base, timestamp_millis, extension)
}

/// Normalize `original` with the current wall-clock time
pub fn normalize_key_now(original: &str) -> String {
    normalize_key(original, Utc::now().timestamp_millis())
}

/// Remove the `_<digits>` stamp inserted by `normalize_key`, if present
pub fn strip_timestamp(key: &str) -> String {
    let (base, extension) = split_extension(key);
    let stripped = match base.rfind('_') {
        Some(idx) => {
            let digits = &base[idx + 1..];
            if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                &base[..idx]
            } else {
                base
            }
        }
        None => base,
    };
    format!("{}{}", stripped, extension)
}

/// Whitespace collapse followed by the character allow-list
pub fn sanitize(original: &str) -> String {
    let mut out = String::with_capacity(original.len());
    let mut in_whitespace = false;
    for c in original.chars() {
        if is_filename_whitespace(c) {
            if !in_whitespace {
                out.push('_');
                in_whitespace = true;
            }
            continue;
        }
        in_whitespace = false;
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            out.push(c);
        }
    }
    out
}

fn is_filename_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0B' | '\x0C' | '\r')
}

fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) => (&name[..idx], &name[idx..]),
        None => (name, ""),
    }
}

/// Which bytes `percent_encode` leaves alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeSet {
    /// RFC 3986 unreserved characters only, as SigV4 requires
    Component,
    /// `Component` but `/` is kept
    Path,
    /// `application/x-www-form-urlencoded`: space becomes `+`, `*` is kept
    Form,
}

pub fn percent_encode(value: &str, set: EncodeSet) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match (byte, set) {
            (b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_', _) => out.push(byte as char),
            (b'~', EncodeSet::Component | EncodeSet::Path) => out.push('~'),
            (b'/', EncodeSet::Path) => out.push('/'),
            (b'*', EncodeSet::Form) => out.push('*'),
            (b' ', EncodeSet::Form) => out.push('+'),
            (other, _) => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize_key("sunset.jpg", 1700000000000), "sunset_1700000000000.jpg");
        assert_eq!(normalize_key("My Summer  Photo.png", 42), "My_Summer_Photo_42.png");
        assert_eq!(normalize_key("tab\tand\nnewline.gif", 7), "tab_and_newline_7.gif");
    }

    #[test]
    fn test_normalize_strips_special_and_non_ascii() {
        assert_eq!(normalize_key("résumé (1).jpg", 5), "rsum_1_5.jpg");
        assert_eq!(normalize_key("日本.png", 5), "_5.png");
        assert_eq!(normalize_key("a/../b.png", 5), "a..b_5.png");
    }

    #[test]
    fn test_normalize_extension_handling() {
        assert_eq!(normalize_key("archive.tar.gz", 9), "archive.tar_9.gz");
        assert_eq!(normalize_key("noextension", 9), "noextension_9");
        assert_eq!(normalize_key("", 9), "_9");
    }

    #[test]
    fn test_strip_timestamp() {
        assert_eq!(strip_timestamp("sunset_1700000000000.jpg"), "sunset.jpg");
        assert_eq!(strip_timestamp("noextension_9"), "noextension");
        assert_eq!(strip_timestamp("plain.jpg"), "plain.jpg");
        assert_eq!(strip_timestamp("under_score.jpg"), "under_score.jpg");
    }

    #[test]
    fn test_normalization_idempotent_modulo_timestamp() {
        let names = [
            "sunset.jpg",
            "My Summer  Photo.png",
            "photo_123.jpg",
            "résumé (final).webp",
            "archive.tar.gz",
            "noextension",
            ".png",
            "  leading and trailing  .mp3",
            "",
        ];
        for name in names {
            let once = strip_timestamp(&normalize_key(name, 1700000000000));
            let twice = strip_timestamp(&normalize_key(&once, 1700000000999));
            assert_eq!(once, twice, "normalization of {:?} is not stable", name);
        }
    }

    #[test]
    fn test_normalize_now_is_unique_per_millisecond() {
        let key = normalize_key_now("a.png");
        assert!(key.starts_with("a_"));
        assert!(key.ends_with(".png"));
        assert_eq!(strip_timestamp(&key), "a.png");
    }

    #[test]
    fn test_percent_encode_sets() {
        assert_eq!(percent_encode("a b/c~d*", EncodeSet::Path), "a%20b/c~d%2A");
        assert_eq!(percent_encode("a b/c~d*", EncodeSet::Component), "a%20b%2Fc~d%2A");
        assert_eq!(percent_encode("a b/c~d*", EncodeSet::Form), "a+b%2Fc%7Ed*");
        assert_eq!(percent_encode("é", EncodeSet::Component), "%C3%A9");
    }
}
