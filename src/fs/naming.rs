//! Filename generation and manipulation.

use regex::Regex;
use url::Url;

use crate::error::{Error, Result};

/// Maximum length of a sanitized title, in characters.
pub const MAX_TITLE_LEN: usize = 64;

/// Validate and sanitize a filename by removing or replacing invalid characters.
///
/// Returns an error if the filename contains path traversal patterns.
pub fn sanitize_filename(name: &str) -> Result<String> {
    if name.contains("..") {
        return Err(Error::InvalidFilename(format!(
            "Path traversal detected: '{}'",
            name
        )));
    }

    if name.contains('/') || name.contains('\\') {
        return Err(Error::InvalidFilename(format!(
            "Path separators not allowed in filename: '{}'",
            name
        )));
    }

    if name.contains('\0') {
        return Err(Error::InvalidFilename(format!(
            "Null bytes not allowed in filename: '{}'",
            name
        )));
    }

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.trim().is_empty() {
        return Err(Error::InvalidFilename(
            "Filename cannot be empty or whitespace-only".to_string(),
        ));
    }

    Ok(sanitized)
}

/// Turn a submission title into a directory-safe fragment.
///
/// Runs of anything but word characters and `-` become a single `_`, leading
/// and trailing `_`/spaces are stripped, and the result is capped at
/// [`MAX_TITLE_LEN`] characters.
pub fn sanitize_title(title: &str) -> String {
    let pattern = Regex::new(r"[^\w\-]+").unwrap();
    let replaced = pattern.replace_all(title, "_");
    let trimmed = replaced.trim_matches(&['_', ' '][..]);

    trimmed.chars().take(MAX_TITLE_LEN).collect()
}

/// Filename for one entry of an ordered set: `{index:03}_{id}{ext}`.
pub fn ordinal_filename(index: usize, id: &str, extension: &str) -> String {
    format!("{:03}_{}{}", index, id, extension)
}

/// Last path segment of a URL, if it is a usable filename.
pub fn filename_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segment = parsed.path_segments()?.last()?;
    if segment.is_empty() {
        return None;
    }
    sanitize_filename(segment).ok()
}

/// Filename stem: the name without its last extension.
pub fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(dot) => &name[..dot],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename_valid() {
        assert_eq!(sanitize_filename("image.jpg").unwrap(), "image.jpg");
        assert_eq!(sanitize_filename("a:b?.png").unwrap(), "a_b_.png");
    }

    #[test]
    fn test_sanitize_filename_rejects_traversal() {
        assert!(sanitize_filename("../etc/passwd").is_err());
        assert!(sanitize_filename("a/b.jpg").is_err());
        assert!(sanitize_filename("a\\b.jpg").is_err());
        assert!(sanitize_filename("   ").is_err());
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("Hello, World!"), "Hello_World");
        assert_eq!(sanitize_title("  [OC] my-cat's face  "), "OC_my-cat_s_face");
        assert_eq!(sanitize_title("Ünïcödé wörds"), "Ünïcödé_wörds");
        assert_eq!(sanitize_title("???"), "");

        let long = "a".repeat(100);
        assert_eq!(sanitize_title(&long).chars().count(), MAX_TITLE_LEN);
    }

    #[test]
    fn test_ordinal_filename() {
        assert_eq!(ordinal_filename(0, "abc", ".jpg"), "000_abc.jpg");
        assert_eq!(ordinal_filename(12, "x", ".mp4"), "012_x.mp4");
        assert_eq!(ordinal_filename(1234, "x", ""), "1234_x");
    }

    #[test]
    fn test_filename_from_url() {
        assert_eq!(
            filename_from_url("https://i.redd.it/abc.jpg?width=1").as_deref(),
            Some("abc.jpg")
        );
        assert_eq!(filename_from_url("https://example.com/"), None);
        assert_eq!(filename_from_url("https://example.com/%2E%2E"), None);
        assert_eq!(filename_from_url("garbage"), None);
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("clip.mp4"), "clip");
        assert_eq!(file_stem("SomeCat"), "SomeCat");
        assert_eq!(file_stem(".hidden"), ".hidden");
    }
}
