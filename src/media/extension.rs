//! File extension helpers.
//!
//! Extensions returned here always carry the leading dot (`.jpg`).

use url::Url;

/// Longest extension accepted from a URL path, dot included.
const MAX_URL_EXTENSION_LEN: usize = 5;

/// Extension for a mimetype, e.g. `image/png` -> `.png`.
///
/// Reddit reports JPEGs as `image/jpg`, which is not a registered type, so
/// JPEG variants are mapped explicitly.
pub fn extension_for_mime(mime: &str) -> Option<String> {
    let mime = mime.split(';').next().unwrap_or("").trim().to_lowercase();
    let subtype = mime.split('/').nth(1)?;

    match mime.as_str() {
        "image/jpeg" | "image/jpg" | "image/pjpeg" => return Some(".jpg".to_string()),
        "video/quicktime" => return Some(".mov".to_string()),
        "audio/mp4" => return Some(".m4a".to_string()),
        _ => {}
    }

    let known = mime_guess::get_mime_extensions_str(&mime).unwrap_or(&[]);
    if known.contains(&subtype) {
        return Some(format!(".{}", subtype));
    }
    if let Some(first) = known.first() {
        return Some(format!(".{}", first));
    }

    None
}

/// Extension of the last path segment of a URL, lowercased.
///
/// Query strings and fragments are ignored. Returns `None` for malformed
/// URLs and for "extensions" too long to be real.
pub fn extension_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let filename = parsed.path_segments()?.last()?;
    let dot = filename.rfind('.')?;
    let ext = &filename[dot..];

    if ext.len() < 2 || ext.len() > MAX_URL_EXTENSION_LEN {
        return None;
    }
    if !ext[1..].chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    Some(ext.to_lowercase())
}

/// Coarse fallback by mime family.
pub fn default_extension(mime: &str) -> &'static str {
    if mime.contains("image") {
        ".jpg"
    } else if mime.contains("video") {
        ".mp4"
    } else {
        ".bin"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for_mime() {
        assert_eq!(extension_for_mime("image/jpeg").as_deref(), Some(".jpg"));
        assert_eq!(extension_for_mime("image/jpg").as_deref(), Some(".jpg"));
        assert_eq!(extension_for_mime("image/png").as_deref(), Some(".png"));
        assert_eq!(extension_for_mime("image/gif").as_deref(), Some(".gif"));
        assert_eq!(extension_for_mime("video/mp4").as_deref(), Some(".mp4"));
        assert_eq!(extension_for_mime("image/webp; charset=x").as_deref(), Some(".webp"));
        assert_eq!(extension_for_mime("nonsense"), None);
    }

    #[test]
    fn test_extension_from_url() {
        assert_eq!(
            extension_from_url("https://i.redd.it/abc.JPG?width=640").as_deref(),
            Some(".jpg")
        );
        assert_eq!(
            extension_from_url("https://preview.redd.it/x.gif?format=mp4&s=1").as_deref(),
            Some(".gif")
        );
        assert_eq!(extension_from_url("https://example.com/noext"), None);
        assert_eq!(extension_from_url("https://example.com/file.toolong"), None);
        assert_eq!(extension_from_url("not a url"), None);
    }

    #[test]
    fn test_default_extension() {
        assert_eq!(default_extension("image/whatever"), ".jpg");
        assert_eq!(default_extension("video/x"), ".mp4");
        assert_eq!(default_extension(""), ".bin");
    }
}
