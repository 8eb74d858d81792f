//! Selection of downloadable media from submission previews.

use crate::api::types::{Preview, PreviewSource};
use crate::media::extension::extension_from_url;
use crate::media::gallery::unescape;

/// A preview URL chosen for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewMedia {
    pub url: String,
    /// Extension with leading dot.
    pub extension: String,
}

/// Format rank, higher is better.
fn rank(extension: &str) -> u8 {
    match extension {
        ".mp4" => 3,
        ".gif" => 2,
        ".jpg" | ".jpeg" | ".png" | ".webp" => 1,
        _ => 0,
    }
}

/// Pick the best preview: the video preview's fallback URL if it is an MP4,
/// otherwise the first preview image's best rendition ranked
/// mp4 > gif > static image, larger first within a format.
pub fn best_preview(preview: &Preview) -> Option<PreviewMedia> {
    if let Some(url) = preview
        .reddit_video_preview
        .as_ref()
        .and_then(|video| video.fallback_url.as_deref())
    {
        let url = unescape(url);
        if extension_from_url(&url).as_deref() == Some(".mp4") {
            return Some(PreviewMedia {
                url,
                extension: ".mp4".to_string(),
            });
        }
    }

    let image = preview.images.first()?;
    let mut candidates: Vec<(PreviewMedia, u32)> = Vec::new();

    // Variant URLs keep the original path (`x.gif?format=mp4`), so the key decides the format.
    for (key, extension) in [("mp4", ".mp4"), ("gif", ".gif")] {
        if let Some(source) = image.variants.get(key).and_then(|v| v.source.as_ref()) {
            if let Some(url) = &source.url {
                candidates.push((
                    PreviewMedia {
                        url: unescape(url),
                        extension: extension.to_string(),
                    },
                    source.width,
                ));
            }
        }
    }

    let renditions = image.source.iter().chain(image.resolutions.iter());
    candidates.extend(renditions.filter_map(rendition));

    candidates
        .into_iter()
        .filter(|(media, _)| rank(&media.extension) > 0)
        .max_by_key(|(media, width)| (rank(&media.extension), *width))
        .map(|(media, _)| media)
}

fn rendition(source: &PreviewSource) -> Option<(PreviewMedia, u32)> {
    let url = unescape(source.url.as_deref()?);
    let extension = extension_from_url(&url)?;
    Some((PreviewMedia { url, extension }, source.width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn preview(value: serde_json::Value) -> Preview {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_video_preview_wins() {
        let p = preview(json!({
            "reddit_video_preview": {"fallback_url": "https://v.redd.it/abc/DASH_480.mp4?source=fallback"},
            "images": [{"source": {"url": "https://i.redd.it/x.gif", "width": 500}}]
        }));
        let best = best_preview(&p).unwrap();
        assert_eq!(best.url, "https://v.redd.it/abc/DASH_480.mp4?source=fallback");
        assert_eq!(best.extension, ".mp4");
    }

    #[test]
    fn test_mp4_rendition_beats_larger_static() {
        let p = preview(json!({"images": [{
            "source": {"url": "https://preview.redd.it/x.jpg?s=1", "width": 1920},
            "resolutions": [
                {"url": "https://preview.redd.it/x.jpg?width=320", "width": 320},
                {"url": "https://preview.redd.it/x.mp4?width=640", "width": 640}
            ]
        }]}));
        let best = best_preview(&p).unwrap();
        assert_eq!(best.extension, ".mp4");
        assert_eq!(best.url, "https://preview.redd.it/x.mp4?width=640");
    }

    #[test]
    fn test_variants_use_key_for_format() {
        let p = preview(json!({"images": [{
            "source": {"url": "https://preview.redd.it/x.gif?s=1", "width": 400},
            "variants": {
                "mp4": {"source": {"url": "https://preview.redd.it/x.gif?format=mp4&amp;s=2", "width": 400}}
            }
        }]}));
        let best = best_preview(&p).unwrap();
        assert_eq!(best.extension, ".mp4");
        assert_eq!(best.url, "https://preview.redd.it/x.gif?format=mp4&s=2");
    }

    #[test]
    fn test_static_fallback_and_empty() {
        let p = preview(json!({"images": [{
            "source": {"url": "https://preview.redd.it/x.jpg", "width": 1000},
            "resolutions": [{"url": "https://preview.redd.it/x.jpg?width=108", "width": 108}]
        }]}));
        assert_eq!(best_preview(&p).unwrap().url, "https://preview.redd.it/x.jpg");
        assert_eq!(best_preview(&Preview::default()), None);
    }
}
