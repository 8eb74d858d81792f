//! Reddit gallery item resolution.

use std::collections::HashMap;

use serde_json::Value;

use crate::api::types::{GalleryData, MediaMetadataEntry};
use crate::fs::{ordinal_filename, sanitize_filename};
use crate::media::extension::{extension_for_mime, extension_from_url};

/// A gallery entry with a resolved source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    /// Zero-based position in the gallery.
    pub index: usize,
    pub media_id: String,
    pub mime_type: Option<String>,
    pub url: String,
    /// Extension with leading dot.
    pub extension: String,
}

impl GalleryItem {
    pub fn is_video(&self) -> bool {
        self.mime_type.as_deref().is_some_and(|m| m.contains("video"))
    }

    /// `{index:03}_{media_id}{ext}`.
    pub fn filename(&self) -> String {
        ordinal_filename(self.index, &self.media_id, &self.extension)
    }
}

/// A gallery entry that could not be resolved to a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedItem {
    pub index: usize,
    pub reason: String,
}

/// Resolve every gallery entry, in gallery order.
pub fn resolve_items(
    data: &GalleryData,
    metadata: &HashMap<String, Value>,
) -> Vec<Result<GalleryItem, UnresolvedItem>> {
    data.items
        .iter()
        .enumerate()
        .map(|(index, entry)| -> Result<GalleryItem, UnresolvedItem> {
            let unresolved = |reason: String| UnresolvedItem { index, reason };

            let raw_id = entry
                .media_id
                .as_deref()
                .filter(|id| !id.is_empty())
                .ok_or_else(|| unresolved("missing media_id".to_string()))?;
            let media_id = sanitize_filename(raw_id).map_err(|e| unresolved(e.to_string()))?;

            let meta = metadata
                .get(raw_id)
                .and_then(MediaMetadataEntry::from_value)
                .ok_or_else(|| unresolved(format!("no metadata for {}", media_id)))?;

            let (url, extension) = pick_source(&meta)
                .ok_or_else(|| unresolved(format!("no usable source for {}", media_id)))?;

            Ok(GalleryItem {
                index,
                media_id,
                mime_type: meta.m.clone(),
                url,
                extension,
            })
        })
        .collect()
}

/// Source URL and extension by priority: image `u`, video `mp4`, animated
/// `gif`, then `u` with a guessed extension.
fn pick_source(meta: &MediaMetadataEntry) -> Option<(String, String)> {
    let source = meta.s.as_ref()?;
    let mime = meta.m.as_deref().unwrap_or("");

    if mime.contains("image") {
        if let Some(u) = &source.u {
            if let Some(ext) = extension_for_mime(mime).or_else(|| subtype_extension(mime)) {
                return Some((unescape(u), ext));
            }
        }
    }
    if mime.contains("video") {
        if let Some(mp4) = &source.mp4 {
            return Some((unescape(mp4), ".mp4".to_string()));
        }
    }
    if mime.contains("image") {
        if let Some(gif) = &source.gif {
            return Some((unescape(gif), ".gif".to_string()));
        }
    }

    let u = unescape(source.u.as_ref()?);
    let ext = extension_from_url(&u).unwrap_or_else(|| ".jpg".to_string());
    tracing::debug!("Using fallback source for {} with extension {}", u, ext);
    Some((u, ext))
}

fn subtype_extension(mime: &str) -> Option<String> {
    let subtype = mime.split('/').nth(1)?;
    if subtype.is_empty() {
        return None;
    }
    sanitize_filename(subtype).ok().map(|s| format!(".{}", s))
}

/// Undo the HTML escaping Reddit applies to URLs without `raw_json`.
pub fn unescape(url: &str) -> String {
    url.replace("&amp;", "&")
}
