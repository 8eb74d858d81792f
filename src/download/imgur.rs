//! Imgur albums and single images.

use std::time::Duration;

use regex::Regex;
use url::Url;

use crate::api::ImgurImage;
use crate::download::downloader::Downloader;
use crate::download::outcome::{DownloadOutcome, Verdict};
use crate::error::{Error, Result};
use crate::fs::{file_stem, ordinal_filename, sanitize_filename, SubmissionContext};
use crate::media::{default_extension, extension_for_mime, extension_from_url};
use crate::output::create_item_bar;

/// Timeout for files linked from Imgur.
pub const IMGUR_FILE_TIMEOUT: Duration = Duration::from_secs(30);

/// Album ID from `/a/{id}` or `/gallery/{id}`.
pub fn album_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let parts: Vec<&str> = parsed.path().trim_matches('/').split('/').collect();

    match parts.as_slice() {
        [kind, id] if (*kind == "a" || *kind == "gallery") && !id.is_empty() => Some(id.to_string()),
        _ => None,
    }
}

/// Image ID from the last path segment, extension removed.
pub fn image_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let last = parsed.path().trim_matches('/').rsplit('/').next()?;
    let candidate = file_stem(last);

    let pattern = Regex::new(r"^[a-zA-Z0-9]{5,}$").unwrap();
    pattern.is_match(candidate).then(|| candidate.to_string())
}

/// Download every image of an album.
pub async fn download_imgur_album(
    downloader: &Downloader,
    url: &str,
    context: &mut SubmissionContext,
) -> Result<Verdict> {
    let imgur = downloader.imgur()?;
    let id = album_id(url)
        .ok_or_else(|| Error::MissingMedia(format!("no Imgur album ID in {}", url)))?;

    let album = imgur.album(&id).await?;
    if album.images.is_empty() {
        tracing::warn!("Imgur album {} has no images", id);
        return Ok(Verdict::Succeeded);
    }

    tracing::debug!("Imgur album {} has {} item(s)", id, album.images.len());

    let progress = downloader
        .show_progress
        .then(|| create_item_bar(album.images.len() as u64, "album"));

    let mut outcomes = Vec::with_capacity(album.images.len());
    for (index, image) in album.images.iter().enumerate() {
        let outcome = match (image.link.as_deref(), album_filename(index, image)) {
            (Some(link), Ok(filename)) => {
                let dest = context.files_dir().join(&filename);

                match downloader.fetcher.fetch(link, &dest, IMGUR_FILE_TIMEOUT).await {
                    Ok(fetched) => DownloadOutcome::downloaded(filename, fetched.path),
                    Err(e) => {
                        tracing::warn!("Album item {} failed: {}", index + 1, e);
                        DownloadOutcome::failed(filename, e)
                    }
                }
            }
            (Some(_), Err(e)) => {
                tracing::warn!("Skipping album item {}: {}", index + 1, e);
                DownloadOutcome::unavailable(format!("item {}", index + 1), e.to_string())
            }
            _ => {
                tracing::warn!("Skipping album item {}: missing link or ID", index + 1);
                DownloadOutcome::unavailable(format!("item {}", index + 1), "missing link or ID")
            }
        };
        outcomes.push(outcome);

        if let Some(ref pb) = progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    Ok(Verdict::from_outcomes(&outcomes))
}

/// `{index:03}_{id}.{subtype}`, `jpeg` when Imgur gives no type.
fn album_filename(index: usize, image: &ImgurImage) -> Result<String> {
    let subtype = image
        .mime_type
        .as_deref()
        .and_then(|m| m.split('/').nth(1))
        .filter(|s| !s.is_empty())
        .unwrap_or("jpeg");
    let id = sanitize_filename(&image.id)?;
    let subtype = sanitize_filename(subtype)?;
    Ok(ordinal_filename(index, &id, &format!(".{}", subtype)))
}

/// Download a single Imgur image or video.
pub async fn download_imgur_image(
    downloader: &Downloader,
    url: &str,
    context: &mut SubmissionContext,
) -> Result<Verdict> {
    let imgur = downloader.imgur()?;
    let id = image_id(url)
        .ok_or_else(|| Error::MissingMedia(format!("no Imgur image ID in {}", url)))?;

    let image = imgur.image(&id).await?;
    let Some(link) = image.link.as_deref() else {
        return Ok(Verdict::from_outcomes(&[DownloadOutcome::unavailable(
            id,
            "Imgur returned no link",
        )]));
    };

    let mime = image.mime_type.as_deref().unwrap_or("");
    let extension = extension_for_mime(mime)
        .or_else(|| extension_from_url(link))
        .unwrap_or_else(|| default_extension(mime).to_string());
    let filename = format!("{}{}", id, extension);

    tracing::debug!("Imgur {} ({})", filename, if mime.is_empty() { "unknown type" } else { mime });

    let dest = context.files_dir().join(&filename);
    let outcome = match downloader.fetcher.fetch(link, &dest, IMGUR_FILE_TIMEOUT).await {
        Ok(fetched) => DownloadOutcome::downloaded(filename, fetched.path),
        Err(e) => {
            tracing::warn!("{}", e);
            DownloadOutcome::failed(filename, e)
        }
    };

    Ok(Verdict::from_outcomes(&[outcome]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_album_id() {
        assert_eq!(album_id("https://imgur.com/a/Ab12C").as_deref(), Some("Ab12C"));
        assert_eq!(album_id("https://imgur.com/gallery/Xy9/").as_deref(), Some("Xy9"));
        assert_eq!(album_id("https://imgur.com/a/"), None);
        assert_eq!(album_id("https://imgur.com/a/b/c"), None);
        assert_eq!(album_id("https://imgur.com/Ab12C"), None);
    }

    #[test]
    fn test_image_id() {
        assert_eq!(image_id("https://imgur.com/Ab12Cde").as_deref(), Some("Ab12Cde"));
        assert_eq!(image_id("https://i.imgur.com/Ab12Cde.gifv").as_deref(), Some("Ab12Cde"));
        assert_eq!(image_id("https://imgur.com/abc"), None);
        assert_eq!(image_id("https://imgur.com/"), None);
        assert_eq!(image_id("https://imgur.com/bad-id!"), None);
    }

    fn image(id: &str, mime: Option<&str>) -> ImgurImage {
        serde_json::from_value(serde_json::json!({
            "id": id, "type": mime, "link": "https://i.imgur.com/x.png"
        }))
        .unwrap()
    }

    #[test]
    fn test_album_filename() {
        assert_eq!(album_filename(2, &image("Ab12C", Some("image/png"))).unwrap(), "002_Ab12C.png");
        assert_eq!(album_filename(0, &image("Ab12C", None)).unwrap(), "000_Ab12C.jpeg");
        assert_eq!(album_filename(1, &image("a:b", Some("video/x|y"))).unwrap(), "001_a_b.x_y");
        assert!(album_filename(0, &image("../x", Some("image/png"))).is_err());
        assert!(album_filename(0, &image("", Some("image/png"))).is_err());
    }
}
