//! Reddit-hosted video.
//!
//! v.redd.it serves video and audio as separate DASH streams. The video
//! stream is required; audio is optional and merged in with ffmpeg when one
//! of the candidate URLs answers. Whatever happens after the video stream is
//! saved, the result is a playable `{id}.mp4`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;
use uuid::Uuid;

use crate::api::Submission;
use crate::download::downloader::Downloader;
use crate::download::fetcher::Fetched;
use crate::error::{Error, Result};
use crate::fs::SubmissionContext;

/// Timeout for the video stream.
pub const VIDEO_STREAM_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for each audio candidate.
pub const AUDIO_STREAM_TIMEOUT: Duration = Duration::from_secs(20);

/// Audio files at or below this size are treated as error pages.
pub const MIN_AUDIO_BYTES: u64 = 1024;

/// Audio paths tried under `{base}/{id}/`, in order.
const AUDIO_TEMPLATES: &[&str] = &[
    "DASH_audio.mp4",
    "DASH_AUDIO_128.mp4",
    "DASH_AUDIO_64.mp4",
    "DASH_audio.m4a",
];

/// The file a reconciliation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoArtifact {
    /// Video and audio merged.
    Merged(PathBuf),
    /// Video stream only, either silent or after a failed merge.
    VideoOnly(PathBuf),
    /// Downloaded by yt-dlp from the HLS playlist.
    Hls(PathBuf),
}

impl VideoArtifact {
    pub fn path(&self) -> &Path {
        match self {
            VideoArtifact::Merged(p) | VideoArtifact::VideoOnly(p) | VideoArtifact::Hls(p) => p,
        }
    }
}

impl fmt::Display for VideoArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match self {
            VideoArtifact::Merged(_) => write!(f, "{} (with audio)", name),
            VideoArtifact::VideoOnly(_) => write!(f, "{} (video only)", name),
            VideoArtifact::Hls(_) => write!(f, "{} (HLS)", name),
        }
    }
}

/// Media ID from a `v.redd.it/{id}` URL.
pub fn video_id(url: &str) -> Option<String> {
    let pattern = Regex::new(r"v\.redd\.it/([^/?#]+)").unwrap();
    pattern
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Ordered, de-duplicated audio URLs to try for a video.
///
/// Fixed DASH paths under `{base}/{id}/` come first, then siblings of
/// `video_url` with its resolution segment swapped for the audio one.
/// `video_url` itself is never a candidate.
pub fn audio_candidates(base: &str, id: &str, video_url: &str) -> Vec<String> {
    let base = base.trim_end_matches('/');
    let mut candidates: Vec<String> = AUDIO_TEMPLATES
        .iter()
        .map(|template| format!("{}/{}/{}", base, id, template))
        .collect();

    let resolution = Regex::new(r"DASH_\d+.*\.mp4").unwrap();
    if resolution.is_match(video_url) {
        for replacement in ["DASH_audio.mp4", "DASH_audio.m4a"] {
            candidates.push(resolution.replace(video_url, replacement).into_owned());
        }
    }

    let mut seen = std::collections::HashSet::new();
    candidates.retain(|c| c != video_url && seen.insert(c.clone()));
    candidates
}

/// Whether a fetched audio candidate looks like real media.
fn is_plausible_audio(fetched: &Fetched) -> bool {
    let content_type = fetched
        .content_type
        .as_deref()
        .unwrap_or("")
        .to_lowercase();
    let type_ok = content_type.is_empty()
        || content_type.contains("audio")
        || content_type.contains("video")
        || content_type.contains("octet-stream");

    type_ok && fetched.bytes > MIN_AUDIO_BYTES
}

/// Download a Reddit video with audio if any is available.
pub async fn download_reddit_video(
    downloader: &Downloader,
    url: &str,
    submission: &Submission,
    context: &mut SubmissionContext,
) -> Result<VideoArtifact> {
    let id = video_id(url)
        .ok_or_else(|| Error::MissingMedia(format!("no video ID in {}", url)))?;

    let descriptor = submission
        .reddit_video()
        .ok_or_else(|| Error::MissingMedia("no processable video".to_string()))?;

    let files_dir = context.files_dir().to_path_buf();
    let final_path = files_dir.join(format!("{}.mp4", id));

    let video_url = match (descriptor.fallback_url, descriptor.hls_url) {
        (Some(fallback), _) => fallback,
        (None, Some(hls)) => {
            tracing::debug!("No fallback URL, downloading HLS playlist");
            return download_hls(downloader, &hls, &id, &files_dir).await;
        }
        (None, None) => {
            return Err(Error::MissingMedia("video has no stream URL".to_string()));
        }
    };

    let video_path = files_dir.join(format!("{}_video.mp4", id));
    downloader
        .fetcher
        .fetch(&video_url, &video_path, VIDEO_STREAM_TIMEOUT)
        .await?;
    tracing::debug!("Video stream saved");

    let audio_path = files_dir.join(format!("{}_audio.mp4", id));
    let has_audio = fetch_audio(downloader, &id, &video_url, &audio_path).await;

    if !has_audio {
        tracing::debug!("No audio stream found");
        tokio::fs::rename(&video_path, &final_path).await?;
        return Ok(VideoArtifact::VideoOnly(final_path));
    }

    match downloader
        .ffmpeg
        .merge(&video_path, &audio_path, &final_path)
        .await
    {
        Ok(()) => {
            remove_quietly(&video_path).await;
            remove_quietly(&audio_path).await;
            Ok(VideoArtifact::Merged(final_path))
        }
        Err(e) => {
            match e {
                Error::FFmpegNotFound => tracing::warn!("ffmpeg not found, keeping video without audio"),
                ref e => tracing::warn!("Merge failed, keeping video without audio: {}", e),
            }
            remove_quietly(&final_path).await;
            remove_quietly(&audio_path).await;
            tokio::fs::rename(&video_path, &final_path).await?;
            Ok(VideoArtifact::VideoOnly(final_path))
        }
    }
}

/// Try audio candidates until one passes the sanity checks.
async fn fetch_audio(downloader: &Downloader, id: &str, video_url: &str, dest: &Path) -> bool {
    for candidate in audio_candidates(&downloader.reddit_video_base, id, video_url) {
        match downloader
            .fetcher
            .fetch(&candidate, dest, AUDIO_STREAM_TIMEOUT)
            .await
        {
            Ok(fetched) if is_plausible_audio(&fetched) => {
                tracing::debug!("Audio from {} ({} bytes)", candidate, fetched.bytes);
                return true;
            }
            Ok(fetched) => {
                tracing::debug!(
                    "Rejected audio from {} ({} bytes, {})",
                    candidate,
                    fetched.bytes,
                    fetched.content_type.as_deref().unwrap_or("no content type")
                );
                remove_quietly(dest).await;
            }
            Err(e) => tracing::debug!("Audio candidate failed: {}", e),
        }
    }
    false
}

/// Let yt-dlp fetch the HLS playlist, then rename its output to `{id}.{ext}`.
async fn download_hls(
    downloader: &Downloader,
    hls_url: &str,
    id: &str,
    dir: &Path,
) -> Result<VideoArtifact> {
    let stem = Uuid::new_v4().simple().to_string();
    let template = format!("{}.%(ext)s", stem);

    downloader.ytdlp.download(hls_url, dir, &template).await?;

    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.file_stem().and_then(|s| s.to_str()) != Some(stem.as_str()) {
            continue;
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("mp4")
            .to_string();
        let target = dir.join(format!("{}.{}", id, extension));
        tokio::fs::rename(&path, &target).await?;
        return Ok(VideoArtifact::Hls(target));
    }

    Err(Error::YtDlp(format!(
        "HLS download finished but no output named {} was found",
        stem
    )))
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove {}: {}", path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_id() {
        assert_eq!(video_id("https://v.redd.it/abc123").as_deref(), Some("abc123"));
        assert_eq!(
            video_id("https://v.redd.it/abc123/DASH_720.mp4?source=fallback").as_deref(),
            Some("abc123")
        );
        assert_eq!(video_id("https://i.redd.it/abc123.jpg"), None);
    }

    #[test]
    fn test_audio_candidates_order() {
        let candidates = audio_candidates(
            "https://v.redd.it/",
            "abc",
            "https://v.redd.it/abc/DASH_720.mp4?source=fallback",
        );
        assert_eq!(
            candidates,
            vec![
                "https://v.redd.it/abc/DASH_audio.mp4",
                "https://v.redd.it/abc/DASH_AUDIO_128.mp4",
                "https://v.redd.it/abc/DASH_AUDIO_64.mp4",
                "https://v.redd.it/abc/DASH_audio.m4a",
                "https://v.redd.it/abc/DASH_audio.mp4?source=fallback",
                "https://v.redd.it/abc/DASH_audio.m4a?source=fallback",
            ]
        );
    }

    #[test]
    fn test_audio_candidates_deduplicated() {
        let candidates = audio_candidates(
            "https://v.redd.it",
            "abc",
            "https://v.redd.it/abc/DASH_480.mp4",
        );
        // The substituted siblings equal the fixed templates.
        assert_eq!(candidates.len(), 4);
        assert!(!candidates.iter().any(|c| c.contains("DASH_480")));
    }

    #[test]
    fn test_audio_candidates_exclude_video_url() {
        let candidates = audio_candidates(
            "https://v.redd.it",
            "abc",
            "https://v.redd.it/abc/DASH_audio.mp4",
        );
        assert!(!candidates.contains(&"https://v.redd.it/abc/DASH_audio.mp4".to_string()));
    }

    #[test]
    fn test_plausible_audio() {
        let fetched = |bytes, content_type: Option<&str>| Fetched {
            path: PathBuf::from("a.mp4"),
            bytes,
            content_type: content_type.map(str::to_string),
        };
        assert!(is_plausible_audio(&fetched(4096, Some("audio/mp4"))));
        assert!(is_plausible_audio(&fetched(4096, None)));
        assert!(is_plausible_audio(&fetched(4096, Some("binary/octet-stream"))));
        assert!(!is_plausible_audio(&fetched(4096, Some("text/html"))));
        assert!(!is_plausible_audio(&fetched(1024, Some("audio/mp4"))));
    }
}
