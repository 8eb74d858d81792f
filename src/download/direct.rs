//! Direct links to image and video files.

use std::time::Duration;

use crate::api::Submission;
use crate::download::downloader::Downloader;
use crate::download::outcome::{DownloadOutcome, Verdict};
use crate::error::Result;
use crate::fs::{filename_from_url, SubmissionContext};
use crate::media::ContentKind;

/// Timeout for direct file downloads.
pub const DIRECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Download a direct file link.
pub async fn download_direct(
    downloader: &Downloader,
    kind: ContentKind,
    url: &str,
    submission: &Submission,
    context: &mut SubmissionContext,
) -> Result<Verdict> {
    let filename = filename_from_url(url).unwrap_or_else(|| match kind {
        ContentKind::DirectVideo => format!("{}_video.mp4", submission.id),
        _ => format!("{}_image", submission.id),
    });

    tracing::debug!("Direct link to {}", filename);

    let dest = context.files_dir().join(&filename);
    let outcome = match downloader.fetcher.fetch(url, &dest, DIRECT_TIMEOUT).await {
        Ok(fetched) => DownloadOutcome::downloaded(filename, fetched.path),
        Err(e) => {
            tracing::warn!("{}", e);
            DownloadOutcome::failed(filename, e)
        }
    };

    Ok(Verdict::from_outcomes(&[outcome]))
}
