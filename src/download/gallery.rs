//! Reddit galleries.

use std::time::Duration;

use crate::api::Submission;
use crate::download::downloader::Downloader;
use crate::download::outcome::{DownloadOutcome, Verdict};
use crate::error::{Error, Result};
use crate::fs::SubmissionContext;
use crate::media::resolve_items;
use crate::output::create_item_bar;

/// Timeout for one gallery item.
pub const GALLERY_ITEM_TIMEOUT: Duration = Duration::from_secs(20);

/// Download every item of a gallery, in gallery order.
pub async fn download_gallery(
    downloader: &Downloader,
    submission: &Submission,
    context: &mut SubmissionContext,
) -> Result<Verdict> {
    let (data, metadata) = submission
        .gallery()
        .ok_or_else(|| Error::MissingMedia("no gallery data on submission".to_string()))?;

    let items = resolve_items(&data, &metadata);
    if items.is_empty() {
        tracing::warn!("Gallery has no items");
        return Ok(Verdict::Succeeded);
    }

    tracing::debug!("Gallery has {} item(s)", items.len());

    let progress = downloader
        .show_progress
        .then(|| create_item_bar(items.len() as u64, "gallery"));

    let mut outcomes = Vec::with_capacity(items.len());
    for item in items {
        let outcome = match item {
            Err(unresolved) => {
                tracing::warn!("Skipping item {}: {}", unresolved.index + 1, unresolved.reason);
                DownloadOutcome::unavailable(format!("item {}", unresolved.index + 1), unresolved.reason)
            }
            Ok(item) if item.is_video() && downloader.skip_videos => {
                tracing::debug!("Skipping video item {} ({})", item.index + 1, item.media_id);
                DownloadOutcome::skipped(item.filename())
            }
            Ok(item) => {
                let filename = item.filename();
                let dest = context.files_dir().join(&filename);
                match downloader.fetcher.fetch(&item.url, &dest, GALLERY_ITEM_TIMEOUT).await {
                    Ok(fetched) => DownloadOutcome::downloaded(filename, fetched.path),
                    Err(e) => {
                        tracing::warn!("Gallery item {} failed: {}", item.index + 1, e);
                        DownloadOutcome::failed(filename, e)
                    }
                }
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

    let verdict = Verdict::from_outcomes(&outcomes);
    tracing::debug!("Gallery {}", verdict);
    Ok(verdict)
}
