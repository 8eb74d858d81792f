//! Per-submission driver.

use std::path::Path;

use tracing::Instrument;

use crate::api::{CommentSource, Submission};
use crate::config::Config;
use crate::download::downloader::Downloader;
use crate::error::Result;
use crate::export::{export_comments, export_submission};
use crate::fs::SubmissionContext;
use crate::output::{print_success, print_warning};

/// Which parts of a submission are written besides its media.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveOptions {
    pub skip_meta: bool,
    pub skip_comments: bool,
    pub comment_limit: Option<usize>,
    /// Print the one-line result per submission.
    pub announce: bool,
}

impl ArchiveOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            skip_meta: config.options.skip_meta,
            skip_comments: config.options.skip_comments,
            comment_limit: config.options.comment_limit,
            announce: config.options.show_progress,
        }
    }

    /// Media goes to a `files/` subdirectory unless nothing else is written.
    pub fn use_files_subdir(&self) -> bool {
        !(self.skip_meta && self.skip_comments)
    }
}

/// What happened to one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionReport {
    /// Its directory already existed; nothing was touched.
    Skipped,
    /// Processed. `media_ok` is false when the media download failed.
    Archived {
        media_ok: bool,
        meta_ok: bool,
        comments_ok: bool,
    },
}

impl SubmissionReport {
    pub fn touched_network(&self) -> bool {
        matches!(self, SubmissionReport::Archived { .. })
    }
}

/// Archive one submission into `{parent}/{index:03}_{title}/`.
///
/// An existing directory skips the submission without any network access.
/// Metadata and comments are exported whatever the media outcome; only a
/// failure to create the directory is returned as `Err`.
pub async fn archive_submission(
    downloader: &Downloader,
    comments: &dyn CommentSource,
    submission: &Submission,
    parent: &Path,
    index: usize,
    options: &ArchiveOptions,
) -> Result<SubmissionReport> {
    let span = tracing::info_span!("submission", id = %submission.id, index);
    archive_in_span(downloader, comments, submission, parent, index, options)
        .instrument(span)
        .await
}

async fn archive_in_span(
    downloader: &Downloader,
    comments: &dyn CommentSource,
    submission: &Submission,
    parent: &Path,
    index: usize,
    options: &ArchiveOptions,
) -> Result<SubmissionReport> {
    let mut context =
        SubmissionContext::new(parent, index, &submission.title, options.use_files_subdir());

    if !context.create()? {
        tracing::info!(
            "Directory '{}' already exists, skipping submission",
            context.dir.display()
        );
        return Ok(SubmissionReport::Skipped);
    }

    let url = submission.url.as_deref().unwrap_or_default();
    tracing::debug!(
        "Processing {} (by {}, {})",
        url,
        submission.author().unwrap_or("[deleted]"),
        submission
            .created_at()
            .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
            .unwrap_or_else(|| "unknown date".to_string())
    );

    let kind = downloader.classify(url, submission).await;
    tracing::debug!("Classified as {}", kind);

    let media_ok = match downloader.download(kind, url, submission, &mut context).await {
        Ok(verdict) => {
            if !verdict.is_success() {
                tracing::warn!("Media download {}: {}", verdict, url);
            }
            verdict.is_success()
        }
        Err(e) => {
            tracing::warn!("Could not download {} ({}): {}", kind, url, e);
            false
        }
    };

    if !context.has_files_dir() {
        tracing::debug!("No media written");
    }

    let meta_ok = if options.skip_meta {
        true
    } else {
        match export_submission(submission, &context.dir) {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("Failed to save submission metadata: {}", e);
                false
            }
        }
    };

    let comments_ok = if options.skip_comments {
        true
    } else {
        match export_comments(comments, submission, &context.dir, options.comment_limit).await {
            Ok(count) => {
                tracing::debug!("Saved {} comment(s)", count);
                true
            }
            Err(e) => {
                tracing::error!("Failed to save comments: {}", e);
                false
            }
        }
    };

    if options.announce {
        let label = format!("{:03} {}", index, submission.title);
        if media_ok {
            print_success(&format!("{} -> {}", label, context.dir.display()));
        } else {
            print_warning(&format!("{} (media failed: {})", label, url));
        }
    }

    Ok(SubmissionReport::Archived {
        media_ok,
        meta_ok,
        comments_ok,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_subdir_only_when_something_else_is_written() {
        let mut options = ArchiveOptions::default();
        assert!(options.use_files_subdir());

        options.skip_meta = true;
        assert!(options.use_files_subdir());

        options.skip_comments = true;
        assert!(!options.use_files_subdir());
    }

    #[test]
    fn test_skipped_does_not_touch_network() {
        assert!(!SubmissionReport::Skipped.touched_network());
        assert!(SubmissionReport::Archived {
            media_ok: false,
            meta_ok: true,
            comments_ok: true
        }
        .touched_network());
    }
}
