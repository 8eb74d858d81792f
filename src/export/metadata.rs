//! `submission.json`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::Submission;
use crate::error::Result;

/// File name of the submission snapshot.
pub const SUBMISSION_FILE: &str = "submission.json";

/// Snapshot of a submission as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub author: Option<String>,
    pub created_utc: i64,
    pub distinguished: Option<String>,
    pub edited: Value,
    pub id: String,
    pub is_original_content: bool,
    pub is_self: bool,
    pub is_video: bool,
    pub link_flair_text: Option<String>,
    pub locked: bool,
    pub media: Option<Value>,
    pub media_embed: Option<Value>,
    pub num_comments: i64,
    pub num_crossposts: i64,
    pub over_18: bool,
    pub permalink: Option<String>,
    pub score: i64,
    pub selftext: String,
    pub selftext_html: Option<String>,
    pub spoiler: bool,
    pub stickied: bool,
    pub subreddit_name_prefixed: Option<String>,
    pub subreddit_id: Option<String>,
    pub subreddit_subscribers: i64,
    pub title: String,
    pub total_awards_received: i64,
    pub upvote_ratio: f64,
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_metadata: Option<Value>,
}

impl From<&Submission> for SubmissionRecord {
    fn from(s: &Submission) -> Self {
        Self {
            author: s.author().map(str::to_string),
            created_utc: s.created_utc as i64,
            distinguished: s.distinguished.clone(),
            edited: s.edited.clone(),
            id: s.id.clone(),
            is_original_content: s.is_original_content,
            is_self: s.is_self,
            is_video: s.is_video,
            link_flair_text: s.link_flair_text.clone(),
            locked: s.locked,
            media: s.media.clone(),
            media_embed: s.media_embed.clone(),
            num_comments: s.num_comments,
            num_crossposts: s.num_crossposts,
            over_18: s.over_18,
            permalink: s.permalink.clone(),
            score: s.score,
            selftext: s.selftext.clone(),
            selftext_html: s.selftext_html.clone(),
            spoiler: s.spoiler,
            stickied: s.stickied,
            subreddit_name_prefixed: s.subreddit_name_prefixed.clone(),
            subreddit_id: s.subreddit_id.clone(),
            subreddit_subscribers: s.subreddit_subscribers,
            title: s.title.clone(),
            total_awards_received: s.total_awards_received,
            upvote_ratio: s.upvote_ratio,
            url: s.url.clone(),
            gallery_data: s.gallery_data.clone().filter(|v| !v.is_null()),
            media_metadata: s.media_metadata.clone().filter(|v| !v.is_null()),
        }
    }
}

/// Write `submission.json` into `dir`.
pub fn export_submission(submission: &Submission, dir: &Path) -> Result<PathBuf> {
    let record = SubmissionRecord::from(submission);
    let path = dir.join(SUBMISSION_FILE);

    let json = serde_json::to_string_pretty(&record)?;
    fs::write(&path, json)?;

    tracing::debug!("Wrote {}", path.display());
    Ok(path)
}
