//! `comments.json`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{Comment, CommentSource, Submission};
use crate::error::Result;

/// File name of the comment export.
pub const COMMENTS_FILE: &str = "comments.json";

/// One comment as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub author: Option<String>,
    pub body: String,
    pub created_utc: i64,
    pub distinguished: Option<String>,
    pub edited: Value,
    pub id: String,
    pub is_submitter: bool,
    pub link_id: Option<String>,
    pub parent_id: Option<String>,
    pub permalink: Option<String>,
    pub score: i64,
    pub stickied: bool,
    pub subreddit_name_prefixed: Option<String>,
    pub subreddit_id: Option<String>,
    pub total_awards_received: i64,
}

impl From<&Comment> for CommentRecord {
    fn from(c: &Comment) -> Self {
        Self {
            author: c.author().map(str::to_string),
            body: c.body.clone(),
            created_utc: c.created_utc as i64,
            distinguished: c.distinguished.clone(),
            edited: c.edited.clone(),
            id: c.id.clone(),
            is_submitter: c.is_submitter,
            link_id: c.link_id.clone(),
            parent_id: c.parent_id.clone(),
            permalink: c.permalink.clone(),
            score: c.score,
            stickied: c.stickied,
            subreddit_name_prefixed: c.subreddit_name_prefixed.clone(),
            subreddit_id: c.subreddit_id.clone(),
            total_awards_received: c.total_awards_received,
        }
    }
}

/// Fetch, expand and write the comments of `submission` to `dir`.
///
/// The flattened list is truncated to `limit` when one is given. The file
/// is written even when there are no comments. Returns the number written.
pub async fn export_comments(
    source: &dyn CommentSource,
    submission: &Submission,
    dir: &Path,
    limit: Option<usize>,
) -> Result<usize> {
    let mut forest = source.comments(submission).await?;

    let pending = forest.pending_placeholders();
    if pending > 0 {
        tracing::debug!("Expanding {} placeholder(s)", pending);
        let added = forest
            .replace_more(source, &submission.fullname())
            .await?;
        tracing::debug!("Expanded {} more comment(s)", added);
    }

    let mut records: Vec<CommentRecord> = forest
        .list()
        .into_iter()
        .map(CommentRecord::from)
        .collect();

    if let Some(limit) = limit {
        records.truncate(limit);
    }

    let path = dir.join(COMMENTS_FILE);
    let json = serde_json::to_string_pretty(&records)?;
    fs::write(&path, json)?;

    tracing::debug!("Wrote {} comment(s) to {}", records.len(), path.display());
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{CommentForest, Thing};
    use async_trait::async_trait;
    use serde_json::json;
    use tempfile::TempDir;

    struct FixedSource {
        top: Value,
        more: Value,
    }

    #[async_trait]
    impl CommentSource for FixedSource {
        async fn comments(&self, _submission: &Submission) -> Result<CommentForest> {
            let things: Vec<Thing> = serde_json::from_value(self.top.clone())?;
            Ok(CommentForest::new(things))
        }

        async fn more_children(&self, _link: &str, _children: &[String]) -> Result<Vec<Thing>> {
            Ok(serde_json::from_value(self.more.clone())?)
        }
    }

    fn comment(id: &str, parent: &str) -> Value {
        json!({"kind": "t1", "data": {
            "id": id,
            "name": format!("t1_{}", id),
            "parent_id": parent,
            "body": format!("body {}", id),
            "author": "someone",
            "created_utc": 1_700_000_000.5,
            "score": 3,
            "replies": ""
        }})
    }

    fn source() -> FixedSource {
        FixedSource {
            top: json!([
                comment("c1", "t3_abc"),
                comment("c2", "t3_abc"),
                {"kind": "more", "data": {"id": "m1", "parent_id": "t3_abc", "count": 1, "children": ["c3"]}}
            ]),
            more: json!([comment("c3", "t3_abc")]),
        }
    }

    fn submission() -> Submission {
        serde_json::from_value(json!({"id": "abc", "title": "t"})).unwrap()
    }

    fn read(dir: &Path) -> Vec<CommentRecord> {
        serde_json::from_str(&std::fs::read_to_string(dir.join(COMMENTS_FILE)).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_expands_and_writes_all() {
        let temp = TempDir::new().unwrap();
        let written = export_comments(&source(), &submission(), temp.path(), None)
            .await
            .unwrap();

        assert_eq!(written, 3);
        let records = read(temp.path());
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["c1", "c2", "c3"]);
        assert_eq!(records[0].created_utc, 1_700_000_000);
    }

    #[tokio::test]
    async fn test_limit_truncates_flattened_list() {
        let temp = TempDir::new().unwrap();
        let written = export_comments(&source(), &submission(), temp.path(), Some(2))
            .await
            .unwrap();

        assert_eq!(written, 2);
        assert_eq!(read(temp.path()).len(), 2);
    }

    #[tokio::test]
    async fn test_empty_comments_still_written() {
        let temp = TempDir::new().unwrap();
        let empty = FixedSource {
            top: json!([]),
            more: json!([]),
        };
        let written = export_comments(&empty, &submission(), temp.path(), None)
            .await
            .unwrap();

        assert_eq!(written, 0);
        let text = std::fs::read_to_string(temp.path().join(COMMENTS_FILE)).unwrap();
        assert_eq!(text.trim(), "[]");
    }
}
