//! Reddit API response type definitions.
//!
//! Submissions keep their media blobs as raw JSON. Typed views are decoded on
//! demand so that one malformed blob reads as "absent" instead of failing the
//! whole submission, and so the raw values can be exported untouched.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A `{kind, data}` object as returned by the Reddit API.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum Thing {
    #[serde(rename = "t1")]
    Comment(Box<Comment>),
    #[serde(rename = "t3")]
    Submission(Box<Submission>),
    #[serde(rename = "more")]
    More(MoreComments),
    #[serde(rename = "Listing")]
    Listing(Listing),
}

/// A page of things.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Listing {
    #[serde(default)]
    pub after: Option<String>,
    #[serde(default)]
    pub children: Vec<Thing>,
}

/// Response of `/api/morechildren`.
#[derive(Debug, Deserialize)]
pub struct MoreChildrenResponse {
    pub json: MoreChildrenJson,
}

#[derive(Debug, Deserialize)]
pub struct MoreChildrenJson {
    #[serde(default)]
    pub errors: Vec<Value>,
    #[serde(default)]
    pub data: Option<MoreChildrenData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MoreChildrenData {
    #[serde(default)]
    pub things: Vec<Thing>,
}

/// A submission (link or self post).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Submission {
    pub id: String,
    pub name: Option<String>,
    pub title: String,
    pub author: Option<String>,
    pub url: Option<String>,
    pub created_utc: f64,
    pub distinguished: Option<String>,
    /// `false`, or the edit timestamp.
    pub edited: Value,
    pub is_original_content: bool,
    pub is_self: bool,
    pub is_video: bool,
    pub link_flair_text: Option<String>,
    pub locked: bool,
    pub num_comments: i64,
    pub num_crossposts: i64,
    pub over_18: bool,
    pub permalink: Option<String>,
    pub score: i64,
    pub selftext: String,
    pub selftext_html: Option<String>,
    pub spoiler: bool,
    pub stickied: bool,
    pub subreddit: Option<String>,
    pub subreddit_name_prefixed: Option<String>,
    pub subreddit_id: Option<String>,
    pub subreddit_subscribers: i64,
    pub total_awards_received: i64,
    pub upvote_ratio: f64,

    pub media: Option<Value>,
    pub media_embed: Option<Value>,
    pub gallery_data: Option<Value>,
    pub media_metadata: Option<Value>,
    pub preview: Option<Value>,
    pub crosspost_parent_list: Vec<Value>,
}

/// A comment.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Comment {
    pub id: String,
    pub name: Option<String>,
    pub author: Option<String>,
    pub body: String,
    pub created_utc: f64,
    pub distinguished: Option<String>,
    pub edited: Value,
    pub is_submitter: bool,
    pub link_id: Option<String>,
    pub parent_id: Option<String>,
    pub permalink: Option<String>,
    pub score: i64,
    pub stickied: bool,
    pub subreddit_name_prefixed: Option<String>,
    pub subreddit_id: Option<String>,
    pub total_awards_received: i64,
    #[serde(deserialize_with = "deserialize_replies")]
    pub replies: Vec<Thing>,
}

/// Placeholder for comments that were not included in the response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MoreComments {
    pub id: String,
    pub parent_id: Option<String>,
    pub count: i64,
    pub children: Vec<String>,
}

/// Reddit sends `""` instead of an empty listing when a comment has no replies.
fn deserialize_replies<'de, D>(deserializer: D) -> std::result::Result<Vec<Thing>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(Vec::new());
    }

    match Thing::deserialize(value).map_err(serde::de::Error::custom)? {
        Thing::Listing(listing) => Ok(listing.children),
        _ => Ok(Vec::new()),
    }
}

/// `media.reddit_video`, also used for `preview.reddit_video_preview`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RedditVideo {
    pub fallback_url: Option<String>,
    pub hls_url: Option<String>,
    pub dash_url: Option<String>,
    pub is_gif: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct MediaBlob {
    reddit_video: Option<RedditVideo>,
}

/// `gallery_data`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GalleryData {
    pub items: Vec<GalleryEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GalleryEntry {
    pub media_id: Option<String>,
    pub caption: Option<String>,
}

/// One value of the `media_metadata` map.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MediaMetadataEntry {
    pub status: Option<String>,
    /// Kind, e.g. `Image`, `AnimatedImage`, `RedditVideo`.
    pub e: Option<String>,
    /// Mimetype, e.g. `image/jpg`.
    pub m: Option<String>,
    /// Source.
    pub s: Option<MediaSource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MediaSource {
    pub u: Option<String>,
    pub gif: Option<String>,
    pub mp4: Option<String>,
}

/// `preview`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Preview {
    pub images: Vec<PreviewImage>,
    pub reddit_video_preview: Option<RedditVideo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PreviewImage {
    pub source: Option<PreviewSource>,
    pub resolutions: Vec<PreviewSource>,
    pub variants: HashMap<String, PreviewVariant>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PreviewVariant {
    pub source: Option<PreviewSource>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PreviewSource {
    pub url: Option<String>,
    pub width: u32,
    pub height: u32,
}

fn decode<T: DeserializeOwned>(value: Option<&Value>) -> Option<T> {
    match value {
        Some(Value::Null) | None => None,
        Some(value) => match serde_json::from_value(value.clone()) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::debug!("Ignoring malformed media blob: {}", e);
                None
            }
        },
    }
}

/// Turn the deleted-author marker into an absent author.
fn live_author(author: Option<&str>) -> Option<&str> {
    author.filter(|name| *name != "[deleted]")
}

impl Submission {
    /// Author name, `None` for deleted accounts.
    pub fn author(&self) -> Option<&str> {
        live_author(self.author.as_deref())
    }

    /// Creation time.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.created_utc as i64, 0)
    }

    /// Fullname (`t3_...`) used to address this submission in API calls.
    pub fn fullname(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("t3_{}", self.id))
    }

    /// First crosspost parent, if this is a crosspost.
    fn crosspost_parent(&self) -> Option<&Value> {
        self.crosspost_parent_list.first()
    }

    /// Reddit video descriptor, from this submission or its crosspost parent.
    pub fn reddit_video(&self) -> Option<RedditVideo> {
        let own = decode::<MediaBlob>(self.media.as_ref()).and_then(|m| m.reddit_video);
        own.or_else(|| {
            let parent = self.crosspost_parent()?;
            decode::<MediaBlob>(parent.get("media")).and_then(|m| m.reddit_video)
        })
    }

    /// Gallery layout and media metadata, from this submission or its crosspost parent.
    pub fn gallery(&self) -> Option<(GalleryData, HashMap<String, Value>)> {
        let own = match (&self.gallery_data, &self.media_metadata) {
            (Some(data), Some(meta)) => Some((data, meta)),
            _ => None,
        };

        let (data, meta) = match own {
            Some(pair) => pair,
            None => {
                let parent = self.crosspost_parent()?;
                (parent.get("gallery_data")?, parent.get("media_metadata")?)
            }
        };

        Some((decode(Some(data))?, decode(Some(meta))?))
    }

    /// Preview images and video preview.
    pub fn preview(&self) -> Option<Preview> {
        decode(self.preview.as_ref())
    }
}

impl Comment {
    /// Author name, `None` for deleted accounts.
    pub fn author(&self) -> Option<&str> {
        live_author(self.author.as_deref())
    }

    /// Fullname (`t1_...`), the value children carry as `parent_id`.
    pub fn fullname(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("t1_{}", self.id))
    }
}

impl MediaMetadataEntry {
    /// Decode one `media_metadata` value.
    pub fn from_value(value: &Value) -> Option<Self> {
        decode(Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_submission_with_missing_fields() {
        let submission: Submission =
            serde_json::from_value(json!({"id": "abc", "title": "Hello"})).unwrap();
        assert_eq!(submission.id, "abc");
        assert!(submission.url.is_none());
        assert!(!submission.is_self);
        assert!(submission.reddit_video().is_none());
        assert!(submission.gallery().is_none());
        assert_eq!(submission.fullname(), "t3_abc");
    }

    #[test]
    fn test_deleted_author() {
        let submission: Submission =
            serde_json::from_value(json!({"id": "abc", "author": "[deleted]"})).unwrap();
        assert!(submission.author().is_none());
    }

    #[test]
    fn test_reddit_video_from_crosspost_parent() {
        let submission: Submission = serde_json::from_value(json!({
            "id": "abc",
            "media": null,
            "crosspost_parent_list": [{
                "media": {"reddit_video": {
                    "fallback_url": "https://v.redd.it/xyz/DASH_720.mp4?source=fallback"
                }}
            }]
        }))
        .unwrap();

        let video = submission.reddit_video().unwrap();
        assert_eq!(
            video.fallback_url.as_deref(),
            Some("https://v.redd.it/xyz/DASH_720.mp4?source=fallback")
        );
    }

    #[test]
    fn test_malformed_media_reads_as_absent() {
        let submission: Submission = serde_json::from_value(json!({
            "id": "abc",
            "media": {"reddit_video": "not an object"}
        }))
        .unwrap();
        assert!(submission.reddit_video().is_none());
    }

    #[test]
    fn test_comment_tree_with_empty_replies() {
        let thing: Thing = serde_json::from_value(json!({
            "kind": "Listing",
            "data": {"after": null, "children": [
                {"kind": "t1", "data": {"id": "c1", "body": "top", "replies": ""}},
                {"kind": "t1", "data": {"id": "c2", "body": "parent", "replies": {
                    "kind": "Listing",
                    "data": {"children": [
                        {"kind": "t1", "data": {"id": "c3", "body": "child", "replies": ""}},
                        {"kind": "more", "data": {"id": "m1", "count": 2, "children": ["c4", "c5"]}}
                    ]}
                }}}
            ]}
        }))
        .unwrap();

        let Thing::Listing(listing) = thing else {
            panic!("expected listing");
        };
        assert_eq!(listing.children.len(), 2);
        match &listing.children[1] {
            Thing::Comment(comment) => assert_eq!(comment.replies.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }
}
