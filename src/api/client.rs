//! Reddit JSON API HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::api::comments::{CommentForest, CommentSource};
use crate::api::types::*;
use crate::config::SortMode;
use crate::error::{Error, Result};

/// Maximum submissions per listing page.
pub const PAGE_SIZE: usize = 100;

/// Maximum comment IDs per `morechildren` request.
pub const MORE_CHILDREN_BATCH: usize = 100;

/// Timeout for API calls.
const API_TIMEOUT: Duration = Duration::from_secs(20);

/// Reddit API client using the public JSON endpoints.
pub struct RedditApi {
    client: Client,
    base_url: String,
}

impl RedditApi {
    /// Create a new API client.
    pub fn new(user_agent: &str, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(API_TIMEOUT)
            .build()
            .map_err(|e| Error::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Make a GET request and check the status.
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response> {
        let url = format!("{}{}", self.base_url, path);

        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[("raw_json", "1")])
            .query(query)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        match status {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                Err(Error::RateLimited(retry_after))
            }
            StatusCode::NOT_FOUND => Err(Error::NotFound(path.to_string())),
            status if !status.is_success() => {
                Err(Error::Api(format!("HTTP {} for {}", status, path)))
            }
            _ => Ok(response),
        }
    }

    /// GET and decode a JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let response = self.get(path, query).await?;
        let text = response.text().await?;

        serde_json::from_str(&text).map_err(|e| {
            Error::Api(format!(
                "Failed to parse {}: {} - Response: {}",
                path,
                e,
                excerpt(&text, 300)
            ))
        })
    }

    /// Fetch up to `limit` submissions from a subreddit listing.
    pub async fn listing(
        &self,
        subreddit: &str,
        sort: SortMode,
        limit: usize,
    ) -> Result<Vec<Submission>> {
        let path = format!("/r/{}/{}.json", subreddit, sort);
        let mut submissions = Vec::new();
        let mut after: Option<String> = None;

        while submissions.len() < limit {
            let page_size = (limit - submissions.len()).min(PAGE_SIZE);
            let mut query = vec![("limit", page_size.to_string())];
            if sort.takes_time_window() {
                query.push(("t", "all".to_string()));
            }
            if let Some(cursor) = &after {
                query.push(("after", cursor.clone()));
            }

            let page: Thing = self.get_json(&path, &query).await?;
            let Thing::Listing(listing) = page else {
                return Err(Error::Api(format!("Expected a listing from {}", path)));
            };

            let before = submissions.len();
            submissions.extend(listing.children.into_iter().filter_map(|thing| match thing {
                Thing::Submission(submission) => Some(*submission),
                _ => None,
            }));

            tracing::debug!(
                "Listing page for r/{} returned {} submissions",
                subreddit,
                submissions.len() - before
            );

            after = listing.after;
            if after.is_none() || submissions.len() == before {
                break;
            }
        }

        submissions.truncate(limit);
        Ok(submissions)
    }

    /// Fetch a single submission and its comment forest.
    pub async fn submission(&self, id: &str) -> Result<(Submission, CommentForest)> {
        let path = format!("/comments/{}.json", id);
        let pages: Vec<Thing> = self.get_json(&path, &[]).await?;
        let mut pages = pages.into_iter();

        let submission = match pages.next() {
            Some(Thing::Listing(listing)) => listing
                .children
                .into_iter()
                .find_map(|thing| match thing {
                    Thing::Submission(submission) => Some(*submission),
                    _ => None,
                })
                .ok_or_else(|| Error::NotFound(format!("submission {}", id)))?,
            _ => return Err(Error::Api(format!("Unexpected response shape for {}", path))),
        };

        let comments = match pages.next() {
            Some(Thing::Listing(listing)) => CommentForest::new(listing.children),
            _ => CommentForest::default(),
        };

        Ok((submission, comments))
    }

    /// Expand placeholder comment IDs.
    pub async fn more_children(&self, link_fullname: &str, children: &[String]) -> Result<Vec<Thing>> {
        let mut things = Vec::new();

        for batch in children.chunks(MORE_CHILDREN_BATCH) {
            let query = [
                ("api_type", "json".to_string()),
                ("link_id", link_fullname.to_string()),
                ("children", batch.join(",")),
            ];
            let response: MoreChildrenResponse =
                self.get_json("/api/morechildren.json", &query).await?;

            if !response.json.errors.is_empty() {
                return Err(Error::Api(format!(
                    "morechildren failed: {:?}",
                    response.json.errors
                )));
            }

            if let Some(data) = response.json.data {
                things.extend(data.things);
            }
        }

        Ok(things)
    }
}

/// The first `max_chars` characters of `text`.
fn excerpt(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(end, _)| &text[..end])
}

#[async_trait]
impl CommentSource for RedditApi {
    async fn comments(&self, submission: &Submission) -> Result<CommentForest> {
        let (_, comments) = self.submission(&submission.id).await?;
        Ok(comments)
    }

    async fn more_children(&self, link_fullname: &str, children: &[String]) -> Result<Vec<Thing>> {
        RedditApi::more_children(self, link_fullname, children).await
    }
}
