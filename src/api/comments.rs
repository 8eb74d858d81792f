//! Comment forest handling.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::types::{Comment, MoreComments, Submission, Thing};
use crate::error::Result;

/// Source of comment trees for submissions.
#[async_trait]
pub trait CommentSource: Send + Sync {
    /// Fetch the comment forest of a submission as first returned by the API.
    async fn comments(&self, submission: &Submission) -> Result<CommentForest>;

    /// Expand placeholder comment IDs into things.
    async fn more_children(&self, link_fullname: &str, children: &[String]) -> Result<Vec<Thing>>;
}

/// Top-level comments of a submission, with their reply trees.
#[derive(Debug, Clone, Default)]
pub struct CommentForest {
    nodes: Vec<Thing>,
}

impl CommentForest {
    /// Wrap the top-level things of a comment listing.
    pub fn new(nodes: Vec<Thing>) -> Self {
        Self { nodes }
    }

    /// Number of placeholder nodes anywhere in the forest.
    pub fn pending_placeholders(&self) -> usize {
        fn count(nodes: &[Thing]) -> usize {
            nodes
                .iter()
                .map(|node| match node {
                    Thing::More(_) => 1,
                    Thing::Comment(comment) => count(&comment.replies),
                    _ => 0,
                })
                .sum()
        }
        count(&self.nodes)
    }

    /// Replace every placeholder node by the comments it stands for.
    ///
    /// Returns the number of comments added. "Continue this thread"
    /// placeholders carry no IDs and are dropped.
    pub async fn replace_more(
        &mut self,
        source: &dyn CommentSource,
        link_fullname: &str,
    ) -> Result<usize> {
        let mut expanded: HashSet<String> = HashSet::new();
        let mut added = 0;

        loop {
            let mut pending = Vec::new();
            take_placeholders(&mut self.nodes, &mut pending);
            if pending.is_empty() {
                break;
            }

            for more in pending {
                if more.children.is_empty() {
                    tracing::debug!("Dropping empty comment placeholder {}", more.id);
                    continue;
                }
                if !expanded.insert(more.id.clone()) {
                    tracing::debug!("Placeholder {} already expanded, dropping", more.id);
                    continue;
                }

                tracing::debug!(
                    "Expanding {} hidden comment(s) under {}",
                    more.children.len(),
                    more.parent_id.as_deref().unwrap_or(link_fullname)
                );

                for thing in source.more_children(link_fullname, &more.children).await? {
                    match thing {
                        Thing::Comment(comment) => {
                            let parent = comment.parent_id.clone();
                            self.attach(parent.as_deref(), link_fullname, Thing::Comment(comment));
                            added += 1;
                        }
                        Thing::More(more) => {
                            let parent = more.parent_id.clone();
                            self.attach(parent.as_deref(), link_fullname, Thing::More(more));
                        }
                        _ => {}
                    }
                }
            }
        }

        Ok(added)
    }

    /// Attach a thing under its parent comment, or at the top level.
    fn attach(&mut self, parent: Option<&str>, link_fullname: &str, thing: Thing) {
        let parent = match parent {
            Some(parent) if parent != link_fullname => parent,
            _ => {
                self.nodes.push(thing);
                return;
            }
        };

        match find_comment_mut(&mut self.nodes, parent) {
            Some(comment) => comment.replies.push(thing),
            None => {
                tracing::debug!("Parent {} not in forest, attaching at top level", parent);
                self.nodes.push(thing);
            }
        }
    }

    /// All comments, flattened breadth-first (top-level comments first).
    pub fn list(&self) -> Vec<&Comment> {
        let mut queue: VecDeque<&Thing> = self.nodes.iter().collect();
        let mut comments = Vec::new();

        while let Some(thing) = queue.pop_front() {
            if let Thing::Comment(comment) = thing {
                comments.push(comment.as_ref());
                queue.extend(comment.replies.iter());
            }
        }

        comments
    }
}

/// Remove placeholder nodes from the whole tree, collecting them into `out`.
fn take_placeholders(nodes: &mut Vec<Thing>, out: &mut Vec<MoreComments>) {
    let (placeholders, rest): (Vec<Thing>, Vec<Thing>) = std::mem::take(nodes)
        .into_iter()
        .partition(|node| matches!(node, Thing::More(_)));
    *nodes = rest;

    out.extend(placeholders.into_iter().filter_map(|node| match node {
        Thing::More(more) => Some(more),
        _ => None,
    }));

    for node in nodes.iter_mut() {
        if let Thing::Comment(comment) = node {
            take_placeholders(&mut comment.replies, out);
        }
    }
}

fn find_comment_mut<'a>(nodes: &'a mut [Thing], fullname: &str) -> Option<&'a mut Comment> {
    for node in nodes.iter_mut() {
        let Thing::Comment(comment) = node else {
            continue;
        };
        if comment.fullname() == fullname {
            return Some(comment.as_mut());
        }
        if let Some(found) = find_comment_mut(&mut comment.replies, fullname) {
            return Some(found);
        }
    }
    None
}

/// Serves forests that were already fetched, once each, before asking `inner`.
pub struct PrefetchedComments<'a> {
    inner: &'a dyn CommentSource,
    forests: Mutex<HashMap<String, CommentForest>>,
}

impl<'a> PrefetchedComments<'a> {
    pub fn new(inner: &'a dyn CommentSource) -> Self {
        Self {
            inner,
            forests: Mutex::new(HashMap::new()),
        }
    }

    /// Keep the forest fetched together with submission `id`.
    pub fn insert(&self, id: &str, forest: CommentForest) {
        if let Ok(mut forests) = self.forests.lock() {
            forests.insert(id.to_string(), forest);
        }
    }

    fn take(&self, id: &str) -> Option<CommentForest> {
        self.forests.lock().ok().and_then(|mut forests| forests.remove(id))
    }
}

#[async_trait]
impl CommentSource for PrefetchedComments<'_> {
    async fn comments(&self, submission: &Submission) -> Result<CommentForest> {
        if let Some(forest) = self.take(&submission.id) {
            tracing::debug!("Using prefetched comments of {}", submission.id);
            return Ok(forest);
        }
        self.inner.comments(submission).await
    }

    async fn more_children(&self, link_fullname: &str, children: &[String]) -> Result<Vec<Thing>> {
        self.inner.more_children(link_fullname, children).await
    }
}
