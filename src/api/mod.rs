//! Reddit and Imgur API module.
//!
//! This module provides:
//! - HTTP client for the Reddit JSON API
//! - Comment forest expansion
//! - Imgur album and image lookups
//! - API response types

pub mod client;
pub mod comments;
pub mod imgur;
pub mod types;

pub use client::{RedditApi, MORE_CHILDREN_BATCH, PAGE_SIZE};
pub use comments::{CommentForest, CommentSource, PrefetchedComments};
pub use imgur::{ImgurAlbum, ImgurApi, ImgurImage};
pub use types::*;
