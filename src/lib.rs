//! Reddit Archiver - archive Reddit submissions to disk
//!
//! This library classifies the link of a submission, downloads its media with
//! a strategy per content kind, and writes the submission and its comments
//! as JSON next to the media.
//!
//! # Features
//!
//! - Direct images and videos, Reddit galleries
//! - Reddit-hosted video with audio merged by ffmpeg
//! - gfycat/redgifs with layered fallbacks
//! - Imgur albums and images
//! - Any site yt-dlp supports
//! - Resumable runs: archived submissions are skipped
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use reddit_archiver::{archive_submission, ArchiveOptions, Config, Downloader, RedditApi};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("config.toml"))?;
//!     let api = RedditApi::new(&config.reddit.user_agent, &config.endpoints.reddit_api)?;
//!     let downloader = Downloader::from_config(&config)?;
//!
//!     let (submission, _) = api.submission("abc123").await?;
//!     let options = ArchiveOptions::from_config(&config);
//!     archive_submission(&downloader, &api, &submission, Path::new("out"), 0, &options).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod export;
pub mod fs;
pub mod media;
pub mod output;

// Re-exports for convenience
pub use api::{CommentSource, RedditApi, Submission};
pub use config::{Config, SortMode};
pub use download::{archive_submission, ArchiveOptions, Downloader, RunStats, SubmissionReport};
pub use error::{Error, Result};
pub use media::{classify, ContentKind};
