//! Download module for submission media.
//!
//! This module provides:
//! - The streaming fetcher shared by every strategy
//! - One strategy per content kind
//! - Reddit video and audio reconciliation
//! - yt-dlp and ffmpeg wrappers
//! - The per-submission driver and run statistics

pub mod direct;
pub mod downloader;
pub mod fetcher;
pub mod gallery;
pub mod gfycat;
pub mod imgur;
pub mod merge;
pub mod outcome;
pub mod state;
pub mod submission;
pub mod video;
pub mod ytdlp;

pub use downloader::Downloader;
pub use fetcher::{FetchError, Fetched, Fetcher};
pub use merge::Ffmpeg;
pub use outcome::{DownloadOutcome, OutcomeStatus, Verdict};
pub use state::RunStats;
pub use submission::{archive_submission, ArchiveOptions, SubmissionReport};
pub use video::{download_reddit_video, VideoArtifact};
pub use ytdlp::YtDlp;
