//! Filesystem module.
//!
//! Provides:
//! - Submission directory layout
//! - Filename generation and sanitizing

pub mod naming;
pub mod paths;

pub use naming::{
    file_stem, filename_from_url, ordinal_filename, sanitize_filename, sanitize_title,
};
pub use paths::{
    submission_dir_name, submissions_dir, subreddit_dir, SubmissionContext, FILES_DIR,
};
