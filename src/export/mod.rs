//! Submission metadata and comment export.

pub mod comments;
pub mod metadata;

pub use comments::{export_comments, CommentRecord, COMMENTS_FILE};
pub use metadata::{export_submission, SubmissionRecord, SUBMISSION_FILE};
