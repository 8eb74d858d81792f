//! Path and directory management.

use std::io;
use std::path::{Path, PathBuf};

use crate::config::SortMode;
use crate::error::Result;
use crate::fs::naming::sanitize_title;

/// Name of the media subdirectory inside a submission directory.
pub const FILES_DIR: &str = "files";

/// Directory name of a submission: `{index:03}_{sanitized title}`.
pub fn submission_dir_name(index: usize, title: &str) -> String {
    format!("{:03}_{}", index, sanitize_title(title))
}

/// Output directory for a subreddit listing.
pub fn subreddit_dir(base: &Path, subreddit: &str, sort: SortMode) -> PathBuf {
    base.join("subreddits").join(subreddit).join(sort.to_string())
}

/// Output directory for submissions requested by ID.
pub fn submissions_dir(base: &Path) -> PathBuf {
    base.join("submissions")
}

/// Per-submission working state.
#[derive(Debug)]
pub struct SubmissionContext {
    pub index: usize,
    pub dir: PathBuf,
    use_files_subdir: bool,
    files_dir: Option<PathBuf>,
}

impl SubmissionContext {
    /// Context for the submission at `index` under `parent`.
    ///
    /// With `use_files_subdir` media goes to `files/`, otherwise straight
    /// into the submission directory.
    pub fn new(parent: &Path, index: usize, title: &str, use_files_subdir: bool) -> Self {
        Self {
            index,
            dir: parent.join(submission_dir_name(index, title)),
            use_files_subdir,
            files_dir: None,
        }
    }

    /// Create the submission directory.
    ///
    /// Returns `false` if it already existed.
    pub fn create(&self) -> Result<bool> {
        if let Some(parent) = self.dir.parent() {
            std::fs::create_dir_all(parent)?;
        }

        match std::fs::create_dir(&self.dir) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Directory media files are written to, created on first call.
    ///
    /// Falls back to the submission directory if `files/` cannot be created.
    pub fn files_dir(&mut self) -> &Path {
        if self.files_dir.is_none() {
            let dir = if self.use_files_subdir {
                let target = self.dir.join(FILES_DIR);
                match std::fs::create_dir_all(&target) {
                    Ok(()) => target,
                    Err(e) => {
                        tracing::error!(
                            "Failed to create '{}': {}, using {}",
                            target.display(),
                            e,
                            self.dir.display()
                        );
                        self.dir.clone()
                    }
                }
            } else {
                self.dir.clone()
            };
            self.files_dir = Some(dir);
        }

        self.files_dir.as_deref().unwrap_or(&self.dir)
    }

    /// Whether [`files_dir`](Self::files_dir) has been requested.
    pub fn has_files_dir(&self) -> bool {
        self.files_dir.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_submission_dir_name() {
        assert_eq!(submission_dir_name(7, "My cat: a story"), "007_My_cat_a_story");
    }

    #[test]
    fn test_layout() {
        let base = Path::new("/archive");
        assert_eq!(
            subreddit_dir(base, "pics", SortMode::Top),
            PathBuf::from("/archive/subreddits/pics/top")
        );
        assert_eq!(submissions_dir(base), PathBuf::from("/archive/submissions"));
    }

    #[test]
    fn test_create_reports_existing() {
        let temp = TempDir::new().unwrap();
        let context = SubmissionContext::new(temp.path(), 0, "title", true);

        assert!(context.create().unwrap());
        assert!(!context.create().unwrap());
    }

    #[test]
    fn test_files_dir_is_lazy() {
        let temp = TempDir::new().unwrap();
        let mut context = SubmissionContext::new(temp.path(), 1, "title", true);
        context.create().unwrap();

        assert!(!context.dir.join(FILES_DIR).exists());
        let files = context.files_dir().to_path_buf();
        assert_eq!(files, context.dir.join(FILES_DIR));
        assert!(files.is_dir());
        assert!(context.has_files_dir());
    }

    #[test]
    fn test_files_dir_without_subdir() {
        let temp = TempDir::new().unwrap();
        let mut context = SubmissionContext::new(temp.path(), 2, "title", false);
        context.create().unwrap();

        let files = context.files_dir().to_path_buf();
        assert_eq!(files, context.dir);
        assert!(!context.dir.join(FILES_DIR).exists());
    }
}
