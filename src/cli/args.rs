//! Command-line argument definitions using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{parse_comment_limit, parse_submission_id, parse_subreddit, Config, SortMode};
use crate::error::Result;

/// Default number of submissions taken from each subreddit.
pub const DEFAULT_LISTING_LIMIT: usize = 25;

/// Reddit submission archiver CLI.
#[derive(Parser, Debug)]
#[command(
    name = "reddit-archiver",
    version,
    about = "Archive Reddit submissions with their media and comments",
    long_about = "A CLI tool to archive Reddit submissions to disk.\n\n\
                  Each submission gets a directory holding its media (images, galleries, \
                  videos with audio, Imgur albums), submission.json and comments.json."
)]
pub struct Args {
    /// Subreddit(s) to archive. Can be repeated.
    #[arg(short = 'r', long = "subreddit", num_args = 1..)]
    pub subreddits: Vec<String>,

    /// Listing sort for subreddits.
    #[arg(short, long, value_enum, default_value_t = SortArg::Hot)]
    pub sort: SortArg,

    /// Number of submissions per subreddit.
    #[arg(short, long, default_value_t = DEFAULT_LISTING_LIMIT)]
    pub limit: usize,

    /// Submission ID(s) or permalink(s) to archive. Can be repeated.
    #[arg(long = "submission", num_args = 1..)]
    pub submissions: Vec<String>,

    /// Base directory for archives.
    #[arg(short = 'd', long = "directory")]
    pub output_directory: Option<PathBuf>,

    /// Path to configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Imgur application client ID.
    #[arg(long = "imgur-client-id", env = "IMGUR_CLIENT_ID")]
    pub imgur_client_id: Option<String>,

    /// User agent sent to Reddit.
    #[arg(short = 'a', long = "user-agent", env = "REDDIT_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Don't download video content.
    #[arg(long)]
    pub skip_videos: bool,

    /// Don't write submission.json.
    #[arg(long)]
    pub skip_meta: bool,

    /// Don't write comments.json.
    #[arg(long)]
    pub skip_comments: bool,

    /// Maximum comments per submission, or `all`.
    #[arg(long, value_parser = comment_limit_arg)]
    pub comment_limit: Option<CommentLimit>,

    /// ffmpeg executable.
    #[arg(long)]
    pub ffmpeg: Option<PathBuf>,

    /// yt-dlp executable.
    #[arg(long = "yt-dlp")]
    pub ytdlp: Option<PathBuf>,

    /// Hide progress bars and per-submission summaries.
    #[arg(long, short)]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

/// Parsed `--comment-limit`; `None` keeps every comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentLimit(pub Option<usize>);

fn comment_limit_arg(input: &str) -> std::result::Result<CommentLimit, String> {
    parse_comment_limit(input).map(CommentLimit)
}

/// CLI sort argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    Hot,
    New,
    Rising,
    Controversial,
    Top,
}

impl From<SortArg> for SortMode {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Hot => SortMode::Hot,
            SortArg::New => SortMode::New,
            SortArg::Rising => SortMode::Rising,
            SortArg::Controversial => SortMode::Controversial,
            SortArg::Top => SortMode::Top,
        }
    }
}

/// Something to archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Subreddit {
        name: String,
        sort: SortMode,
        limit: usize,
    },
    Submissions(Vec<String>),
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Subreddit { name, sort, limit } => write!(f, "r/{} ({}, {})", name, sort, limit),
            Source::Submissions(ids) => write!(f, "{} submission(s)", ids.len()),
        }
    }
}

impl Args {
    /// Validated sources, subreddits first.
    pub fn sources(&self) -> Result<Vec<Source>> {
        let sort = SortMode::from(self.sort);
        let mut sources = Vec::new();

        for subreddit in &self.subreddits {
            sources.push(Source::Subreddit {
                name: parse_subreddit(subreddit)?,
                sort,
                limit: self.limit,
            });
        }

        if !self.submissions.is_empty() {
            let ids = self
                .submissions
                .iter()
                .map(|s| parse_submission_id(s))
                .collect::<Result<Vec<_>>>()?;
            sources.push(Source::Submissions(ids));
        }

        Ok(sources)
    }

    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(self, config: &mut Config) {
        if let Some(dir) = self.output_directory {
            config.options.output_directory = Some(dir);
        }

        if let Some(client_id) = self.imgur_client_id {
            config.imgur.client_id = Some(client_id);
        }

        if let Some(user_agent) = self.user_agent {
            config.reddit.user_agent = user_agent;
        }

        if let Some(CommentLimit(limit)) = self.comment_limit {
            config.options.comment_limit = limit;
        }

        if let Some(ffmpeg) = self.ffmpeg {
            config.tools.ffmpeg = ffmpeg;
        }

        if let Some(ytdlp) = self.ytdlp {
            config.tools.ytdlp = ytdlp;
        }

        // Boolean flags (only override if set)
        if self.skip_videos {
            config.options.skip_videos = true;
        }

        if self.skip_meta {
            config.options.skip_meta = true;
        }

        if self.skip_comments {
            config.options.skip_comments = true;
        }

        if self.quiet {
            config.options.show_progress = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("reddit-archiver").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_sources() {
        let args = parse(&[
            "--subreddit",
            "r/pics",
            "--subreddit",
            "EarthPorn",
            "--sort",
            "top",
            "--limit",
            "10",
            "--submission",
            "https://www.reddit.com/r/pics/comments/abc123/title/",
        ]);

        let sources = args.sources().unwrap();
        assert_eq!(
            sources,
            vec![
                Source::Subreddit {
                    name: "pics".to_string(),
                    sort: SortMode::Top,
                    limit: 10
                },
                Source::Subreddit {
                    name: "EarthPorn".to_string(),
                    sort: SortMode::Top,
                    limit: 10
                },
                Source::Submissions(vec!["abc123".to_string()]),
            ]
        );
    }

    #[test]
    fn test_invalid_subreddit() {
        let args = parse(&["--subreddit", "no spaces allowed"]);
        assert!(args.sources().is_err());
    }

    #[test]
    fn test_comment_limit() {
        assert_eq!(parse(&["--comment-limit", "all"]).comment_limit, Some(CommentLimit(None)));
        assert_eq!(parse(&["--comment-limit", "50"]).comment_limit, Some(CommentLimit(Some(50))));
        assert!(Args::try_parse_from(["reddit-archiver", "--comment-limit", "lots"]).is_err());
    }

    #[test]
    fn test_merge_into_config() {
        let mut config = Config::default();
        config.options.comment_limit = Some(5);

        parse(&[
            "--skip-meta",
            "--quiet",
            "--comment-limit",
            "all",
            "--ffmpeg",
            "/opt/ffmpeg",
            "--imgur-client-id",
            "abc123",
        ])
        .merge_into_config(&mut config);

        assert!(config.options.skip_meta);
        assert!(!config.options.skip_comments);
        assert!(!config.options.show_progress);
        assert_eq!(config.options.comment_limit, None);
        assert_eq!(config.tools.ffmpeg, PathBuf::from("/opt/ffmpeg"));
        assert_eq!(config.imgur_client_id(), Some("abc123"));
    }
}
