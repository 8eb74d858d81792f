//! Configuration structures and loading logic.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reddit: RedditConfig,

    #[serde(default)]
    pub imgur: ImgurConfig,

    #[serde(default)]
    pub options: OptionsConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub endpoints: EndpointsConfig,
}

/// Reddit access configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditConfig {
    /// User agent sent with every request. Reddit throttles generic agents hard.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Imgur API credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImgurConfig {
    /// Imgur application client ID. Imgur links are skipped without it.
    #[serde(default)]
    pub client_id: Option<String>,
}

/// Archiving options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Base directory for archived submissions.
    #[serde(default)]
    pub output_directory: Option<PathBuf>,

    /// Don't download video content.
    #[serde(default)]
    pub skip_videos: bool,

    /// Don't write submission.json.
    #[serde(default)]
    pub skip_meta: bool,

    /// Don't write comments.json.
    #[serde(default)]
    pub skip_comments: bool,

    /// Maximum number of comments written per submission. `None` keeps all.
    #[serde(default)]
    pub comment_limit: Option<usize>,

    /// Whether to show progress bars.
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            output_directory: None,
            skip_videos: false,
            skip_meta: false,
            skip_comments: false,
            comment_limit: None,
            show_progress: true,
        }
    }
}

/// External programs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// ffmpeg executable used to merge video and audio streams.
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: PathBuf,

    /// yt-dlp executable used for generic video sites and HLS streams.
    #[serde(default = "default_ytdlp")]
    pub ytdlp: PathBuf,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            ytdlp: default_ytdlp(),
        }
    }
}

/// Remote base URLs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_reddit_api")]
    pub reddit_api: String,

    /// Host serving reddit-hosted video streams.
    #[serde(default = "default_reddit_video")]
    pub reddit_video: String,

    #[serde(default = "default_imgur_api")]
    pub imgur_api: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            reddit_api: default_reddit_api(),
            reddit_video: default_reddit_video(),
            imgur_api: default_imgur_api(),
        }
    }
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
        }
    }
}

fn default_user_agent() -> String {
    format!("reddit-archiver/{}", env!("CARGO_PKG_VERSION"))
}

fn default_true() -> bool {
    true
}

fn default_ffmpeg() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_ytdlp() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_reddit_api() -> String {
    "https://www.reddit.com".to_string()
}

fn default_reddit_video() -> String {
    "https://v.redd.it".to_string()
}

fn default_imgur_api() -> String {
    "https://api.imgur.com/3".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}. Create one from config.example.toml",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Platform configuration file, e.g. `~/.config/reddit-archiver/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "reddit-archiver")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the effective output directory.
    pub fn output_directory(&self) -> PathBuf {
        self.options
            .output_directory
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Imgur client ID, if one is configured and non-empty.
    pub fn imgur_client_id(&self) -> Option<&str> {
        self.imgur
            .client_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.imgur_client_id().is_none());
        assert!(config.options.show_progress);
        assert_eq!(config.options.comment_limit, None);
        assert_eq!(config.tools.ffmpeg, PathBuf::from("ffmpeg"));
        assert_eq!(config.endpoints.reddit_video, "https://v.redd.it");
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            r#"
            [imgur]
            client_id = "  abc123def  "

            [options]
            skip_videos = true
            comment_limit = 25
            "#,
        )
        .unwrap();

        assert_eq!(config.imgur_client_id(), Some("abc123def"));
        assert!(config.options.skip_videos);
        assert!(!config.options.skip_meta);
        assert_eq!(config.options.comment_limit, Some(25));
        assert!(config.reddit.user_agent.starts_with("reddit-archiver/"));
    }

    #[test]
    fn test_blank_imgur_client_id_is_absent() {
        let mut config = Config::default();
        config.imgur.client_id = Some("   ".to_string());
        assert!(config.imgur_client_id().is_none());
    }
}
