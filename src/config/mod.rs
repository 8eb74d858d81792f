//! Configuration module for the reddit-archiver.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Listing sort modes
//! - Configuration and input validation

pub mod loader;
pub mod modes;
pub mod validation;

pub use loader::{Config, EndpointsConfig, ImgurConfig, OptionsConfig, RedditConfig, ToolsConfig};
pub use modes::SortMode;
pub use validation::{
    parse_comment_limit, parse_subreddit, parse_submission_id, validate_config,
};
