//! Configuration validation logic.

use crate::config::loader::Config;
use crate::error::{Error, Result};
use regex::Regex;

/// Minimum length for a user agent.
const MIN_USER_AGENT_LENGTH: usize = 10;

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_user_agent(&config.reddit.user_agent)?;

    if let Some(client_id) = config.imgur_client_id() {
        validate_imgur_client_id(client_id)?;
    }

    if config.tools.ffmpeg.as_os_str().is_empty() {
        return Err(Error::MissingConfig("tools.ffmpeg".to_string()));
    }

    if config.tools.ytdlp.as_os_str().is_empty() {
        return Err(Error::MissingConfig("tools.ytdlp".to_string()));
    }

    Ok(())
}

/// Validate the user agent string.
pub fn validate_user_agent(user_agent: &str) -> Result<()> {
    if user_agent.trim().is_empty() {
        return Err(Error::MissingConfig("reddit.user_agent".to_string()));
    }

    if user_agent.len() < MIN_USER_AGENT_LENGTH {
        return Err(Error::ConfigValidation {
            field: "reddit.user_agent".to_string(),
            message: format!(
                "User agent must be at least {} characters (got {})",
                MIN_USER_AGENT_LENGTH,
                user_agent.len()
            ),
        });
    }

    let lower = user_agent.to_lowercase();
    if lower.contains("replaceme") || lower.contains("your_user_agent") {
        return Err(Error::ConfigValidation {
            field: "reddit.user_agent".to_string(),
            message: "User agent appears to be a placeholder.".to_string(),
        });
    }

    Ok(())
}

/// Validate the Imgur client ID.
pub fn validate_imgur_client_id(client_id: &str) -> Result<()> {
    let lower = client_id.to_lowercase();
    if lower.contains("replaceme") || lower.contains("your_client_id") {
        return Err(Error::ConfigValidation {
            field: "imgur.client_id".to_string(),
            message: "Client ID appears to be a placeholder. Remove it or provide a real one."
                .to_string(),
        });
    }

    let pattern = Regex::new(r"^[A-Za-z0-9]+$").unwrap();
    if !pattern.is_match(client_id) {
        return Err(Error::ConfigValidation {
            field: "imgur.client_id".to_string(),
            message: format!("Client ID '{}' must be alphanumeric", client_id),
        });
    }

    Ok(())
}

/// Validate subreddit names, stripping an optional `r/` prefix.
pub fn parse_subreddit(input: &str) -> Result<String> {
    let name = input
        .trim()
        .trim_start_matches('/')
        .trim_start_matches("r/")
        .trim_end_matches('/');

    let pattern = Regex::new(r"^[A-Za-z0-9_]{2,21}$").unwrap();
    if !pattern.is_match(name) {
        return Err(Error::ConfigValidation {
            field: "subreddit".to_string(),
            message: format!(
                "Invalid subreddit '{}'. Names are 2-21 letters, digits or underscores.",
                input
            ),
        });
    }

    Ok(name.to_string())
}

/// Extract a submission ID from a permalink, short link or bare ID.
pub fn parse_submission_id(input: &str) -> Result<String> {
    let input = input.trim();

    if input.starts_with("http://") || input.starts_with("https://") {
        // https://www.reddit.com/r/pics/comments/abc123/title/ or https://redd.it/abc123
        let permalink = Regex::new(r"/comments/([a-z0-9]+)").unwrap();
        let short = Regex::new(r"^https?://redd\.it/([a-z0-9]+)/?$").unwrap();

        let captures = permalink
            .captures(input)
            .or_else(|| short.captures(input));
        if let Some(id) = captures.and_then(|c| c.get(1)) {
            return Ok(id.as_str().to_string());
        }

        return Err(Error::ConfigValidation {
            field: "submission".to_string(),
            message: format!("Could not extract submission ID from URL: {}", input),
        });
    }

    let id = input.trim_start_matches("t3_");
    let id_pattern = Regex::new(r"^[a-z0-9]{4,10}$").unwrap();
    if id_pattern.is_match(id) {
        return Ok(id.to_string());
    }

    Err(Error::ConfigValidation {
        field: "submission".to_string(),
        message: format!(
            "Invalid submission ID: '{}'. Expected a base-36 ID or a reddit permalink.",
            input
        ),
    })
}

/// Parse a comment limit: a number, or `all`/`unlimited` for no limit.
pub fn parse_comment_limit(input: &str) -> std::result::Result<Option<usize>, String> {
    match input.trim().to_lowercase().as_str() {
        "all" | "unlimited" | "none" => Ok(None),
        value => value
            .parse::<usize>()
            .map(Some)
            .map_err(|_| format!("'{}' is not a number or 'all'", input)),
    }
}
