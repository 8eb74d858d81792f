//! gfycat and redgifs links.
//!
//! Tried in order, stopping at the first success:
//! 1. resolve redirects (gfycat links often forward elsewhere)
//! 2. the submission's own preview data
//! 3. scraping the resolved page for an MP4 source
//! 4. yt-dlp on the resolved URL

use std::time::Duration;

use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

use crate::api::Submission;
use crate::download::direct::DIRECT_TIMEOUT;
use crate::download::downloader::Downloader;
use crate::download::outcome::Verdict;
use crate::download::ytdlp::DEFAULT_TEMPLATE;
use crate::error::Result;
use crate::fs::{filename_from_url, SubmissionContext};
use crate::media::best_preview;

/// Timeout for fetching the page to scrape.
const SCRAPE_TIMEOUT: Duration = Duration::from_secs(15);

/// Name fragments of full-quality sources.
const HIGH_QUALITY_TOKENS: &[&str] = &["giant.", "zippy."];

/// Name fragments of reduced-quality sources.
const THUMB_TOKENS: &[&str] = &["thumbs."];

pub async fn download_gfycat(
    downloader: &Downloader,
    url: &str,
    submission: &Submission,
    context: &mut SubmissionContext,
) -> Result<Verdict> {
    let final_url = match downloader.fetcher.resolve_redirects(url).await {
        Ok(resolved) => {
            if resolved != url {
                tracing::debug!("Redirected to {}", resolved);
            }
            resolved
        }
        Err(e) => {
            tracing::debug!("Could not resolve {} ({}), using it as is", url, e);
            url.to_string()
        }
    };

    let base_name = filename_from_url(url).unwrap_or_else(|| submission.id.clone());

    if let Some(preview) = submission.preview().as_ref().and_then(best_preview) {
        let filename = format!("{}{}", base_name, preview.extension);
        let dest = context.files_dir().join(&filename);
        match downloader.fetcher.fetch(&preview.url, &dest, DIRECT_TIMEOUT).await {
            Ok(_) => {
                tracing::debug!("Saved preview media as {}", filename);
                return Ok(Verdict::Succeeded);
            }
            Err(e) => tracing::debug!("Preview download failed: {}", e),
        }
    } else {
        tracing::debug!("No usable preview data");
    }

    if is_scrapable(&final_url) {
        match downloader.fetcher.get_text(&final_url, SCRAPE_TIMEOUT).await {
            Ok(html) => match find_video_source(&html) {
                Some(source) => {
                    let filename = filename_from_url(&source)
                        .unwrap_or_else(|| format!("{}.mp4", base_name));
                    let dest = context.files_dir().join(&filename);
                    match downloader.fetcher.fetch(&source, &dest, DIRECT_TIMEOUT).await {
                        Ok(_) => {
                            tracing::debug!("Saved scraped video as {}", filename);
                            return Ok(Verdict::Succeeded);
                        }
                        Err(e) => tracing::debug!("Scraped source failed: {}", e),
                    }
                }
                None => tracing::debug!("No MP4 source on {}", final_url),
            },
            Err(e) => tracing::debug!("Could not fetch {} for scraping: {}", final_url, e),
        }
    }

    let dir = context.files_dir().to_path_buf();
    match downloader.ytdlp.download(&final_url, &dir, DEFAULT_TEMPLATE).await {
        Ok(()) => Ok(Verdict::Succeeded),
        Err(e) => {
            tracing::warn!("All methods failed for {}: {}", url, e);
            Ok(Verdict::Failed)
        }
    }
}

fn is_scrapable(url: &str) -> bool {
    Url::parse(url).is_ok_and(|u| matches!(u.scheme(), "http" | "https"))
}

/// Find an MP4 URL in a gfycat/redgifs page.
///
/// `<video><source>` elements win, full-quality names before thumbnails;
/// otherwise a `"contentUrl"` field in an inline script is used.
pub fn find_video_source(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    if let Ok(selector) = Selector::parse("video source[src]") {
        let sources: Vec<&str> = document
            .select(&selector)
            .filter_map(|el| el.value().attr("src"))
            .filter(|src| src.ends_with(".mp4"))
            .collect();

        let has_token = |src: &str, tokens: &[&str]| tokens.iter().any(|t| src.contains(t));
        let best = sources
            .iter()
            .copied()
            .find(|src| has_token(src, HIGH_QUALITY_TOKENS))
            .or_else(|| sources.iter().copied().find(|src| has_token(src, THUMB_TOKENS)))
            .or_else(|| sources.first().copied());

        if let Some(src) = best {
            return Some(src.to_string());
        }
    }

    let pattern = Regex::new(r#""contentUrl"\s*:\s*"([^"]+\.mp4)""#).unwrap();
    let selector = Selector::parse("script").ok()?;
    document.select(&selector).find_map(|script| {
        let text: String = script.text().collect();
        pattern
            .captures(&text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_high_quality_source() {
        let html = r#"
            <html><body>
              <video>
                <source src="https://thumbs.gfycat.com/Cat-mobile.mp4" type="video/mp4">
                <source src="https://giant.gfycat.com/Cat.webm" type="video/webm">
                <source src="https://giant.gfycat.com/Cat.mp4" type="video/mp4">
              </video>
            </body></html>"#;
        assert_eq!(
            find_video_source(html).as_deref(),
            Some("https://giant.gfycat.com/Cat.mp4")
        );
    }

    #[test]
    fn test_thumbs_before_other_sources() {
        let html = r#"<video>
            <source src="https://cdn.example.com/other.mp4">
            <source src="https://thumbs.redgifs.com/Cat.mp4">
        </video>"#;
        assert_eq!(
            find_video_source(html).as_deref(),
            Some("https://thumbs.redgifs.com/Cat.mp4")
        );
    }

    #[test]
    fn test_script_content_url() {
        let html = r#"<html><head>
            <script type="application/ld+json">
              {"@type": "VideoObject", "contentUrl" : "https://files.redgifs.com/Cat.mp4"}
            </script>
        </head></html>"#;
        assert_eq!(
            find_video_source(html).as_deref(),
            Some("https://files.redgifs.com/Cat.mp4")
        );
    }

    #[test]
    fn test_nothing_found() {
        assert_eq!(find_video_source("<html><body><img src='x.jpg'></body></html>"), None);
    }

    #[test]
    fn test_is_scrapable() {
        assert!(is_scrapable("https://www.redgifs.com/watch/cat"));
        assert!(is_scrapable("http://127.0.0.1:8080/Cat"));
        assert!(!is_scrapable("ftp://gfycat.com/Cat"));
        assert!(!is_scrapable("nope"));
    }
}
