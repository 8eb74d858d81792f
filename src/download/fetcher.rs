//! Streaming download primitive.
//!
//! Every media download goes through [`Fetcher::fetch`], which streams the
//! body to disk and removes whatever was written if the transfer fails.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use reqwest::{header, Client, Response};
use thiserror::Error;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::output::create_download_bar;

/// Minimum file size to show progress bar (20 MB).
const PROGRESS_THRESHOLD: u64 = 20 * 1024 * 1024;

/// Timeout for establishing connections.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Timeout for the HEAD request used to resolve redirects.
pub const REDIRECT_HEAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for the GET fallback used to resolve redirects.
pub const REDIRECT_GET_TIMEOUT: Duration = Duration::from_secs(15);

/// Typed fetch failure.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP {status} fetching {url}")]
    Http { status: u16, url: String },

    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("Timed out after {}s fetching {url}", .timeout.as_secs())]
    Timeout { url: String, timeout: Duration },

    #[error("Failed to fetch {url}: {message}")]
    Other { url: String, message: String },
}

impl FetchError {
    fn from_reqwest(url: &str, timeout: Duration, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout,
            }
        } else if e.is_connect() || e.is_request() || e.is_body() {
            FetchError::Network {
                url: url.to_string(),
                message: e.to_string(),
            }
        } else {
            FetchError::Other {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    }

    fn io(url: &str, e: std::io::Error) -> Self {
        FetchError::Other {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}

/// A completed download.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub path: PathBuf,
    pub bytes: u64,
    /// `Content-Type` as sent by the server.
    pub content_type: Option<String>,
}

/// HTTP downloader shared by all strategies.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    show_progress: bool,
}

impl Fetcher {
    pub fn new(user_agent: &str, show_progress: bool) -> crate::error::Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| crate::error::Error::Download(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            show_progress,
        })
    }

    /// Download `url` to `dest`.
    ///
    /// `timeout` bounds the wait for the response headers and for each body
    /// chunk, not the whole transfer. On failure no file is left at `dest`.
    pub async fn fetch(
        &self,
        url: &str,
        dest: &Path,
        timeout: Duration,
    ) -> Result<Fetched, FetchError> {
        let result = self.stream_to_file(url, dest, timeout).await;

        if result.is_err() {
            if let Err(e) = tokio::fs::remove_file(dest).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!("Failed to remove partial file {}: {}", dest.display(), e);
                }
            }
        }

        result
    }

    async fn stream_to_file(
        &self,
        url: &str,
        dest: &Path,
        timeout: Duration,
    ) -> Result<Fetched, FetchError> {
        let response = self.send(self.client.get(url), url, timeout).await?;

        let content_length = response.content_length();
        let content_type = header_value(&response, header::CONTENT_TYPE);

        let progress = if self.show_progress
            && content_length.is_some_and(|l| l > PROGRESS_THRESHOLD)
        {
            Some(create_download_bar(content_length.unwrap_or(0)))
        } else {
            None
        };

        let file = File::create(dest).await.map_err(|e| FetchError::io(url, e))?;
        let mut writer = BufWriter::new(file);
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        loop {
            let next = tokio::time::timeout(timeout, stream.next())
                .await
                .map_err(|_| FetchError::Timeout {
                    url: url.to_string(),
                    timeout,
                })?;

            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk.map_err(|e| FetchError::from_reqwest(url, timeout, e))?;

            writer
                .write_all(&chunk)
                .await
                .map_err(|e| FetchError::io(url, e))?;
            written += chunk.len() as u64;

            if let Some(ref pb) = progress {
                pb.set_position(written);
            }
        }

        writer.flush().await.map_err(|e| FetchError::io(url, e))?;

        if let Some(pb) = progress {
            pb.finish_and_clear();
        }

        if let Some(expected) = content_length {
            if expected != written {
                tracing::warn!(
                    "Size mismatch for {}: expected {} bytes, got {}",
                    dest.display(),
                    expected,
                    written
                );
            }
        }

        tracing::debug!("Downloaded {} ({} bytes)", dest.display(), written);

        Ok(Fetched {
            path: dest.to_path_buf(),
            bytes: written,
            content_type,
        })
    }

    /// Send a request, mapping failures and error statuses to [`FetchError`].
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
        timeout: Duration,
    ) -> Result<Response, FetchError> {
        let response = tokio::time::timeout(timeout, request.send())
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
                timeout,
            })?
            .map_err(|e| FetchError::from_reqwest(url, timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response)
    }

    /// Final URL after following redirects.
    ///
    /// Tries a HEAD request first and falls back to GET for servers that
    /// mishandle HEAD.
    pub async fn resolve_redirects(&self, url: &str) -> Result<String, FetchError> {
        match self
            .send(self.client.head(url), url, REDIRECT_HEAD_TIMEOUT)
            .await
        {
            Ok(response) => Ok(response.url().to_string()),
            Err(e) => {
                tracing::debug!("HEAD failed for {} ({}), trying GET", url, e);
                let response = self
                    .send(self.client.get(url), url, REDIRECT_GET_TIMEOUT)
                    .await?;
                Ok(response.url().to_string())
            }
        }
    }

    /// GET a page body as text.
    pub async fn get_text(&self, url: &str, timeout: Duration) -> Result<String, FetchError> {
        let response = self.send(self.client.get(url), url, timeout).await?;

        tokio::time::timeout(timeout, response.text())
            .await
            .map_err(|_| FetchError::Timeout {
                url: url.to_string(),
                timeout,
            })?
            .map_err(|e| FetchError::from_reqwest(url, timeout, e))
    }
}

fn header_value(response: &Response, name: header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn fetcher() -> Fetcher {
        Fetcher::new("reddit-archiver-test", false).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_writes_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(vec![7u8; 4096], "image/jpeg"))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("a.jpg");
        let fetched = fetcher()
            .fetch(&format!("{}/a.jpg", server.uri()), &dest, TIMEOUT)
            .await
            .unwrap();

        assert_eq!(fetched.bytes, 4096);
        assert_eq!(fetched.content_type.as_deref(), Some("image/jpeg"));
        assert_eq!(std::fs::read(&dest).unwrap().len(), 4096);
    }

    #[tokio::test]
    async fn test_http_error_leaves_no_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("b.jpg");
        std::fs::write(&dest, b"stale").unwrap();

        let result = fetcher()
            .fetch(&format!("{}/b.jpg", server.uri()), &dest, TIMEOUT)
            .await;

        assert!(matches!(result, Err(FetchError::Http { status: 403, .. })));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("slow.mp4");
        let result = fetcher()
            .fetch(&format!("{}/slow.mp4", server.uri()), &dest, Duration::from_millis(200))
            .await;

        assert!(matches!(result, Err(FetchError::Timeout { .. })));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("x");
        let result = fetcher()
            .fetch("http://127.0.0.1:9/x", &dest, TIMEOUT)
            .await;

        assert!(matches!(result, Err(FetchError::Network { .. })));
    }

    #[tokio::test]
    async fn test_resolve_redirects() {
        let server = MockServer::start().await;
        Mock::given(path("/old"))
            .respond_with(
                ResponseTemplate::new(301).insert_header("location", format!("{}/new", server.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(path("/new"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let resolved = fetcher()
            .resolve_redirects(&format!("{}/old", server.uri()))
            .await
            .unwrap();
        assert_eq!(resolved, format!("{}/new", server.uri()));
    }
}
