//! Imgur API client for album and image lookups.

use std::time::Duration;

use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

const ALBUM_TIMEOUT: Duration = Duration::from_secs(20);
const IMAGE_TIMEOUT: Duration = Duration::from_secs(15);

/// Imgur response envelope.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    status: u16,
    #[serde(default)]
    data: Value,
}

/// An album with its images in display order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImgurAlbum {
    pub id: String,
    pub title: Option<String>,
    pub images_count: usize,
    pub images: Vec<ImgurImage>,
}

/// A single image or video.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ImgurImage {
    pub id: String,
    /// Mimetype, e.g. `image/png` or `video/mp4`.
    #[serde(rename = "type")]
    pub mime_type: Option<String>,
    pub link: Option<String>,
    pub animated: bool,
    pub has_sound: bool,
}

/// Imgur API client authenticated with an application client ID.
pub struct ImgurApi {
    client: Client,
    client_id: String,
    base_url: String,
}

impl ImgurApi {
    pub fn new(client_id: &str, user_agent: &str, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Api(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            client_id: client_id.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Look up an album and its images.
    pub async fn album(&self, album_id: &str) -> Result<ImgurAlbum> {
        self.get(&format!("/album/{}", album_id), ALBUM_TIMEOUT).await
    }

    /// Look up a single image or video.
    pub async fn image(&self, image_id: &str) -> Result<ImgurImage> {
        self.get(&format!("/image/{}", image_id), IMAGE_TIMEOUT).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, timeout: Duration) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, format!("Client-ID {}", self.client_id))
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        // Imgur wraps errors in the same envelope, so try to decode before checking the status.
        let envelope: Envelope = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => {
                return Err(Error::Api(format!("Failed to parse Imgur {}: {}", path, e)));
            }
            Err(_) => return Err(Error::Api(format!("Imgur HTTP {} for {}", status, path))),
        };

        if !envelope.success || !status.is_success() {
            // `error` is either a string or an object with a `message`.
            let message = match envelope.data.get("error") {
                Some(Value::String(message)) => message.clone(),
                Some(error) => error
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("Unknown error")
                    .to_string(),
                None => "Unknown error".to_string(),
            };
            return match envelope.status {
                404 => Err(Error::NotFound(format!("Imgur {}: {}", path, message))),
                429 => Err(Error::RateLimited(60)),
                code => Err(Error::Api(format!("Imgur {} ({}): {}", path, code, message))),
            };
        }

        serde_json::from_value(envelope.data)
            .map_err(|e| Error::Api(format!("Unexpected Imgur data for {}: {}", path, e)))
    }
}
