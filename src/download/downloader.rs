//! Shared state for the download strategies and kind dispatch.

use tracing::Instrument;

use crate::api::{ImgurApi, Submission};
use crate::config::Config;
use crate::download::direct::download_direct;
use crate::download::fetcher::Fetcher;
use crate::download::gallery::download_gallery;
use crate::download::gfycat::download_gfycat;
use crate::download::imgur::{download_imgur_album, download_imgur_image};
use crate::download::merge::Ffmpeg;
use crate::download::outcome::Verdict;
use crate::download::video::download_reddit_video;
use crate::download::ytdlp::{YtDlp, DEFAULT_TEMPLATE};
use crate::error::{Error, Result};
use crate::fs::SubmissionContext;
use crate::media::{classify, ContentKind};

/// Everything a strategy needs to fetch media.
pub struct Downloader {
    pub fetcher: Fetcher,
    pub imgur: Option<ImgurApi>,
    pub ytdlp: YtDlp,
    pub ffmpeg: Ffmpeg,
    /// Base URL of the Reddit video host, without trailing slash.
    pub reddit_video_base: String,
    pub skip_videos: bool,
    pub show_progress: bool,
}

impl Downloader {
    pub fn from_config(config: &Config) -> Result<Self> {
        let user_agent = &config.reddit.user_agent;

        let imgur = match config.imgur_client_id() {
            Some(client_id) => Some(ImgurApi::new(
                client_id,
                user_agent,
                &config.endpoints.imgur_api,
            )?),
            None => {
                tracing::warn!("No Imgur client ID configured, Imgur links will be skipped");
                None
            }
        };

        Ok(Self {
            fetcher: Fetcher::new(user_agent, config.options.show_progress)?,
            imgur,
            ytdlp: YtDlp::new(&config.tools.ytdlp),
            ffmpeg: Ffmpeg::new(&config.tools.ffmpeg),
            reddit_video_base: config.endpoints.reddit_video.trim_end_matches('/').to_string(),
            skip_videos: config.options.skip_videos,
            show_progress: config.options.show_progress,
        })
    }

    /// Classify a link, probing yt-dlp for links no rule recognises.
    ///
    /// No probe runs when videos are disabled.
    pub async fn classify(&self, url: &str, submission: &Submission) -> ContentKind {
        let kind = classify(url, submission);
        if kind != ContentKind::Unclassified || self.skip_videos {
            return kind;
        }

        match self.ytdlp.probe(url).await {
            Ok(Some(extractor)) => {
                tracing::debug!("yt-dlp supports {} ({})", url, extractor);
                ContentKind::GenericVideoSite
            }
            Ok(None) => kind,
            Err(Error::YtDlpNotFound) => {
                tracing::debug!("yt-dlp not installed, not probing {}", url);
                kind
            }
            Err(e) => {
                tracing::debug!("yt-dlp probe failed for {}: {}", url, e);
                kind
            }
        }
    }

    /// Run the strategy for `kind`.
    ///
    /// `Err` means the strategy could not run at all; item-level failures are
    /// reported through the verdict.
    pub async fn download(
        &self,
        kind: ContentKind,
        url: &str,
        submission: &Submission,
        context: &mut SubmissionContext,
    ) -> Result<Verdict> {
        if kind.is_video() && self.skip_videos {
            tracing::info!("Skipping {} (videos disabled)", kind);
            return Ok(Verdict::Succeeded);
        }

        let span = tracing::info_span!("strategy", kind = %kind);
        async {
            match kind {
                ContentKind::DirectImage | ContentKind::DirectVideo => {
                    download_direct(self, kind, url, submission, context).await
                }
                ContentKind::RedditGallery => download_gallery(self, submission, context).await,
                ContentKind::RedditVideo => {
                    let artifact = download_reddit_video(self, url, submission, context).await?;
                    tracing::info!("Saved {}", artifact);
                    Ok(Verdict::Succeeded)
                }
                ContentKind::GfycatOrRedgifs => {
                    download_gfycat(self, url, submission, context).await
                }
                ContentKind::ImgurAlbum => download_imgur_album(self, url, context).await,
                ContentKind::ImgurImage => download_imgur_image(self, url, context).await,
                ContentKind::SelfPost => {
                    tracing::debug!("Self post, nothing to download");
                    Ok(Verdict::Succeeded)
                }
                ContentKind::GenericVideoSite => {
                    let dir = context.files_dir().to_path_buf();
                    self.ytdlp.download(url, &dir, DEFAULT_TEMPLATE).await?;
                    Ok(Verdict::Succeeded)
                }
                ContentKind::Unclassified => {
                    tracing::info!("Link type not handled: {}", url);
                    Ok(Verdict::Succeeded)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Imgur client, or the error explaining why Imgur links cannot be fetched.
    pub(crate) fn imgur(&self) -> Result<&ImgurApi> {
        self.imgur
            .as_ref()
            .ok_or_else(|| Error::MissingConfig("imgur.client_id".to_string()))
    }
}
