//! yt-dlp subprocess wrapper for generic video sites.

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;

use crate::error::{Error, Result};

/// Format selection preferring an MP4 video with M4A audio.
pub const FORMAT: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/bestvideo+bestaudio/best";

/// Default output template, relative to the target directory.
pub const DEFAULT_TEMPLATE: &str = "%(id)s.%(ext)s";

/// Upper bound for a support probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Socket timeout handed to yt-dlp for downloads.
const SOCKET_TIMEOUT_SECS: &str = "30";

/// Never probed: photo pages that yt-dlp claims but cannot download usefully.
const PROBE_EXCLUSIONS: &[&str] = &["flickr.com/photos"];

#[derive(Debug, Deserialize)]
struct ProbeInfo {
    #[serde(default)]
    extractor_key: Option<String>,
}

/// yt-dlp invoked as an external program.
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
}

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn run(&self, args: &[&str], timeout: Option<Duration>) -> Result<Output> {
        let mut command = Command::new(&self.program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = command.output();
        let output = match timeout {
            Some(limit) => tokio::time::timeout(limit, output).await.map_err(|_| {
                Error::YtDlp(format!("timed out after {}s", limit.as_secs()))
            })?,
            None => output.await,
        };

        output.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::YtDlpNotFound
            } else {
                Error::YtDlp(format!("Failed to run {}: {}", self.program.display(), e))
            }
        })
    }

    /// Ask yt-dlp whether it has a dedicated extractor for `url`.
    ///
    /// Returns the extractor key when supported. The catch-all `Generic`
    /// extractor does not count.
    pub async fn probe(&self, url: &str) -> Result<Option<String>> {
        if PROBE_EXCLUSIONS.iter().any(|pattern| url.contains(pattern)) {
            return Ok(None);
        }

        let output = self
            .run(
                &[
                    "--dump-single-json",
                    "--flat-playlist",
                    "--no-warnings",
                    "--skip-download",
                    url,
                ],
                Some(PROBE_TIMEOUT),
            )
            .await?;

        if !output.status.success() {
            tracing::debug!(
                "yt-dlp has no extractor for {}: {}",
                url,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(None);
        }

        let info: ProbeInfo = serde_json::from_slice(&output.stdout)?;
        Ok(info.extractor_key.filter(|key| key != "Generic"))
    }

    /// Download `url` into `dir` using the output `template`.
    ///
    /// Succeeds only if yt-dlp exits cleanly and printed no `ERROR:` line.
    pub async fn download(&self, url: &str, dir: &Path, template: &str) -> Result<()> {
        let output_template = dir.join(template).to_string_lossy().into_owned();

        tracing::debug!("yt-dlp download of {} to {}", url, output_template);

        let output = self
            .run(
                &[
                    "-f",
                    FORMAT,
                    "-o",
                    output_template.as_str(),
                    "--no-overwrites",
                    "--continue",
                    "--no-progress",
                    "--socket-timeout",
                    SOCKET_TIMEOUT_SECS,
                    url,
                ],
                None,
            )
            .await?;

        let log = format!(
            "{}\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );

        if log.contains("ERROR:") || !output.status.success() {
            for line in log.lines().filter(|l| l.contains("ERROR:") || l.contains("WARNING:")) {
                tracing::warn!("yt-dlp: {}", line.trim());
            }
            return Err(Error::YtDlp(format!(
                "download of {} failed ({})",
                url, output.status
            )));
        }

        Ok(())
    }
}
