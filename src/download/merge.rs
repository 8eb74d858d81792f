//! Video and audio multiplexing with ffmpeg.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

use crate::error::{Error, Result};

/// A merged file must be at least this fraction of the video-only input.
pub const MIN_MERGED_RATIO: f64 = 0.8;

/// ffmpeg invoked as an external program.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    program: PathBuf,
}

impl Ffmpeg {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Copy the video stream, re-encode audio to AAC, stop at the shorter stream.
    ///
    /// Fails unless ffmpeg exits cleanly and `output` is at least
    /// [`MIN_MERGED_RATIO`] of the size of `video`.
    pub async fn merge(&self, video: &Path, audio: &Path, output: &Path) -> Result<()> {
        let result = Command::new(&self.program)
            .arg("-loglevel")
            .arg("error")
            .arg("-i")
            .arg(video)
            .arg("-i")
            .arg(audio)
            .args(["-c:v", "copy", "-c:a", "aac", "-shortest"])
            .arg(output)
            .arg("-y")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::FFmpegNotFound
                } else {
                    Error::FFmpeg(format!("Failed to run ffmpeg: {}", e))
                }
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(Error::FFmpeg(format!(
                "ffmpeg exited with status {}: {}",
                result.status,
                stderr.trim()
            )));
        }

        let video_size = tokio::fs::metadata(video).await?.len();
        let merged_size = match tokio::fs::metadata(output).await {
            Ok(meta) => meta.len(),
            Err(_) => {
                return Err(Error::FFmpeg(format!(
                    "ffmpeg reported success but {} is missing",
                    output.display()
                )))
            }
        };

        if (merged_size as f64) < video_size as f64 * MIN_MERGED_RATIO {
            return Err(Error::FFmpeg(format!(
                "merged file is {} bytes, expected at least {:.0}% of {} bytes",
                merged_size,
                MIN_MERGED_RATIO * 100.0,
                video_size
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_program() {
        let temp = TempDir::new().unwrap();
        let ffmpeg = Ffmpeg::new("/nonexistent/ffmpeg-for-tests");
        let result = ffmpeg
            .merge(
                &temp.path().join("v.mp4"),
                &temp.path().join("a.mp4"),
                &temp.path().join("out.mp4"),
            )
            .await;
        assert!(matches!(result, Err(Error::FFmpegNotFound)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_nonzero_exit() {
        let temp = TempDir::new().unwrap();
        let ffmpeg = Ffmpeg::new("false");
        let result = ffmpeg
            .merge(
                &temp.path().join("v.mp4"),
                &temp.path().join("a.mp4"),
                &temp.path().join("out.mp4"),
            )
            .await;
        assert!(matches!(result, Err(Error::FFmpeg(_))));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_truncated_output_is_rejected() {
        let temp = TempDir::new().unwrap();
        let video = temp.path().join("v.mp4");
        let output = temp.path().join("out.mp4");
        std::fs::write(&video, vec![0u8; 10_000]).unwrap();
        std::fs::write(&output, vec![0u8; 100]).unwrap();

        // `true` exits cleanly without touching the output.
        let result = Ffmpeg::new("true")
            .merge(&video, &temp.path().join("a.mp4"), &output)
            .await;
        assert!(matches!(result, Err(Error::FFmpeg(_))));
    }
}
