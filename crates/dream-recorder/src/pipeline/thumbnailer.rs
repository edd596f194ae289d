//! Square still frames from generated videos, cut with ffmpeg.

use crate::config::ThumbnailConfig;

use dream_recorder_core::{CoreError, CoreResult};

use std::{path::Path, process::Stdio};

use tokio::process::Command;
use tracing::{debug, instrument};

/// Runs ffmpeg to grab one centered square frame from a video.
#[derive(Debug, Clone)]
pub(crate) struct Thumbnailer {
    config: ThumbnailConfig,
}

impl Thumbnailer {
    pub(crate) fn new(config: ThumbnailConfig) -> Self {
        Self { config }
    }

    pub(crate) fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// Write a thumbnail of `video` to `thumb`.
    ///
    /// Fails if ffmpeg cannot be started, exits unsuccessfully, or exits
    /// without producing the file.
    #[instrument(skip(self))]
    pub(crate) async fn capture(&self, video: &Path, thumb: &Path) -> CoreResult<()> {
        let size = self.config.size;
        let filter = format!(
            "crop=min(iw\\,ih):min(iw\\,ih),scale={}:{}",
            size, size
        );

        let output = Command::new(&self.config.ffmpeg_path)
            .arg("-y")
            .args(["-loglevel", "error"])
            .args(["-ss", &self.config.offset_secs.to_string()])
            .arg("-i")
            .arg(video)
            .args(["-vframes", "1"])
            .args(["-vf", &filter])
            .arg(thumb)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                CoreError::pipeline(format!(
                    "Failed to run {}: {}",
                    self.config.ffmpeg_path, e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CoreError::pipeline(format!(
                "Thumbnail extraction failed ({}): {}",
                output.status,
                stderr.trim()
            )));
        }

        if !tokio::fs::try_exists(thumb).await.unwrap_or(false) {
            return Err(CoreError::pipeline("Thumbnail extraction produced no file"));
        }

        debug!(thumb = ?thumb, "Thumbnail written");
        Ok(())
    }
}
