use crate::config::{
    default_ffmpeg_path, default_thumbnail_enabled, default_thumbnail_offset_secs,
    default_thumbnail_size,
};

use serde::{Deserialize, Serialize};

/// Still frame taken from each generated video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailConfig {
    /// Whether thumbnails are generated.
    #[serde(default = "default_thumbnail_enabled")]
    pub enabled: bool,
    /// ffmpeg executable, looked up on `PATH` unless absolute.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,
    /// Edge length of the square thumbnail in pixels.
    #[serde(default = "default_thumbnail_size")]
    pub size: u32,
    /// Position of the captured frame, in seconds.
    #[serde(default = "default_thumbnail_offset_secs")]
    pub offset_secs: u32,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            enabled: default_thumbnail_enabled(),
            ffmpeg_path: default_ffmpeg_path(),
            size: default_thumbnail_size(),
            offset_secs: default_thumbnail_offset_secs(),
        }
    }
}
