use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Where recordings, videos, thumbnails and the dream index live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Captured audio.
    pub recordings_dir: PathBuf,
    /// Generated videos.
    pub videos_dir: PathBuf,
    /// Video thumbnails.
    pub thumbs_dir: PathBuf,
    /// JSON file holding the dream records.
    pub dreams_file: PathBuf,
}

impl StorageConfig {
    /// Default layout under `data_dir`.
    pub fn under(data_dir: &Path) -> Self {
        Self {
            recordings_dir: data_dir.join("recordings"),
            videos_dir: data_dir.join("videos"),
            thumbs_dir: data_dir.join("thumbs"),
            dreams_file: data_dir.join("dreams.json"),
        }
    }
}
