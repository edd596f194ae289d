use crate::{CoreResult, Dream};

use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use tracing::{debug, instrument, warn};

/// Blob storage for recordings, videos and thumbnails, addressed by filename.
#[derive(Debug, Clone)]
pub struct MediaLibrary {
    recordings_dir: PathBuf,
    videos_dir: PathBuf,
    thumbs_dir: PathBuf,
}

impl MediaLibrary {
    /// Create a library over the three media directories.
    pub fn new(
        recordings_dir: impl Into<PathBuf>,
        videos_dir: impl Into<PathBuf>,
        thumbs_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            recordings_dir: recordings_dir.into(),
            videos_dir: videos_dir.into(),
            thumbs_dir: thumbs_dir.into(),
        }
    }

    /// Create the media directories if missing.
    pub async fn ensure_dirs(&self) -> CoreResult<()> {
        for dir in [&self.recordings_dir, &self.videos_dir, &self.thumbs_dir] {
            tokio::fs::create_dir_all(dir).await?;
        }
        Ok(())
    }

    /// Directory of recorded audio.
    pub fn recordings_dir(&self) -> &Path {
        &self.recordings_dir
    }

    /// Directory of generated videos.
    pub fn videos_dir(&self) -> &Path {
        &self.videos_dir
    }

    /// Directory of thumbnails.
    pub fn thumbs_dir(&self) -> &Path {
        &self.thumbs_dir
    }

    /// Store a recording and return its path.
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub async fn write_recording(&self, filename: &str, bytes: &[u8]) -> CoreResult<PathBuf> {
        let path = self.recordings_dir.join(checked_filename(filename)?);
        tokio::fs::write(&path, bytes).await?;
        debug!(path = ?path, "Recording written");
        Ok(path)
    }

    /// Store a video and return its path.
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub async fn write_video(&self, filename: &str, bytes: &[u8]) -> CoreResult<PathBuf> {
        let path = self.videos_dir.join(checked_filename(filename)?);
        tokio::fs::write(&path, bytes).await?;
        debug!(path = ?path, "Video written");
        Ok(path)
    }

    /// Path a thumbnail named `filename` is written to.
    pub fn thumb_path(&self, filename: &str) -> CoreResult<PathBuf> {
        Ok(self.thumbs_dir.join(checked_filename(filename)?))
    }

    /// Remove a dream's audio, video and thumbnail.
    ///
    /// Best-effort: each failure is logged and counted, never returned.
    /// Files that are already gone are not failures.
    #[instrument(skip(self, dream), fields(dream_id = dream.id))]
    pub async fn remove_dream_files(&self, dream: &Dream) -> usize {
        self.remove_files(
            &dream.audio_filename,
            Some(&dream.video_filename),
            dream.thumb_filename.as_deref(),
        )
        .await
    }

    /// Remove media by name, with the same best-effort rules as
    /// [`remove_dream_files`](Self::remove_dream_files).
    ///
    /// Used for the files of a generation that never became a dream.
    #[instrument(skip(self))]
    pub async fn remove_files(
        &self,
        audio_filename: &str,
        video_filename: Option<&str>,
        thumb_filename: Option<&str>,
    ) -> usize {
        let mut targets = vec![(&self.recordings_dir, audio_filename)];
        if let Some(video) = video_filename {
            targets.push((&self.videos_dir, video));
        }
        if let Some(thumb) = thumb_filename {
            targets.push((&self.thumbs_dir, thumb));
        }

        let mut failures = 0;
        for (dir, filename) in targets {
            if !is_plain_filename(filename) {
                warn!(filename, "Refusing to delete file outside media directory");
                failures += 1;
                continue;
            }

            let path = dir.join(filename);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => debug!(path = ?path, "Media file removed"),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!(path = ?path, "Media file already absent");
                }
                Err(e) => {
                    warn!(path = ?path, error = ?e, "Failed to remove media file");
                    failures += 1;
                }
            }
        }

        failures
    }
}

fn checked_filename(filename: &str) -> CoreResult<&str> {
    if is_plain_filename(filename) {
        Ok(filename)
    } else {
        Err(io::Error::new(
            ErrorKind::InvalidInput,
            format!("not a plain file name: {:?}", filename),
        )
        .into())
    }
}

fn is_plain_filename(filename: &str) -> bool {
    !filename.is_empty()
        && filename != "."
        && filename != ".."
        && !filename.contains(['/', '\\'])
}
