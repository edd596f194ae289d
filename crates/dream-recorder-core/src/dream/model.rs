use serde::{Deserialize, Serialize};

/// URL prefix under which generated videos are served.
pub const VIDEO_URL_PREFIX: &str = "/media/video";

/// Build the public URL of a stored video file.
pub fn video_url(video_filename: &str) -> String {
    format!("{}/{}", VIDEO_URL_PREFIX, video_filename)
}

/// A completed dream as kept by the dream store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dream {
    /// Store-assigned identifier.
    pub id: u64,
    /// Transcribed narration.
    pub transcription: String,
    /// Prompt the video was generated from.
    pub video_prompt: String,
    /// Recorded audio file in the recordings directory.
    pub audio_filename: String,
    /// Generated video file in the videos directory.
    pub video_filename: String,
    /// Thumbnail in the thumbs directory, if one was produced.
    #[serde(default)]
    pub thumb_filename: Option<String>,
    /// Creation time, milliseconds since the Unix epoch.
    pub created_at_ms: u64,
}

impl Dream {
    /// Public URL of this dream's video.
    pub fn video_url(&self) -> String {
        video_url(&self.video_filename)
    }
}

/// A dream about to be saved; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDream {
    /// Transcribed narration.
    pub transcription: String,
    /// Prompt the video was generated from.
    pub video_prompt: String,
    /// Recorded audio file name.
    pub audio_filename: String,
    /// Generated video file name.
    pub video_filename: String,
    /// Thumbnail file name, if any.
    pub thumb_filename: Option<String>,
}

/// Order dreams newest first, breaking timestamp ties by id.
///
/// The playback cursor relies on this order being stable.
pub fn sort_newest_first(dreams: &mut [Dream]) {
    dreams.sort_by(|a, b| {
        b.created_at_ms
            .cmp(&a.created_at_ms)
            .then_with(|| b.id.cmp(&a.id))
    });
}
