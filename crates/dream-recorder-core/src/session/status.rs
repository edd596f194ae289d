use std::fmt;

use serde::{Deserialize, Serialize};

/// Phase of the device-wide recording session.
///
/// `Processing` and `Generating` are sub-phases reported by the
/// generation pipeline; the session itself only moves between them when
/// the pipeline says so.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Waiting for a recording to start.
    #[default]
    Ready,
    /// Accepting audio fragments.
    Recording,
    /// Audio handed to the pipeline, transcription in progress.
    Processing,
    /// Transcription done, video being generated.
    Generating,
    /// The last recording produced a video.
    Complete,
}

impl SessionStatus {
    /// Whether audio fragments are currently accepted.
    pub fn is_recording(self) -> bool {
        self == SessionStatus::Recording
    }

    /// Whether a background generation job owns this phase.
    pub fn is_busy(self) -> bool {
        matches!(self, SessionStatus::Processing | SessionStatus::Generating)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionStatus::Ready => "ready",
            SessionStatus::Recording => "recording",
            SessionStatus::Processing => "processing",
            SessionStatus::Generating => "generating",
            SessionStatus::Complete => "complete",
        };
        f.write_str(name)
    }
}
