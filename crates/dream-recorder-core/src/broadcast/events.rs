use crate::SessionSnapshot;

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one connected client channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientId(Uuid);

impl ClientId {
    /// Allocate a fresh identifier for a new connection.
    pub fn new() -> Self {
        ClientId(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hardware gesture or alarm trigger, relayed verbatim to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceEvent {
    /// One short tap on the touch sensor.
    SingleTap,
    /// Two taps in quick succession.
    DoubleTap,
    /// Three taps in quick succession.
    TripleTap,
    /// Long press.
    Hold,
    /// The wake-up alarm fired.
    AlarmTriggered,
}

impl DeviceEvent {
    /// Wire tag of the event.
    pub fn as_str(self) -> &'static str {
        match self {
            DeviceEvent::SingleTap => "single_tap",
            DeviceEvent::DoubleTap => "double_tap",
            DeviceEvent::TripleTap => "triple_tap",
            DeviceEvent::Hold => "hold",
            DeviceEvent::AlarmTriggered => "alarm_triggered",
        }
    }
}

impl fmt::Display for DeviceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events sent from a client connection.
///
/// Wire form: `{"event": "<name>", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum InboundEvent {
    /// Begin a new recording.
    StartRecording,
    /// One fragment of recorded audio.
    StreamRecording {
        /// Raw audio bytes.
        data: Vec<u8>,
    },
    /// Finish the recording and start processing.
    StopRecording,
    /// Cycle playback to the next older dream.
    ShowPreviousDream,
}

/// Events published to client connections.
///
/// Wire form: `{"event": "<name>", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// Full session state.
    StateUpdate(SessionSnapshot),
    /// Play a stored dream.
    PlayVideo {
        /// URL of the video file.
        video_url: String,
        /// Whether the client should loop playback.
        #[serde(rename = "loop")]
        looped: bool,
    },
    /// Relayed hardware gesture or alarm.
    #[serde(rename = "device_event")]
    Device {
        /// Symbolic event tag.
        #[serde(rename = "eventType")]
        event_type: DeviceEvent,
    },
    /// A failed or rejected operation.
    Error {
        /// Human-readable description.
        message: String,
    },
    /// The alarm was switched on or off.
    AlarmToggled {
        /// New alarm state.
        enabled: bool,
    },
    /// Transcription finished (sent to the recording client).
    TranscriptionUpdate {
        /// Transcribed text.
        text: String,
    },
    /// Video prompt generated (sent to the recording client).
    VideoPromptUpdate {
        /// Prompt text.
        text: String,
    },
    /// Video ready to play (sent to the recording client).
    VideoReady {
        /// URL of the video file.
        url: String,
    },
}

impl OutboundEvent {
    /// Wire name of the event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::StateUpdate(_) => "state_update",
            OutboundEvent::PlayVideo { .. } => "play_video",
            OutboundEvent::Device { .. } => "device_event",
            OutboundEvent::Error { .. } => "error",
            OutboundEvent::AlarmToggled { .. } => "alarm_toggled",
            OutboundEvent::TranscriptionUpdate { .. } => "transcription_update",
            OutboundEvent::VideoPromptUpdate { .. } => "video_prompt_update",
            OutboundEvent::VideoReady { .. } => "video_ready",
        }
    }
}
