use crate::config::default_max_recording_bytes;

use serde::{Deserialize, Serialize};

/// Limits applied while audio is streamed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Size guard for one recording; later fragments are dropped.
    #[serde(default = "default_max_recording_bytes")]
    pub max_recording_bytes: usize,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            max_recording_bytes: default_max_recording_bytes(),
        }
    }
}
