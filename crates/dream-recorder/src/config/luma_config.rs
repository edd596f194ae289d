use crate::config::{
    default_luma_api_url, default_luma_aspect_ratio, default_luma_duration,
    default_luma_max_poll_attempts, default_luma_model, default_luma_poll_interval_secs,
    default_luma_resolution,
};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Video generation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LumaConfig {
    /// API key. `LUMALABS_API_KEY` takes precedence when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL of the API.
    #[serde(default = "default_luma_api_url")]
    pub api_url: String,
    /// Generation model.
    #[serde(default = "default_luma_model")]
    pub model: String,
    /// Output resolution, e.g. `540p`.
    #[serde(default = "default_luma_resolution")]
    pub resolution: String,
    /// Clip length, e.g. `5s`.
    #[serde(default = "default_luma_duration")]
    pub duration: String,
    /// Aspect ratio, e.g. `21:9`.
    #[serde(default = "default_luma_aspect_ratio")]
    pub aspect_ratio: String,
    /// Seconds between status polls.
    #[serde(default = "default_luma_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Polls before the generation is considered timed out.
    #[serde(default = "default_luma_max_poll_attempts")]
    pub max_poll_attempts: u32,
}

impl Default for LumaConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_luma_api_url(),
            model: default_luma_model(),
            resolution: default_luma_resolution(),
            duration: default_luma_duration(),
            aspect_ratio: default_luma_aspect_ratio(),
            poll_interval_secs: default_luma_poll_interval_secs(),
            max_poll_attempts: default_luma_max_poll_attempts(),
        }
    }
}

impl LumaConfig {
    /// Delay between status polls.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
