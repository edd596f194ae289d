//! Video generation over the Luma Dream Machine HTTP API.

use crate::config::LumaConfig;

use dream_recorder_core::{CoreError, CoreResult};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Default, Deserialize)]
struct GenerationAssets {
    video: Option<String>,
    url: Option<String>,
}

/// A generation as reported by the create and status endpoints.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct GenerationStatus {
    pub(crate) id: Option<String>,
    state: Option<String>,
    assets: Option<GenerationAssets>,
    failure_reason: Option<String>,
}

/// What a status poll tells the caller to do next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PollStep {
    /// Still running; the state string is kept for logging.
    Pending(String),
    /// Finished; remote URL of the video.
    Ready(String),
    /// Finished without a video.
    Failed(String),
}

impl GenerationStatus {
    pub(crate) fn step(&self) -> PollStep {
        let state = self.state.as_deref().unwrap_or("unknown");

        match state {
            "completed" | "succeeded" => {
                let video = self
                    .assets
                    .as_ref()
                    .and_then(|a| a.video.clone().or_else(|| a.url.clone()));
                match video {
                    Some(url) => PollStep::Ready(url),
                    None => PollStep::Failed("Video URL not found in completed generation".to_string()),
                }
            }
            "failed" | "error" => PollStep::Failed(
                self.failure_reason
                    .clone()
                    .unwrap_or_else(|| "Unknown error".to_string()),
            ),
            other => PollStep::Pending(other.to_string()),
        }
    }
}

/// Client for creating, polling and downloading generations.
#[derive(Debug, Clone)]
pub(crate) struct LumaClient {
    http: reqwest::Client,
    config: LumaConfig,
}

impl LumaClient {
    pub(crate) fn new(http: reqwest::Client, config: LumaConfig) -> Self {
        Self { http, config }
    }

    #[track_caller]
    fn api_key(&self) -> CoreResult<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| CoreError::pipeline("Luma API key not configured"))
    }

    /// Generate a video for `prompt` and return its remote URL.
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    pub(crate) async fn generate(&self, prompt: &str) -> CoreResult<String> {
        let id = self.create(prompt).await?;
        info!(generation_id = %id, "Video generation started");
        self.poll(&id).await
    }

    async fn create(&self, prompt: &str) -> CoreResult<String> {
        let api_key = self.api_key()?;
        let url = format!("{}/generations", self.config.api_url);

        let body = serde_json::json!({
            "prompt": prompt,
            "model": self.config.model,
            "resolution": self.config.resolution,
            "duration": self.config.duration,
            "aspect_ratio": self.config.aspect_ratio
        });

        let created: GenerationStatus = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| CoreError::pipeline(format!("Video generation request failed: {}", e)))?
            .json()
            .await
            .map_err(|e| CoreError::pipeline(format!("Invalid generation response: {}", e)))?;

        created
            .id
            .ok_or_else(|| CoreError::pipeline("Generation response carried no id"))
    }

    /// Poll until the generation finishes or the attempt budget runs out.
    ///
    /// Transport errors on a single poll are logged and retried.
    async fn poll(&self, id: &str) -> CoreResult<String> {
        let api_key = self.api_key()?;
        let url = format!("{}/generations/{}", self.config.api_url, id);
        let attempts = self.config.max_poll_attempts;

        for attempt in 1..=attempts {
            let status = self
                .http
                .get(&url)
                .bearer_auth(api_key)
                .send()
                .await
                .and_then(|r| r.error_for_status());

            match status {
                Ok(response) => match response.json::<GenerationStatus>().await {
                    Ok(status) => match status.step() {
                        PollStep::Ready(video_url) => {
                            info!(generation_id = %id, attempt, "Video generation completed");
                            return Ok(video_url);
                        }
                        PollStep::Failed(reason) => {
                            return Err(CoreError::pipeline(format!(
                                "Video generation failed: {}",
                                reason
                            )));
                        }
                        PollStep::Pending(state) => {
                            debug!(generation_id = %id, state = %state, attempt, attempts, "Generation pending");
                        }
                    },
                    Err(e) => warn!(generation_id = %id, attempt, error = ?e, "Unreadable status response"),
                },
                Err(e) => warn!(generation_id = %id, attempt, error = ?e, "Status check failed"),
            }

            tokio::time::sleep(self.config.poll_interval()).await;
        }

        Err(CoreError::pipeline(format!(
            "Timed out waiting for video generation after {} attempts",
            attempts
        )))
    }

    /// Fetch the finished video.
    #[instrument(skip(self))]
    pub(crate) async fn download(&self, video_url: &str) -> CoreResult<Vec<u8>> {
        let bytes = self
            .http
            .get(video_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| CoreError::pipeline(format!("Video download failed: {}", e)))?
            .bytes()
            .await
            .map_err(|e| CoreError::pipeline(format!("Video download failed: {}", e)))?;

        info!(bytes = bytes.len(), "Video downloaded");
        Ok(bytes.to_vec())
    }
}
