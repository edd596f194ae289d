//! Speech-to-text and video prompt generation over the OpenAI HTTP API.

use crate::config::OpenAiConfig;

use dream_recorder_core::{CoreError, CoreResult};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// Body of a transcription response.
#[derive(Debug, Deserialize)]
pub(crate) struct TranscriptionResponse {
    pub(crate) text: String,
}

impl TranscriptionResponse {
    /// The transcribed text, rejecting silence.
    #[track_caller]
    pub(crate) fn into_text(self) -> CoreResult<String> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(CoreError::pipeline("Transcription was empty"));
        }
        Ok(text.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Body of a chat completion response.
#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    choices: Vec<ChatChoice>,
}

impl ChatResponse {
    /// Text of the first choice.
    #[track_caller]
    pub(crate) fn into_prompt(self) -> CoreResult<String> {
        let prompt = self
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if prompt.is_empty() {
            return Err(CoreError::pipeline("Failed to generate video prompt"));
        }
        Ok(prompt)
    }
}

/// Client for the transcription and chat completion endpoints.
#[derive(Debug, Clone)]
pub(crate) struct OpenAiClient {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    pub(crate) fn new(http: reqwest::Client, config: OpenAiConfig) -> Self {
        Self { http, config }
    }

    #[track_caller]
    fn api_key(&self) -> CoreResult<&str> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| CoreError::pipeline("OpenAI API key not configured"))
    }

    /// Transcribe a recorded clip.
    #[instrument(skip(self, audio), fields(bytes = audio.len()))]
    pub(crate) async fn transcribe(&self, audio: Vec<u8>, filename: &str) -> CoreResult<String> {
        let api_key = self.api_key()?;
        let url = format!("{}/audio/transcriptions", self.config.api_url);

        let file = Part::bytes(audio)
            .file_name(filename.to_string())
            .mime_str("audio/webm")
            .map_err(|e| CoreError::pipeline(format!("Invalid audio part: {}", e)))?;
        let form = Form::new()
            .text("model", self.config.whisper_model.clone())
            .part("file", file);

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| CoreError::pipeline(format!("Transcription request failed: {}", e)))?;

        let body: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| CoreError::pipeline(format!("Invalid transcription response: {}", e)))?;

        let text = body.into_text()?;
        info!(text_len = text.len(), "Transcription received");
        Ok(text)
    }

    /// Turn a transcription into a cinematic video prompt.
    #[instrument(skip(self, transcription), fields(text_len = transcription.len()))]
    pub(crate) async fn video_prompt(&self, transcription: &str) -> CoreResult<String> {
        let api_key = self.api_key()?;
        let url = format!("{}/chat/completions", self.config.api_url);

        let body = serde_json::json!({
            "model": self.config.gpt_model,
            "messages": [
                { "role": "system", "content": self.config.system_prompt },
                { "role": "user", "content": transcription }
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| CoreError::pipeline(format!("Prompt request failed: {}", e)))?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| CoreError::pipeline(format!("Invalid prompt response: {}", e)))?;

        let prompt = body.into_prompt()?;
        debug!(prompt_len = prompt.len(), "Video prompt generated");
        Ok(prompt)
    }
}
