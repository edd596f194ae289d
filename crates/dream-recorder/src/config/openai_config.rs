use crate::config::{
    default_gpt_max_tokens, default_gpt_model, default_gpt_temperature, default_openai_api_url,
    default_system_prompt, default_whisper_model,
};

use serde::{Deserialize, Serialize};

/// Transcription and prompt generation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API key. `OPENAI_API_KEY` takes precedence when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL of the API.
    #[serde(default = "default_openai_api_url")]
    pub api_url: String,
    /// Speech-to-text model.
    #[serde(default = "default_whisper_model")]
    pub whisper_model: String,
    /// Chat model used to write the video prompt.
    #[serde(default = "default_gpt_model")]
    pub gpt_model: String,
    /// System prompt for the chat model.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Sampling temperature.
    #[serde(default = "default_gpt_temperature")]
    pub temperature: f32,
    /// Upper bound on prompt length in tokens.
    #[serde(default = "default_gpt_max_tokens")]
    pub max_tokens: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_openai_api_url(),
            whisper_model: default_whisper_model(),
            gpt_model: default_gpt_model(),
            system_prompt: default_system_prompt(),
            temperature: default_gpt_temperature(),
            max_tokens: default_gpt_max_tokens(),
        }
    }
}
