mod alarm_config;
#[allow(clippy::module_inception)]
mod config;
mod luma_config;
mod openai_config;
mod recording_config;
mod server_config;
mod storage_config;
mod thumbnail_config;

pub(crate) use {
    alarm_config::{AlarmConfig, AlarmUpdate, validate_alarm_time},
    config::Config,
    luma_config::LumaConfig,
    openai_config::OpenAiConfig,
    recording_config::RecordingConfig,
    server_config::ServerConfig,
    storage_config::StorageConfig,
    thumbnail_config::ThumbnailConfig,
};

pub(crate) const DEFAULT_HOST: &str = "0.0.0.0";
pub(crate) const DEFAULT_PORT: u16 = 5000;

pub(crate) const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub(crate) const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1";
pub(crate) const DEFAULT_WHISPER_MODEL: &str = "whisper-1";
pub(crate) const DEFAULT_GPT_MODEL: &str = "gpt-4o-mini";
pub(crate) const DEFAULT_GPT_TEMPERATURE: f32 = 0.7;
pub(crate) const DEFAULT_GPT_MAX_TOKENS: u32 = 200;
pub(crate) const DEFAULT_SYSTEM_PROMPT: &str = "You are a creative video prompt engineer. \
Your task is to transform dream descriptions into detailed, cinematic video prompts. \
Focus on visual elements, atmosphere, and emotional tone. \
Keep the prompt concise but rich in visual detail. \
Format the response as a single paragraph.";

pub(crate) const LUMALABS_API_KEY_VAR: &str = "LUMALABS_API_KEY";
pub(crate) const DEFAULT_LUMA_API_URL: &str = "https://api.lumalabs.ai/dream-machine/v1";
pub(crate) const DEFAULT_LUMA_MODEL: &str = "ray-flash-2";
pub(crate) const DEFAULT_LUMA_RESOLUTION: &str = "540p";
pub(crate) const DEFAULT_LUMA_DURATION: &str = "5s";
pub(crate) const DEFAULT_LUMA_ASPECT_RATIO: &str = "21:9";
pub(crate) const DEFAULT_LUMA_POLL_INTERVAL_SECS: u64 = 5;
pub(crate) const DEFAULT_LUMA_MAX_POLL_ATTEMPTS: u32 = 60;

pub(crate) const DEFAULT_ALARM_HOUR: u8 = 7;
pub(crate) const DEFAULT_ALARM_MINUTE: u8 = 0;
pub(crate) const DEFAULT_ALARM_ENABLED: bool = true;

pub(crate) const DEFAULT_THUMBNAIL_ENABLED: bool = true;
pub(crate) const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";
pub(crate) const DEFAULT_THUMBNAIL_SIZE: u32 = 540;
pub(crate) const DEFAULT_THUMBNAIL_OFFSET_SECS: u32 = 1;

pub(crate) fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

pub(crate) fn default_port() -> u16 {
    DEFAULT_PORT
}

pub(crate) fn default_max_recording_bytes() -> usize {
    dream_recorder_core::DEFAULT_MAX_RECORDING_BYTES
}

pub(crate) fn default_openai_api_url() -> String {
    DEFAULT_OPENAI_API_URL.to_string()
}

pub(crate) fn default_whisper_model() -> String {
    DEFAULT_WHISPER_MODEL.to_string()
}

pub(crate) fn default_gpt_model() -> String {
    DEFAULT_GPT_MODEL.to_string()
}

pub(crate) fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

pub(crate) fn default_gpt_temperature() -> f32 {
    DEFAULT_GPT_TEMPERATURE
}

pub(crate) fn default_gpt_max_tokens() -> u32 {
    DEFAULT_GPT_MAX_TOKENS
}

pub(crate) fn default_luma_api_url() -> String {
    DEFAULT_LUMA_API_URL.to_string()
}

pub(crate) fn default_luma_model() -> String {
    DEFAULT_LUMA_MODEL.to_string()
}

pub(crate) fn default_luma_resolution() -> String {
    DEFAULT_LUMA_RESOLUTION.to_string()
}

pub(crate) fn default_luma_duration() -> String {
    DEFAULT_LUMA_DURATION.to_string()
}

pub(crate) fn default_luma_aspect_ratio() -> String {
    DEFAULT_LUMA_ASPECT_RATIO.to_string()
}

pub(crate) fn default_luma_poll_interval_secs() -> u64 {
    DEFAULT_LUMA_POLL_INTERVAL_SECS
}

pub(crate) fn default_luma_max_poll_attempts() -> u32 {
    DEFAULT_LUMA_MAX_POLL_ATTEMPTS
}

pub(crate) fn default_alarm_hour() -> u8 {
    DEFAULT_ALARM_HOUR
}

pub(crate) fn default_alarm_minute() -> u8 {
    DEFAULT_ALARM_MINUTE
}

pub(crate) fn default_alarm_enabled() -> bool {
    DEFAULT_ALARM_ENABLED
}

pub(crate) fn default_thumbnail_enabled() -> bool {
    DEFAULT_THUMBNAIL_ENABLED
}

pub(crate) fn default_ffmpeg_path() -> String {
    DEFAULT_FFMPEG_PATH.to_string()
}

pub(crate) fn default_thumbnail_size() -> u32 {
    DEFAULT_THUMBNAIL_SIZE
}

pub(crate) fn default_thumbnail_offset_secs() -> u32 {
    DEFAULT_THUMBNAIL_OFFSET_SECS
}
