//! Configuration management for dream-recorder.
//!
//! Handles loading and saving TOML configuration files with cross-platform
//! paths, environment overrides for credentials, and atomic write operations.

use crate::{
    AppError, AppResult,
    config::{
        AlarmConfig, LUMALABS_API_KEY_VAR, LumaConfig, OPENAI_API_KEY_VAR, OpenAiConfig,
        RecordingConfig, ServerConfig, StorageConfig, ThumbnailConfig, validate_alarm_time,
    },
};

use std::{
    fs,
    io::Write,
    panic::Location,
    path::{Path, PathBuf},
};

use directories::ProjectDirs;
use error_location::ErrorLocation;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Main configuration struct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and WebSocket server.
    #[serde(default)]
    pub server: ServerConfig,
    /// Media and dream index locations.
    pub storage: StorageConfig,
    /// Recording limits.
    #[serde(default)]
    pub recording: RecordingConfig,
    /// Transcription and prompt generation.
    #[serde(default)]
    pub openai: OpenAiConfig,
    /// Video generation.
    #[serde(default)]
    pub luma: LumaConfig,
    /// Wake-up alarm.
    #[serde(default)]
    pub alarm: AlarmConfig,
    /// Video thumbnails.
    #[serde(default)]
    pub thumbnail: ThumbnailConfig,
}

impl Config {
    /// Defaults with all storage under `data_dir`.
    pub fn default_in(data_dir: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::under(data_dir),
            recording: RecordingConfig::default(),
            openai: OpenAiConfig::default(),
            luma: LumaConfig::default(),
            alarm: AlarmConfig::default(),
            thumbnail: ThumbnailConfig::default(),
        }
    }

    /// Load configuration from the platform config directory, creating a
    /// default file if none exists.
    #[track_caller]
    #[instrument]
    pub fn load() -> AppResult<Self> {
        let project_dirs = Self::project_dirs()?;
        Self::load_or_create(&Self::config_path()?, project_dirs.data_dir())
    }

    /// Load configuration from `path`, or write and return defaults rooted
    /// at `data_dir` if the file does not exist.
    #[track_caller]
    #[instrument]
    pub fn load_or_create(path: &Path, data_dir: &Path) -> AppResult<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .map_err(|e| AppError::config(format!("Failed to read config: {}", e)))?;

            let config: Config = toml::from_str(&contents)
                .map_err(|e| AppError::config(format!("Failed to parse config: {}", e)))?;

            config.validate()?;

            info!(config_path = ?path, "Configuration loaded");

            Ok(config)
        } else {
            info!(config_path = ?path, "No config found, creating default");
            let config = Self::default_in(data_dir);
            config.save_to(path)?;
            Ok(config)
        }
    }

    /// Check value ranges that serde cannot express.
    #[track_caller]
    pub fn validate(&self) -> AppResult<()> {
        validate_alarm_time(self.alarm.hour, self.alarm.minute)?;

        if self.recording.max_recording_bytes == 0 {
            return Err(AppError::config(
                "recording.max_recording_bytes must be greater than zero",
            ));
        }

        if self.thumbnail.size == 0 {
            return Err(AppError::config("thumbnail.size must be greater than zero"));
        }

        if self.luma.max_poll_attempts == 0 {
            return Err(AppError::config(
                "luma.max_poll_attempts must be greater than zero",
            ));
        }

        Ok(())
    }

    /// A copy with API keys taken from the environment where set.
    ///
    /// `lookup` resolves a variable name; empty values are ignored. The
    /// copy is handed to the pipeline only, so keys from the environment
    /// are never written back to disk.
    pub fn with_env_overrides(&self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = self.clone();

        let present = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(key) = present(OPENAI_API_KEY_VAR) {
            config.openai.api_key = Some(key);
        }
        if let Some(key) = present(LUMALABS_API_KEY_VAR) {
            config.luma.api_key = Some(key);
        }

        config
    }

    /// Names of credentials that are not configured.
    ///
    /// Missing keys do not prevent startup; the pipeline fails through the
    /// normal failure path when it needs them.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let missing = |key: &Option<String>| key.as_deref().is_none_or(|k| k.trim().is_empty());

        let mut names = Vec::new();
        if missing(&self.openai.api_key) {
            names.push(OPENAI_API_KEY_VAR);
        }
        if missing(&self.luma.api_key) {
            names.push(LUMALABS_API_KEY_VAR);
        }
        names
    }

    /// Save configuration to `path` using atomic write pattern.
    ///
    /// Writes to a temporary file first, then renames to prevent corruption
    /// if the process crashes during the write.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| AppError::config(format!("Failed to serialize config: {}", e)))?;

        let missing_parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty() && !p.exists());

        if let Some(parent) = missing_parent {
            fs::create_dir_all(parent)?;
            debug!(config_dir = ?parent, "Created config directory");
        }

        let temp_path = path.with_extension("toml.tmp");

        let mut temp_file = fs::File::create(&temp_path)
            .map_err(|e| AppError::config(format!("Failed to create temp config file: {}", e)))?;

        temp_file
            .write_all(contents.as_bytes())
            .map_err(|e| AppError::config(format!("Failed to write temp config file: {}", e)))?;

        temp_file
            .sync_all()
            .map_err(|e| AppError::config(format!("Failed to sync temp config file: {}", e)))?;

        fs::rename(&temp_path, path).map_err(|e| {
            AppError::config(format!("Failed to rename temp config to final: {}", e))
        })?;

        info!(config_path = ?path, "Configuration saved (atomic write)");

        Ok(())
    }

    /// Path of the config file in the platform config directory.
    #[track_caller]
    pub fn config_path() -> AppResult<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory for rolling log files.
    #[track_caller]
    pub fn log_dir() -> AppResult<PathBuf> {
        Ok(Self::project_dirs()?.data_local_dir().join("logs"))
    }

    #[track_caller]
    fn project_dirs() -> AppResult<ProjectDirs> {
        ProjectDirs::from("com", "dream-recorder", "Dream-Recorder").ok_or_else(|| {
            AppError::Config {
                reason: "Failed to get project directories".to_string(),
                location: ErrorLocation::from(Location::caller()),
            }
        })
    }
}
