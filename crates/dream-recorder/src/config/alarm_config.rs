use crate::{
    AppError, AppResult,
    config::{default_alarm_enabled, default_alarm_hour, default_alarm_minute},
};

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Wake-up alarm settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmConfig {
    /// Hour of day, 0 to 23.
    #[serde(default = "default_alarm_hour")]
    pub hour: u8,
    /// Minute, 0 to 59.
    #[serde(default = "default_alarm_minute")]
    pub minute: u8,
    /// Whether the alarm fires.
    #[serde(default = "default_alarm_enabled")]
    pub enabled: bool,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            hour: default_alarm_hour(),
            minute: default_alarm_minute(),
            enabled: default_alarm_enabled(),
        }
    }
}

impl AlarmConfig {
    /// Whether `now` falls in the alarm's minute. Ignores `enabled`.
    pub fn matches(&self, now: NaiveTime) -> bool {
        now.hour() == u32::from(self.hour) && now.minute() == u32::from(self.minute)
    }

    /// Alarm time as `HH:MM`.
    pub fn time_label(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }

    /// Apply an update; `enabled` is kept when the update leaves it out.
    pub fn apply(&mut self, update: &AlarmUpdate) {
        self.hour = update.hour;
        self.minute = update.minute;
        if let Some(enabled) = update.enabled {
            self.enabled = enabled;
        }
    }
}

/// New alarm time as posted by the settings page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AlarmUpdate {
    /// Hour of day, 0 to 23.
    pub hour: u8,
    /// Minute, 0 to 59.
    pub minute: u8,
    /// New enabled state, if it should change.
    #[serde(default)]
    pub enabled: Option<bool>,
}

impl AlarmUpdate {
    /// Reject times outside the clock.
    #[track_caller]
    pub fn validate(&self) -> AppResult<()> {
        validate_alarm_time(self.hour, self.minute)
    }
}

#[track_caller]
pub(crate) fn validate_alarm_time(hour: u8, minute: u8) -> AppResult<()> {
    if hour > 23 {
        return Err(AppError::config(format!(
            "alarm.hour must be 0-23, got {}",
            hour
        )));
    }

    if minute > 59 {
        return Err(AppError::config(format!(
            "alarm.minute must be 0-59, got {}",
            minute
        )));
    }

    Ok(())
}
