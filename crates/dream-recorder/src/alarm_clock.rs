//! Wall-clock driver for the wake-up alarm.
//!
//! The clock only asks; whether the alarm fires is decided by the
//! application loop, which owns the alarm settings.

use crate::AppCommand;

use std::time::Duration;

use chrono::Local;
use serde::Serialize;
use tokio::{
    sync::mpsc,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info, instrument};

/// How often the local time is compared with the alarm.
///
/// Shorter than a minute so the alarm minute is never skipped.
pub(crate) const ALARM_CHECK_INTERVAL: Duration = Duration::from_secs(15);

/// Result of comparing the clock with the alarm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub(crate) enum AlarmCheck {
    /// The alarm is switched off.
    Disabled,
    /// The alarm fired; `alarm_triggered` was relayed.
    Triggered {
        /// Alarm time as `HH:MM`.
        alarm_time: String,
    },
    /// The alarm minute is now, but it already fired today.
    AlreadyTriggered {
        /// Alarm time as `HH:MM`.
        alarm_time: String,
    },
    /// Not yet (or no longer) alarm time.
    NoMatch {
        /// Local time as `HH:MM`.
        current_time: String,
        /// Alarm time as `HH:MM`.
        alarm_time: String,
    },
}

/// Queue an alarm check every `period` until the application stops.
#[instrument(skip(command_tx))]
pub(crate) async fn run(command_tx: mpsc::Sender<AppCommand>, period: Duration) {
    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!("Alarm clock running");

    loop {
        ticker.tick().await;

        let now = Local::now().naive_local();
        let command = AppCommand::CheckAlarm { now, reply: None };

        if command_tx.send(command).await.is_err() {
            debug!("Application stopped, alarm clock exiting");
            break;
        }
    }
}
