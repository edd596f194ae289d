use crate::{
    AppCommand, AppError, AppResult,
    alarm_clock::AlarmCheck,
    config::{AlarmConfig, AlarmUpdate, Config},
};

use std::{ops::ControlFlow, panic::Location, path::PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use dream_recorder_core::{DeviceEvent, DreamRecorder, DreamStore, GenerationPipeline};
use error_location::ErrorLocation;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, instrument};

/// Main application state.
///
/// Owns the recorder and drains the command channel one command at a
/// time. The transport never touches the recorder directly.
pub struct App<S, P> {
    pub(crate) recorder: DreamRecorder<S, P>,
    pub(crate) config: Config,
    pub(crate) config_path: PathBuf,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    /// Day the alarm last fired; it fires at most once per day and time.
    pub(crate) alarm_fired_on: Option<NaiveDate>,
}

impl<S: DreamStore, P: GenerationPipeline> App<S, P> {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Dream recorder starting");

        loop {
            let Some(command) = self.command_rx.recv().await else {
                info!("All command senders dropped, shutting down");
                break;
            };

            if self.handle_command(command).await.is_break() {
                info!("Shutdown requested");
                break;
            }
        }

        let _ = self.shutdown_tx.send(true);
        info!("Dream recorder shut down successfully");

        Ok(())
    }

    /// Apply one command. `Break` ends the loop.
    pub(crate) async fn handle_command(&mut self, command: AppCommand) -> ControlFlow<()> {
        match command {
            AppCommand::Connect { client } => {
                self.recorder.connect(client).await;
            }
            AppCommand::Disconnect { client } => {
                info!(client_id = %client, "Client disconnected");
            }
            AppCommand::Inbound { client, event } => {
                if let Err(e) = self.recorder.handle_inbound(client, event).await {
                    error!(client_id = %client, error = ?e, "Failed to handle client event");
                    self.recorder.report_error(client, &e);
                }
            }
            AppCommand::Device(event) => {
                self.recorder.relay_device_event(event);
            }
            AppCommand::SessionState { reply } => {
                if reply.send(self.recorder.snapshot().await).is_err() {
                    debug!("State requester went away");
                }
            }
            AppCommand::ListDreams { reply } => {
                if reply.send(self.recorder.list_dreams().await).is_err() {
                    debug!("Dream list requester went away");
                }
            }
            AppCommand::DeleteDream { id, reply } => {
                let result = self.recorder.delete_dream(id).await;
                if let Err(e) = &result {
                    error!(dream_id = id, error = ?e, "Failed to delete dream");
                }
                if reply.send(result).is_err() {
                    debug!(dream_id = id, "Delete requester went away");
                }
            }
            AppCommand::ToggleAlarm { reply } => {
                let result = self.toggle_alarm().await;
                if let Err(e) = &result {
                    error!(error = ?e, "Failed to toggle alarm");
                }
                if reply.send(result).is_err() {
                    debug!("Alarm toggle requester went away");
                }
            }
            AppCommand::AlarmSettings { reply } => {
                if reply.send(self.config.alarm.clone()).is_err() {
                    debug!("Alarm settings requester went away");
                }
            }
            AppCommand::SetAlarm { update, reply } => {
                let result = self.set_alarm(update).await;
                if let Err(e) = &result {
                    error!(error = ?e, "Failed to save alarm");
                }
                if reply.send(result).is_err() {
                    debug!("Alarm update requester went away");
                }
            }
            AppCommand::CheckAlarm { now, reply } => {
                let check = self.check_alarm(now);
                if let Some(reply) = reply {
                    if reply.send(check).is_err() {
                        debug!("Alarm check requester went away");
                    }
                }
            }
            AppCommand::Shutdown => return ControlFlow::Break(()),
        }

        ControlFlow::Continue(())
    }

    /// Flip the alarm, persist it, then announce the new value.
    ///
    /// The in-memory config only changes once the file is written.
    #[instrument(skip(self))]
    async fn toggle_alarm(&mut self) -> AppResult<bool> {
        let mut updated = self.config.clone();
        updated.alarm.enabled = !updated.alarm.enabled;

        self.config = persist_config(self.config_path.clone(), updated).await?;
        let enabled = self.config.alarm.enabled;

        self.recorder.announce_alarm_toggled(enabled);
        info!(enabled, "Alarm toggled");

        Ok(enabled)
    }

    /// Store a new alarm time. A changed enabled state is announced like a toggle.
    #[instrument(skip(self))]
    async fn set_alarm(&mut self, update: AlarmUpdate) -> AppResult<AlarmConfig> {
        let mut updated = self.config.clone();
        updated.alarm.apply(&update);
        updated.validate()?;

        let enabled_changed = updated.alarm.enabled != self.config.alarm.enabled;

        self.config = persist_config(self.config_path.clone(), updated).await?;
        self.alarm_fired_on = None;

        if enabled_changed {
            self.recorder
                .announce_alarm_toggled(self.config.alarm.enabled);
        }

        info!(
            alarm_time = %self.config.alarm.time_label(),
            enabled = self.config.alarm.enabled,
            "Alarm settings saved"
        );

        Ok(self.config.alarm.clone())
    }

    /// Fire the alarm when `now` is its minute and it has not fired today.
    fn check_alarm(&mut self, now: NaiveDateTime) -> AlarmCheck {
        let alarm = &self.config.alarm;
        if !alarm.enabled {
            return AlarmCheck::Disabled;
        }

        let alarm_time = alarm.time_label();

        if !alarm.matches(now.time()) {
            return AlarmCheck::NoMatch {
                current_time: now.format("%H:%M").to_string(),
                alarm_time,
            };
        }

        let today = now.date();
        if self.alarm_fired_on == Some(today) {
            return AlarmCheck::AlreadyTriggered { alarm_time };
        }

        self.alarm_fired_on = Some(today);
        self.recorder.relay_device_event(DeviceEvent::AlarmTriggered);
        info!(alarm_time = %alarm_time, "Alarm triggered");

        AlarmCheck::Triggered { alarm_time }
    }
}

/// Write `updated` to `path` off the event loop and return it once saved.
async fn persist_config(path: PathBuf, updated: Config) -> AppResult<Config> {
    tokio::task::spawn_blocking(move || updated.save_to(&path).map(|()| updated))
        .await
        .map_err(|e| AppError::TaskFailed {
            message: format!("Config save task failed: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?
}
