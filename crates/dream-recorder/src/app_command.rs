use crate::{
    AppResult,
    alarm_clock::AlarmCheck,
    config::{AlarmConfig, AlarmUpdate},
};

use chrono::NaiveDateTime;
use dream_recorder_core::{ClientId, CoreResult, DeviceEvent, Dream, InboundEvent, SessionSnapshot};
use tokio::sync::oneshot;

/// Commands queued by the transport for the application event loop.
///
/// Every client and device event passes through here, so handlers run one
/// at a time in arrival order.
#[derive(Debug)]
pub enum AppCommand {
    /// A WebSocket client connected and is subscribed.
    Connect {
        /// The new client.
        client: ClientId,
    },
    /// A WebSocket client disconnected.
    Disconnect {
        /// The departed client.
        client: ClientId,
    },
    /// An event received from a client.
    Inbound {
        /// Sender of the event.
        client: ClientId,
        /// The event.
        event: InboundEvent,
    },
    /// A hardware gesture or alarm trigger to relay.
    Device(DeviceEvent),
    /// Read the current session state.
    SessionState {
        /// Receives the snapshot.
        reply: oneshot::Sender<SessionSnapshot>,
    },
    /// List stored dreams, newest first.
    ListDreams {
        /// Receives the list.
        reply: oneshot::Sender<CoreResult<Vec<Dream>>>,
    },
    /// Delete a dream and its media files.
    DeleteDream {
        /// Identifier of the dream.
        id: u64,
        /// Receives the deleted record.
        reply: oneshot::Sender<CoreResult<Dream>>,
    },
    /// Flip the alarm on or off and persist the change.
    ToggleAlarm {
        /// Receives the new `enabled` value.
        reply: oneshot::Sender<AppResult<bool>>,
    },
    /// Read the alarm settings.
    AlarmSettings {
        /// Receives the current settings.
        reply: oneshot::Sender<AlarmConfig>,
    },
    /// Change the alarm time, and optionally its enabled state, and persist it.
    SetAlarm {
        /// The new settings.
        update: AlarmUpdate,
        /// Receives the saved settings.
        reply: oneshot::Sender<AppResult<AlarmConfig>>,
    },
    /// Compare local time with the alarm and fire it when due.
    CheckAlarm {
        /// Local wall-clock time of the check.
        now: NaiveDateTime,
        /// Receives the outcome, when the caller wants it.
        reply: Option<oneshot::Sender<AlarmCheck>>,
    },
    /// Request application shutdown.
    Shutdown,
}
