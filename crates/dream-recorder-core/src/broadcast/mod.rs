mod broadcaster;
mod events;

pub use {
    broadcaster::{DEFAULT_BROADCAST_CAPACITY, SessionBroadcaster, Subscription},
    events::{ClientId, DeviceEvent, InboundEvent, OutboundEvent},
};
