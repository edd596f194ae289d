//! HTTP and WebSocket transport.
//!
//! Handlers translate requests into [`AppCommand`](crate::AppCommand)s and
//! wait for replies where one is needed; they never touch the recorder.

mod api;
mod router;
mod socket;

pub(crate) use router::{ServerState, router, serve};

#[cfg(test)]
pub(crate) use socket::decode_message;
