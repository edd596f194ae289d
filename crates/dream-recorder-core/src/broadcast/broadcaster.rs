use crate::{ClientId, OutboundEvent};

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{trace, warn};

/// Events buffered per client before a slow client starts missing them.
pub const DEFAULT_BROADCAST_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
struct Envelope {
    target: Option<ClientId>,
    event: OutboundEvent,
}

/// Fan-out of session events to every connected client.
///
/// Backed by a single broadcast channel, so all clients observe events in
/// publish order. Delivery is best-effort: a client that falls more than
/// the channel capacity behind skips the missed events and resynchronizes
/// on its next connect.
#[derive(Debug, Clone)]
pub struct SessionBroadcaster {
    tx: broadcast::Sender<Envelope>,
}

impl SessionBroadcaster {
    /// Create a broadcaster buffering `capacity` events per client.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Register a client. Events published afterwards reach it.
    pub fn subscribe(&self, client: ClientId) -> Subscription {
        Subscription {
            client,
            rx: self.tx.subscribe(),
        }
    }

    /// Send an event to every client. Returns the number of receivers.
    pub fn publish(&self, event: OutboundEvent) -> usize {
        self.send(Envelope {
            target: None,
            event,
        })
    }

    /// Send an event to one client only.
    pub fn send_to(&self, client: ClientId, event: OutboundEvent) -> usize {
        self.send(Envelope {
            target: Some(client),
            event,
        })
    }

    /// Number of subscribed clients.
    pub fn client_count(&self) -> usize {
        self.tx.receiver_count()
    }

    fn send(&self, envelope: Envelope) -> usize {
        let name = envelope.event.name();
        match self.tx.send(envelope) {
            Ok(receivers) => receivers,
            Err(_) => {
                trace!(event = name, "No clients connected, event dropped");
                0
            }
        }
    }
}

impl Default for SessionBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_BROADCAST_CAPACITY)
    }
}

/// One client's view of the broadcast stream.
#[derive(Debug)]
pub struct Subscription {
    client: ClientId,
    rx: broadcast::Receiver<Envelope>,
}

impl Subscription {
    /// The client this subscription belongs to.
    pub fn client(&self) -> ClientId {
        self.client
    }

    /// Wait for the next event addressed to this client.
    ///
    /// Returns `None` once the broadcaster is gone.
    pub async fn recv(&mut self) -> Option<OutboundEvent> {
        loop {
            match self.rx.recv().await {
                Ok(envelope) => {
                    if let Some(event) = self.accept(envelope) {
                        return Some(event);
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!(client_id = %self.client, missed, "Client lagged, events dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Take the next already-published event addressed to this client.
    pub fn try_recv(&mut self) -> Option<OutboundEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(envelope) => {
                    if let Some(event) = self.accept(envelope) {
                        return Some(event);
                    }
                }
                Err(TryRecvError::Lagged(missed)) => {
                    warn!(client_id = %self.client, missed, "Client lagged, events dropped");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    fn accept(&self, envelope: Envelope) -> Option<OutboundEvent> {
        match envelope.target {
            Some(target) if target != self.client => None,
            _ => Some(envelope.event),
        }
    }
}
