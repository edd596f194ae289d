use crate::{AppCommand, server::ServerState};

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use dream_recorder_core::{ClientId, InboundEvent};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, instrument, warn};

/// `GET /ws`: upgrade to the client event socket.
pub(crate) async fn upgrade(
    State(state): State<ServerState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Decode one client frame. Binary frames are raw audio fragments.
pub(crate) fn decode_message(message: Message) -> Option<Result<InboundEvent, serde_json::Error>> {
    match message {
        Message::Text(text) => Some(serde_json::from_str(text.as_str())),
        Message::Binary(bytes) => Some(Ok(InboundEvent::StreamRecording {
            data: bytes.to_vec(),
        })),
        _ => None,
    }
}

#[instrument(skip_all, fields(client_id = tracing::field::Empty))]
async fn handle_socket(socket: WebSocket, state: ServerState) {
    let client = ClientId::new();
    tracing::Span::current().record("client_id", tracing::field::display(client));

    // Subscribed before Connect is queued so the connect-time state is not missed.
    let mut subscription = state.broadcaster.subscribe(client);

    if state
        .command_tx
        .send(AppCommand::Connect { client })
        .await
        .is_err()
    {
        warn!("Recorder is shutting down, closing new connection");
        return;
    }

    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(event) = subscription.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(text) => text,
                Err(e) => {
                    warn!(event = event.name(), error = ?e, "Failed to encode event");
                    continue;
                }
            };

            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let command_tx = state.command_tx.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            if matches!(message, Message::Close(_)) {
                break;
            }

            let event = match decode_message(message) {
                Some(Ok(event)) => event,
                Some(Err(e)) => {
                    warn!(client_id = %client, error = %e, "Ignoring malformed client message");
                    continue;
                }
                None => continue,
            };

            if command_tx
                .send(AppCommand::Inbound { client, event })
                .await
                .is_err()
            {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    if state
        .command_tx
        .send(AppCommand::Disconnect { client })
        .await
        .is_err()
    {
        debug!("Recorder already stopped");
    }

    info!("Socket closed");
}
