//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, OutboundFrame, PusherReceiver, pusher_channel},
    ui::{
        handler::router::{disconnect, route_message},
        state::AppState,
    },
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives frames from the rx channel and writes them to the WebSocket.
///
/// This function handles the outbound flow: replies, broadcasts and liveness
/// pings are all queued on the channel by the use cases.
///
/// # Arguments
///
/// * `rx` - Channel receiver for this connection's outbound frames
/// * `sender` - WebSocket sink to send messages to this client
///
/// # Returns
///
/// A `JoinHandle` for the spawned task
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<OutboundFrame>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let message = match frame {
                OutboundFrame::Text(text) => Message::Text(text.into()),
                OutboundFrame::Ping => Message::Ping(Bytes::new()),
            };
            if sender.send(message).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection_id = ConnectionId::generate();
    let (sender, mut receiver) = socket.split();
    let (tx, PusherReceiver { frames, mut kill }) = pusher_channel();

    // The writer must be running before the greeting is queued.
    let mut send_task = pusher_loop(frames, sender);

    state
        .connect_participant_usecase
        .execute(connection_id.clone(), tx)
        .await;
    tracing::info!("Connection '{}' opened", connection_id);

    let state_clone = state.clone();
    let connection_id_clone = connection_id.clone();

    // Spawn a task to receive messages from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error on '{}': {}", connection_id_clone, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    tracing::debug!("Received from '{}': {}", connection_id_clone, text.as_str());

                    // Run in its own task so aborting this loop never cuts a handler short.
                    let state = state_clone.clone();
                    let connection_id = connection_id_clone.clone();
                    let dispatch = tokio::spawn(async move {
                        route_message(&state, &connection_id, text.as_str()).await;
                    });
                    if let Err(e) = dispatch.await {
                        tracing::error!("Handler for '{}' panicked: {}", connection_id_clone, e);
                    }
                }
                Message::Pong(_) => {
                    state_clone
                        .sweep_connections_usecase
                        .mark_alive(&connection_id_clone)
                        .await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id_clone);
                    break;
                }
                Message::Binary(_) => {
                    tracing::warn!("Ignoring binary frame from '{}'", connection_id_clone);
                }
            }
        }
    });

    // If any one of the tasks completes, abort the other.
    // A kill aborts both, even if the writer is blocked on a dead peer.
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
        _ = kill.triggered() => {
            tracing::info!("Connection '{}' terminated", connection_id);
            send_task.abort();
            recv_task.abort();
        }
    };

    match disconnect(&state, &connection_id).await {
        Some(removal) => tracing::info!(
            "Connection '{}' closed, player '{}' left its room",
            connection_id,
            removal.departure.player.name.as_str()
        ),
        None => tracing::info!("Connection '{}' closed", connection_id),
    }
}
