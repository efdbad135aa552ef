//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use dotbox_shared::dto::{ClientMessage, ConnectionRole};

use crate::{
    domain::{ConnectionId, PlayerName, SessionError},
    infrastructure::move_source::{OutboundFrame, RemoteConnection, SubmissionRouter},
    ui::state::AppState,
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub role: ConnectionRole,
    pub name: Option<String>,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    // Create a channel for the messages the session sends to this client
    let (tx, rx) = mpsc::unbounded_channel();
    let id = ConnectionId::generate();
    let (connection, router) = RemoteConnection::new(id, tx);

    match query.role {
        ConnectionRole::Player => {
            let name = PlayerName::from_optional(query.name).map_err(|e| {
                tracing::warn!("Rejecting player connection: {}", e);
                StatusCode::BAD_REQUEST
            })?;
            match state.session.add_player(Box::new(connection), name).await {
                Ok(slot) => tracing::info!("Connection {} seated as {}", id, slot),
                Err(SessionError::SessionFull) => {
                    tracing::warn!("Session is full. Rejecting connection {}", id);
                    return Err(StatusCode::CONFLICT);
                }
                Err(e) => {
                    tracing::error!("Failed to seat connection {}: {}", id, e);
                    return Err(StatusCode::SERVICE_UNAVAILABLE);
                }
            }
        }
        ConnectionRole::Observer => {
            if let Err(e) = state.session.add_observer(Box::new(connection)).await {
                tracing::error!("Failed to register observer {}: {}", id, e);
                return Err(StatusCode::SERVICE_UNAVAILABLE);
            }
        }
    }

    let failed_state = state.clone();
    Ok(ws
        .on_failed_upgrade(move |e| {
            tracing::warn!("WebSocket upgrade failed for {}: {}", id, e);
            tokio::spawn(async move {
                let _ = failed_state.session.disconnect(id).await;
            });
        })
        .on_upgrade(move |socket| handle_socket(socket, state, id, router, rx)))
}

/// Spawns a task that forwards queued frames to the WebSocket sender.
///
/// A `Close` frame closes the socket and ends the task.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<OutboundFrame>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            match frame {
                OutboundFrame::Text(text) => {
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                OutboundFrame::Close => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    id: ConnectionId,
    router: SubmissionRouter,
    rx: mpsc::UnboundedReceiver<OutboundFrame>,
) {
    let (sender, mut receiver) = socket.split();

    // Spawn a task to receive move submissions from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error on {}: {}", id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::SubmitMove(submission)) => {
                        tracing::debug!("Move submission from {}", id);
                        router.deliver(submission);
                    }
                    Err(e) => {
                        tracing::warn!("Ignoring unparseable message from {}: {}", id, e);
                    }
                },
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Connection {} requested close", id);
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to push session messages to this client
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    if let Err(e) = state.session.disconnect(id).await {
        tracing::warn!("Failed to report disconnect of {}: {}", id, e);
    } else {
        tracing::info!("Connection {} closed", id);
    }
}
