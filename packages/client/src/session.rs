//! WebSocket client session management.

use std::{future::Future, time::Duration};

use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{Error as WsError, http::StatusCode, protocol::Message},
};

use dotbox_shared::{
    dto::{ConnectionRole, ServerMessage},
    game::{MoveChooser, RandomMoveChooser},
};

use super::{error::ClientError, handler::MessageHandler};

/// How to join the server
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// WebSocket endpoint, e.g. `ws://127.0.0.1:8080/ws`
    pub url: String,
    pub role: ConnectionRole,
    pub name: Option<String>,
    /// Pause before each answer
    pub think_time: Duration,
    /// Seed for the move chooser; random when `None`
    pub seed: Option<u64>,
}

impl ClientOptions {
    pub fn new(url: impl Into<String>, role: ConnectionRole) -> Self {
        Self {
            url: url.into(),
            role,
            name: None,
            think_time: Duration::ZERO,
            seed: None,
        }
    }

    /// Endpoint with the role and name query parameters appended
    pub fn connect_url(&self) -> String {
        let role = match self.role {
            ConnectionRole::Player => "player",
            ConnectionRole::Observer => "observer",
        };
        let separator = if self.url.contains('?') { '&' } else { '?' };
        let mut url = format!("{}{}role={}", self.url, separator, role);
        if let Some(name) = &self.name {
            url.push_str("&name=");
            url.push_str(&encode_query_value(name));
        }
        url
    }

    fn chooser(&self) -> Box<dyn MoveChooser> {
        match self.seed {
            Some(seed) => Box::new(RandomMoveChooser::with_seed(seed)),
            None => Box::new(RandomMoveChooser::new()),
        }
    }
}

fn encode_query_value(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

/// Run one WebSocket session until the server goes away or `shutdown` resolves.
///
/// Returns `Ok(())` only when stopped by `shutdown`.
pub async fn run_client_session(
    options: &ClientOptions,
    shutdown: impl Future<Output = ()>,
) -> Result<(), ClientError> {
    let url = options.connect_url();

    let (ws_stream, _response) = match connect_async(url.as_str()).await {
        Ok(result) => result,
        Err(WsError::Http(response)) if response.status() == StatusCode::CONFLICT => {
            return Err(ClientError::SessionFull);
        }
        Err(e) => return Err(ClientError::ConnectionError(e.to_string())),
    };

    tracing::info!("Connected to {}", options.url);
    if options.role == ConnectionRole::Observer {
        println!("\nWatching the game. Press Ctrl+C to exit.\n");
    }

    let (mut write, mut read) = ws_stream.split();
    let mut handler = MessageHandler::new(options.role, options.chooser());
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutting down the client");
                if let Err(e) = write.send(Message::Close(None)).await {
                    tracing::debug!("Failed to send close frame: {}", e);
                }
                return Ok(());
            }
            message = read.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    let server_message = match serde_json::from_str::<ServerMessage>(text.as_str()) {
                        Ok(message) => message,
                        Err(e) => {
                            tracing::warn!("Ignoring unreadable message: {}", e);
                            continue;
                        }
                    };

                    let reaction = match handler.handle(server_message) {
                        Ok(reaction) => reaction,
                        Err(e) => {
                            tracing::warn!("{}", e);
                            continue;
                        }
                    };
                    if let Some(display) = reaction.display {
                        print!("{}", display);
                    }
                    if let Some(reply) = reaction.reply {
                        if !options.think_time.is_zero() {
                            tokio::time::sleep(options.think_time).await;
                        }
                        let json = serde_json::to_string(&reply)
                            .map_err(|e| ClientError::Protocol(e.to_string()))?;
                        write
                            .send(Message::Text(json.into()))
                            .await
                            .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
                    }
                }
                Some(Ok(Message::Close(_))) => {
                    tracing::info!("Server closed the connection");
                    return Err(ClientError::ConnectionError(
                        "Server closed the connection".to_string(),
                    ));
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    return Err(ClientError::ConnectionError(e.to_string()));
                }
                None => {
                    return Err(ClientError::ConnectionError("Connection lost".to_string()));
                }
            }
        }
    }
}
