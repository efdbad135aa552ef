//! Error types for the game client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Both player slots are taken
    #[error("Session is full, no player slot is available")]
    SessionFull,

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The server sent something the client cannot use
    #[error("Protocol error: {0}")]
    Protocol(String),
}
