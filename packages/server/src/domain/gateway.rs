use async_trait::async_trait;

use dotbox_shared::game::Player;

use super::{
    connection::{ConnectionId, PlayerName},
    error::SessionError,
    move_source::MoveSource,
    session::SessionSnapshot,
};

/// Entry point of the running game session used by the transport and the operator console
#[async_trait]
pub trait SessionGateway: Send + Sync {
    /// Seat a player in the first free slot
    async fn add_player(
        &self,
        source: Box<dyn MoveSource>,
        name: PlayerName,
    ) -> Result<Player, SessionError>;

    /// Register a read-only observer
    async fn add_observer(&self, source: Box<dyn MoveSource>) -> Result<(), SessionError>;

    /// Forget a closed connection
    async fn disconnect(&self, id: ConnectionId) -> Result<(), SessionError>;

    async fn start_round(&self) -> Result<(), SessionError>;

    /// Begin the next round and return its number
    async fn next_round(&self) -> Result<u32, SessionError>;

    async fn end_round(&self) -> Result<(), SessionError>;

    /// Hand the first move of the pending round to the other player
    async fn swap_starting_player(&self) -> Result<Player, SessionError>;

    async fn snapshot(&self) -> Result<SessionSnapshot, SessionError>;
}
