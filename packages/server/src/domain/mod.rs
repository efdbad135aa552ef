//! Domain layer of the game server.
//!
//! Defines the capabilities the session coordinator depends on (`MoveSource`,
//! `SessionGateway`) together with the value objects and errors they exchange.
//! Concrete implementations live in the infrastructure and usecase layers.

mod connection;
mod error;
mod gateway;
mod move_source;
mod session;

pub use connection::{ConnectionId, PlayerKind, PlayerName};
pub use error::{SessionError, ValueObjectError};
pub use gateway::SessionGateway;
pub use move_source::{AutomatedPlayerFactory, MoveResponseHandler, MoveSource, MoveSourceError};
#[cfg(test)]
pub use move_source::MockMoveSource;
pub use session::{
    ForfeitReason, GameMode, InvalidResponsePolicy, PlayerSummary, RoundPhase, SessionSnapshot,
};
