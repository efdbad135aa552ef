//! Data Transfer Objects shared by the server and the client.
//!
//! - `codec`: encoded game state and moves, with conversions to the domain
//! - `message`: the WebSocket message catalogue

pub mod codec;
pub mod message;

pub use codec::{CodecError, EncodedBox, EncodedDot, EncodedGameState, EncodedMove, Ownership};
pub use message::{
    AssignRole, ClientMessage, ConnectionRole, MoveRequest, MoveSubmission, PlayerNames,
    ServerMessage, StateUpdate,
};
