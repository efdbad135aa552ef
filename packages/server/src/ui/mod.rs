//! Outer surfaces of the game server: the axum router and the operator console.

pub mod console;
mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
