//! Client for the Dots and Boxes game server.
//!
//! Joins a session either as a player, answering every move request with a
//! move from a `MoveChooser`, or as an observer printing each state update.

pub mod error;
pub mod formatter;
pub mod handler;
pub mod runner;
pub mod session;

pub use runner::run_client;
pub use session::{ClientOptions, run_client_session};
