//! Authoritative Dots and Boxes game server.
//!
//! One session seats two players, asks them for moves in turn over WebSocket
//! (or locally, for automated players) and streams the game to observers.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
