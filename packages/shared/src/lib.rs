//! Shared building blocks for the Dots and Boxes server and client.
//!
//! - `game`: board model, game state and move choosers
//! - `dto`: wire encodings of the game state and the message catalogue
//! - `logger` / `time`: ambient utilities used by both binaries

pub mod dto;
pub mod game;
pub mod logger;
pub mod time;
