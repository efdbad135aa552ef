//! Data Transfer Objects of the HTTP API.
//!
//! WebSocket messages are shared with the client and live in
//! `dotbox_shared::dto`.

pub mod http;
