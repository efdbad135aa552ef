//! Infrastructure layer: implementations of the domain capabilities and the
//! DTOs of the HTTP API.

pub mod dto;
pub mod move_source;
