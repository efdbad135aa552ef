//! Value objects describing connections and the players behind them.

use std::fmt;

use uuid::Uuid;

use dotbox_shared::game::Player;

use super::error::ValueObjectError;

/// Identity of one connection (remote socket or local automated player)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who supplies the moves for a player slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerKind {
    Remote,
    LocalAutomated,
}

/// Display name of a player
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerName(String);

impl PlayerName {
    pub const MAX_LEN: usize = 32;

    /// Name given to remote players that connect without one
    pub const ANONYMOUS: &'static str = "BillyNoNames";

    /// Validate and create a player name (surrounding whitespace is trimmed).
    ///
    /// # Errors
    ///
    /// `ValueObjectError::PlayerNameEmpty` or `ValueObjectError::PlayerNameTooLong`
    pub fn new(raw: impl Into<String>) -> Result<Self, ValueObjectError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValueObjectError::PlayerNameEmpty);
        }
        let length = trimmed.chars().count();
        if length > Self::MAX_LEN {
            return Err(ValueObjectError::PlayerNameTooLong {
                max: Self::MAX_LEN,
                actual: length,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Name from an optional query parameter, falling back to `ANONYMOUS`
    /// when it is absent or blank
    ///
    /// # Errors
    ///
    /// `ValueObjectError::PlayerNameTooLong`
    pub fn from_optional(raw: Option<String>) -> Result<Self, ValueObjectError> {
        match raw {
            Some(raw) if !raw.trim().is_empty() => Self::new(raw),
            _ => Ok(Self(Self::ANONYMOUS.to_string())),
        }
    }

    /// Name given to a local automated player seated in `slot`
    pub fn automated(slot: Player) -> Self {
        match slot {
            Player::Player1 => Self("LocalBot1".to_string()),
            Player::Player2 => Self("LocalBot2".to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
