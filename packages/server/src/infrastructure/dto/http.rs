//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use dotbox_shared::{
    dto::{EncodedGameState, EncodedMove, Ownership},
    game::Player,
};

use crate::domain::{GameMode, PlayerKind, PlayerSummary, RoundPhase, SessionSnapshot};

/// Response of `GET /api/session`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshotDto {
    pub round: u32,
    pub phase: String,
    pub mode: String,
    pub players: Vec<PlayerSummaryDto>,
    pub observer_count: usize,
    pub score: ScoreDto,
    pub victor: Ownership,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outstanding_request_id: Option<String>,
    pub encoded_game_state: EncodedGameState,
    #[serde(default)]
    pub encoded_last_move: Option<EncodedMove>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummaryDto {
    pub slot: Player,
    pub name: String,
    pub kind: String,
    pub connection_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDto {
    #[serde(rename = "PLAYER1")]
    pub player1: usize,
    #[serde(rename = "PLAYER2")]
    pub player2: usize,
}

fn phase_label(phase: RoundPhase) -> &'static str {
    match phase {
        RoundPhase::NotStarted => "not_started",
        RoundPhase::InProgress => "in_progress",
        RoundPhase::Suspended => "suspended",
        RoundPhase::GameOver => "game_over",
    }
}

fn mode_label(mode: GameMode) -> &'static str {
    match mode {
        GameMode::Standard => "standard",
        GameMode::Solo => "solo",
        GameMode::Screensaver => "screensaver",
    }
}

fn kind_label(kind: PlayerKind) -> &'static str {
    match kind {
        PlayerKind::Remote => "remote",
        PlayerKind::LocalAutomated => "local_automated",
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<&PlayerSummary> for PlayerSummaryDto {
    fn from(summary: &PlayerSummary) -> Self {
        Self {
            slot: summary.slot,
            name: summary.name.clone(),
            kind: kind_label(summary.kind).to_string(),
            connection_id: summary.connection_id.to_string(),
        }
    }
}

impl From<&SessionSnapshot> for SessionSnapshotDto {
    fn from(snapshot: &SessionSnapshot) -> Self {
        let state = &snapshot.state;
        Self {
            round: snapshot.round,
            phase: phase_label(snapshot.phase).to_string(),
            mode: mode_label(snapshot.mode).to_string(),
            players: snapshot.players.iter().map(PlayerSummaryDto::from).collect(),
            observer_count: snapshot.observer_count,
            score: ScoreDto {
                player1: state.score(Player::Player1),
                player2: state.score(Player::Player2),
            },
            victor: state.victor().into(),
            end_reason: state.end_reason().map(str::to_string),
            outstanding_request_id: snapshot.outstanding_request.map(|id| id.to_string()),
            encoded_game_state: EncodedGameState::from(state),
            encoded_last_move: snapshot.last_move.as_ref().map(EncodedMove::from),
        }
    }
}
