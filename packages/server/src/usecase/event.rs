use tokio::sync::oneshot;

use dotbox_shared::{dto::MoveSubmission, game::Player};

use crate::domain::{ConnectionId, MoveSource, PlayerName, SessionError, SessionSnapshot};

type Reply<T> = oneshot::Sender<Result<T, SessionError>>;

/// Everything the session task reacts to, applied one at a time
pub enum SessionEvent {
    AddPlayer {
        source: Box<dyn MoveSource>,
        name: PlayerName,
        reply: Reply<Player>,
    },
    AddObserver {
        source: Box<dyn MoveSource>,
        reply: Reply<()>,
    },
    Disconnected {
        id: ConnectionId,
    },
    MoveSubmitted {
        from: ConnectionId,
        submission: MoveSubmission,
    },
    StartRound {
        reply: Reply<()>,
    },
    NextRound {
        reply: Reply<u32>,
    },
    EndRound {
        reply: Reply<()>,
    },
    SwapStartingPlayer {
        reply: Reply<Player>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
}

impl SessionEvent {
    /// Short label for logging
    pub fn label(&self) -> &'static str {
        match self {
            Self::AddPlayer { .. } => "add_player",
            Self::AddObserver { .. } => "add_observer",
            Self::Disconnected { .. } => "disconnected",
            Self::MoveSubmitted { .. } => "move_submitted",
            Self::StartRound { .. } => "start_round",
            Self::NextRound { .. } => "next_round",
            Self::EndRound { .. } => "end_round",
            Self::SwapStartingPlayer { .. } => "swap_starting_player",
            Self::Snapshot { .. } => "snapshot",
        }
    }
}
