//! UseCase: one game session between two players
//!
//! `Session` owns both player slots, the observers and the authoritative game
//! state. It asks the player whose turn it is for a move, accepts only the
//! answer to the single outstanding request and pushes every state change to
//! the observers.
//!
//! The session itself is synchronous; `session_actor` feeds it events one at a
//! time and fires the deadline of the outstanding request.

use std::sync::Arc;

use tokio::{sync::mpsc::WeakUnboundedSender, time::Instant};
use uuid::Uuid;

use dotbox_shared::{
    dto::{
        AssignRole, ConnectionRole, EncodedGameState, EncodedMove, MoveRequest, MoveSubmission,
        PlayerNames, ServerMessage, StateUpdate,
    },
    game::{GameError, GameState, Move, Player},
    time::Clock,
};

use crate::domain::{
    AutomatedPlayerFactory, ConnectionId, ForfeitReason, GameMode, InvalidResponsePolicy,
    MoveResponseHandler, MoveSource, PlayerKind, PlayerName, PlayerSummary, RoundPhase,
    SessionError, SessionSnapshot,
};

use super::{config::SessionConfig, event::SessionEvent};

/// Why a move submission was dropped without touching the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredResponse {
    /// No round is accepting moves (not started, ended or over)
    RoundNotActive,
    NoOutstandingRequest,
    RequestIdMismatch,
    /// The request id matches but the answer came from another connection
    WrongResponder,
}

/// What `Session::receive_move_response` did with a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOutcome {
    Accepted { captured: bool, game_over: bool },
    Ignored(IgnoredResponse),
    /// The responder lost the round
    Forfeited(ForfeitReason),
    /// The responder was asked again
    Reissued(ForfeitReason),
}

struct PlayerSlot {
    source: Box<dyn MoveSource>,
    name: PlayerName,
}

#[derive(Debug, Clone, Copy)]
struct OutstandingRequest {
    request_id: Uuid,
    responder: Player,
    responder_id: ConnectionId,
    deadline: Instant,
}

pub struct Session {
    config: SessionConfig,
    clock: Arc<dyn Clock>,
    events: WeakUnboundedSender<SessionEvent>,
    automated_players: AutomatedPlayerFactory,
    players: [Option<PlayerSlot>; 2],
    observers: Vec<Box<dyn MoveSource>>,
    state: GameState,
    last_move: Option<Move>,
    round: u32,
    /// Whether the current round has been started
    started: bool,
    /// Whether move submissions are routed to the session
    listening: bool,
    outstanding: Option<OutstandingRequest>,
}

impl Session {
    /// Create a session waiting for its first round.
    ///
    /// Move submissions are posted to `events` as `SessionEvent::MoveSubmitted`.
    /// `automated_players` is only called in modes that fill empty slots.
    pub fn new(
        config: SessionConfig,
        clock: Arc<dyn Clock>,
        events: WeakUnboundedSender<SessionEvent>,
        automated_players: AutomatedPlayerFactory,
    ) -> Result<Self, SessionError> {
        let round = 1;
        let state = GameState::new(config.board_size, first_player_of_round(round))?;
        Ok(Self {
            config,
            clock,
            events,
            automated_players,
            players: [None, None],
            observers: Vec::new(),
            state,
            last_move: None,
            round,
            started: false,
            listening: false,
            outstanding: None,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> RoundPhase {
        if !self.started {
            RoundPhase::NotStarted
        } else if self.state.is_game_over() {
            RoundPhase::GameOver
        } else if !self.listening {
            RoundPhase::Suspended
        } else {
            RoundPhase::InProgress
        }
    }

    /// Id and deadline of the request currently awaiting an answer
    pub fn outstanding_deadline(&self) -> Option<(Uuid, Instant)> {
        self.outstanding
            .map(|request| (request.request_id, request.deadline))
    }

    /// Whether a finished round should be followed by another one on its own
    pub fn wants_auto_restart(&self) -> bool {
        self.config.mode == GameMode::Screensaver
            && self.phase() == RoundPhase::GameOver
    }

    /// Seat a player in the first free slot and tell it which slot it got.
    ///
    /// # Errors
    ///
    /// `SessionError::SessionFull` when both slots are taken. The rejected
    /// source is disconnected.
    pub fn add_player(
        &mut self,
        mut source: Box<dyn MoveSource>,
        name: PlayerName,
    ) -> Result<Player, SessionError> {
        let Some(slot) = Player::ALL
            .into_iter()
            .find(|player| self.players[player.index()].is_none())
        else {
            tracing::warn!(
                "Rejecting player {} ({}): both slots are taken",
                name,
                source.id()
            );
            source.disconnect();
            return Err(SessionError::SessionFull);
        };

        self.seat(slot, source, name);
        Ok(slot)
    }

    /// Register an observer and send it the current state right away
    pub fn add_observer(&mut self, mut source: Box<dyn MoveSource>) {
        let assign = ServerMessage::AssignRole(AssignRole {
            role: ConnectionRole::Observer,
            slot: None,
        });
        let update = self.state_update();
        for message in [&assign, &update] {
            if let Err(e) = source.send(message) {
                tracing::warn!("Failed to greet observer {}: {}", source.id(), e);
            }
        }
        tracing::info!("Observer {} joined", source.id());
        self.observers.push(source);
    }

    /// Forget a closed connection.
    ///
    /// A player leaving an in-progress round forfeits it.
    pub fn disconnected(&mut self, id: ConnectionId) {
        if let Some(position) = self.observers.iter().position(|o| o.id() == id) {
            self.observers.remove(position);
            tracing::info!("Observer {} left", id);
            return;
        }

        let Some(slot) = Player::ALL.into_iter().find(|player| {
            self.players[player.index()]
                .as_ref()
                .is_some_and(|seat| seat.source.id() == id)
        }) else {
            tracing::debug!("Ignoring disconnect of unknown connection {}", id);
            return;
        };

        if let Some(mut seat) = self.players[slot.index()].take() {
            seat.source.remove_move_listeners();
            tracing::info!("{} ({}) left {}", seat.name, id, slot);
        }

        if self.phase() == RoundPhase::InProgress {
            self.forfeit(slot, ForfeitReason::Disconnected);
            self.broadcast_state();
        }
    }

    /// Start the current round: fill empty slots the mode allows, attach
    /// listeners and ask the first player for a move.
    ///
    /// # Errors
    ///
    /// `RoundInProgress` if this round was already started, or
    /// `IncompleteRoster` if a slot is still empty or, in solo mode, no remote
    /// player is seated. Nothing is changed on error.
    pub fn start_round(&mut self) -> Result<(), SessionError> {
        if self.started {
            return Err(SessionError::RoundInProgress);
        }

        let empty: Vec<Player> = Player::ALL
            .into_iter()
            .filter(|player| self.players[player.index()].is_none())
            .collect();
        if let Some(&first_empty) = empty.first()
            && empty.len() > self.config.mode.automated_fill_ins()
        {
            return Err(SessionError::IncompleteRoster(first_empty));
        }
        let remote_seated = self
            .players
            .iter()
            .flatten()
            .any(|seat| seat.source.kind() == PlayerKind::Remote);
        if self.config.mode.requires_remote_player() && !remote_seated {
            let missing = empty.first().copied().unwrap_or(Player::Player1);
            return Err(SessionError::IncompleteRoster(missing));
        }
        for slot in empty {
            let source = (self.automated_players)();
            self.seat(slot, source, PlayerName::automated(slot));
        }

        self.started = true;
        self.attach_listeners();
        tracing::info!(
            "Round {} started, {} moves first",
            self.round,
            self.state.players_turn()
        );
        self.request_move_from_current_player();
        self.broadcast_state();
        Ok(())
    }

    /// Send a fresh move request to the player whose turn it is.
    ///
    /// The new request supersedes any outstanding one.
    pub fn request_move_from_current_player(&mut self) {
        let player = self.state.players_turn();
        let Some(seat) = self.players[player.index()].as_mut() else {
            tracing::error!("Cannot request a move: {} slot is empty", player);
            self.outstanding = None;
            return;
        };

        let sent_at = self.clock.now_millis();
        let timeout_millis = i64::try_from(self.config.move_timeout.as_millis()).unwrap_or(i64::MAX);
        let request_id = Uuid::new_v4();
        let message = ServerMessage::RequestMove(MoveRequest {
            role: player,
            sent_at,
            expected_by: sent_at.saturating_add(timeout_millis),
            request_id,
            encoded_game_state: EncodedGameState::from(&self.state),
            encoded_last_move: self.last_move.as_ref().map(EncodedMove::from),
        });

        self.outstanding = Some(OutstandingRequest {
            request_id,
            responder: player,
            responder_id: seat.source.id(),
            deadline: Instant::now() + self.config.move_timeout,
        });
        tracing::debug!("Requesting move {} from {} ({})", request_id, player, seat.name);
        if let Err(e) = seat.source.send(&message) {
            tracing::warn!(
                "Failed to send move request to {}: {}, it will time out",
                player,
                e
            );
        }
    }

    /// Handle a move submitted through the connection `from`.
    ///
    /// Only the answer to the outstanding request, from the connection it was
    /// sent to, is considered. Anything else is ignored and changes nothing.
    pub fn receive_move_response(
        &mut self,
        from: ConnectionId,
        submission: MoveSubmission,
    ) -> ResponseOutcome {
        if self.phase() != RoundPhase::InProgress {
            tracing::debug!("Ignoring move from {}: round is not in progress", from);
            return ResponseOutcome::Ignored(IgnoredResponse::RoundNotActive);
        }
        let Some(request) = self.outstanding else {
            tracing::warn!("Ignoring move from {}: no request is outstanding", from);
            return ResponseOutcome::Ignored(IgnoredResponse::NoOutstandingRequest);
        };
        if submission.request_id != Some(request.request_id) {
            tracing::warn!(
                "Ignoring stale move from {}: request id {:?} does not match {}",
                from,
                submission.request_id,
                request.request_id
            );
            return ResponseOutcome::Ignored(IgnoredResponse::RequestIdMismatch);
        }
        if from != request.responder_id {
            tracing::warn!(
                "Ignoring move from {}: request {} was sent to {}",
                from,
                request.request_id,
                request.responder_id
            );
            return ResponseOutcome::Ignored(IgnoredResponse::WrongResponder);
        }

        self.outstanding = None;
        let player = request.responder;
        let Some(encoded) = submission.encoded_move else {
            return self.reject(player, ForfeitReason::MissingMovePayload);
        };

        match self.state.apply_player_move(Move::from(encoded)) {
            Ok(outcome) => {
                self.last_move = Some(outcome.applied);
                tracing::debug!(
                    "{} played {} (captured: {})",
                    player,
                    outcome.applied,
                    outcome.captured
                );
                self.broadcast_state();
                if !outcome.game_over {
                    self.request_move_from_current_player();
                }
                ResponseOutcome::Accepted {
                    captured: outcome.captured,
                    game_over: outcome.game_over,
                }
            }
            Err(GameError::IllegalMove { reason, .. }) => {
                self.reject(player, ForfeitReason::IllegalMove(reason))
            }
            Err(e) => {
                tracing::warn!("Ignoring move from {}: {}", player, e);
                ResponseOutcome::Ignored(IgnoredResponse::RoundNotActive)
            }
        }
    }

    /// Forfeit the round if `request_id` is still outstanding.
    ///
    /// Returns whether anything happened.
    pub fn expire_outstanding_request(&mut self, request_id: Uuid) -> bool {
        match self.outstanding {
            Some(request) if request.request_id == request_id => {
                tracing::warn!(
                    "{} did not answer request {} in time",
                    request.responder,
                    request_id
                );
                self.forfeit(request.responder, ForfeitReason::Timeout);
                self.broadcast_state();
                true
            }
            _ => false,
        }
    }

    /// Replace the game with a fresh one and start it.
    ///
    /// Odd rounds open with `PLAYER1`, even rounds with `PLAYER2`. Registrations
    /// are kept; listeners are detached and attached again.
    ///
    /// # Errors
    ///
    /// `RoundNotStarted` before the first round has been started. A failure
    /// from `start_round` leaves the new round waiting to be started.
    pub fn next_round(&mut self) -> Result<u32, SessionError> {
        if !self.started {
            return Err(SessionError::RoundNotStarted);
        }

        let next = self.round + 1;
        let state = GameState::new(self.config.board_size, first_player_of_round(next))?;
        self.detach_listeners();
        self.outstanding = None;
        self.round = next;
        self.state = state;
        self.last_move = None;
        self.started = false;
        self.start_round()?;
        Ok(self.round)
    }

    /// Stop listening for moves without touching registrations or the board.
    pub fn end_round(&mut self) -> Result<(), SessionError> {
        if !self.started {
            return Err(SessionError::RoundNotStarted);
        }
        self.detach_listeners();
        self.outstanding = None;
        tracing::info!("Round {} ended", self.round);
        Ok(())
    }

    /// Give the first move of the not-yet-started round to the other player.
    pub fn swap_starting_player(&mut self) -> Result<Player, SessionError> {
        if self.started {
            return Err(SessionError::RoundInProgress);
        }
        let first = self.state.toggle_turn(None);
        tracing::info!("{} will move first in round {}", first, self.round);
        Ok(first)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let players = Player::ALL
            .into_iter()
            .filter_map(|slot| {
                self.players[slot.index()]
                    .as_ref()
                    .map(|seat| PlayerSummary {
                        slot,
                        name: seat.name.to_string(),
                        kind: seat.source.kind(),
                        connection_id: seat.source.id(),
                    })
            })
            .collect();

        SessionSnapshot {
            round: self.round,
            phase: self.phase(),
            mode: self.config.mode,
            players,
            observer_count: self.observers.len(),
            state: self.state.clone(),
            last_move: self.last_move,
            outstanding_request: self.outstanding.map(|request| request.request_id),
        }
    }

    fn seat(&mut self, slot: Player, mut source: Box<dyn MoveSource>, name: PlayerName) {
        let message = ServerMessage::AssignRole(AssignRole {
            role: ConnectionRole::Player,
            slot: Some(slot),
        });
        if let Err(e) = source.send(&message) {
            tracing::warn!("Failed to send role to {}: {}", source.id(), e);
        }
        if self.listening {
            source.on_move_submitted(response_handler(&self.events, source.id()));
        }
        tracing::info!(
            "{} joined as {} ({:?}, {})",
            name,
            slot,
            source.kind(),
            source.id()
        );
        self.players[slot.index()] = Some(PlayerSlot { source, name });
    }

    fn reject(&mut self, player: Player, reason: ForfeitReason) -> ResponseOutcome {
        match self.config.invalid_response_policy {
            InvalidResponsePolicy::Forfeit => {
                self.forfeit(player, reason);
                self.broadcast_state();
                ResponseOutcome::Forfeited(reason)
            }
            InvalidResponsePolicy::Reissue => {
                tracing::warn!("{} {}, asking again", player, reason);
                self.request_move_from_current_player();
                self.broadcast_state();
                ResponseOutcome::Reissued(reason)
            }
        }
    }

    fn forfeit(&mut self, loser: Player, reason: ForfeitReason) {
        self.outstanding = None;
        self.state
            .set_winner(Some(loser.opponent()), format!("{} {}", loser, reason));
    }

    fn attach_listeners(&mut self) {
        for seat in self.players.iter_mut().flatten() {
            let handler = response_handler(&self.events, seat.source.id());
            seat.source.on_move_submitted(handler);
        }
        self.listening = true;
    }

    fn detach_listeners(&mut self) {
        for seat in self.players.iter_mut().flatten() {
            seat.source.remove_move_listeners();
        }
        self.listening = false;
    }

    fn broadcast_state(&mut self) {
        if self.observers.is_empty() {
            return;
        }
        let message = self.state_update();
        for observer in &mut self.observers {
            if let Err(e) = observer.send(&message) {
                tracing::warn!("Failed to update observer {}: {}", observer.id(), e);
            }
        }
    }

    fn state_update(&self) -> ServerMessage {
        let name_of = |slot: Player| {
            self.players[slot.index()]
                .as_ref()
                .map(|seat| seat.name.to_string())
        };
        ServerMessage::StateUpdate(StateUpdate {
            current_turn_role: self.state.players_turn(),
            player_names: PlayerNames {
                player1: name_of(Player::Player1),
                player2: name_of(Player::Player2),
            },
            sent_at: self.clock.now_millis(),
            encoded_game_state: EncodedGameState::from(&self.state),
            encoded_last_move: self.last_move.as_ref().map(EncodedMove::from),
        })
    }
}

fn first_player_of_round(round: u32) -> Player {
    if round % 2 == 0 {
        Player::Player2
    } else {
        Player::Player1
    }
}

fn response_handler(
    events: &WeakUnboundedSender<SessionEvent>,
    from: ConnectionId,
) -> MoveResponseHandler {
    let events = events.clone();
    Arc::new(move |submission| {
        let Some(events) = events.upgrade() else {
            tracing::debug!("Session has stopped, dropping move from {}", from);
            return;
        };
        if events
            .send(SessionEvent::MoveSubmitted { from, submission })
            .is_err()
        {
            tracing::debug!("Session has stopped, dropping move from {}", from);
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

    use dotbox_shared::{
        game::{IllegalMoveReason, MIN_BOARD_SIZE},
        time::FixedClock,
    };

    use super::*;
    use crate::domain::{MockMoveSource, MoveSourceError};

    const NOW: i64 = 1_700_000_000_000;

    #[derive(Default)]
    struct Recorded {
        sent: Vec<ServerMessage>,
        handler: Option<MoveResponseHandler>,
        listeners_removed: usize,
        disconnected: bool,
    }

    /// Move source that records everything the session does to it
    #[derive(Clone)]
    struct FakeSource {
        id: ConnectionId,
        kind: PlayerKind,
        recorded: Arc<Mutex<Recorded>>,
    }

    impl FakeSource {
        fn new(kind: PlayerKind) -> Self {
            Self {
                id: ConnectionId::generate(),
                kind,
                recorded: Arc::new(Mutex::new(Recorded::default())),
            }
        }

        fn sent(&self) -> Vec<ServerMessage> {
            self.recorded.lock().unwrap().sent.clone()
        }

        fn requests(&self) -> Vec<MoveRequest> {
            self.sent()
                .into_iter()
                .filter_map(|message| match message {
                    ServerMessage::RequestMove(request) => Some(request),
                    _ => None,
                })
                .collect()
        }

        fn last_request(&self) -> MoveRequest {
            self.requests().pop().expect("no move request was sent")
        }

        fn state_updates(&self) -> Vec<StateUpdate> {
            self.sent()
                .into_iter()
                .filter_map(|message| match message {
                    ServerMessage::StateUpdate(update) => Some(update),
                    _ => None,
                })
                .collect()
        }

        fn has_listener(&self) -> bool {
            self.recorded.lock().unwrap().handler.is_some()
        }

        fn submit(&self, submission: MoveSubmission) -> bool {
            let handler = self.recorded.lock().unwrap().handler.clone();
            match handler {
                Some(handler) => {
                    handler(submission);
                    true
                }
                None => false,
            }
        }
    }

    impl MoveSource for FakeSource {
        fn id(&self) -> ConnectionId {
            self.id
        }

        fn kind(&self) -> PlayerKind {
            self.kind
        }

        fn send(&mut self, message: &ServerMessage) -> Result<(), MoveSourceError> {
            self.recorded.lock().unwrap().sent.push(message.clone());
            Ok(())
        }

        fn on_move_submitted(&mut self, handler: MoveResponseHandler) {
            self.recorded.lock().unwrap().handler = Some(handler);
        }

        fn remove_move_listeners(&mut self) {
            let mut recorded = self.recorded.lock().unwrap();
            recorded.handler = None;
            recorded.listeners_removed += 1;
        }

        fn disconnect(&mut self) {
            self.recorded.lock().unwrap().disconnected = true;
        }
    }

    struct Fixture {
        session: Session,
        events: UnboundedReceiver<SessionEvent>,
        _sender: UnboundedSender<SessionEvent>,
        automated: Arc<Mutex<Vec<FakeSource>>>,
    }

    fn fixture(config: SessionConfig) -> Fixture {
        let (sender, events) = mpsc::unbounded_channel();
        let automated = Arc::new(Mutex::new(Vec::new()));
        let created = automated.clone();
        let factory: AutomatedPlayerFactory = Box::new(move || {
            let source = FakeSource::new(PlayerKind::LocalAutomated);
            created.lock().unwrap().push(source.clone());
            Box::new(source) as Box<dyn MoveSource>
        });
        let session = Session::new(
            config,
            Arc::new(FixedClock::new(NOW)),
            sender.downgrade(),
            factory,
        )
        .unwrap();
        Fixture {
            session,
            events,
            _sender: sender,
            automated,
        }
    }

    fn config(board_size: usize) -> SessionConfig {
        SessionConfig {
            board_size,
            ..SessionConfig::default()
        }
    }

    /// Session with two remote players and one observer, round not started
    fn seated(config: SessionConfig) -> (Fixture, FakeSource, FakeSource, FakeSource) {
        let mut f = fixture(config);
        let player1 = FakeSource::new(PlayerKind::Remote);
        let player2 = FakeSource::new(PlayerKind::Remote);
        let observer = FakeSource::new(PlayerKind::Remote);
        f.session
            .add_player(Box::new(player1.clone()), PlayerName::new("alice").unwrap())
            .unwrap();
        f.session
            .add_player(Box::new(player2.clone()), PlayerName::new("bob").unwrap())
            .unwrap();
        f.session.add_observer(Box::new(observer.clone()));
        (f, player1, player2, observer)
    }

    fn answer(f: &mut Fixture, source: &FakeSource, mv: Move) -> ResponseOutcome {
        let request = source.last_request();
        f.session.receive_move_response(
            source.id,
            MoveSubmission::new(request.request_id, EncodedMove::from(&mv)),
        )
    }

    #[test]
    fn test_players_fill_slots_in_order() {
        // テスト項目: プレイヤーは PLAYER1, PLAYER2 の順に割り当てられ、ASSIGN_ROLE を受け取る
        // given (前提条件):
        let mut f = fixture(config(3));
        let first = FakeSource::new(PlayerKind::Remote);
        let second = FakeSource::new(PlayerKind::Remote);

        // when (操作):
        let slot1 = f
            .session
            .add_player(Box::new(first.clone()), PlayerName::new("alice").unwrap());
        let slot2 = f
            .session
            .add_player(Box::new(second.clone()), PlayerName::new("bob").unwrap());

        // then (期待する結果):
        assert_eq!(slot1, Ok(Player::Player1));
        assert_eq!(slot2, Ok(Player::Player2));
        assert_eq!(
            second.sent(),
            vec![ServerMessage::AssignRole(AssignRole {
                role: ConnectionRole::Player,
                slot: Some(Player::Player2),
            })]
        );
        let snapshot = f.session.snapshot();
        assert_eq!(snapshot.players.len(), 2);
        assert_eq!(snapshot.players[0].name, "alice");
        assert_eq!(snapshot.phase, RoundPhase::NotStarted);
    }

    #[test]
    fn test_third_player_is_rejected_and_disconnected() {
        // テスト項目: 満席のセッションに参加しようとしたソースは切断される
        // given (前提条件):
        let (mut f, _, _, _) = seated(config(3));
        let mut third = MockMoveSource::new();
        third.expect_id().return_const(ConnectionId::generate());
        third.expect_send().never();
        third.expect_disconnect().times(1).return_const(());

        // when (操作):
        let result = f
            .session
            .add_player(Box::new(third), PlayerName::new("carol").unwrap());

        // then (期待する結果):
        assert_eq!(result, Err(SessionError::SessionFull));
        assert_eq!(f.session.snapshot().players.len(), 2);
    }

    #[test]
    fn test_observer_receives_role_and_current_state() {
        // テスト項目: observer は登録直後に ASSIGN_ROLE と STATE_UPDATE を受け取る
        // given (前提条件):
        let mut f = fixture(config(3));
        let observer = FakeSource::new(PlayerKind::Remote);

        // when (操作):
        f.session.add_observer(Box::new(observer.clone()));

        // then (期待する結果):
        let sent = observer.sent();
        assert_eq!(sent.len(), 2);
        assert!(matches!(
            &sent[0],
            ServerMessage::AssignRole(AssignRole {
                role: ConnectionRole::Observer,
                slot: None
            })
        ));
        let update = &observer.state_updates()[0];
        assert_eq!(update.sent_at, NOW);
        assert_eq!(update.encoded_game_state.board_size, 3);
        assert_eq!(f.session.snapshot().observer_count, 1);
    }

    #[test]
    fn test_start_round_requires_full_roster() {
        // テスト項目: standard モードで空席があると開始できず、リスナーも登録されない
        // given (前提条件):
        let mut f = fixture(config(3));
        let player1 = FakeSource::new(PlayerKind::Remote);
        f.session
            .add_player(Box::new(player1.clone()), PlayerName::new("alice").unwrap())
            .unwrap();

        // when (操作):
        let result = f.session.start_round();

        // then (期待する結果):
        assert_eq!(result, Err(SessionError::IncompleteRoster(Player::Player2)));
        assert!(!player1.has_listener());
        assert!(player1.requests().is_empty());
        assert_eq!(f.session.phase(), RoundPhase::NotStarted);
    }

    #[test]
    fn test_start_round_requests_first_move() {
        // テスト項目: ラウンド開始で PLAYER1 に REQUEST_MOVE が送られ、observer に通知される
        // given (前提条件):
        let (mut f, player1, player2, observer) = seated(config(4));

        // when (操作):
        f.session.start_round().unwrap();

        // then (期待する結果):
        let request = player1.last_request();
        assert_eq!(request.role, Player::Player1);
        assert_eq!(request.sent_at, NOW);
        assert_eq!(request.expected_by, NOW + 2000);
        assert_eq!(request.encoded_last_move, None);
        assert!(player2.requests().is_empty());
        assert!(player1.has_listener());
        assert!(player2.has_listener());
        assert_eq!(
            f.session.outstanding_deadline().map(|(id, _)| id),
            Some(request.request_id)
        );
        assert_eq!(observer.state_updates().len(), 2);
        assert_eq!(f.session.phase(), RoundPhase::InProgress);
    }

    #[test]
    fn test_start_round_twice_is_rejected() {
        // given (前提条件):
        let (mut f, _, _, _) = seated(config(3));
        f.session.start_round().unwrap();

        // when (操作):
        let result = f.session.start_round();

        // then (期待する結果):
        assert_eq!(result, Err(SessionError::RoundInProgress));
    }

    #[test]
    fn test_submissions_are_routed_to_session_events() {
        // テスト項目: リスナー経由の提出は送信元の ConnectionId 付きでイベントになる
        // given (前提条件):
        let (mut f, player1, _, _) = seated(config(3));
        f.session.start_round().unwrap();
        let request = player1.last_request();
        let submission =
            MoveSubmission::new(request.request_id, EncodedMove::from(&Move::horizontal(0, 0)));

        // when (操作):
        assert!(player1.submit(submission.clone()));

        // then (期待する結果):
        match f.events.try_recv() {
            Ok(SessionEvent::MoveSubmitted {
                from,
                submission: received,
            }) => {
                assert_eq!(from, player1.id);
                assert_eq!(received, submission);
            }
            _ => panic!("expected a MoveSubmitted event"),
        }
    }

    #[test]
    fn test_capture_keeps_turn_with_capturing_player() {
        // テスト項目: box を獲得したプレイヤーに再度 REQUEST_MOVE が送られる
        // given (前提条件):
        let (mut f, player1, player2, observer) = seated(config(4));
        f.session.start_round().unwrap();
        answer(&mut f, &player1, Move::horizontal(0, 0));
        answer(&mut f, &player2, Move::vertical(0, 0));
        answer(&mut f, &player1, Move::vertical(1, 0));
        assert_eq!(player2.requests().len(), 2);

        // when (操作):
        let outcome = answer(&mut f, &player2, Move::horizontal(0, 1));

        // then (期待する結果):
        assert_eq!(
            outcome,
            ResponseOutcome::Accepted {
                captured: true,
                game_over: false
            }
        );
        let request = player2.last_request();
        assert_eq!(player2.requests().len(), 3);
        assert_eq!(request.role, Player::Player2);
        assert_eq!(
            GameState::try_from(request.encoded_game_state.clone())
                .unwrap()
                .legal_moves()
                .len(),
            20
        );
        let last = request.encoded_last_move.unwrap();
        assert_eq!((last.x, last.y, last.is_horizontal), (0, 1, true));
        let state = f.session.state();
        assert_eq!(
            state.board().box_at(0, 0).unwrap().ownership,
            Some(Player::Player2)
        );
        assert_eq!(
            observer.state_updates().last().unwrap().current_turn_role,
            Player::Player2
        );
    }

    #[test]
    fn test_stale_request_id_is_ignored() {
        // テスト項目: 古い request id の応答は無視され、状態も通知も変わらない
        // given (前提条件):
        let (mut f, player1, _, observer) = seated(config(3));
        f.session.start_round().unwrap();
        let before = f.session.state().clone();
        let updates = observer.state_updates().len();

        // when (操作):
        let outcome = f.session.receive_move_response(
            player1.id,
            MoveSubmission::new(Uuid::new_v4(), EncodedMove::from(&Move::horizontal(0, 0))),
        );

        // then (期待する結果):
        assert_eq!(
            outcome,
            ResponseOutcome::Ignored(IgnoredResponse::RequestIdMismatch)
        );
        assert_eq!(f.session.state(), &before);
        assert_eq!(observer.state_updates().len(), updates);
        assert!(f.session.outstanding_deadline().is_some());
    }

    #[test]
    fn test_matching_id_from_wrong_connection_is_ignored() {
        // テスト項目: 正しい request id でも別の接続からの応答は無視される
        // given (前提条件):
        let (mut f, player1, player2, _) = seated(config(3));
        f.session.start_round().unwrap();
        let request = player1.last_request();

        // when (操作):
        let outcome = f.session.receive_move_response(
            player2.id,
            MoveSubmission::new(request.request_id, EncodedMove::from(&Move::horizontal(0, 0))),
        );

        // then (期待する結果):
        assert_eq!(
            outcome,
            ResponseOutcome::Ignored(IgnoredResponse::WrongResponder)
        );
        assert_eq!(f.session.state().turn(), 0);
    }

    #[test]
    fn test_timeout_forfeits_to_opponent() {
        // テスト項目: 期限切れで相手の勝利となり、保留中のリクエストが消える
        // given (前提条件):
        let (mut f, player1, _, observer) = seated(config(4));
        f.session.start_round().unwrap();
        let request = player1.last_request();
        let updates = observer.state_updates().len();

        // when (操作):
        let expired = f.session.expire_outstanding_request(request.request_id);

        // then (期待する結果):
        assert!(expired);
        assert!(f.session.state().is_game_over());
        assert_eq!(f.session.state().victor(), Some(Player::Player2));
        assert_eq!(f.session.outstanding_deadline(), None);
        assert_eq!(f.session.phase(), RoundPhase::GameOver);
        let last_update = observer.state_updates().pop().unwrap();
        assert_eq!(observer.state_updates().len(), updates + 1);
        assert!(last_update.encoded_game_state.game_over);

        // 期限切れ後に届いた応答は無視される
        let late = f.session.receive_move_response(
            player1.id,
            MoveSubmission::new(request.request_id, EncodedMove::from(&Move::horizontal(0, 0))),
        );
        assert_eq!(late, ResponseOutcome::Ignored(IgnoredResponse::RoundNotActive));
    }

    #[test]
    fn test_expiring_superseded_request_does_nothing() {
        // テスト項目: すでに応答済みのリクエストの期限切れは無視される
        // given (前提条件):
        let (mut f, player1, _, _) = seated(config(4));
        f.session.start_round().unwrap();
        let first = player1.last_request();
        answer(&mut f, &player1, Move::horizontal(0, 0));

        // when (操作):
        let expired = f.session.expire_outstanding_request(first.request_id);

        // then (期待する結果):
        assert!(!expired);
        assert!(!f.session.state().is_game_over());
    }

    #[test]
    fn test_missing_move_forfeits_by_default() {
        // テスト項目: encodedMove のない応答は既定ポリシーで没収負けとなる
        // given (前提条件):
        let (mut f, player1, _, _) = seated(config(3));
        f.session.start_round().unwrap();
        let request = player1.last_request();

        // when (操作):
        let outcome = f.session.receive_move_response(
            player1.id,
            MoveSubmission {
                request_id: Some(request.request_id),
                encoded_move: None,
            },
        );

        // then (期待する結果):
        assert_eq!(
            outcome,
            ResponseOutcome::Forfeited(ForfeitReason::MissingMovePayload)
        );
        assert_eq!(f.session.state().victor(), Some(Player::Player2));
        assert_eq!(
            f.session.state().end_reason(),
            Some("PLAYER1 answered without a move")
        );
    }

    #[test]
    fn test_reissue_policy_asks_again() {
        // テスト項目: reissue ポリシーでは不正な応答の後に同じプレイヤーへ新しいリクエストが送られる
        // given (前提条件):
        let (mut f, player1, _, observer) = seated(SessionConfig {
            invalid_response_policy: InvalidResponsePolicy::Reissue,
            ..config(3)
        });
        f.session.start_round().unwrap();
        let first = player1.last_request();
        let updates_before = observer.state_updates().len();

        // when (操作):
        let outcome = answer(&mut f, &player1, Move::horizontal(5, 5));

        // then (期待する結果):
        assert_eq!(
            outcome,
            ResponseOutcome::Reissued(ForfeitReason::IllegalMove(IllegalMoveReason::OutOfBounds))
        );
        let second = player1.last_request();
        assert_eq!(player1.requests().len(), 2);
        assert_ne!(second.request_id, first.request_id);
        assert_eq!(second.role, Player::Player1);
        assert!(!f.session.state().is_game_over());
        assert_eq!(f.session.state().turn(), 0);
        assert_eq!(observer.state_updates().len(), updates_before + 1);

        // 古いリクエストへの応答はもう受け付けない
        let stale = f.session.receive_move_response(
            player1.id,
            MoveSubmission::new(first.request_id, EncodedMove::from(&Move::horizontal(0, 0))),
        );
        assert_eq!(
            stale,
            ResponseOutcome::Ignored(IgnoredResponse::RequestIdMismatch)
        );
    }

    #[test]
    fn test_illegal_move_forfeits_by_default() {
        // テスト項目: 既に引かれた辺への手は没収負けとなる
        // given (前提条件):
        let (mut f, player1, player2, _) = seated(config(3));
        f.session.start_round().unwrap();
        answer(&mut f, &player1, Move::vertical(0, 0));

        // when (操作):
        let outcome = answer(&mut f, &player2, Move::vertical(0, 0));

        // then (期待する結果):
        assert_eq!(
            outcome,
            ResponseOutcome::Forfeited(ForfeitReason::IllegalMove(
                IllegalMoveReason::EdgeAlreadyClaimed
            ))
        );
        assert_eq!(f.session.state().victor(), Some(Player::Player1));
    }

    #[test]
    fn test_complete_game_on_smallest_board() {
        // テスト項目: 最小盤面で最後の辺を引いたプレイヤーが勝ち、以降のリクエストは送られない
        // given (前提条件):
        let (mut f, player1, player2, _) = seated(config(MIN_BOARD_SIZE));
        f.session.start_round().unwrap();
        answer(&mut f, &player1, Move::horizontal(0, 0));
        answer(&mut f, &player2, Move::vertical(0, 0));
        answer(&mut f, &player1, Move::horizontal(0, 1));

        // when (操作):
        let outcome = answer(&mut f, &player2, Move::vertical(1, 0));

        // then (期待する結果):
        assert_eq!(
            outcome,
            ResponseOutcome::Accepted {
                captured: true,
                game_over: true
            }
        );
        assert_eq!(f.session.state().victor(), Some(Player::Player2));
        assert_eq!(f.session.outstanding_deadline(), None);
        assert_eq!(player2.requests().len(), 2);
    }

    #[test]
    fn test_next_round_alternates_first_player() {
        // テスト項目: 次のラウンドは新しい盤面で、偶数ラウンドは PLAYER2 から始まる
        // given (前提条件):
        let (mut f, player1, player2, _) = seated(config(3));
        f.session.start_round().unwrap();
        answer(&mut f, &player1, Move::horizontal(0, 0));

        // when (操作):
        let round = f.session.next_round();

        // then (期待する結果):
        assert_eq!(round, Ok(2));
        assert_eq!(f.session.state().turn(), 0);
        assert_eq!(f.session.state().legal_moves().len(), 12);
        let request = player2.last_request();
        assert_eq!(request.role, Player::Player2);
        assert_eq!(request.encoded_last_move, None);
        assert_eq!(player1.recorded.lock().unwrap().listeners_removed, 1);
        assert!(player1.has_listener());
        assert_eq!(f.session.snapshot().players.len(), 2);

        // 3 ラウンド目は再び PLAYER1 から
        assert_eq!(f.session.next_round(), Ok(3));
        assert_eq!(f.session.state().players_turn(), Player::Player1);
    }

    #[test]
    fn test_next_round_before_start_is_rejected() {
        // given (前提条件):
        let (mut f, _, _, _) = seated(config(3));

        // when (操作):
        let result = f.session.next_round();

        // then (期待する結果):
        assert_eq!(result, Err(SessionError::RoundNotStarted));
        assert_eq!(f.session.round(), 1);
    }

    #[test]
    fn test_end_round_detaches_listeners() {
        // テスト項目: ラウンド終了後は応答が無視されるが、登録は残る
        // given (前提条件):
        let (mut f, player1, _, _) = seated(config(3));
        f.session.start_round().unwrap();
        let request = player1.last_request();

        // when (操作):
        f.session.end_round().unwrap();

        // then (期待する結果):
        assert!(!player1.has_listener());
        assert_eq!(f.session.phase(), RoundPhase::Suspended);
        let outcome = f.session.receive_move_response(
            player1.id,
            MoveSubmission::new(request.request_id, EncodedMove::from(&Move::horizontal(0, 0))),
        );
        assert_eq!(outcome, ResponseOutcome::Ignored(IgnoredResponse::RoundNotActive));
        assert_eq!(f.session.snapshot().players.len(), 2);
        assert_eq!(f.session.next_round(), Ok(2));
    }

    #[test]
    fn test_player_disconnect_forfeits_round() {
        // テスト項目: 進行中にプレイヤーが切断すると相手の勝ちとなり、席が空く
        // given (前提条件):
        let (mut f, _, player2, _) = seated(config(3));
        f.session.start_round().unwrap();

        // when (操作):
        f.session.disconnected(player2.id);

        // then (期待する結果):
        assert_eq!(f.session.state().victor(), Some(Player::Player1));
        assert_eq!(
            f.session.state().end_reason(),
            Some("PLAYER2 disconnected")
        );
        let snapshot = f.session.snapshot();
        assert_eq!(snapshot.players.len(), 1);
        assert_eq!(snapshot.players[0].slot, Player::Player1);

        // 空いた席には新しいプレイヤーが座れる
        let newcomer = FakeSource::new(PlayerKind::Remote);
        let slot = f
            .session
            .add_player(Box::new(newcomer), PlayerName::new("dave").unwrap());
        assert_eq!(slot, Ok(Player::Player2));
    }

    #[test]
    fn test_observer_disconnect_removes_observer() {
        // given (前提条件):
        let (mut f, _, _, observer) = seated(config(3));

        // when (操作):
        f.session.disconnected(observer.id);

        // then (期待する結果):
        assert_eq!(f.session.snapshot().observer_count, 0);
        assert!(!f.session.state().is_game_over());
    }

    #[test]
    fn test_solo_mode_fills_empty_slot_with_automated_player() {
        // テスト項目: solo モードでは空席がローカルプレイヤーで埋められる
        // given (前提条件):
        let mut f = fixture(SessionConfig {
            mode: GameMode::Solo,
            ..config(3)
        });
        let human = FakeSource::new(PlayerKind::Remote);
        f.session
            .add_player(Box::new(human.clone()), PlayerName::new("alice").unwrap())
            .unwrap();

        // when (操作):
        f.session.start_round().unwrap();

        // then (期待する結果):
        let automated = f.automated.lock().unwrap().clone();
        assert_eq!(automated.len(), 1);
        assert!(automated[0].has_listener());
        let snapshot = f.session.snapshot();
        assert_eq!(snapshot.players[1].kind, PlayerKind::LocalAutomated);
        assert_eq!(snapshot.players[1].name, "LocalBot2");
        assert_eq!(human.requests().len(), 1);
    }

    #[test]
    fn test_solo_mode_still_needs_one_player() {
        // given (前提条件):
        let mut f = fixture(SessionConfig {
            mode: GameMode::Solo,
            ..config(3)
        });

        // when (操作):
        let result = f.session.start_round();

        // then (期待する結果):
        assert_eq!(result, Err(SessionError::IncompleteRoster(Player::Player1)));
        assert!(f.automated.lock().unwrap().is_empty());
    }

    #[test]
    fn test_solo_next_round_without_remote_player_is_refused() {
        // テスト項目: solo モードでリモートプレイヤーが切断した後の次ラウンドは bot 同士では始まらない
        // given (前提条件):
        let mut f = fixture(SessionConfig {
            mode: GameMode::Solo,
            ..config(3)
        });
        let human = FakeSource::new(PlayerKind::Remote);
        f.session
            .add_player(Box::new(human.clone()), PlayerName::new("alice").unwrap())
            .unwrap();
        f.session.start_round().unwrap();
        f.session.disconnected(human.id);

        // when (操作):
        let result = f.session.next_round();

        // then (期待する結果):
        assert_eq!(result, Err(SessionError::IncompleteRoster(Player::Player1)));
        assert_eq!(f.automated.lock().unwrap().len(), 1);
        assert_eq!(f.session.phase(), RoundPhase::NotStarted);

        // 新しいリモートプレイヤーが入れば再開できる
        let newcomer = FakeSource::new(PlayerKind::Remote);
        f.session
            .add_player(Box::new(newcomer.clone()), PlayerName::new("carol").unwrap())
            .unwrap();
        f.session.start_round().unwrap();
        let kinds: Vec<PlayerKind> = f
            .session
            .snapshot()
            .players
            .iter()
            .map(|player| player.kind)
            .collect();
        assert_eq!(kinds, vec![PlayerKind::Remote, PlayerKind::LocalAutomated]);
        assert_eq!(f.automated.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_swap_starting_player_before_start_only() {
        // テスト項目: 開始前なら先手を入れ替えられ、開始後は拒否される
        // given (前提条件):
        let (mut f, _, player2, _) = seated(config(3));

        // when (操作):
        let swapped = f.session.swap_starting_player();
        f.session.start_round().unwrap();

        // then (期待する結果):
        assert_eq!(swapped, Ok(Player::Player2));
        assert_eq!(player2.requests().len(), 1);
        assert_eq!(
            f.session.swap_starting_player(),
            Err(SessionError::RoundInProgress)
        );
    }

    #[test]
    fn test_invalid_board_size_is_rejected() {
        // given (前提条件):
        let (sender, _events) = mpsc::unbounded_channel::<SessionEvent>();

        // when (操作):
        let result = Session::new(
            config(1),
            Arc::new(FixedClock::new(NOW)),
            sender.downgrade(),
            Box::new(|| {
                Box::new(FakeSource::new(PlayerKind::LocalAutomated)) as Box<dyn MoveSource>
            }),
        );

        // then (期待する結果):
        assert!(matches!(
            result,
            Err(SessionError::Game(GameError::InvalidSize(1)))
        ));
    }
}
