//! Task that owns the `Session` and applies events to it one at a time.
//!
//! Besides events, the task waits on two timers: the deadline of the
//! outstanding move request and, in screensaver mode, the automatic start of
//! the next round.

use std::{future::Future, sync::Arc};

use async_trait::async_trait;
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
    time::{Instant, sleep_until},
};

use dotbox_shared::{game::Player, time::Clock};

use crate::domain::{
    AutomatedPlayerFactory, ConnectionId, MoveSource, PlayerName, SessionError, SessionGateway,
    SessionSnapshot,
};

use super::{config::SessionConfig, event::SessionEvent, play_game::Session};

/// Cloneable handle to a running session task
#[derive(Clone)]
pub struct SessionHandle {
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionHandle {
    /// Build a session and spawn the task driving it.
    ///
    /// The task stops once every handle has been dropped.
    pub fn spawn(
        config: SessionConfig,
        clock: Arc<dyn Clock>,
        automated_players: AutomatedPlayerFactory,
    ) -> Result<(Self, JoinHandle<()>), SessionError> {
        let (events, receiver) = mpsc::unbounded_channel();
        let session = Session::new(config, clock, events.downgrade(), automated_players)?;
        let task = tokio::spawn(run_session(session, receiver));
        Ok((Self { events }, task))
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T, SessionError>>) -> SessionEvent,
    ) -> Result<T, SessionError> {
        let (reply, response) = oneshot::channel();
        self.events
            .send(build(reply))
            .map_err(|_| SessionError::SessionClosed)?;
        response.await.map_err(|_| SessionError::SessionClosed)?
    }
}

#[async_trait]
impl SessionGateway for SessionHandle {
    async fn add_player(
        &self,
        source: Box<dyn MoveSource>,
        name: PlayerName,
    ) -> Result<Player, SessionError> {
        self.request(|reply| SessionEvent::AddPlayer {
            source,
            name,
            reply,
        })
        .await
    }

    async fn add_observer(&self, source: Box<dyn MoveSource>) -> Result<(), SessionError> {
        self.request(|reply| SessionEvent::AddObserver { source, reply })
            .await
    }

    async fn disconnect(&self, id: ConnectionId) -> Result<(), SessionError> {
        self.events
            .send(SessionEvent::Disconnected { id })
            .map_err(|_| SessionError::SessionClosed)
    }

    async fn start_round(&self) -> Result<(), SessionError> {
        self.request(|reply| SessionEvent::StartRound { reply }).await
    }

    async fn next_round(&self) -> Result<u32, SessionError> {
        self.request(|reply| SessionEvent::NextRound { reply }).await
    }

    async fn end_round(&self) -> Result<(), SessionError> {
        self.request(|reply| SessionEvent::EndRound { reply }).await
    }

    async fn swap_starting_player(&self) -> Result<Player, SessionError> {
        self.request(|reply| SessionEvent::SwapStartingPlayer { reply })
            .await
    }

    async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        let (reply, response) = oneshot::channel();
        self.events
            .send(SessionEvent::Snapshot { reply })
            .map_err(|_| SessionError::SessionClosed)?;
        response.await.map_err(|_| SessionError::SessionClosed)
    }
}

async fn run_session(mut session: Session, mut events: mpsc::UnboundedReceiver<SessionEvent>) {
    tracing::info!(
        "Session started (board size {}, mode {:?})",
        session.config().board_size,
        session.config().mode
    );
    let mut restart_at: Option<Instant> = None;

    loop {
        let deadline = session.outstanding_deadline();
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => dispatch(&mut session, event),
                None => break,
            },
            request_id = at_deadline(deadline) => {
                session.expire_outstanding_request(request_id);
            }
            () = at_deadline(restart_at.map(|at| ((), at))) => {
                restart_at = None;
                match session.next_round() {
                    Ok(round) => tracing::info!("Round {} started automatically", round),
                    Err(e) => tracing::warn!("Failed to start the next round: {}", e),
                }
            }
        }

        restart_at = match (session.wants_auto_restart(), restart_at) {
            (true, None) => Some(Instant::now() + session.config().round_restart_delay),
            (true, scheduled) => scheduled,
            (false, _) => None,
        };
    }

    tracing::info!("Session stopped");
}

/// Resolve to `value` at `at`, or never when there is nothing to wait for
fn at_deadline<T>(deadline: Option<(T, Instant)>) -> impl Future<Output = T> {
    async move {
        match deadline {
            Some((value, at)) => {
                sleep_until(at).await;
                value
            }
            None => std::future::pending().await,
        }
    }
}

fn dispatch(session: &mut Session, event: SessionEvent) {
    tracing::trace!("Session event: {}", event.label());
    match event {
        SessionEvent::AddPlayer {
            source,
            name,
            reply,
        } => {
            let _ = reply.send(session.add_player(source, name));
        }
        SessionEvent::AddObserver { source, reply } => {
            session.add_observer(source);
            let _ = reply.send(Ok(()));
        }
        SessionEvent::Disconnected { id } => session.disconnected(id),
        SessionEvent::MoveSubmitted { from, submission } => {
            let outcome = session.receive_move_response(from, submission);
            tracing::trace!("Move from {}: {:?}", from, outcome);
        }
        SessionEvent::StartRound { reply } => {
            let _ = reply.send(session.start_round());
        }
        SessionEvent::NextRound { reply } => {
            let _ = reply.send(session.next_round());
        }
        SessionEvent::EndRound { reply } => {
            let _ = reply.send(session.end_round());
        }
        SessionEvent::SwapStartingPlayer { reply } => {
            let _ = reply.send(session.swap_starting_player());
        }
        SessionEvent::Snapshot { reply } => {
            let _ = reply.send(session.snapshot());
        }
    }
}
