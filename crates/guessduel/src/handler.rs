//! Per-connection handler: nickname handshake, pairing, and the guess loop.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Prompt for a nickname until a usable one arrives (or time runs out)
//!   2. Register it and take the waiting slot or pair with the waiter
//!   3. Exchange setup messages and play until someone wins or leaves
//!   4. Tear down: drop registry entries and tell the opponent
//!
//! Sessions never touch each other's sockets. Anything meant for the
//! opponent goes through the registry onto the opponent's outbox, and
//! the opponent's own task writes it out.

use std::fmt;
use std::ops::ControlFlow;
use std::sync::Arc;

use guessduel_protocol::{ClientMessage, Codec, ProtocolError, ServerMessage};
use guessduel_room::{GuessOutcome, Room};
use guessduel_session::{
    Outbound, PairOutcome, PeerReceiver, PeerSender, Registry, SessionState,
    normalize_nickname,
};
use guessduel_transport::{Connection, ConnectionId, TcpConnection};
use tokio::sync::mpsc;

use crate::GuessDuelError;
use crate::server::ServerState;

/// Why a session ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    /// The peer closed its end of the stream.
    PeerClosed,
    /// The peer sent `leave`.
    Left,
    /// No usable nickname before the handshake deadline.
    HandshakeTimedOut,
    /// This player guessed the secret.
    Won,
    /// The opponent's session ended.
    OpponentExited,
    /// Every sender for our outbox is gone.
    OutboxClosed,
}

impl fmt::Display for Exit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PeerClosed => write!(f, "peer closed"),
            Self::Left => write!(f, "left"),
            Self::HandshakeTimedOut => write!(f, "handshake timed out"),
            Self::Won => write!(f, "won"),
            Self::OpponentExited => write!(f, "opponent exited"),
            Self::OutboxClosed => write!(f, "outbox closed"),
        }
    }
}

/// Removes `conn` from the registry and tells its opponent, if any.
fn release(registry: &mut Registry, conn: ConnectionId) {
    if let Some(opponent) = registry.remove_all(conn) {
        registry.send(opponent, ServerMessage::OpponentExited);
        tracing::info!(%conn, %opponent, "opponent notified of exit");
    }
}

/// One connection's state machine.
///
/// Dropping a `Session` that never reached [`teardown`](Self::teardown)
/// (the handler panicked, or its task was cancelled) still releases the
/// registry entries. `Drop` is synchronous, so that path spawns a
/// fire-and-forget task for the async lock.
struct Session<'a, C: Codec> {
    conn: &'a TcpConnection,
    state: Arc<ServerState<C>>,
    id: ConnectionId,
    phase: SessionState,
    nickname: String,
    room: Option<Arc<Room>>,
    decode_failures: u32,
    torn_down: bool,
}

impl<C: Codec> Drop for Session<'_, C> {
    fn drop(&mut self) {
        if self.torn_down {
            return;
        }
        let id = self.id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut registry = state.registry.lock().await;
            release(&mut registry, id);
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: TcpConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), GuessDuelError> {
    let conn_id = conn.id();
    tracing::info!(%conn_id, peer = %conn.peer_addr(), "connection accepted");

    let (outbox_tx, mut outbox) = mpsc::unbounded_channel();
    let mut session = Session::new(&conn, state);

    let result = session.drive(outbox_tx, &mut outbox).await;
    session.teardown().await;

    let exit = result?;
    tracing::info!(%conn_id, %exit, "session ended");
    Ok(())
}

impl<'a, C: Codec> Session<'a, C> {
    fn new(conn: &'a TcpConnection, state: Arc<ServerState<C>>) -> Self {
        Self {
            id: conn.id(),
            conn,
            state,
            phase: SessionState::AwaitingNickname,
            nickname: String::new(),
            room: None,
            decode_failures: 0,
            torn_down: false,
        }
    }

    /// Runs the session until it ends for any reason.
    async fn drive(
        &mut self,
        outbox_tx: PeerSender,
        outbox: &mut PeerReceiver,
    ) -> Result<Exit, GuessDuelError> {
        // --- Step 1: Nickname ---
        let deadline = self.state.config.handshake_timeout;
        let nickname = match tokio::time::timeout(deadline, self.await_nickname()).await {
            Ok(result) => match result? {
                ControlFlow::Continue(name) => name,
                ControlFlow::Break(exit) => return Ok(exit),
            },
            Err(_) => return Ok(Exit::HandshakeTimedOut),
        };
        tracing::info!(conn_id = %self.id, %nickname, "nickname accepted");
        self.nickname = nickname;

        // --- Step 2: Matchmaking ---
        let outcome = {
            let mut registry = self.state.registry.lock().await;
            registry.record_name(self.id, self.nickname.clone(), outbox_tx)?;
            registry.pair(self.id)?
        };

        let room = match outcome {
            PairOutcome::Waiting => {
                self.transition(SessionState::Waiting);
                match self.await_opponent(outbox).await? {
                    ControlFlow::Continue(room) => {
                        self.transition(SessionState::Paired);
                        room
                    }
                    ControlFlow::Break(exit) => return Ok(exit),
                }
            }
            PairOutcome::PairedWith { opponent, room } => {
                self.transition(SessionState::Paired);
                self.start_game(opponent, &room).await?;
                room
            }
        };
        self.room = Some(Arc::clone(&room));

        // --- Step 3: Play ---
        self.transition(SessionState::Playing);
        self.play(&room, outbox).await
    }

    /// Prompts until the peer sends a usable nickname.
    ///
    /// Every ignored message or rejected name gets a fresh prompt.
    async fn await_nickname(&mut self) -> Result<ControlFlow<Exit, String>, GuessDuelError> {
        loop {
            self.send(&ServerMessage::RequestNickname).await?;
            match self.recv().await? {
                None => return Ok(ControlFlow::Break(Exit::PeerClosed)),
                Some(ClientMessage::Leave) => return Ok(ControlFlow::Break(Exit::Left)),
                Some(ClientMessage::SendNickname(raw)) => match normalize_nickname(&raw) {
                    Some(name) => return Ok(ControlFlow::Continue(name)),
                    None => tracing::debug!(conn_id = %self.id, "rejected unusable nickname"),
                },
                Some(other) => tracing::debug!(
                    conn_id = %self.id,
                    tag = other.tag(),
                    "ignoring message before nickname"
                ),
            }
        }
    }

    /// Sits in the waiting slot until the registry pairs us.
    ///
    /// The pairing connection queues our setup messages right after the
    /// `Paired` notice, so they are written once the play loop starts.
    async fn await_opponent(
        &mut self,
        outbox: &mut PeerReceiver,
    ) -> Result<ControlFlow<Exit, Arc<Room>>, GuessDuelError> {
        loop {
            tokio::select! {
                biased;
                outbound = outbox.recv() => match outbound {
                    Some(Outbound::Paired { opponent, room }) => {
                        tracing::info!(conn_id = %self.id, %opponent, room_id = %room.id(), "paired");
                        return Ok(ControlFlow::Continue(room));
                    }
                    Some(Outbound::Message(msg)) => self.send(&msg).await?,
                    None => return Ok(ControlFlow::Break(Exit::OutboxClosed)),
                },
                inbound = self.recv() => match inbound? {
                    None => return Ok(ControlFlow::Break(Exit::PeerClosed)),
                    Some(ClientMessage::Leave) => return Ok(ControlFlow::Break(Exit::Left)),
                    Some(other) => tracing::debug!(
                        conn_id = %self.id,
                        tag = other.tag(),
                        "ignoring message while waiting"
                    ),
                },
            }
        }
    }

    /// Sends the game setup to both players.
    ///
    /// Called by the later arrival. The opponent's copy is queued on its
    /// outbox under the registry lock; ours is written directly.
    async fn start_game(&mut self, opponent: ConnectionId, room: &Room) -> Result<(), GuessDuelError> {
        let opponent_name = {
            let registry = self.state.registry.lock().await;
            for msg in self.setup_messages(room, &self.nickname) {
                registry.send(opponent, msg);
            }
            registry.lookup_name(opponent).map(str::to_owned)
        };

        // A missing name means the opponent already tore down, and its
        // teardown queued `opponent_exited` for us.
        if let Some(name) = opponent_name {
            for msg in self.setup_messages(room, &name) {
                self.send(&msg).await?;
            }
        }
        tracing::info!(conn_id = %self.id, %opponent, room_id = %room.id(), "game started");
        Ok(())
    }

    /// Opponent identity, bounds, optional reveal, then start.
    fn setup_messages(&self, room: &Room, opponent_name: &str) -> Vec<ServerMessage> {
        let bounds = room.config();
        let mut messages = vec![
            ServerMessage::OpponentIdentified(opponent_name.to_string()),
            ServerMessage::GameBounds(bounds.lower_bound(), bounds.upper_bound()),
        ];
        if self.state.config.reveal_secret_on_start {
            messages.push(ServerMessage::CorrectNumberReveal(room.secret()));
        }
        messages.push(ServerMessage::GameStart);
        messages
    }

    /// The guess loop.
    async fn play(&mut self, room: &Room, outbox: &mut PeerReceiver) -> Result<Exit, GuessDuelError> {
        loop {
            tokio::select! {
                biased;
                outbound = outbox.recv() => match outbound {
                    Some(Outbound::Message(msg)) => {
                        let exited = msg == ServerMessage::OpponentExited;
                        self.send(&msg).await?;
                        if exited {
                            return Ok(Exit::OpponentExited);
                        }
                    }
                    Some(Outbound::Paired { .. }) => {
                        tracing::warn!(conn_id = %self.id, "pairing notice while playing, ignoring");
                    }
                    None => return Ok(Exit::OutboxClosed),
                },
                inbound = self.recv() => {
                    let Some(msg) = inbound? else {
                        return Ok(Exit::PeerClosed);
                    };
                    if let ControlFlow::Break(exit) = self.handle_play_message(room, msg).await? {
                        return Ok(exit);
                    }
                }
            }
        }
    }

    async fn handle_play_message(
        &mut self,
        room: &Room,
        msg: ClientMessage,
    ) -> Result<ControlFlow<Exit>, GuessDuelError> {
        match msg {
            ClientMessage::SubmitGuess(Some(guess)) => match room.evaluate(guess) {
                GuessOutcome::TooLow => self.send(&ServerMessage::GuessTooLow).await?,
                GuessOutcome::TooHigh => self.send(&ServerMessage::GuessTooHigh).await?,
                GuessOutcome::AlreadyOver => {
                    tracing::debug!(conn_id = %self.id, guess, "room over, discarding guess");
                }
                GuessOutcome::Correct => {
                    self.announce_win(room).await?;
                    return Ok(ControlFlow::Break(Exit::Won));
                }
            },
            ClientMessage::SubmitGuess(None) => {
                tracing::debug!(conn_id = %self.id, "ignoring non-integer guess");
            }
            ClientMessage::Leave => return Ok(ControlFlow::Break(Exit::Left)),
            ClientMessage::SendNickname(_) => {
                tracing::debug!(conn_id = %self.id, "ignoring nickname while playing");
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Tells both players who won. The loser also learns the secret.
    async fn announce_win(&mut self, room: &Room) -> Result<(), GuessDuelError> {
        let winner = ServerMessage::WinnerAnnounced(self.nickname.clone());
        {
            let registry = self.state.registry.lock().await;
            registry.send_to_opponent(self.id, winner.clone());
            registry.send_to_opponent(self.id, ServerMessage::CorrectNumberReveal(room.secret()));
        }
        self.send(&ServerMessage::GuessValid).await?;
        self.send(&winner).await?;
        tracing::info!(conn_id = %self.id, room_id = %room.id(), nickname = %self.nickname, "game won");
        Ok(())
    }

    /// Releases registry entries and closes the socket. Idempotent.
    async fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        let was_paired = self.phase.is_paired();
        self.transition(SessionState::Terminated);
        {
            let mut registry = self.state.registry.lock().await;
            release(&mut registry, self.id);
        }
        if let Err(e) = self.conn.close().await {
            tracing::debug!(conn_id = %self.id, error = %e, "close failed");
        }
        tracing::debug!(
            conn_id = %self.id,
            room_id = ?self.room.as_ref().map(|room| room.id()),
            was_paired,
            "session torn down"
        );
    }

    fn transition(&mut self, next: SessionState) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "invalid transition {} -> {next}",
            self.phase
        );
        tracing::debug!(conn_id = %self.id, from = %self.phase, to = %next, "session transition");
        self.phase = next;
    }

    async fn send(&self, msg: &ServerMessage) -> Result<(), GuessDuelError> {
        let bytes = self.state.codec.encode(msg)?;
        self.conn.send(&bytes).await?;
        Ok(())
    }

    /// Reads frames until one decodes. `Ok(None)` means the peer closed.
    ///
    /// A successful decode resets the failure count. The failure that
    /// reaches `max_decode_failures` ends the session.
    async fn recv(&mut self) -> Result<Option<ClientMessage>, GuessDuelError> {
        loop {
            let Some(frame) = self.conn.recv().await? else {
                return Ok(None);
            };
            match self.state.codec.decode::<ClientMessage>(&frame) {
                Ok(msg) => {
                    self.decode_failures = 0;
                    return Ok(Some(msg));
                }
                Err(e) => {
                    self.decode_failures += 1;
                    tracing::debug!(
                        conn_id = %self.id,
                        error = %e,
                        failures = self.decode_failures,
                        "failed to decode message"
                    );
                    if self.decode_failures >= self.state.config.max_decode_failures {
                        return Err(ProtocolError::TooManyMalformed(self.decode_failures).into());
                    }
                }
            }
        }
    }
}
