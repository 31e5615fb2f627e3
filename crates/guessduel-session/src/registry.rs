//! The registry: every named connection, its opponent, and its room.
//!
//! This is the central piece of the session layer. It's responsible for:
//! - Recording nicknames once the handshake completes
//! - Holding at most one connection in the waiting slot
//! - Pairing the waiter with the next arrival into a fresh [`Room`]
//! - Routing messages to a connection or its opponent
//! - Tearing down both directions of a pairing in one step
//!
//! # Concurrency note
//!
//! `Registry` is NOT thread-safe by itself; it uses plain `HashMap`s.
//! The server keeps it behind a single `tokio::sync::Mutex`, and every
//! method here is a compound read-modify-write that completes under
//! that one lock. That is what makes [`pair`](Registry::pair) atomic:
//! of two connections arriving together, only one can see an empty
//! waiting slot.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use guessduel_protocol::ServerMessage;
use guessduel_room::{Room, RoomConfig, RoomId};
use guessduel_transport::ConnectionId;

use crate::{Outbound, PeerSender, SessionError};

/// Counter for generating unique room IDs.
static NEXT_ROOM_ID: AtomicU64 = AtomicU64::new(1);

/// What [`Registry::pair`] did with a connection.
#[derive(Debug, Clone)]
pub enum PairOutcome {
    /// Nobody was waiting; this connection now holds the waiting slot.
    Waiting,
    /// Matched with the connection that was waiting.
    PairedWith {
        opponent: ConnectionId,
        room: Arc<Room>,
    },
}

/// A named connection and the channel that reaches its session.
#[derive(Debug)]
struct Peer {
    nickname: String,
    outbox: PeerSender,
}

/// Process-wide record of named connections and their pairings.
///
/// ## Invariants
///
/// - `opponents` is symmetric: if A ↦ B then B ↦ A.
/// - Both members of a pair map to the same `Arc<Room>` in `rooms`.
/// - A connection is either in the waiting slot or in `opponents`,
///   never both.
pub struct Registry {
    /// Named connections, keyed by connection ID.
    peers: HashMap<ConnectionId, Peer>,

    /// Who each paired connection is playing against.
    opponents: HashMap<ConnectionId, ConnectionId>,

    /// The room each paired connection is playing in.
    rooms: HashMap<ConnectionId, Arc<Room>>,

    /// The single unpaired connection, if any.
    waiting: Option<ConnectionId>,

    /// Bounds for every room this registry creates.
    room_config: RoomConfig,
}

impl Registry {
    /// Creates an empty registry whose rooms use `room_config`.
    pub fn new(room_config: RoomConfig) -> Self {
        Self {
            peers: HashMap::new(),
            opponents: HashMap::new(),
            rooms: HashMap::new(),
            waiting: None,
            room_config,
        }
    }

    /// Records a connection's nickname and outbox after its handshake.
    ///
    /// # Errors
    /// [`SessionError::AlreadyRegistered`] if the connection already has
    /// a nickname. Nicknames never change once set.
    pub fn record_name(
        &mut self,
        conn: ConnectionId,
        nickname: String,
        outbox: PeerSender,
    ) -> Result<(), SessionError> {
        if self.peers.contains_key(&conn) {
            return Err(SessionError::AlreadyRegistered(conn));
        }
        tracing::debug!(%conn, %nickname, "nickname recorded");
        self.peers.insert(conn, Peer { nickname, outbox });
        Ok(())
    }

    /// Puts a connection in the waiting slot, or pairs it with whoever
    /// is already there.
    ///
    /// On a match this creates the room, records both directions of the
    /// pairing, and pushes [`Outbound::Paired`] to the waiter's outbox.
    /// The caller then owns the setup exchange (nicknames, bounds, start)
    /// for both sides.
    ///
    /// A waiter whose session already dropped its outbox is discarded
    /// rather than paired, so a new arrival never lands in a dead room.
    ///
    /// # Errors
    /// - [`SessionError::NotRegistered`] — no nickname recorded yet
    /// - [`SessionError::AlreadyMatched`] — already waiting or paired
    pub fn pair(
        &mut self,
        conn: ConnectionId,
    ) -> Result<PairOutcome, SessionError> {
        if !self.peers.contains_key(&conn) {
            return Err(SessionError::NotRegistered(conn));
        }
        if self.is_matched(conn) {
            return Err(SessionError::AlreadyMatched(conn));
        }

        let waiter = match self.waiting.take() {
            Some(waiter) if self.is_reachable(waiter) => waiter,
            stale => {
                if let Some(stale) = stale {
                    tracing::debug!(%stale, "discarding closed waiter");
                }
                self.waiting = Some(conn);
                tracing::info!(%conn, "waiting for an opponent");
                return Ok(PairOutcome::Waiting);
            }
        };

        let room_id = RoomId(NEXT_ROOM_ID.fetch_add(1, Ordering::Relaxed));
        let room = Arc::new(Room::new(room_id, self.room_config));
        self.record_opponent_pair(waiter, conn, Arc::clone(&room))?;

        if let Some(peer) = self.peers.get(&waiter) {
            let _ = peer.outbox.send(Outbound::Paired {
                opponent: conn,
                room: Arc::clone(&room),
            });
        }

        tracing::info!(%room_id, first = %waiter, second = %conn, "room created");
        Ok(PairOutcome::PairedWith {
            opponent: waiter,
            room,
        })
    }

    /// Records `a` and `b` as opponents sharing `room`, both directions
    /// at once.
    ///
    /// # Errors
    /// - [`SessionError::SelfPairing`] — `a == b`
    /// - [`SessionError::NotRegistered`] — either side has no nickname
    /// - [`SessionError::AlreadyMatched`] — either side is waiting or paired
    pub fn record_opponent_pair(
        &mut self,
        a: ConnectionId,
        b: ConnectionId,
        room: Arc<Room>,
    ) -> Result<(), SessionError> {
        if a == b {
            return Err(SessionError::SelfPairing(a));
        }
        for conn in [a, b] {
            if !self.peers.contains_key(&conn) {
                return Err(SessionError::NotRegistered(conn));
            }
            if self.is_matched(conn) {
                return Err(SessionError::AlreadyMatched(conn));
            }
        }

        self.opponents.insert(a, b);
        self.opponents.insert(b, a);
        self.rooms.insert(a, Arc::clone(&room));
        self.rooms.insert(b, room);
        Ok(())
    }

    /// Returns the connection's nickname.
    pub fn lookup_name(&self, conn: ConnectionId) -> Option<&str> {
        self.peers.get(&conn).map(|p| p.nickname.as_str())
    }

    /// Returns the connection's opponent, if paired.
    pub fn lookup_opponent(&self, conn: ConnectionId) -> Option<ConnectionId> {
        self.opponents.get(&conn).copied()
    }

    /// Returns the room the connection is playing in, if paired.
    pub fn lookup_room(&self, conn: ConnectionId) -> Option<Arc<Room>> {
        self.rooms.get(&conn).cloned()
    }

    /// Queues a message on a connection's outbox.
    ///
    /// Returns `false` if the connection is gone. Delivery failures are
    /// never errors here: the target's own session notices the dead
    /// socket and tears itself down.
    pub fn send(&self, conn: ConnectionId, msg: ServerMessage) -> bool {
        match self.peers.get(&conn) {
            Some(peer) => peer.outbox.send(Outbound::Message(msg)).is_ok(),
            None => false,
        }
    }

    /// Queues a message for the connection's opponent.
    ///
    /// Returns `false` if there is no opponent (never paired, or the
    /// pairing was already torn down).
    pub fn send_to_opponent(&self, conn: ConnectionId, msg: ServerMessage) -> bool {
        match self.lookup_opponent(conn) {
            Some(opponent) => self.send(opponent, msg),
            None => false,
        }
    }

    /// Removes every entry touching `conn`, plus the opponent's mirrored
    /// pairing and room entries.
    ///
    /// Returns the former opponent so the caller can tell it, under the
    /// same lock, that its partner left. Idempotent: a second call finds
    /// nothing and returns `None`.
    pub fn remove_all(&mut self, conn: ConnectionId) -> Option<ConnectionId> {
        let removed = self.peers.remove(&conn);
        if self.waiting == Some(conn) {
            self.waiting = None;
        }
        self.rooms.remove(&conn);

        let opponent = self.opponents.remove(&conn);
        if let Some(opponent) = opponent {
            if self.opponents.get(&opponent) == Some(&conn) {
                self.opponents.remove(&opponent);
                self.rooms.remove(&opponent);
            }
        }

        if let Some(peer) = removed {
            tracing::debug!(%conn, nickname = %peer.nickname, "registry entries removed");
        }
        opponent
    }

    /// The connection holding the waiting slot, if any.
    pub fn waiting(&self) -> Option<ConnectionId> {
        self.waiting
    }

    /// Number of named connections.
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Returns `true` if no connection is registered.
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Number of live pairings.
    pub fn room_count(&self) -> usize {
        self.opponents.len() / 2
    }

    fn is_matched(&self, conn: ConnectionId) -> bool {
        self.waiting == Some(conn) || self.opponents.contains_key(&conn)
    }

    fn is_reachable(&self, conn: ConnectionId) -> bool {
        self.peers
            .get(&conn)
            .is_some_and(|p| !p.outbox.is_closed())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}

// =========================================================================
// Tests
// =========================================================================
