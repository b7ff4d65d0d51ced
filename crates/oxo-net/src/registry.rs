//! Session bookkeeping for connected clients.
//!
//! The registry owns every live [`Session`], keyed by connection identity.
//! Entries live in a sharded map, so operations on the same identity
//! serialize on its entry while different identities proceed independently.

use dashmap::DashMap;

use oxo_game::{Coord, GameSnapshot, Session, Strategy};

use crate::server::ConnectionId;

/// The `ConnectionId -> Session` association for one server.
///
/// Owned by [`GameServer`](crate::server::GameServer) and shared with every
/// connection handler; tests can inject their own via
/// [`GameServer::with_registry`](crate::server::GameServer::with_registry).
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<ConnectionId, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a fresh game for `id`, discarding any session that identity
    /// already had. Always succeeds; returns the snapshot to push.
    pub fn start_game(&self, id: ConnectionId, strategy: Strategy) -> GameSnapshot {
        let session = Session::new(strategy);
        let snapshot = session.snapshot();
        self.sessions.insert(id, session);
        snapshot
    }

    /// Apply a human move for `id`.
    ///
    /// Returns the snapshot to push, or `None` when there is nothing to say:
    /// no session exists for this identity, or the session ignored the
    /// request. The stored session is replaced only on `Some`; the entry
    /// guard is held across the transition, so concurrent calls for one
    /// identity serialize.
    pub fn apply_move(&self, id: ConnectionId, at: Coord) -> Option<GameSnapshot> {
        let mut entry = self.sessions.get_mut(&id)?;
        let next = entry.advance(at)?;
        let snapshot = next.snapshot();
        *entry = next;
        Some(snapshot)
    }

    /// The current snapshot for `id`, if a session exists.
    pub fn snapshot(&self, id: ConnectionId) -> Option<GameSnapshot> {
        self.sessions.get(&id).map(|session| session.snapshot())
    }

    /// Drop the session for `id`. Idempotent; returns whether one existed.
    pub fn end(&self, id: ConnectionId) -> bool {
        self.sessions.remove(&id).is_some()
    }

    /// Whether `id` currently has a session.
    pub fn contains(&self, id: ConnectionId) -> bool {
        self.sessions.contains_key(&id)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use oxo_game::{GameStatus, Mark};

    const ALICE: ConnectionId = ConnectionId(1);
    const BOB: ConnectionId = ConnectionId(2);

    #[test]
    fn test_start_game_creates_a_playing_session() {
        let registry = SessionRegistry::new();
        assert!(registry.is_empty());

        let snapshot = registry.start_game(ALICE, Strategy::RuleBased);
        assert_eq!(snapshot.status, GameStatus::Playing);
        assert_eq!(snapshot.current_player, Mark::X);
        assert!(registry.contains(ALICE));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_start_game_discards_the_previous_session() {
        let registry = SessionRegistry::new();
        registry.start_game(ALICE, Strategy::RuleBased);
        registry
            .apply_move(ALICE, Coord::new(0, 0))
            .expect("move accepted");

        let snapshot = registry.start_game(ALICE, Strategy::RuleBased);
        assert_eq!(snapshot.board.empty_cells().len(), 9, "board starts empty");
        assert_eq!(registry.len(), 1, "replacement, not accumulation");
    }

    #[test]
    fn test_apply_move_without_a_session_is_ignored() {
        let registry = SessionRegistry::new();
        assert_eq!(registry.apply_move(ALICE, Coord::new(0, 0)), None);
        assert!(!registry.contains(ALICE));
    }

    #[test]
    fn test_apply_move_stores_the_successor_state() {
        let registry = SessionRegistry::new();
        registry.start_game(ALICE, Strategy::RuleBased);

        let pushed = registry
            .apply_move(ALICE, Coord::new(0, 0))
            .expect("move accepted");
        assert_eq!(pushed.board.get(Coord::new(0, 0)), Some(Mark::X));
        assert_eq!(pushed.board.get(Coord::new(1, 1)), Some(Mark::O));

        let stored = registry.snapshot(ALICE).expect("session exists");
        assert_eq!(stored, pushed, "stored state matches the pushed snapshot");
    }

    #[test]
    fn test_ignored_move_leaves_the_session_untouched() {
        let registry = SessionRegistry::new();
        registry.start_game(ALICE, Strategy::RuleBased);
        let before = registry
            .apply_move(ALICE, Coord::new(0, 0))
            .expect("move accepted");

        // Same cell again: occupied, so no push and no change.
        assert_eq!(registry.apply_move(ALICE, Coord::new(0, 0)), None);
        assert_eq!(registry.snapshot(ALICE), Some(before));
    }

    #[test]
    fn test_end_is_idempotent() {
        let registry = SessionRegistry::new();
        registry.start_game(ALICE, Strategy::RuleBased);

        assert!(registry.end(ALICE));
        assert!(!registry.end(ALICE));
        assert_eq!(registry.apply_move(ALICE, Coord::new(0, 0)), None);
    }

    #[test]
    fn test_identities_are_independent() {
        let registry = SessionRegistry::new();
        registry.start_game(ALICE, Strategy::RuleBased);
        registry.start_game(BOB, Strategy::Random);

        registry
            .apply_move(ALICE, Coord::new(2, 2))
            .expect("move accepted");
        let bob = registry.snapshot(BOB).expect("session exists");
        assert_eq!(
            bob.board.empty_cells().len(),
            9,
            "one player's moves never touch another's board"
        );

        registry.end(ALICE);
        assert!(!registry.contains(ALICE));
        assert!(registry.contains(BOB));
    }
}
