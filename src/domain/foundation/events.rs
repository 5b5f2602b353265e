//! Domain events emitted by the controllers.
//!
//! Events are a closed tagged union: the broadcaster dispatches on
//! `EventKind` with an exhaustive `match`, never on string lookup. Every
//! event names its debounce subject (the room it primarily belongs to) so
//! the broadcast layer can coalesce high-frequency updates and sequence
//! deliveries per subject.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use uuid::Uuid;

use super::{MatchId, RoomId, Timestamp, TournamentId};

/// Unique identifier for one event instance, used for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

impl EventId {
    /// Creates a new random event ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The closed set of event kinds this core emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A bracket node filled and its match became playable.
    MatchReady,
    /// A match moved to `Live`.
    MatchStarted,
    /// Running score changed during a live match. High-frequency; the
    /// broadcaster coalesces these per match.
    ScoreUpdated,
    /// A match reached a terminal decided state (completed or forfeit).
    MatchCompleted,
    /// Bracket structure or progression changed.
    BracketUpdated,
    /// A participant contested a pending result.
    DisputeCreated,
    /// The tournament result was determined.
    TournamentCompleted,
}

impl EventKind {
    /// Returns the wire type string for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::MatchReady => "match_ready",
            EventKind::MatchStarted => "match_started",
            EventKind::ScoreUpdated => "score_updated",
            EventKind::MatchCompleted => "match_completed",
            EventKind::BracketUpdated => "bracket_updated",
            EventKind::DisputeCreated => "dispute_created",
            EventKind::TournamentCompleted => "tournament_completed",
        }
    }

    /// High-frequency kinds that the broadcaster may coalesce within a
    /// debounce window, delivering only the latest payload.
    pub fn is_coalescable(&self) -> bool {
        matches!(self, EventKind::ScoreUpdated)
    }

    /// Terminal kinds for their subject. These bypass debouncing, flush
    /// immediately, and cancel any pending coalesced delivery.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EventKind::MatchCompleted | EventKind::TournamentCompleted
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One domain event, ready for fan-out.
///
/// `subject` identifies the debounce/sequencing subject. Match-scoped
/// events are delivered to both the match room and the owning tournament
/// room; tournament-scoped events go to the tournament room only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub event_id: EventId,
    pub kind: EventKind,
    pub tournament_id: TournamentId,
    pub subject: RoomId,
    pub occurred_at: Timestamp,
    /// Event payload. Carries opaque identifiers only, never PII.
    pub payload: JsonValue,
}

impl DomainEvent {
    /// Creates a match-scoped event.
    pub fn for_match(
        kind: EventKind,
        tournament_id: TournamentId,
        match_id: MatchId,
        payload: JsonValue,
    ) -> Self {
        Self {
            event_id: EventId::new(),
            kind,
            tournament_id,
            subject: RoomId::Match(match_id),
            occurred_at: Timestamp::now(),
            payload,
        }
    }

    /// Creates a tournament-scoped event.
    pub fn for_tournament(
        kind: EventKind,
        tournament_id: TournamentId,
        payload: JsonValue,
    ) -> Self {
        Self {
            event_id: EventId::new(),
            kind,
            tournament_id,
            subject: RoomId::Tournament(tournament_id),
            occurred_at: Timestamp::now(),
            payload,
        }
    }

    /// Rooms this event should be delivered to.
    pub fn rooms(&self) -> Vec<RoomId> {
        match self.subject {
            RoomId::Match(_) => vec![self.subject, RoomId::Tournament(self.tournament_id)],
            RoomId::Tournament(_) => vec![self.subject],
        }
    }
}
