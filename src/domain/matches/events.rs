//! Event constructors for match lifecycle transitions.
//!
//! Payloads carry opaque identifiers and scores only. Builders take the
//! aggregate after the transition committed, so the payload always reflects
//! persisted state.

use serde_json::json;

use crate::domain::foundation::{DomainEvent, EventKind};

use super::{Match, MatchScore};

/// A bracket node filled and this match became playable.
pub fn match_ready(m: &Match) -> DomainEvent {
    DomainEvent::for_match(
        EventKind::MatchReady,
        m.tournament_id,
        m.id,
        json!({
            "match_id": m.id,
            "round": m.round,
            "ordinal": m.ordinal,
            "home": m.home,
            "away": m.away,
            "scheduled_at": m.scheduled_at.map(|t| t.to_rfc3339()),
        }),
    )
}

/// The match moved to `Live`.
pub fn match_started(m: &Match) -> DomainEvent {
    DomainEvent::for_match(
        EventKind::MatchStarted,
        m.tournament_id,
        m.id,
        json!({
            "match_id": m.id,
            "round": m.round,
            "home": m.home,
            "away": m.away,
            "started_at": m.started_at.map(|t| t.to_rfc3339()),
        }),
    )
}

/// Running score changed during live play.
pub fn score_updated(m: &Match, score: MatchScore) -> DomainEvent {
    DomainEvent::for_match(
        EventKind::ScoreUpdated,
        m.tournament_id,
        m.id,
        json!({
            "match_id": m.id,
            "home": m.home,
            "away": m.away,
            "home_score": score.home,
            "away_score": score.away,
        }),
    )
}

/// The match reached a terminal state (completed, forfeit, or cancelled).
/// A cancelled match carries no winner; the bracket layer decides what,
/// if anything, the cancellation settles.
pub fn match_completed(m: &Match) -> DomainEvent {
    DomainEvent::for_match(
        EventKind::MatchCompleted,
        m.tournament_id,
        m.id,
        json!({
            "match_id": m.id,
            "state": m.state,
            "winner": m.winner,
            "loser": m.loser,
            "home_score": m.score.map(|s| s.home),
            "away_score": m.score.map(|s| s.away),
            "completed_at": m.completed_at.map(|t| t.to_rfc3339()),
        }),
    )
}
