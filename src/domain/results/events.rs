//! Event constructor for the terminal tournament event.

use serde_json::json;

use crate::domain::foundation::{DomainEvent, EventKind};

use super::TournamentResult;

/// The tournament result was determined. Terminal for the tournament room.
pub fn tournament_completed(result: &TournamentResult) -> DomainEvent {
    DomainEvent::for_tournament(
        EventKind::TournamentCompleted,
        result.tournament_id,
        json!({
            "tournament_id": result.tournament_id,
            "winner": result.winner,
            "runner_up": result.runner_up,
            "third_place": result.third_place,
            "requires_review": result.requires_review,
            "determined_at": result.determined_at.to_rfc3339(),
        }),
    )
}
