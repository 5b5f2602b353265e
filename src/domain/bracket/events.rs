//! Event constructors for bracket progression.

use serde_json::json;

use crate::domain::foundation::{DomainEvent, EventKind};

use super::Bracket;

/// Bracket structure or progression changed.
///
/// Carries the full node list; clients re-render from it instead of
/// patching. Everything in it is an opaque identifier.
pub fn bracket_updated(bracket: &Bracket) -> DomainEvent {
    let nodes: Vec<_> = bracket
        .nodes
        .iter()
        .map(|node| {
            json!({
                "round": node.round,
                "position": node.position,
                "slots": node.slots,
                "match_id": node.match_id,
                "decided": node.decided,
            })
        })
        .collect();

    DomainEvent::for_tournament(
        EventKind::BracketUpdated,
        bracket.tournament_id,
        json!({
            "tournament_id": bracket.tournament_id,
            "rounds": bracket.rounds,
            "participant_count": bracket.participant_count,
            "nodes": nodes,
        }),
    )
}
