//! Event constructors for the dispute workflow.
//!
//! Only the fact of the dispute is broadcast. The free-text detail and
//! evidence references stay on the record and never reach a room.

use serde_json::json;

use crate::domain::foundation::{DomainEvent, EventKind};

use super::Dispute;

/// A participant contested a pending result.
pub fn dispute_created(d: &Dispute) -> DomainEvent {
    DomainEvent::for_match(
        EventKind::DisputeCreated,
        d.tournament_id,
        d.match_id,
        json!({
            "dispute_id": d.id,
            "match_id": d.match_id,
            "reason": d.reason,
            "opened_at": d.opened_at.to_rfc3339(),
        }),
    )
}
