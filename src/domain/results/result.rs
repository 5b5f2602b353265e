//! The persisted tournament result.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ParticipantId, Timestamp, TournamentId};

use super::{TieBreakAudit, TieBreakRule};

/// How the winner placement was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeterminationMethod {
    /// The final match produced the winner directly.
    FinalMatch,
    /// The final could not decide (for example a cancelled final); the
    /// named cascade rule settled it.
    TieBreak(TieBreakRule),
}

/// Final placements for one tournament.
///
/// Written exactly once per tournament; the result repository enforces
/// idempotency on `tournament_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentResult {
    pub tournament_id: TournamentId,
    pub winner: ParticipantId,
    pub runner_up: ParticipantId,
    /// Absent for two-participant tournaments and when no semifinal loser
    /// exists.
    pub third_place: Option<ParticipantId>,
    pub method: DeterminationMethod,
    /// Every tie-break rule consulted, in order, across all placements.
    pub audit: Vec<TieBreakAudit>,
    /// Set when half or more of the matches on the winner's path were
    /// forfeits; the result stands but is flagged for organizer review.
    pub requires_review: bool,
    pub determined_at: Timestamp,
}
