//! Determination errors.

use thiserror::Error;

use crate::domain::foundation::{MatchId, ParticipantId, ValidationError};

/// Errors raised while determining final placements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeterminationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The bracket still has undecided nodes; determination must wait.
    #[error("bracket still has {open} undecided node(s)")]
    Incomplete { open: usize },

    /// A bracket node references a match that was never stored.
    #[error("match {match_id} is referenced by the bracket but has no record")]
    MissingRecord { match_id: MatchId },

    /// Every cascade rule came back inconclusive. No result is persisted;
    /// an organizer has to settle the placement by hand.
    #[error("tie-break cascade exhausted between {first} and {second}")]
    TieBreakUnresolved {
        first: ParticipantId,
        second: ParticipantId,
    },
}
