//! Bracket errors.

use thiserror::Error;

use crate::domain::foundation::{MatchId, ValidationError};

/// Errors raised by bracket generation and progression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BracketError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A bracket needs at least two participants.
    #[error("a bracket requires at least 2 participants, got {actual}")]
    TooFewParticipants { actual: usize },

    /// Regeneration was requested after the tournament started.
    #[error("bracket cannot be regenerated after the tournament has started")]
    AlreadyStarted,

    /// A completion event referenced a match no bracket node owns.
    #[error("match {match_id} does not belong to any bracket node")]
    UnknownMatch { match_id: MatchId },

    /// A node received a second decision.
    #[error("bracket node {index} is already decided")]
    NodeAlreadyDecided { index: usize },
}
