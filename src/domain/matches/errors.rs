//! Match lifecycle errors.

use thiserror::Error;

use crate::domain::foundation::{ConflictError, MatchId, ValidationError};

/// Errors raised by match lifecycle operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    /// The caller is not one of the two participants of this match.
    #[error("caller is not a participant of match {match_id}")]
    NotParticipant { match_id: MatchId },

    /// A result was submitted or confirmed with equal scores while the
    /// tournament's tie policy does not permit ties.
    #[error("tied result is not permitted for match {match_id}")]
    TieNotAllowed { match_id: MatchId },

    /// The reporter tried to confirm their own submitted result.
    #[error("a submitted result must be confirmed by the opponent or an organizer")]
    SelfConfirmation,

    /// Both sides must check in before the match can start.
    #[error("match {match_id} cannot start: not all participants checked in")]
    CheckInIncomplete { match_id: MatchId },

    /// The match record was tombstoned and accepts no further writes.
    #[error("match {match_id} is tombstoned")]
    Tombstoned { match_id: MatchId },
}
