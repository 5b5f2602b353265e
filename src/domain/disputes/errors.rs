//! Dispute errors.

use thiserror::Error;

use crate::domain::foundation::{ConflictError, MatchId, ValidationError};

/// Errors raised by dispute records and the dispute workflow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisputeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    /// A second dispute was filed while one is still unresolved.
    #[error("match {match_id} already has an unresolved dispute")]
    AlreadyDisputed { match_id: MatchId },

    /// The caller is not a participant of the disputed match.
    #[error("only a participant of match {match_id} can dispute its result")]
    NotParticipant { match_id: MatchId },
}
