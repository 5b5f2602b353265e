//! Unified error type for the application services.

use thiserror::Error;

use crate::domain::bracket::BracketError;
use crate::domain::disputes::DisputeError;
use crate::domain::foundation::AuthError;
use crate::domain::matches::MatchError;
use crate::domain::results::DeterminationError;
use crate::ports::StorageError;

/// Everything an application service can fail with.
///
/// Wire mappings live at the edges: the gateway turns these into close
/// codes or error frames, keeping internal detail out of client view.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Dispute(#[from] DisputeError),

    #[error(transparent)]
    Bracket(#[from] BracketError),

    #[error(transparent)]
    Determination(#[from] DeterminationError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The caller's role or participation does not cover the operation.
    #[error("forbidden: {reason}")]
    Forbidden { reason: String },
}

impl ServiceError {
    /// Creates a forbidden error.
    pub fn forbidden(reason: impl Into<String>) -> Self {
        ServiceError::Forbidden {
            reason: reason.into(),
        }
    }

    /// Short classification used as the `error` field on wire frames.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Match(MatchError::Validation(_))
            | ServiceError::Dispute(DisputeError::Validation(_))
            | ServiceError::Bracket(BracketError::Validation(_))
            | ServiceError::Determination(DeterminationError::Validation(_)) => "invalid",
            ServiceError::Match(MatchError::Conflict(_))
            | ServiceError::Dispute(DisputeError::Conflict(_)) => "conflict",
            ServiceError::Match(_) | ServiceError::Dispute(_) => "rejected",
            ServiceError::Bracket(_) | ServiceError::Determination(_) => "rejected",
            ServiceError::Storage(StorageError::NotFound(_)) => "not_found",
            ServiceError::Storage(_) => "unavailable",
            ServiceError::Auth(_) => "unauthorized",
            ServiceError::Forbidden { .. } => "forbidden",
        }
    }
}
