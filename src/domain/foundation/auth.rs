//! Authentication types for the domain layer.
//!
//! Token issuance lives with an external auth provider; this core only
//! consumes a validated bearer credential. These types carry the result of
//! that validation plus the role the caller holds in one tournament, and
//! have no provider dependencies.

use thiserror::Error;

use super::{ParticipantId, Role, UserId};

/// A caller's resolved standing within one tournament.
///
/// Combines the authenticated identity with the role computed from the
/// tournament's registration state, and the participant handle when the
/// caller is playing in the tournament.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_id: UserId,
    pub role: Role,
    /// Set only when the caller is registered as a participant.
    pub participant_id: Option<ParticipantId>,
}

impl CallerIdentity {
    /// Creates a caller identity.
    pub fn new(user_id: UserId, role: Role, participant_id: Option<ParticipantId>) -> Self {
        Self {
            user_id,
            role,
            participant_id,
        }
    }

    /// Returns true if this caller holds at least the required role.
    pub fn has_role(&self, required: Role) -> bool {
        self.role.at_least(required)
    }

    /// Returns true if this caller is the given participant.
    pub fn is_participant(&self, participant: ParticipantId) -> bool {
        self.participant_id == Some(participant)
    }
}

/// Authentication errors surfaced during connection admission.
///
/// Each variant maps to a distinct WebSocket close code so clients can
/// distinguish "log in again" from "this credential was never valid".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No credential was supplied with the connection request.
    #[error("authentication required")]
    MissingCredential,

    /// The credential has expired.
    #[error("token expired")]
    TokenExpired,

    /// The credential is malformed or has an invalid signature.
    #[error("token invalid")]
    TokenInvalid,

    /// The auth or registration capability is unreachable.
    #[error("auth service unavailable: {0}")]
    ServiceUnavailable(String),
}
