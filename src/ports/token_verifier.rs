//! Authentication ports for the connection gateway.

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, CallerIdentity, ParticipantId, TournamentId, UserId};

/// Verifies a bearer token and returns the caller it authenticates.
///
/// The returned identity carries the platform role from the token claims;
/// the participant entry is tournament-scoped and resolved separately.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<CallerIdentity, AuthError>;
}

/// Resolves which participant entry a user plays under in a tournament.
///
/// Spectators resolve to `None`; the gateway then grants read-only access.
#[async_trait]
pub trait RoleResolver: Send + Sync {
    async fn participant_for(
        &self,
        user: &UserId,
        tournament_id: TournamentId,
    ) -> Result<Option<ParticipantId>, AuthError>;
}
