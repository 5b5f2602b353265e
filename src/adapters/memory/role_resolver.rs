//! In-memory participant resolver.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::foundation::{AuthError, ParticipantId, TournamentId, UserId};
use crate::ports::RoleResolver;

/// Maps (user, tournament) to a participant entry from a registration
/// table held in memory. Unregistered users resolve to `None` and join as
/// spectators.
pub struct InMemoryRoleResolver {
    entries: RwLock<HashMap<(UserId, TournamentId), ParticipantId>>,
}

impl InMemoryRoleResolver {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a user's participant entry for a tournament.
    pub fn register(&self, user: UserId, tournament_id: TournamentId, participant: ParticipantId) {
        self.entries
            .write()
            .expect("resolver lock poisoned")
            .insert((user, tournament_id), participant);
    }
}

impl Default for InMemoryRoleResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoleResolver for InMemoryRoleResolver {
    async fn participant_for(
        &self,
        user: &UserId,
        tournament_id: TournamentId,
    ) -> Result<Option<ParticipantId>, AuthError> {
        Ok(self
            .entries
            .read()
            .expect("resolver lock poisoned")
            .get(&(user.clone(), tournament_id))
            .copied())
    }
}
