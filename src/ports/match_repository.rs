//! MatchRepository port.

use async_trait::async_trait;

use crate::domain::foundation::{MatchId, TournamentId};
use crate::domain::matches::Match;

use super::StorageError;

/// Storage for match aggregates.
///
/// The lifecycle controller follows load, guard, persist, publish; updates
/// replace the whole aggregate after its guards have run.
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Stores a newly materialized match.
    async fn insert(&self, record: &Match) -> Result<(), StorageError>;

    /// Loads one match.
    async fn get(&self, id: MatchId) -> Result<Match, StorageError>;

    /// Replaces a stored match after a guarded mutation.
    async fn update(&self, record: &Match) -> Result<(), StorageError>;

    /// All matches of a tournament, tombstoned ones included.
    async fn list_by_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Vec<Match>, StorageError>;
}
