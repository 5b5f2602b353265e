//! ResultRepository port.

use async_trait::async_trait;

use crate::domain::foundation::TournamentId;
use crate::domain::results::TournamentResult;

use super::StorageError;

/// Once-only storage for tournament results.
///
/// Determination may be triggered more than once (replayed completion
/// events, manual re-runs); the first stored result always wins.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Stores the result unless one already exists for the tournament.
    ///
    /// Returns the stored result either way, so callers can tell a replay
    /// from a first write without a second round-trip.
    async fn insert_once(
        &self,
        result: &TournamentResult,
    ) -> Result<TournamentResult, StorageError>;

    /// The stored result, if determination already ran.
    async fn get(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Option<TournamentResult>, StorageError>;
}
