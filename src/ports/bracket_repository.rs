//! BracketRepository port.

use async_trait::async_trait;

use crate::domain::bracket::Bracket;
use crate::domain::foundation::TournamentId;

use super::StorageError;

/// Storage for one bracket per tournament.
#[async_trait]
pub trait BracketRepository: Send + Sync {
    /// Stores or replaces the tournament's bracket.
    async fn save(&self, bracket: &Bracket) -> Result<(), StorageError>;

    /// Loads the tournament's bracket.
    async fn get(&self, tournament_id: TournamentId) -> Result<Bracket, StorageError>;
}
