//! In-memory result repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::foundation::TournamentId;
use crate::domain::results::TournamentResult;
use crate::ports::{ResultRepository, StorageError};

pub struct InMemoryResultRepository {
    records: RwLock<HashMap<TournamentId, TournamentResult>>,
}

impl InMemoryResultRepository {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryResultRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResultRepository for InMemoryResultRepository {
    async fn insert_once(
        &self,
        result: &TournamentResult,
    ) -> Result<TournamentResult, StorageError> {
        let mut records = self.records.write().expect("result lock poisoned");
        Ok(records
            .entry(result.tournament_id)
            .or_insert_with(|| result.clone())
            .clone())
    }

    async fn get(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Option<TournamentResult>, StorageError> {
        Ok(self
            .records
            .read()
            .expect("result lock poisoned")
            .get(&tournament_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ParticipantId, Timestamp};
    use crate::domain::results::DeterminationMethod;

    fn result(tournament_id: TournamentId, winner: i64) -> TournamentResult {
        TournamentResult {
            tournament_id,
            winner: ParticipantId::new(winner),
            runner_up: ParticipantId::new(winner + 1),
            third_place: None,
            method: DeterminationMethod::FinalMatch,
            audit: vec![],
            requires_review: false,
            determined_at: Timestamp::now(),
        }
    }

    #[tokio::test]
    async fn first_write_wins() {
        let repo = InMemoryResultRepository::new();
        let tid = TournamentId::new();

        let stored = repo.insert_once(&result(tid, 1)).await.unwrap();
        assert_eq!(stored.winner, ParticipantId::new(1));

        // A competing write returns the original, unchanged.
        let replay = repo.insert_once(&result(tid, 9)).await.unwrap();
        assert_eq!(replay.winner, ParticipantId::new(1));
        assert_eq!(
            repo.get(tid).await.unwrap().unwrap().winner,
            ParticipantId::new(1)
        );
    }
}
