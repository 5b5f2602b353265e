//! In-memory dispute repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::disputes::Dispute;
use crate::domain::foundation::{DisputeId, MatchId, StateMachine};
use crate::ports::{DisputeRepository, StorageError};

pub struct InMemoryDisputeRepository {
    records: RwLock<HashMap<DisputeId, Dispute>>,
}

impl InMemoryDisputeRepository {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryDisputeRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DisputeRepository for InMemoryDisputeRepository {
    async fn insert(&self, dispute: &Dispute) -> Result<(), StorageError> {
        let mut records = self.records.write().expect("dispute lock poisoned");
        let unresolved_exists = records
            .values()
            .any(|d| d.match_id == dispute.match_id && !d.status.is_terminal());
        if unresolved_exists {
            return Err(StorageError::Duplicate(format!(
                "unresolved dispute for match {}",
                dispute.match_id
            )));
        }
        records.insert(dispute.id, dispute.clone());
        Ok(())
    }

    async fn get(&self, id: DisputeId) -> Result<Dispute, StorageError> {
        self.records
            .read()
            .expect("dispute lock poisoned")
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("dispute {id}")))
    }

    async fn update(&self, dispute: &Dispute) -> Result<(), StorageError> {
        let mut records = self.records.write().expect("dispute lock poisoned");
        if !records.contains_key(&dispute.id) {
            return Err(StorageError::NotFound(format!("dispute {}", dispute.id)));
        }
        records.insert(dispute.id, dispute.clone());
        Ok(())
    }

    async fn find_unresolved(&self, match_id: MatchId) -> Result<Option<Dispute>, StorageError> {
        Ok(self
            .records
            .read()
            .expect("dispute lock poisoned")
            .values()
            .find(|d| d.match_id == match_id && !d.status.is_terminal())
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::disputes::{DisputeDecision, DisputeReason, Resolution};
    use crate::domain::foundation::{ParticipantId, Timestamp, TournamentId, UserId};

    fn dispute(match_id: MatchId) -> Dispute {
        Dispute::open(
            DisputeId::new(),
            TournamentId::new(),
            match_id,
            ParticipantId::new(1),
            DisputeReason::IncorrectScore,
            "wrong score",
            Timestamp::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn uniqueness_holds_only_while_unresolved() {
        let repo = InMemoryDisputeRepository::new();
        let match_id = MatchId::new();

        let mut first = dispute(match_id);
        repo.insert(&first).await.unwrap();
        assert!(matches!(
            repo.insert(&dispute(match_id)).await,
            Err(StorageError::Duplicate(_))
        ));
        assert!(repo.find_unresolved(match_id).await.unwrap().is_some());

        first
            .resolve(Resolution {
                decision: DisputeDecision::AcceptReported,
                final_score: None,
                disqualified: None,
                resolved_by: UserId::new("org-1").unwrap(),
                resolved_at: Timestamp::now(),
                note: None,
            })
            .unwrap();
        repo.update(&first).await.unwrap();

        assert!(repo.find_unresolved(match_id).await.unwrap().is_none());
        repo.insert(&dispute(match_id)).await.unwrap();
    }
}
