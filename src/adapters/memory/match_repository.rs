//! In-memory match repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::foundation::{MatchId, TournamentId};
use crate::domain::matches::Match;
use crate::ports::{MatchRepository, StorageError};

pub struct InMemoryMatchRepository {
    records: RwLock<HashMap<MatchId, Match>>,
}

impl InMemoryMatchRepository {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryMatchRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MatchRepository for InMemoryMatchRepository {
    async fn insert(&self, record: &Match) -> Result<(), StorageError> {
        let mut records = self.records.write().expect("match lock poisoned");
        if records.contains_key(&record.id) {
            return Err(StorageError::Duplicate(format!("match {}", record.id)));
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn get(&self, id: MatchId) -> Result<Match, StorageError> {
        self.records
            .read()
            .expect("match lock poisoned")
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("match {id}")))
    }

    async fn update(&self, record: &Match) -> Result<(), StorageError> {
        let mut records = self.records.write().expect("match lock poisoned");
        if !records.contains_key(&record.id) {
            return Err(StorageError::NotFound(format!("match {}", record.id)));
        }
        records.insert(record.id, record.clone());
        Ok(())
    }

    async fn list_by_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> Result<Vec<Match>, StorageError> {
        let mut list: Vec<Match> = self
            .records
            .read()
            .expect("match lock poisoned")
            .values()
            .filter(|m| m.tournament_id == tournament_id)
            .cloned()
            .collect();
        list.sort_by_key(|m| (m.round, m.ordinal));
        Ok(list)
    }
}
