//! In-memory bracket repository.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::bracket::Bracket;
use crate::domain::foundation::TournamentId;
use crate::ports::{BracketRepository, StorageError};

pub struct InMemoryBracketRepository {
    records: RwLock<HashMap<TournamentId, Bracket>>,
}

impl InMemoryBracketRepository {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryBracketRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BracketRepository for InMemoryBracketRepository {
    async fn save(&self, bracket: &Bracket) -> Result<(), StorageError> {
        self.records
            .write()
            .expect("bracket lock poisoned")
            .insert(bracket.tournament_id, bracket.clone());
        Ok(())
    }

    async fn get(&self, tournament_id: TournamentId) -> Result<Bracket, StorageError> {
        self.records
            .read()
            .expect("bracket lock poisoned")
            .get(&tournament_id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("bracket {tournament_id}")))
    }
}
