//! Winner determination service.
//!
//! Wraps the pure determination engine with persistence and the once-only
//! guarantee: the first stored result wins, replays return it unchanged
//! and emit nothing.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::foundation::{DomainEvent, MatchId, Timestamp, TournamentId};
use crate::domain::matches::Match;
use crate::domain::results::{events, TournamentResult, WinnerDeterminationEngine};
use crate::ports::{BracketRepository, EventPublisher, MatchRepository, ResultRepository};

use super::ServiceError;

pub struct WinnerDeterminationService {
    brackets: Arc<dyn BracketRepository>,
    matches: Arc<dyn MatchRepository>,
    results: Arc<dyn ResultRepository>,
    publisher: Arc<dyn EventPublisher>,
}

impl WinnerDeterminationService {
    pub fn new(
        brackets: Arc<dyn BracketRepository>,
        matches: Arc<dyn MatchRepository>,
        results: Arc<dyn ResultRepository>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            brackets,
            matches,
            results,
            publisher,
        }
    }

    /// Determines and persists the tournament result.
    ///
    /// Idempotent: a stored result is returned as-is. The terminal event
    /// is emitted only on the first write.
    pub async fn determine(
        &self,
        tournament_id: TournamentId,
    ) -> Result<TournamentResult, ServiceError> {
        if let Some(existing) = self.results.get(tournament_id).await? {
            return Ok(existing);
        }

        let bracket = self.brackets.get(tournament_id).await?;
        let records = self.matches.list_by_tournament(tournament_id).await?;
        let by_id: HashMap<MatchId, Match> = records
            .into_iter()
            .filter(|m| !m.tombstoned)
            .map(|m| (m.id, m))
            .collect();

        let result = WinnerDeterminationEngine::determine(&bracket, &by_id, Timestamp::now())?;
        let stored = self.results.insert_once(&result).await?;

        // A concurrent determination may have won the insert; only the
        // writer announces.
        if stored == result {
            self.publish(events::tournament_completed(&stored)).await;
        }
        Ok(stored)
    }

    async fn publish(&self, event: DomainEvent) {
        if let Err(error) = self.publisher.publish(event).await {
            tracing::warn!(%error, "event publish failed after commit");
        }
    }
}
