//! Bracket progression.
//!
//! Generates the bracket, materializes matches as nodes fill, and reacts
//! to match completions: winners advance toward the root, newly filled
//! nodes become playable matches, and the champion triggers winner
//! determination. Runs as an event handler so completion reaches it the
//! same way whether a result was confirmed, forfeited, or dispute-settled.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::bracket::{
    events, Bracket, BracketEngine, BracketError, SeedEntry, SeedingPolicy,
};
use crate::domain::foundation::{
    CallerIdentity, DomainEvent, EventKind, MatchId, Role, RoomId, TournamentId,
};
use crate::domain::matches::{events as match_events, Match, MatchError};
use crate::ports::{
    BracketRepository, EventHandler, EventPublisher, HandlerResult, MatchRepository, StorageError,
};

use super::{ServiceError, WinnerDeterminationService};

pub struct BracketProgressionService {
    brackets: Arc<dyn BracketRepository>,
    matches: Arc<dyn MatchRepository>,
    publisher: Arc<dyn EventPublisher>,
    determination: Arc<WinnerDeterminationService>,
}

impl BracketProgressionService {
    pub fn new(
        brackets: Arc<dyn BracketRepository>,
        matches: Arc<dyn MatchRepository>,
        publisher: Arc<dyn EventPublisher>,
        determination: Arc<WinnerDeterminationService>,
    ) -> Self {
        Self {
            brackets,
            matches,
            publisher,
            determination,
        }
    }

    /// Generates the bracket and materializes the first playable matches.
    ///
    /// Regeneration is allowed until any match has been decided.
    pub async fn create_bracket(
        &self,
        caller: &CallerIdentity,
        tournament_id: TournamentId,
        entries: &[SeedEntry],
        policy: &SeedingPolicy,
    ) -> Result<Bracket, ServiceError> {
        if !caller.has_role(Role::Organizer) {
            return Err(ServiceError::forbidden(
                "bracket generation requires the organizer role",
            ));
        }
        match self.brackets.get(tournament_id).await {
            Ok(existing) if existing.has_progress() => {
                return Err(BracketError::AlreadyStarted.into());
            }
            Ok(_) | Err(StorageError::NotFound(_)) => {}
            Err(other) => return Err(other.into()),
        }

        let mut bracket = BracketEngine::generate(tournament_id, entries, policy)?;
        let created = self.materialize(&mut bracket).await?;
        self.brackets.save(&bracket).await?;

        self.publish(events::bracket_updated(&bracket)).await;
        for record in &created {
            self.publish(match_events::match_ready(record)).await;
        }
        Ok(bracket)
    }

    /// Advances a decided match's winner and materializes what opened up.
    async fn on_match_completed(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
    ) -> Result<(), ServiceError> {
        let mut bracket = match self.brackets.get(tournament_id).await {
            Ok(bracket) => bracket,
            // Standalone matches exist outside any bracket.
            Err(StorageError::NotFound(_)) => return Ok(()),
            Err(other) => return Err(other.into()),
        };

        let record = self.matches.get(match_id).await?;
        let Some(winner) = record.winner else {
            // A cancelled match decides nothing on the tree. A cancelled
            // final is the exception: the tournament can still be settled
            // through the tie-break cascade over the semifinal results.
            if bracket.node_of_match(match_id) == Some(Bracket::ROOT) {
                self.determination.determine(tournament_id).await?;
            }
            return Ok(());
        };

        let outcome = match BracketEngine::advance(&mut bracket, match_id, winner) {
            Ok(outcome) => outcome,
            // Replayed completion for a node that already advanced.
            Err(BracketError::NodeAlreadyDecided { .. }) => return Ok(()),
            Err(BracketError::UnknownMatch { .. }) => return Ok(()),
            Err(other) => return Err(other.into()),
        };

        let created = self.materialize(&mut bracket).await?;
        self.brackets.save(&bracket).await?;

        self.publish(events::bracket_updated(&bracket)).await;
        for new_match in &created {
            self.publish(match_events::match_ready(new_match)).await;
        }

        if outcome.champion.is_some() {
            self.determination.determine(tournament_id).await?;
        }
        Ok(())
    }

    /// Creates match records for every full, undecided, unattached node.
    async fn materialize(&self, bracket: &mut Bracket) -> Result<Vec<Match>, ServiceError> {
        let mut created = Vec::new();
        for index in bracket.nodes_awaiting_match() {
            let node = &bracket.nodes[index];
            let (Some(home), Some(away)) = (node.slots[0], node.slots[1]) else {
                continue;
            };
            let record = Match::new(
                MatchId::new(),
                bracket.tournament_id,
                node.round,
                node.position,
                home,
                away,
                None,
                None,
            )
            .map_err(MatchError::from)?;
            bracket.attach_match(index, record.id);
            self.matches.insert(&record).await?;
            created.push(record);
        }
        Ok(created)
    }

    async fn publish(&self, event: DomainEvent) {
        if let Err(error) = self.publisher.publish(event).await {
            tracing::warn!(%error, "event publish failed after commit");
        }
    }
}

#[async_trait]
impl EventHandler for BracketProgressionService {
    async fn handle(&self, event: &DomainEvent) -> HandlerResult {
        if event.kind != EventKind::MatchCompleted {
            return Ok(());
        }
        let RoomId::Match(match_id) = event.subject else {
            return Ok(());
        };
        self.on_match_completed(event.tournament_id, match_id).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "bracket_progression"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryBracketRepository, InMemoryEventBus, InMemoryMatchRepository,
        InMemoryResultRepository,
    };
    use crate::domain::foundation::{ParticipantId, Timestamp, UserId};
    use crate::domain::matches::{MatchScore, MatchState};
    use crate::ports::{EventSubscriber, ResultRepository};

    fn organizer() -> CallerIdentity {
        CallerIdentity::new(UserId::new("org-1").unwrap(), Role::Organizer, None)
    }

    fn entries(n: i64) -> Vec<SeedEntry> {
        (1..=n).map(|i| SeedEntry::new(ParticipantId::new(i))).collect()
    }

    struct Fixture {
        service: Arc<BracketProgressionService>,
        brackets: Arc<InMemoryBracketRepository>,
        matches: Arc<InMemoryMatchRepository>,
        results: Arc<InMemoryResultRepository>,
        bus: Arc<InMemoryEventBus>,
    }

    fn fixture() -> Fixture {
        let brackets = Arc::new(InMemoryBracketRepository::new());
        let matches = Arc::new(InMemoryMatchRepository::new());
        let results = Arc::new(InMemoryResultRepository::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let determination = Arc::new(WinnerDeterminationService::new(
            brackets.clone(),
            matches.clone(),
            results.clone(),
            bus.clone(),
        ));
        let service = Arc::new(BracketProgressionService::new(
            brackets.clone(),
            matches.clone(),
            bus.clone(),
            determination,
        ));
        bus.subscribe(EventKind::MatchCompleted, service.clone());

        Fixture {
            service,
            brackets,
            matches,
            results,
            bus,
        }
    }

    /// Completes a stored match 2-0 for home and announces it on the bus,
    /// which feeds the progression handler.
    async fn complete(f: &Fixture, match_id: MatchId) {
        let mut record = f.matches.get(match_id).await.unwrap();
        let now = Timestamp::now();
        record.start(now).unwrap();
        record
            .submit_result(record.home, MatchScore::new(2, 0).unwrap(), false)
            .unwrap();
        record.confirm_result(&organizer(), now).unwrap();
        f.matches.update(&record).await.unwrap();
        f.bus
            .publish(match_events::match_completed(&record))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn create_bracket_materializes_first_round() {
        let f = fixture();
        let tid = TournamentId::new();
        let bracket = f
            .service
            .create_bracket(&organizer(), tid, &entries(4), &SeedingPolicy::SlotOrder)
            .await
            .unwrap();

        assert!(bracket.nodes_awaiting_match().is_empty());
        let stored = f.matches.list_by_tournament(tid).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored.iter().all(|m| m.state == MatchState::Ready));

        let kinds: Vec<EventKind> = f.bus.published().iter().map(|e| e.kind).collect();
        assert_eq!(kinds[0], EventKind::BracketUpdated);
        assert_eq!(kinds.iter().filter(|k| **k == EventKind::MatchReady).count(), 2);
    }

    #[tokio::test]
    async fn players_cannot_generate_brackets() {
        let f = fixture();
        let player = CallerIdentity::new(
            UserId::new("user-1").unwrap(),
            Role::Player,
            Some(ParticipantId::new(1)),
        );
        let err = f
            .service
            .create_bracket(
                &player,
                TournamentId::new(),
                &entries(4),
                &SeedingPolicy::SlotOrder,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn regeneration_is_refused_after_progress() {
        let f = fixture();
        let tid = TournamentId::new();
        f.service
            .create_bracket(&organizer(), tid, &entries(4), &SeedingPolicy::SlotOrder)
            .await
            .unwrap();

        let first = f.matches.list_by_tournament(tid).await.unwrap()[0].id;
        complete(&f, first).await;

        let err = f
            .service
            .create_bracket(&organizer(), tid, &entries(4), &SeedingPolicy::SlotOrder)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Bracket(BracketError::AlreadyStarted)
        ));
    }

    #[tokio::test]
    async fn completions_cascade_to_a_stored_result() {
        let f = fixture();
        let tid = TournamentId::new();
        f.service
            .create_bracket(&organizer(), tid, &entries(4), &SeedingPolicy::SlotOrder)
            .await
            .unwrap();

        // Play the two semifinals; the final materializes off the second.
        let round_one: Vec<MatchId> = f
            .matches
            .list_by_tournament(tid)
            .await
            .unwrap()
            .iter()
            .map(|m| m.id)
            .collect();
        for id in round_one {
            complete(&f, id).await;
        }

        let final_match = f
            .matches
            .list_by_tournament(tid)
            .await
            .unwrap()
            .into_iter()
            .find(|m| m.round == 2)
            .expect("final materialized");
        complete(&f, final_match.id).await;

        let bracket = f.brackets.get(tid).await.unwrap();
        assert!(bracket.champion().is_some());

        let result = f.results.get(tid).await.unwrap().expect("result stored");
        assert_eq!(Some(result.winner), bracket.champion());

        let kinds: Vec<EventKind> = f.bus.published().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds
                .iter()
                .filter(|k| **k == EventKind::TournamentCompleted)
                .count(),
            1
        );
    }

    #[tokio::test]
    async fn replayed_completion_is_ignored() {
        let f = fixture();
        let tid = TournamentId::new();
        f.service
            .create_bracket(&organizer(), tid, &entries(4), &SeedingPolicy::SlotOrder)
            .await
            .unwrap();

        let first = f.matches.list_by_tournament(tid).await.unwrap()[0].id;
        complete(&f, first).await;

        // Replay the same completion event.
        let record = f.matches.get(first).await.unwrap();
        f.bus
            .publish(match_events::match_completed(&record))
            .await
            .unwrap();

        let stored = f.matches.list_by_tournament(tid).await.unwrap();
        // Two semifinals only; the replay materialized nothing new.
        assert_eq!(stored.len(), 2);
    }

    #[tokio::test]
    async fn cancelled_final_settles_by_tie_break() {
        let f = fixture();
        let tid = TournamentId::new();
        f.service
            .create_bracket(&organizer(), tid, &entries(4), &SeedingPolicy::SlotOrder)
            .await
            .unwrap();

        let round_one: Vec<MatchId> = f
            .matches
            .list_by_tournament(tid)
            .await
            .unwrap()
            .iter()
            .map(|m| m.id)
            .collect();
        for id in round_one {
            complete(&f, id).await;
        }

        // The organizer pulls the final; its terminal frame carries no
        // winner, so the tournament settles through the cascade instead.
        let final_match = f
            .matches
            .list_by_tournament(tid)
            .await
            .unwrap()
            .into_iter()
            .find(|m| m.round == 2)
            .expect("final materialized");
        let mut record = f.matches.get(final_match.id).await.unwrap();
        record.cancel().unwrap();
        f.matches.update(&record).await.unwrap();
        f.bus
            .publish(match_events::match_completed(&record))
            .await
            .unwrap();

        let bracket = f.brackets.get(tid).await.unwrap();
        assert!(bracket.champion().is_none());

        let result = f.results.get(tid).await.unwrap().expect("result stored");
        assert_eq!(bracket.seed_number(result.winner), Some(1));
        assert_eq!(
            f.bus
                .published()
                .iter()
                .filter(|e| e.kind == EventKind::TournamentCompleted)
                .count(),
            1
        );
    }
}
