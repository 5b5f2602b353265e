//! Match lifecycle controller.
//!
//! Every operation follows the same shape: load the aggregate, run its
//! guards, persist, then publish the corresponding event best-effort. A
//! failed publish is logged and never undoes the persisted change; the
//! broadcast layer tolerates gaps, clients re-sync on reconnect.

use std::sync::Arc;

use crate::domain::foundation::{CallerIdentity, DomainEvent, MatchId, Role, Timestamp};
use crate::domain::matches::{events, CheckInOutcome, Match, MatchScore};
use crate::ports::{EventPublisher, MatchRepository};

use super::ServiceError;

/// Orchestrates guarded transitions on match aggregates.
pub struct MatchLifecycleController {
    matches: Arc<dyn MatchRepository>,
    publisher: Arc<dyn EventPublisher>,
    allow_ties: bool,
}

impl MatchLifecycleController {
    pub fn new(
        matches: Arc<dyn MatchRepository>,
        publisher: Arc<dyn EventPublisher>,
        allow_ties: bool,
    ) -> Self {
        Self {
            matches,
            publisher,
            allow_ties,
        }
    }

    /// Records a check-in for the caller's participant entry.
    pub async fn check_in(
        &self,
        caller: &CallerIdentity,
        match_id: MatchId,
        now: Timestamp,
    ) -> Result<CheckInOutcome, ServiceError> {
        let participant = self.require_participant(caller)?;
        let mut record = self.matches.get(match_id).await?;

        let outcome = record.check_in(participant, now)?;
        self.matches.update(&record).await?;

        match outcome {
            CheckInOutcome::Waiting => {}
            CheckInOutcome::BothReady => self.publish(events::match_ready(&record)).await,
            CheckInOutcome::ForfeitedPastDeadline { .. } => {
                self.publish(events::match_completed(&record)).await;
            }
        }
        Ok(outcome)
    }

    /// Forfeits a match whose check-in deadline expired. Invoked by the
    /// deadline sweeper, not by clients.
    pub async fn forfeit_no_show(
        &self,
        match_id: MatchId,
        now: Timestamp,
    ) -> Result<(), ServiceError> {
        let mut record = self.matches.get(match_id).await?;
        record.forfeit_no_show(now)?;
        self.matches.update(&record).await?;
        self.publish(events::match_completed(&record)).await;
        Ok(())
    }

    /// Starts a match. Participants and organizers may start.
    pub async fn start(
        &self,
        caller: &CallerIdentity,
        match_id: MatchId,
        now: Timestamp,
    ) -> Result<(), ServiceError> {
        let mut record = self.matches.get(match_id).await?;
        self.require_participant_or_role(caller, &record, Role::Organizer)?;

        record.start(now)?;
        self.matches.update(&record).await?;
        self.publish(events::match_started(&record)).await;
        Ok(())
    }

    /// Updates the running score of a live match.
    pub async fn report_live_score(
        &self,
        caller: &CallerIdentity,
        match_id: MatchId,
        score: MatchScore,
    ) -> Result<(), ServiceError> {
        let participant = self.require_participant(caller)?;
        let mut record = self.matches.get(match_id).await?;

        record.report_live_score(participant, score)?;
        self.matches.update(&record).await?;
        self.publish(events::score_updated(&record, score)).await;
        Ok(())
    }

    /// Submits a final result for opponent confirmation.
    pub async fn submit_result(
        &self,
        caller: &CallerIdentity,
        match_id: MatchId,
        score: MatchScore,
    ) -> Result<(), ServiceError> {
        let participant = self.require_participant(caller)?;
        let mut record = self.matches.get(match_id).await?;

        record.submit_result(participant, score, self.allow_ties)?;
        self.matches.update(&record).await?;
        self.publish(events::score_updated(&record, score)).await;
        Ok(())
    }

    /// Confirms a pending result, completing the match.
    pub async fn confirm_result(
        &self,
        caller: &CallerIdentity,
        match_id: MatchId,
        now: Timestamp,
    ) -> Result<Match, ServiceError> {
        let mut record = self.matches.get(match_id).await?;
        record.confirm_result(caller, now)?;
        self.matches.update(&record).await?;
        self.publish(events::match_completed(&record)).await;
        Ok(record)
    }

    /// Cancels a match. Organizer and above only.
    pub async fn cancel(
        &self,
        caller: &CallerIdentity,
        match_id: MatchId,
    ) -> Result<(), ServiceError> {
        if !caller.has_role(Role::Organizer) {
            return Err(ServiceError::forbidden(
                "cancelling a match requires the organizer role",
            ));
        }
        let mut record = self.matches.get(match_id).await?;
        record.cancel()?;
        self.matches.update(&record).await?;
        self.publish(events::match_completed(&record)).await;
        Ok(())
    }

    fn require_participant(
        &self,
        caller: &CallerIdentity,
    ) -> Result<crate::domain::foundation::ParticipantId, ServiceError> {
        caller
            .participant_id
            .ok_or_else(|| ServiceError::forbidden("caller has no participant entry"))
    }

    fn require_participant_or_role(
        &self,
        caller: &CallerIdentity,
        record: &Match,
        role: Role,
    ) -> Result<(), ServiceError> {
        if caller.has_role(role) {
            return Ok(());
        }
        let participant = self.require_participant(caller)?;
        if record.side_of(participant).is_none() {
            return Err(ServiceError::forbidden(
                "caller is not a participant of this match",
            ));
        }
        Ok(())
    }

    async fn publish(&self, event: DomainEvent) {
        if let Err(error) = self.publisher.publish(event).await {
            tracing::warn!(%error, "event publish failed after commit");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryEventBus, InMemoryMatchRepository};
    use crate::domain::foundation::{EventKind, ParticipantId, TournamentId, UserId};
    use crate::domain::matches::MatchState;

    fn player(n: i64) -> CallerIdentity {
        CallerIdentity::new(
            UserId::new(format!("user-{n}")).unwrap(),
            Role::Player,
            Some(ParticipantId::new(n)),
        )
    }

    fn organizer() -> CallerIdentity {
        CallerIdentity::new(UserId::new("org-1").unwrap(), Role::Organizer, None)
    }

    struct Fixture {
        controller: MatchLifecycleController,
        matches: Arc<InMemoryMatchRepository>,
        bus: Arc<InMemoryEventBus>,
        match_id: MatchId,
    }

    async fn fixture(scheduled: bool) -> Fixture {
        let matches = Arc::new(InMemoryMatchRepository::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let controller =
            MatchLifecycleController::new(matches.clone(), bus.clone(), false);

        let now = Timestamp::now();
        let record = Match::new(
            MatchId::new(),
            TournamentId::new(),
            1,
            1,
            ParticipantId::new(1),
            ParticipantId::new(2),
            scheduled.then_some(now),
            scheduled.then(|| now.plus_secs(600)),
        )
        .unwrap();
        let match_id = record.id;
        matches.insert(&record).await.unwrap();

        Fixture {
            controller,
            matches,
            bus,
            match_id,
        }
    }

    #[tokio::test]
    async fn check_in_persists_and_emits_ready_once_both_in() {
        let f = fixture(true).await;
        let now = Timestamp::now();

        f.controller.check_in(&player(1), f.match_id, now).await.unwrap();
        assert!(f.bus.published().is_empty());

        f.controller.check_in(&player(2), f.match_id, now).await.unwrap();
        let events = f.bus.published();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::MatchReady);

        let stored = f.matches.get(f.match_id).await.unwrap();
        assert_eq!(stored.state, MatchState::Ready);
    }

    #[tokio::test]
    async fn spectator_cannot_check_in() {
        let f = fixture(true).await;
        let spectator =
            CallerIdentity::new(UserId::new("viewer").unwrap(), Role::Spectator, None);
        let err = f
            .controller
            .check_in(&spectator, f.match_id, Timestamp::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden { .. }));
    }

    #[tokio::test]
    async fn full_happy_path_emits_in_order() {
        let f = fixture(false).await;
        let now = Timestamp::now();

        f.controller.start(&player(1), f.match_id, now).await.unwrap();
        f.controller
            .report_live_score(&player(1), f.match_id, MatchScore::new(1, 0).unwrap())
            .await
            .unwrap();
        f.controller
            .submit_result(&player(1), f.match_id, MatchScore::new(2, 1).unwrap())
            .await
            .unwrap();
        f.controller
            .confirm_result(&player(2), f.match_id, now)
            .await
            .unwrap();

        let kinds: Vec<EventKind> = f.bus.published().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::MatchStarted,
                EventKind::ScoreUpdated,
                EventKind::ScoreUpdated,
                EventKind::MatchCompleted,
            ]
        );

        let stored = f.matches.get(f.match_id).await.unwrap();
        assert_eq!(stored.state, MatchState::Completed);
        assert_eq!(stored.winner, Some(ParticipantId::new(1)));
    }

    #[tokio::test]
    async fn tie_submission_is_rejected_by_default_policy() {
        let f = fixture(false).await;
        let now = Timestamp::now();
        f.controller.start(&player(1), f.match_id, now).await.unwrap();

        let err = f
            .controller
            .submit_result(&player(1), f.match_id, MatchScore::new(1, 1).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Match(_)));
    }

    #[tokio::test]
    async fn cancel_requires_organizer() {
        let f = fixture(false).await;
        let err = f.controller.cancel(&player(1), f.match_id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden { .. }));

        f.controller.cancel(&organizer(), f.match_id).await.unwrap();
        let stored = f.matches.get(f.match_id).await.unwrap();
        assert_eq!(stored.state, MatchState::Cancelled);
    }

    #[tokio::test]
    async fn submission_announces_the_pending_score() {
        let f = fixture(false).await;
        let now = Timestamp::now();

        f.controller.start(&player(1), f.match_id, now).await.unwrap();
        f.controller
            .submit_result(&player(1), f.match_id, MatchScore::new(2, 1).unwrap())
            .await
            .unwrap();

        let events = f.bus.published();
        assert_eq!(events.last().unwrap().kind, EventKind::ScoreUpdated);
        assert_eq!(events.last().unwrap().payload["home_score"], 2);
    }

    #[tokio::test]
    async fn cancellation_announces_a_terminal_frame() {
        let f = fixture(false).await;

        f.controller.cancel(&organizer(), f.match_id).await.unwrap();

        let events = f.bus.published();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::MatchCompleted);
        assert_eq!(events[0].payload["state"], "cancelled");
        assert!(events[0].payload["winner"].is_null());
    }

    #[tokio::test]
    async fn late_check_in_forfeits_and_emits_completion() {
        let f = fixture(true).await;
        let late = Timestamp::now().plus_secs(601);

        let outcome = f
            .controller
            .check_in(&player(2), f.match_id, late)
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            CheckInOutcome::ForfeitedPastDeadline { .. }
        ));

        let events = f.bus.published();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::MatchCompleted);
    }
}
