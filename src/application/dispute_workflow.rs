//! Dispute workflow.
//!
//! Opening a dispute freezes the match in `Disputed`; resolving applies
//! exactly one decision back onto the match and closes the dispute in the
//! same pass. Escalated disputes need an admin to settle.

use std::sync::Arc;

use crate::domain::disputes::{
    events, Dispute, DisputeDecision, DisputeError, DisputeReason, Resolution,
};
use crate::domain::foundation::{
    CallerIdentity, DisputeId, DomainEvent, MatchId, ParticipantId, Role, Timestamp,
    ValidationError,
};
use crate::domain::matches::{events as match_events, Match, MatchScore};
use crate::domain::{bracket, disputes::DisputeStatus};
use crate::ports::{
    BracketRepository, DisputeRepository, EventPublisher, MatchRepository, StorageError,
};

use super::ServiceError;

/// A reviewer's decision, as received from the wire.
#[derive(Debug, Clone)]
pub struct ResolveCommand {
    pub decision: DisputeDecision,
    pub final_score: Option<MatchScore>,
    pub disqualified: Option<ParticipantId>,
    pub note: Option<String>,
}

/// Orchestrates dispute filing, review, and resolution.
pub struct DisputeWorkflow {
    disputes: Arc<dyn DisputeRepository>,
    matches: Arc<dyn MatchRepository>,
    brackets: Arc<dyn BracketRepository>,
    publisher: Arc<dyn EventPublisher>,
}

impl DisputeWorkflow {
    pub fn new(
        disputes: Arc<dyn DisputeRepository>,
        matches: Arc<dyn MatchRepository>,
        brackets: Arc<dyn BracketRepository>,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            disputes,
            matches,
            brackets,
            publisher,
        }
    }

    /// Files a dispute against a match's pending result.
    pub async fn open(
        &self,
        caller: &CallerIdentity,
        match_id: MatchId,
        reason: DisputeReason,
        detail: impl Into<String>,
        now: Timestamp,
    ) -> Result<Dispute, ServiceError> {
        let participant = caller
            .participant_id
            .ok_or_else(|| ServiceError::forbidden("caller has no participant entry"))?;

        let mut record = self.matches.get(match_id).await?;
        if record.side_of(participant).is_none() {
            return Err(DisputeError::NotParticipant { match_id }.into());
        }
        if self.disputes.find_unresolved(match_id).await?.is_some() {
            return Err(DisputeError::AlreadyDisputed { match_id }.into());
        }

        record.mark_disputed()?;
        let dispute = Dispute::open(
            DisputeId::new(),
            record.tournament_id,
            match_id,
            participant,
            reason,
            detail,
            now,
        )?;

        // The repository's uniqueness guard closes the race between two
        // concurrent filings.
        match self.disputes.insert(&dispute).await {
            Ok(()) => {}
            Err(StorageError::Duplicate(_)) => {
                return Err(DisputeError::AlreadyDisputed { match_id }.into());
            }
            Err(other) => return Err(other.into()),
        }
        self.matches.update(&record).await?;

        self.publish(events::dispute_created(&dispute)).await;
        Ok(dispute)
    }

    /// A reviewer takes the dispute. Organizer and above.
    pub async fn begin_review(
        &self,
        caller: &CallerIdentity,
        dispute_id: DisputeId,
    ) -> Result<Dispute, ServiceError> {
        self.require_role(caller, Role::Organizer)?;
        let mut dispute = self.disputes.get(dispute_id).await?;
        dispute.begin_review(caller.user_id.clone())?;
        self.disputes.update(&dispute).await?;
        Ok(dispute)
    }

    /// Hands the dispute up to an admin. Organizer and above.
    pub async fn escalate(
        &self,
        caller: &CallerIdentity,
        dispute_id: DisputeId,
    ) -> Result<Dispute, ServiceError> {
        self.require_role(caller, Role::Organizer)?;
        let mut dispute = self.disputes.get(dispute_id).await?;
        dispute.escalate()?;
        self.disputes.update(&dispute).await?;
        Ok(dispute)
    }

    /// Applies a decision, closing the dispute and settling the match.
    ///
    /// Escalated disputes require the admin role; everything else takes an
    /// organizer.
    pub async fn resolve(
        &self,
        caller: &CallerIdentity,
        dispute_id: DisputeId,
        command: ResolveCommand,
        now: Timestamp,
    ) -> Result<(Dispute, Match), ServiceError> {
        let mut dispute = self.disputes.get(dispute_id).await?;
        let required = if dispute.status == DisputeStatus::Escalated {
            Role::Admin
        } else {
            Role::Organizer
        };
        self.require_role(caller, required)?;

        let mut record = self.matches.get(dispute.match_id).await?;

        match command.decision {
            DisputeDecision::OverrideScore => {
                let score = command.final_score.ok_or_else(|| {
                    DisputeError::from(ValidationError::invalid(
                        "final_score",
                        "override requires a final score",
                    ))
                })?;
                record.resolve_with_score(score, now)?;
            }
            DisputeDecision::AcceptReported => {
                let score = record.reported_score.ok_or_else(|| {
                    DisputeError::from(ValidationError::invalid(
                        "reported_score",
                        "no reported score to accept",
                    ))
                })?;
                record.resolve_with_score(score, now)?;
            }
            DisputeDecision::Rematch => {
                record.resolve_rematch(None, None)?;
            }
            DisputeDecision::Disqualify => {
                let target = command.disqualified.ok_or_else(|| {
                    DisputeError::from(ValidationError::invalid(
                        "disqualified",
                        "disqualify requires a participant",
                    ))
                })?;
                record.resolve_disqualify(target, now)?;
            }
        }

        dispute.resolve(Resolution {
            decision: command.decision,
            final_score: command.final_score,
            disqualified: command.disqualified,
            resolved_by: caller.user_id.clone(),
            resolved_at: now,
            note: command.note,
        })?;

        self.matches.update(&record).await?;
        self.disputes.update(&dispute).await?;

        match command.decision {
            DisputeDecision::Rematch => {
                // Viewers re-render the bracket; the node is back in play.
                match self.brackets.get(record.tournament_id).await {
                    Ok(b) => self.publish(bracket::events::bracket_updated(&b)).await,
                    Err(StorageError::NotFound(_)) => {}
                    Err(other) => return Err(other.into()),
                }
            }
            _ => self.publish(match_events::match_completed(&record)).await,
        }

        Ok((dispute, record))
    }

    fn require_role(&self, caller: &CallerIdentity, role: Role) -> Result<(), ServiceError> {
        if caller.has_role(role) {
            Ok(())
        } else {
            Err(ServiceError::forbidden(format!(
                "operation requires the {role:?} role"
            )))
        }
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
    use crate::adapters::memory::{
        InMemoryBracketRepository, InMemoryDisputeRepository, InMemoryEventBus,
        InMemoryMatchRepository,
    };
    use crate::domain::bracket::{Bracket, BracketEngine, SeedEntry, SeedingPolicy};
    use crate::domain::foundation::{EventKind, TournamentId, UserId};
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

    fn admin() -> CallerIdentity {
        CallerIdentity::new(UserId::new("adm-1").unwrap(), Role::Admin, None)
    }

    struct Fixture {
        workflow: DisputeWorkflow,
        matches: Arc<InMemoryMatchRepository>,
        bus: Arc<InMemoryEventBus>,
        match_id: MatchId,
        tournament_id: TournamentId,
        brackets: Arc<InMemoryBracketRepository>,
    }

    /// A match in `PendingResult` with 2-1 reported by participant 1.
    async fn fixture() -> Fixture {
        let matches = Arc::new(InMemoryMatchRepository::new());
        let disputes = Arc::new(InMemoryDisputeRepository::new());
        let brackets = Arc::new(InMemoryBracketRepository::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let workflow = DisputeWorkflow::new(
            disputes.clone(),
            matches.clone(),
            brackets.clone(),
            bus.clone(),
        );

        let tournament_id = TournamentId::new();
        let mut record = Match::new(
            MatchId::new(),
            tournament_id,
            1,
            1,
            ParticipantId::new(1),
            ParticipantId::new(2),
            None,
            None,
        )
        .unwrap();
        let now = Timestamp::now();
        record.start(now).unwrap();
        record
            .submit_result(record.home, MatchScore::new(2, 1).unwrap(), false)
            .unwrap();
        let match_id = record.id;
        matches.insert(&record).await.unwrap();

        Fixture {
            workflow,
            matches,
            bus,
            match_id,
            tournament_id,
            brackets,
        }
    }

    fn accept() -> ResolveCommand {
        ResolveCommand {
            decision: DisputeDecision::AcceptReported,
            final_score: None,
            disqualified: None,
            note: None,
        }
    }

    #[tokio::test]
    async fn open_marks_match_disputed_and_emits() {
        let f = fixture().await;
        let dispute = f
            .workflow
            .open(
                &player(2),
                f.match_id,
                DisputeReason::IncorrectScore,
                "final game not counted",
                Timestamp::now(),
            )
            .await
            .unwrap();
        assert_eq!(dispute.status, DisputeStatus::Open);

        let stored = f.matches.get(f.match_id).await.unwrap();
        assert_eq!(stored.state, MatchState::Disputed);

        let events = f.bus.published();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::DisputeCreated);
    }

    #[tokio::test]
    async fn second_dispute_on_same_match_is_rejected() {
        let f = fixture().await;
        f.workflow
            .open(
                &player(2),
                f.match_id,
                DisputeReason::IncorrectScore,
                "final game not counted",
                Timestamp::now(),
            )
            .await
            .unwrap();

        let err = f
            .workflow
            .open(
                &player(1),
                f.match_id,
                DisputeReason::Other,
                "counter dispute",
                Timestamp::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Dispute(DisputeError::AlreadyDisputed { .. })
                | ServiceError::Match(_)
        ));
    }

    #[tokio::test]
    async fn non_participant_cannot_open() {
        let f = fixture().await;
        let err = f
            .workflow
            .open(
                &player(9),
                f.match_id,
                DisputeReason::Other,
                "not my match",
                Timestamp::now(),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Dispute(DisputeError::NotParticipant { .. })
        ));
    }

    #[tokio::test]
    async fn override_resolution_completes_with_new_score() {
        let f = fixture().await;
        let dispute = f
            .workflow
            .open(
                &player(2),
                f.match_id,
                DisputeReason::IncorrectScore,
                "score entered backwards",
                Timestamp::now(),
            )
            .await
            .unwrap();

        let (resolved, record) = f
            .workflow
            .resolve(
                &organizer(),
                dispute.id,
                ResolveCommand {
                    decision: DisputeDecision::OverrideScore,
                    final_score: Some(MatchScore::new(1, 2).unwrap()),
                    disqualified: None,
                    note: Some("VOD confirms away win".into()),
                },
                Timestamp::now(),
            )
            .await
            .unwrap();

        assert_eq!(resolved.status, DisputeStatus::Resolved);
        assert_eq!(record.state, MatchState::Completed);
        assert_eq!(record.winner, Some(ParticipantId::new(2)));

        let last = f.bus.published().pop().unwrap();
        assert_eq!(last.kind, EventKind::MatchCompleted);
    }

    #[tokio::test]
    async fn rematch_resets_match_and_updates_bracket() {
        let f = fixture().await;

        // Give the tournament a bracket so the rematch can re-render it.
        let entries: Vec<SeedEntry> =
            (1..=2).map(|i| SeedEntry::new(ParticipantId::new(i))).collect();
        let mut b =
            BracketEngine::generate(f.tournament_id, &entries, &SeedingPolicy::SlotOrder).unwrap();
        b.attach_match(Bracket::ROOT, f.match_id);
        f.brackets.save(&b).await.unwrap();

        let dispute = f
            .workflow
            .open(
                &player(2),
                f.match_id,
                DisputeReason::TechnicalFailure,
                "server crashed in game three",
                Timestamp::now(),
            )
            .await
            .unwrap();

        let (_, record) = f
            .workflow
            .resolve(
                &organizer(),
                dispute.id,
                ResolveCommand {
                    decision: DisputeDecision::Rematch,
                    final_score: None,
                    disqualified: None,
                    note: None,
                },
                Timestamp::now(),
            )
            .await
            .unwrap();

        assert_eq!(record.state, MatchState::Scheduled);
        assert_eq!(record.rematch_count, 1);

        let last = f.bus.published().pop().unwrap();
        assert_eq!(last.kind, EventKind::BracketUpdated);
    }

    #[tokio::test]
    async fn escalated_disputes_need_an_admin() {
        let f = fixture().await;
        let dispute = f
            .workflow
            .open(
                &player(2),
                f.match_id,
                DisputeReason::OpponentMisconduct,
                "smurfing account",
                Timestamp::now(),
            )
            .await
            .unwrap();

        f.workflow.begin_review(&organizer(), dispute.id).await.unwrap();
        f.workflow.escalate(&organizer(), dispute.id).await.unwrap();

        let err = f
            .workflow
            .resolve(&organizer(), dispute.id, accept(), Timestamp::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden { .. }));

        let (resolved, _) = f
            .workflow
            .resolve(&admin(), dispute.id, accept(), Timestamp::now())
            .await
            .unwrap();
        assert_eq!(resolved.status, DisputeStatus::Resolved);
    }

    #[tokio::test]
    async fn players_cannot_resolve() {
        let f = fixture().await;
        let dispute = f
            .workflow
            .open(
                &player(2),
                f.match_id,
                DisputeReason::IncorrectScore,
                "wrong score",
                Timestamp::now(),
            )
            .await
            .unwrap();

        let err = f
            .workflow
            .resolve(&player(2), dispute.id, accept(), Timestamp::now())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden { .. }));
    }
}
