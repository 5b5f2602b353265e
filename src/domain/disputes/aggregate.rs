//! The Dispute aggregate.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    DisputeId, MatchId, ParticipantId, StateMachine, Timestamp, TournamentId, UserId,
    ValidationError,
};

use crate::domain::matches::MatchScore;

use super::{DisputeError, DisputeStatus};

/// Why a result is being contested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeReason {
    IncorrectScore,
    OpponentMisconduct,
    TechnicalFailure,
    Other,
}

/// The four ways a dispute can be settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeDecision {
    /// Replace the reported score with a reviewer-supplied one.
    OverrideScore,
    /// The reported score stands.
    AcceptReported,
    /// Reset the match and play it again.
    Rematch,
    /// Disqualify one participant; the other advances by forfeit.
    Disqualify,
}

/// A reviewer's final decision, recorded on the dispute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub decision: DisputeDecision,
    /// Required for `OverrideScore`; ignored otherwise.
    pub final_score: Option<MatchScore>,
    /// Required for `Disqualify`; ignored otherwise.
    pub disqualified: Option<ParticipantId>,
    pub resolved_by: UserId,
    pub resolved_at: Timestamp,
    pub note: Option<String>,
}

impl Resolution {
    fn validate(&self) -> Result<(), ValidationError> {
        match self.decision {
            DisputeDecision::OverrideScore if self.final_score.is_none() => Err(
                ValidationError::invalid("final_score", "override requires a final score"),
            ),
            DisputeDecision::Disqualify if self.disqualified.is_none() => Err(
                ValidationError::invalid("disqualified", "disqualify requires a participant"),
            ),
            _ => Ok(()),
        }
    }
}

/// The dispute aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispute {
    pub id: DisputeId,
    pub tournament_id: TournamentId,
    pub match_id: MatchId,
    pub raised_by: ParticipantId,
    pub reason: DisputeReason,
    /// Free-text account from the raiser. Never broadcast.
    pub detail: String,
    /// Opaque references to uploaded evidence (object-store keys).
    pub evidence_refs: Vec<String>,
    pub status: DisputeStatus,
    pub opened_at: Timestamp,
    pub reviewed_by: Option<UserId>,
    pub resolution: Option<Resolution>,
}

impl Dispute {
    /// Opens a dispute against a match's pending result.
    pub fn open(
        id: DisputeId,
        tournament_id: TournamentId,
        match_id: MatchId,
        raised_by: ParticipantId,
        reason: DisputeReason,
        detail: impl Into<String>,
        now: Timestamp,
    ) -> Result<Self, DisputeError> {
        let detail = detail.into();
        if detail.trim().is_empty() {
            return Err(ValidationError::empty_field("detail").into());
        }
        Ok(Self {
            id,
            tournament_id,
            match_id,
            raised_by,
            reason,
            detail,
            evidence_refs: Vec::new(),
            status: DisputeStatus::Open,
            opened_at: now,
            reviewed_by: None,
            resolution: None,
        })
    }

    /// Attaches an evidence reference. Rejected once resolved.
    pub fn add_evidence(&mut self, reference: impl Into<String>) -> Result<(), DisputeError> {
        if self.status.is_terminal() {
            return Err(crate::domain::foundation::ConflictError::invalid_transition(
                DisputeStatus::ENTITY,
                format!("{:?}", self.status),
                "evidence update",
            )
            .into());
        }
        let reference = reference.into();
        if reference.trim().is_empty() {
            return Err(ValidationError::empty_field("evidence_ref").into());
        }
        self.evidence_refs.push(reference);
        Ok(())
    }

    /// A reviewer takes the dispute.
    pub fn begin_review(&mut self, reviewer: UserId) -> Result<(), DisputeError> {
        self.status = self.status.transition_to(DisputeStatus::UnderReview)?;
        self.reviewed_by = Some(reviewer);
        Ok(())
    }

    /// Hands the dispute up to an admin.
    pub fn escalate(&mut self) -> Result<(), DisputeError> {
        self.status = self.status.transition_to(DisputeStatus::Escalated)?;
        Ok(())
    }

    /// Applies a decision, closing the dispute.
    ///
    /// Resolving straight from `Open` passes through `UnderReview` within
    /// the same call so the review step is always on record.
    pub fn resolve(&mut self, resolution: Resolution) -> Result<(), DisputeError> {
        resolution.validate()?;
        if self.status == DisputeStatus::Open {
            self.begin_review(resolution.resolved_by.clone())?;
        }
        self.status = self.status.transition_to(DisputeStatus::Resolved)?;
        if self.reviewed_by.is_none() {
            self.reviewed_by = Some(resolution.resolved_by.clone());
        }
        self.resolution = Some(resolution);
        Ok(())
    }
}
