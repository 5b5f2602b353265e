//! The Match aggregate.
//!
//! Holds everything one match owns: participants, check-in flags, scores,
//! timestamps, game-specific lobby detail, and the decided winner/loser.
//! All mutation goes through guarded methods that drive the `MatchState`
//! state machine; the application controller persists the aggregate and
//! emits the corresponding event after each successful call.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::foundation::{
    CallerIdentity, MatchId, ParticipantId, Role, StateMachine, Timestamp, TournamentId,
    ValidationError,
};

use super::{MatchError, MatchState};

/// One of the two sides of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    /// Returns the opposing side.
    pub fn opposite(&self) -> Side {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }
}

/// A non-negative score pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchScore {
    pub home: u32,
    pub away: u32,
}

impl MatchScore {
    /// Creates a score pair, rejecting values outside the wire range.
    pub fn new(home: i64, away: i64) -> Result<Self, ValidationError> {
        const MAX: i64 = u32::MAX as i64;
        let home = u32::try_from(home)
            .map_err(|_| ValidationError::out_of_range("home_score", 0, MAX, home))?;
        let away = u32::try_from(away)
            .map_err(|_| ValidationError::out_of_range("away_score", 0, MAX, away))?;
        Ok(Self { home, away })
    }

    /// Returns true when both sides scored the same.
    pub fn is_tie(&self) -> bool {
        self.home == self.away
    }

    /// Returns the winning side, or `None` for a tie.
    pub fn winner_side(&self) -> Option<Side> {
        match self.home.cmp(&self.away) {
            std::cmp::Ordering::Greater => Some(Side::Home),
            std::cmp::Ordering::Less => Some(Side::Away),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// Outcome of a check-in attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckInOutcome {
    /// One side checked in; still waiting on the other.
    Waiting,
    /// Both sides are in; the match is ready to start.
    BothReady,
    /// The check-in deadline passed; the match was auto-forfeited.
    ForfeitedPastDeadline { winner: ParticipantId },
}

/// The match aggregate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    pub tournament_id: TournamentId,
    /// Round number within the bracket, 1-based.
    pub round: u32,
    /// Ordinal within the round, 1-based.
    pub ordinal: u32,
    pub home: ParticipantId,
    pub away: ParticipantId,
    pub home_checked_in: bool,
    pub away_checked_in: bool,
    pub state: MatchState,
    /// Final confirmed score, set when the match completes.
    pub score: Option<MatchScore>,
    /// Score submitted by a participant, awaiting confirmation.
    pub reported_score: Option<MatchScore>,
    /// Which participant submitted the pending result.
    pub reported_by: Option<ParticipantId>,
    /// Running score reported during live play. Informational only.
    pub live_score: Option<MatchScore>,
    pub scheduled_at: Option<Timestamp>,
    pub check_in_deadline: Option<Timestamp>,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    /// Game-specific lobby data (server address, map pool, and so on).
    pub lobby_detail: JsonValue,
    pub winner: Option<ParticipantId>,
    pub loser: Option<ParticipantId>,
    /// Number of times a dispute resolution reset this match for a rematch.
    pub rematch_count: u32,
    /// Matches are never hard-deleted; this flag retires the record.
    pub tombstoned: bool,
}

impl Match {
    /// Creates a new match between two participants.
    ///
    /// Starts in `Scheduled` when a scheduled time is set, otherwise in
    /// `Ready` (check-in is meaningless without a schedule).
    pub fn new(
        id: MatchId,
        tournament_id: TournamentId,
        round: u32,
        ordinal: u32,
        home: ParticipantId,
        away: ParticipantId,
        scheduled_at: Option<Timestamp>,
        check_in_deadline: Option<Timestamp>,
    ) -> Result<Self, ValidationError> {
        if round < 1 {
            return Err(ValidationError::out_of_range("round", 1, i64::MAX, round as i64));
        }
        if ordinal < 1 {
            return Err(ValidationError::out_of_range(
                "ordinal",
                1,
                i64::MAX,
                ordinal as i64,
            ));
        }
        if home == away {
            return Err(ValidationError::invalid(
                "participants",
                "a match requires two distinct participants",
            ));
        }

        let scheduled = scheduled_at.is_some();
        Ok(Self {
            id,
            tournament_id,
            round,
            ordinal,
            home,
            away,
            home_checked_in: !scheduled,
            away_checked_in: !scheduled,
            state: if scheduled {
                MatchState::Scheduled
            } else {
                MatchState::Ready
            },
            score: None,
            reported_score: None,
            reported_by: None,
            live_score: None,
            scheduled_at,
            check_in_deadline,
            started_at: None,
            completed_at: None,
            lobby_detail: JsonValue::Null,
            winner: None,
            loser: None,
            rematch_count: 0,
            tombstoned: false,
        })
    }

    // ─── Participant helpers ─────────────────────────────────────────

    /// Returns which side a participant plays on, if any.
    pub fn side_of(&self, participant: ParticipantId) -> Option<Side> {
        if participant == self.home {
            Some(Side::Home)
        } else if participant == self.away {
            Some(Side::Away)
        } else {
            None
        }
    }

    /// Returns the participant on the given side.
    pub fn participant(&self, side: Side) -> ParticipantId {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }

    /// Returns the opponent of a participant, if they play in this match.
    pub fn opponent_of(&self, participant: ParticipantId) -> Option<ParticipantId> {
        self.side_of(participant)
            .map(|side| self.participant(side.opposite()))
    }

    /// Returns true when both sides have checked in.
    pub fn both_checked_in(&self) -> bool {
        self.home_checked_in && self.away_checked_in
    }

    fn guard_not_tombstoned(&self) -> Result<(), MatchError> {
        if self.tombstoned {
            Err(MatchError::Tombstoned { match_id: self.id })
        } else {
            Ok(())
        }
    }

    fn require_side(&self, participant: ParticipantId) -> Result<Side, MatchError> {
        self.side_of(participant)
            .ok_or(MatchError::NotParticipant { match_id: self.id })
    }

    // ─── Lifecycle operations ────────────────────────────────────────

    /// Records a participant check-in.
    ///
    /// Past the check-in deadline the match auto-forfeits instead: the side
    /// that did check in wins; a double no-show deterministically awards the
    /// home slot.
    pub fn check_in(
        &mut self,
        participant: ParticipantId,
        now: Timestamp,
    ) -> Result<CheckInOutcome, MatchError> {
        self.guard_not_tombstoned()?;
        let side = self.require_side(participant)?;

        if self.past_check_in_deadline(now) {
            let winner = self.forfeit_no_show(now)?;
            return Ok(CheckInOutcome::ForfeitedPastDeadline { winner });
        }

        // Guard current state by attempting the transition we would need.
        match side {
            Side::Home => {
                self.state.transition_to(if self.away_checked_in {
                    MatchState::Ready
                } else {
                    MatchState::CheckIn
                })?;
                self.home_checked_in = true;
            }
            Side::Away => {
                self.state.transition_to(if self.home_checked_in {
                    MatchState::Ready
                } else {
                    MatchState::CheckIn
                })?;
                self.away_checked_in = true;
            }
        }

        if self.both_checked_in() {
            self.state = MatchState::Ready;
            Ok(CheckInOutcome::BothReady)
        } else {
            self.state = MatchState::CheckIn;
            Ok(CheckInOutcome::Waiting)
        }
    }

    fn past_check_in_deadline(&self, now: Timestamp) -> bool {
        matches!(self.state, MatchState::Scheduled | MatchState::CheckIn)
            && self
                .check_in_deadline
                .map(|deadline| now.is_after(&deadline))
                .unwrap_or(false)
    }

    /// Forfeits a match whose check-in deadline expired.
    ///
    /// Returns the advancing participant.
    pub fn forfeit_no_show(&mut self, now: Timestamp) -> Result<ParticipantId, MatchError> {
        self.guard_not_tombstoned()?;
        self.state = self.state.transition_to(MatchState::Forfeit)?;

        let winner_side = if self.home_checked_in && !self.away_checked_in {
            Side::Home
        } else if self.away_checked_in && !self.home_checked_in {
            Side::Away
        } else {
            // Double no-show: award the home slot so the outcome is
            // deterministic either way.
            Side::Home
        };
        let winner = self.participant(winner_side);
        self.winner = Some(winner);
        self.loser = Some(self.participant(winner_side.opposite()));
        self.completed_at = Some(now);
        Ok(winner)
    }

    /// Starts the match. Both sides must have checked in.
    pub fn start(&mut self, now: Timestamp) -> Result<(), MatchError> {
        self.guard_not_tombstoned()?;
        if !self.both_checked_in() {
            return Err(MatchError::CheckInIncomplete { match_id: self.id });
        }
        self.state = self.state.transition_to(MatchState::Live)?;
        self.started_at = Some(now);
        Ok(())
    }

    /// Updates the running score during live play. No state change.
    pub fn report_live_score(
        &mut self,
        reporter: ParticipantId,
        score: MatchScore,
    ) -> Result<(), MatchError> {
        self.guard_not_tombstoned()?;
        self.require_side(reporter)?;
        if self.state != MatchState::Live {
            return Err(crate::domain::foundation::ConflictError::invalid_transition(
                "Match",
                format!("{:?}", self.state),
                "Live",
            )
            .into());
        }
        self.live_score = Some(score);
        Ok(())
    }

    /// Submits a final result for confirmation.
    pub fn submit_result(
        &mut self,
        submitter: ParticipantId,
        score: MatchScore,
        allow_ties: bool,
    ) -> Result<(), MatchError> {
        self.guard_not_tombstoned()?;
        self.require_side(submitter)?;
        if score.is_tie() && !allow_ties {
            return Err(MatchError::TieNotAllowed { match_id: self.id });
        }
        self.state = self.state.transition_to(MatchState::PendingResult)?;
        self.reported_score = Some(score);
        self.reported_by = Some(submitter);
        Ok(())
    }

    /// Confirms a pending result, completing the match.
    ///
    /// The confirmer must be the opponent of the reporter, or hold at least
    /// the organizer role.
    pub fn confirm_result(
        &mut self,
        confirmer: &CallerIdentity,
        now: Timestamp,
    ) -> Result<(), MatchError> {
        self.guard_not_tombstoned()?;

        if !confirmer.has_role(Role::Organizer) {
            let participant = confirmer
                .participant_id
                .ok_or(MatchError::NotParticipant { match_id: self.id })?;
            self.require_side(participant)?;
            if self.reported_by == Some(participant) {
                return Err(MatchError::SelfConfirmation);
            }
        }

        let score = self.reported_score.ok_or_else(|| {
            ValidationError::invalid("reported_score", "no result has been submitted")
        })?;
        self.complete_with(score, now)
    }

    /// Marks the match disputed. Called by the dispute workflow once a
    /// dispute record exists.
    pub fn mark_disputed(&mut self) -> Result<(), MatchError> {
        self.guard_not_tombstoned()?;
        self.state = self.state.transition_to(MatchState::Disputed)?;
        Ok(())
    }

    /// Resolves a dispute by overriding or accepting with final scores.
    pub fn resolve_with_score(
        &mut self,
        final_score: MatchScore,
        now: Timestamp,
    ) -> Result<(), MatchError> {
        self.guard_not_tombstoned()?;
        if self.state != MatchState::Disputed {
            self.state.transition_to(MatchState::Completed)?;
        }
        self.complete_with(final_score, now)
    }

    /// Resolves a dispute by resetting the match for a rematch.
    pub fn resolve_rematch(
        &mut self,
        scheduled_at: Option<Timestamp>,
        check_in_deadline: Option<Timestamp>,
    ) -> Result<(), MatchError> {
        self.guard_not_tombstoned()?;
        self.state = self.state.transition_to(MatchState::Scheduled)?;
        self.home_checked_in = false;
        self.away_checked_in = false;
        self.score = None;
        self.reported_score = None;
        self.reported_by = None;
        self.live_score = None;
        self.scheduled_at = scheduled_at;
        self.check_in_deadline = check_in_deadline;
        self.started_at = None;
        self.completed_at = None;
        self.winner = None;
        self.loser = None;
        self.rematch_count += 1;
        Ok(())
    }

    /// Resolves a dispute by disqualifying a participant.
    pub fn resolve_disqualify(
        &mut self,
        disqualified: ParticipantId,
        now: Timestamp,
    ) -> Result<(), MatchError> {
        self.guard_not_tombstoned()?;
        let side = self.require_side(disqualified)?;
        self.state = self.state.transition_to(MatchState::Forfeit)?;
        self.winner = Some(self.participant(side.opposite()));
        self.loser = Some(disqualified);
        self.completed_at = Some(now);
        Ok(())
    }

    /// Cancels the match. Permitted from any non-terminal state.
    pub fn cancel(&mut self) -> Result<(), MatchError> {
        self.guard_not_tombstoned()?;
        self.state = self.state.transition_to(MatchState::Cancelled)?;
        Ok(())
    }

    /// Retires the record. Tombstoned matches reject every operation.
    pub fn tombstone(&mut self) {
        self.tombstoned = true;
    }

    fn complete_with(&mut self, score: MatchScore, now: Timestamp) -> Result<(), MatchError> {
        // A completed match must carry a winner, so a tie can never
        // complete even when the tie policy allowed submitting one.
        let winner_side = score
            .winner_side()
            .ok_or(MatchError::TieNotAllowed { match_id: self.id })?;
        self.state = self.state.transition_to(MatchState::Completed)?;
        self.score = Some(score);
        self.winner = Some(self.participant(winner_side));
        self.loser = Some(self.participant(winner_side.opposite()));
        self.completed_at = Some(now);
        Ok(())
    }
}
