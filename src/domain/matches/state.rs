//! Match lifecycle state machine.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// State of one match.
///
/// Terminal states are `Completed`, `Forfeit`, and `Cancelled`. A match
/// with a scheduled time starts in `Scheduled`; one without starts in
/// `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchState {
    /// Waiting for its scheduled time and participant check-ins.
    Scheduled,
    /// One side has checked in; waiting on the other before the deadline.
    CheckIn,
    /// Both sides checked in; waiting for an explicit start.
    Ready,
    /// Being played.
    Live,
    /// A participant submitted a result that awaits confirmation.
    PendingResult,
    /// Result confirmed; winner and loser recorded.
    Completed,
    /// A pending result is contested; the dispute workflow gates re-entry.
    Disputed,
    /// Decided by forfeit (missed check-in or disqualification).
    Forfeit,
    /// Cancelled by an organizer or admin.
    Cancelled,
}

impl StateMachine for MatchState {
    const ENTITY: &'static str = "Match";

    fn can_transition_to(&self, target: &Self) -> bool {
        use MatchState::*;
        matches!(
            (self, target),
            // Check-in phase
            (Scheduled, CheckIn)
                | (Scheduled, Ready)
                | (CheckIn, Ready)
                | (Scheduled, Forfeit) // missed check-in deadline
                | (CheckIn, Forfeit)
            // Play
                | (Ready, Live)
                | (Live, PendingResult)
            // Result settlement
                | (PendingResult, Completed)
                | (PendingResult, Disputed)
            // Dispute resolution
                | (Disputed, Completed) // override / accept
                | (Disputed, Scheduled) // rematch
                | (Disputed, Forfeit) // disqualify
            // Cancellation from any non-terminal state
                | (Scheduled, Cancelled)
                | (CheckIn, Cancelled)
                | (Ready, Cancelled)
                | (Live, Cancelled)
                | (PendingResult, Cancelled)
                | (Disputed, Cancelled)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use MatchState::*;
        match self {
            Scheduled => vec![CheckIn, Ready, Forfeit, Cancelled],
            CheckIn => vec![Ready, Forfeit, Cancelled],
            Ready => vec![Live, Cancelled],
            Live => vec![PendingResult, Cancelled],
            PendingResult => vec![Completed, Disputed, Cancelled],
            Disputed => vec![Completed, Scheduled, Forfeit, Cancelled],
            Completed | Forfeit | Cancelled => vec![],
        }
    }
}

impl MatchState {
    /// All states, for exhaustive property tests.
    pub fn all() -> [MatchState; 9] {
        use MatchState::*;
        [
            Scheduled,
            CheckIn,
            Ready,
            Live,
            PendingResult,
            Completed,
            Disputed,
            Forfeit,
            Cancelled,
        ]
    }

    /// Returns true if the match reached a decided terminal state with a
    /// winner (completed or forfeit, but not cancelled).
    pub fn is_decided(&self) -> bool {
        matches!(self, MatchState::Completed | MatchState::Forfeit)
    }
}
