//! Dispute review state machine.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Review state of one dispute. `Resolved` is the only terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisputeStatus {
    /// Filed and waiting for a reviewer.
    Open,
    /// A reviewer has taken it.
    UnderReview,
    /// Handed up to an admin.
    Escalated,
    /// A decision was applied to the match.
    Resolved,
}

impl StateMachine for DisputeStatus {
    const ENTITY: &'static str = "Dispute";

    fn can_transition_to(&self, target: &Self) -> bool {
        use DisputeStatus::*;
        matches!(
            (self, target),
            (Open, UnderReview)
                | (UnderReview, Resolved)
                | (UnderReview, Escalated)
                | (Escalated, Resolved)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use DisputeStatus::*;
        match self {
            Open => vec![UnderReview],
            UnderReview => vec![Resolved, Escalated],
            Escalated => vec![Resolved],
            Resolved => vec![],
        }
    }
}
