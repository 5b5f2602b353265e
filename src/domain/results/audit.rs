//! Tie-break audit trail.
//!
//! Every rule the cascade consults leaves an entry, whether it decided the
//! placement or not, so organizers can see exactly why a placement fell the
//! way it did.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::ParticipantId;

/// Which placement a tie-break run was deciding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Winner,
    ThirdPlace,
}

/// The cascade rules, in the order they are consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreakRule {
    /// The decided match the candidates played against each other.
    HeadToHead,
    /// Aggregate score differential across each candidate's completed
    /// matches.
    ScoreDifferential,
    /// Lower seed number wins.
    SeedPosition,
    /// The candidate whose last match completed earlier wins.
    EarliestCompletion,
}

impl fmt::Display for TieBreakRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TieBreakRule::HeadToHead => "head_to_head",
            TieBreakRule::ScoreDifferential => "score_differential",
            TieBreakRule::SeedPosition => "seed_position",
            TieBreakRule::EarliestCompletion => "earliest_completion",
        };
        write!(f, "{name}")
    }
}

/// What a rule concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreakOutcome {
    Decided(ParticipantId),
    Inconclusive,
}

/// One audit entry: which rule ran, what it saw, what it concluded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TieBreakAudit {
    pub placement: Placement,
    pub rule: TieBreakRule,
    /// The inputs the rule compared, rendered for the audit log.
    pub detail: String,
    pub outcome: TieBreakOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rules_render_snake_case() {
        assert_eq!(TieBreakRule::HeadToHead.to_string(), "head_to_head");
        assert_eq!(
            TieBreakRule::EarliestCompletion.to_string(),
            "earliest_completion"
        );
    }

    #[test]
    fn audit_entries_serialize() {
        let entry = TieBreakAudit {
            placement: Placement::ThirdPlace,
            rule: TieBreakRule::SeedPosition,
            detail: "seed 3 vs seed 5".into(),
            outcome: TieBreakOutcome::Decided(ParticipantId::new(7)),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["placement"], "third_place");
        assert_eq!(json["rule"], "seed_position");
    }
}
