//! Seeding policies.
//!
//! A policy turns the registered entries into a seed order: position 0 is
//! seed 1. Ranked seeding is deterministic; ties on the external rank score
//! fall back to tenure, then to the participant identifier, so identical
//! inputs always yield identical orders.

use rand::seq::SliceRandom;

use crate::domain::foundation::{ParticipantId, ValidationError};

use super::BracketError;

/// One registered entry with the attributes seeding may consult.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedEntry {
    pub id: ParticipantId,
    /// External ranking score. Required for ranked seeding.
    pub rank: Option<i64>,
    /// Days since the participant registered on the platform.
    pub tenure_days: Option<u32>,
    /// Whether this entry type participates in the ranking system at all.
    pub ranked_eligible: bool,
}

impl SeedEntry {
    /// Creates an entry with no ranking attributes.
    pub fn new(id: ParticipantId) -> Self {
        Self {
            id,
            rank: None,
            tenure_days: None,
            ranked_eligible: true,
        }
    }

    /// Sets the external rank score.
    pub fn with_rank(mut self, rank: i64) -> Self {
        self.rank = Some(rank);
        self
    }

    /// Sets the tenure used as the first rank tie-break.
    pub fn with_tenure_days(mut self, days: u32) -> Self {
        self.tenure_days = Some(days);
        self
    }

    /// Marks the entry as outside the ranking system.
    pub fn unranked_entity(mut self) -> Self {
        self.ranked_eligible = false;
        self
    }
}

/// How initial bracket placement is decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedingPolicy {
    /// In registration order.
    SlotOrder,
    /// Uniform random shuffle.
    Random,
    /// Caller-provided order; must be a permutation of the entries.
    Manual(Vec<ParticipantId>),
    /// By external rank score, descending, with deterministic tie-breaks.
    Ranked,
}

/// Computes the seed order for the given entries under a policy.
pub fn seed_order(
    entries: &[SeedEntry],
    policy: &SeedingPolicy,
) -> Result<Vec<ParticipantId>, BracketError> {
    if entries.len() < 2 {
        return Err(BracketError::TooFewParticipants {
            actual: entries.len(),
        });
    }
    let mut seen = std::collections::HashSet::new();
    for entry in entries {
        if !seen.insert(entry.id) {
            return Err(ValidationError::invalid(
                "participants",
                format!("participant {} registered twice", entry.id),
            )
            .into());
        }
    }

    match policy {
        SeedingPolicy::SlotOrder => Ok(entries.iter().map(|e| e.id).collect()),
        SeedingPolicy::Random => {
            let mut order: Vec<ParticipantId> = entries.iter().map(|e| e.id).collect();
            order.shuffle(&mut rand::thread_rng());
            Ok(order)
        }
        SeedingPolicy::Manual(order) => {
            let given: std::collections::HashSet<_> = order.iter().copied().collect();
            if order.len() != entries.len() || given.len() != order.len() || !seen.eq(&given) {
                return Err(ValidationError::invalid(
                    "seed_order",
                    "manual order must be a permutation of the registered participants",
                )
                .into());
            }
            Ok(order.clone())
        }
        SeedingPolicy::Ranked => ranked_order(entries),
    }
}

fn ranked_order(entries: &[SeedEntry]) -> Result<Vec<ParticipantId>, BracketError> {
    for entry in entries {
        if !entry.ranked_eligible {
            return Err(ValidationError::invalid(
                "seed_order",
                format!("participant {} is not a ranked-eligible entry", entry.id),
            )
            .into());
        }
        if entry.rank.is_none() {
            return Err(ValidationError::invalid(
                "seed_order",
                format!("participant {} has no rank", entry.id),
            )
            .into());
        }
    }

    let mut ordered: Vec<&SeedEntry> = entries.iter().collect();
    // Rank descending, tenure descending, identifier ascending. The sort is
    // stable but the full key already makes the order total.
    ordered.sort_by(|a, b| {
        b.rank
            .cmp(&a.rank)
            .then_with(|| b.tenure_days.unwrap_or(0).cmp(&a.tenure_days.unwrap_or(0)))
            .then_with(|| a.id.cmp(&b.id))
    });
    Ok(ordered.into_iter().map(|e| e.id).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(order: &[ParticipantId]) -> Vec<i64> {
        order.iter().map(|p| p.as_i64()).collect()
    }

    fn entries(n: i64) -> Vec<SeedEntry> {
        (1..=n).map(|i| SeedEntry::new(ParticipantId::new(i))).collect()
    }

    #[test]
    fn slot_order_preserves_registration_order() {
        let order = seed_order(&entries(4), &SeedingPolicy::SlotOrder).unwrap();
        assert_eq!(ids(&order), vec![1, 2, 3, 4]);
    }

    #[test]
    fn random_is_a_permutation() {
        let input = entries(16);
        let order = seed_order(&input, &SeedingPolicy::Random).unwrap();
        let mut sorted = ids(&order);
        sorted.sort();
        assert_eq!(sorted, (1..=16).collect::<Vec<_>>());
    }

    #[test]
    fn manual_rejects_non_permutation() {
        let input = entries(3);
        let bad = SeedingPolicy::Manual(vec![
            ParticipantId::new(1),
            ParticipantId::new(2),
            ParticipantId::new(9),
        ]);
        assert!(seed_order(&input, &bad).is_err());

        let short = SeedingPolicy::Manual(vec![ParticipantId::new(1)]);
        assert!(seed_order(&input, &short).is_err());
    }

    #[test]
    fn manual_accepts_valid_permutation() {
        let input = entries(3);
        let order = seed_order(
            &input,
            &SeedingPolicy::Manual(vec![
                ParticipantId::new(3),
                ParticipantId::new(1),
                ParticipantId::new(2),
            ]),
        )
        .unwrap();
        assert_eq!(ids(&order), vec![3, 1, 2]);
    }

    #[test]
    fn ranked_sorts_by_rank_then_tenure_then_id() {
        let input = vec![
            SeedEntry::new(ParticipantId::new(5)).with_rank(100).with_tenure_days(10),
            SeedEntry::new(ParticipantId::new(3)).with_rank(200),
            SeedEntry::new(ParticipantId::new(4)).with_rank(100).with_tenure_days(30),
            SeedEntry::new(ParticipantId::new(1)).with_rank(100).with_tenure_days(10),
        ];
        let order = seed_order(&input, &SeedingPolicy::Ranked).unwrap();
        // 3 leads on rank; 4 wins the tenure tie-break; 1 beats 5 on id.
        assert_eq!(ids(&order), vec![3, 4, 1, 5]);
    }

    #[test]
    fn ranked_is_deterministic() {
        let input: Vec<SeedEntry> = (1..=8)
            .map(|i| SeedEntry::new(ParticipantId::new(i)).with_rank(50))
            .collect();
        let first = seed_order(&input, &SeedingPolicy::Ranked).unwrap();
        let second = seed_order(&input, &SeedingPolicy::Ranked).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn ranked_requires_rank_for_everyone() {
        let mut input = entries(3);
        input[1] = input[1].clone().with_rank(10);
        let err = seed_order(&input, &SeedingPolicy::Ranked).unwrap_err();
        assert!(matches!(err, BracketError::Validation(_)));
    }

    #[test]
    fn ranked_rejects_ineligible_entries() {
        let input = vec![
            SeedEntry::new(ParticipantId::new(1)).with_rank(10),
            SeedEntry::new(ParticipantId::new(2)).with_rank(20).unranked_entity(),
        ];
        assert!(seed_order(&input, &SeedingPolicy::Ranked).is_err());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let input = vec![
            SeedEntry::new(ParticipantId::new(1)),
            SeedEntry::new(ParticipantId::new(1)),
        ];
        assert!(seed_order(&input, &SeedingPolicy::SlotOrder).is_err());
    }
}
