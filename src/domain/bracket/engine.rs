//! Bracket generation and winner propagation.

use crate::domain::foundation::{MatchId, ParticipantId, TournamentId, ValidationError};

use super::{seed_order, Bracket, BracketError, BracketNode, NodeIndex, SeedEntry, SeedingPolicy};

/// Outcome of advancing a completed match through the bracket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvanceOutcome {
    /// The node the completed match decided.
    pub node: NodeIndex,
    /// Parent node that became fully populated and now needs a match.
    pub filled_parent: Option<NodeIndex>,
    /// Set when the final was decided.
    pub champion: Option<ParticipantId>,
}

/// Generates brackets and advances winners through them.
pub struct BracketEngine;

impl BracketEngine {
    /// Builds a bracket sized to the next power of two.
    ///
    /// Seeds are placed in standard order (seed 1 and seed 2 can only meet
    /// in the final); the padding slots pair against the best seeds, so
    /// byes go to the lowest seed numbers first. Bye nodes decide
    /// immediately without a match and their winners pre-fill the next
    /// round.
    pub fn generate(
        tournament_id: TournamentId,
        entries: &[SeedEntry],
        policy: &SeedingPolicy,
    ) -> Result<Bracket, BracketError> {
        let seeds = seed_order(entries, policy)?;
        let n = seeds.len() as u32;
        let rounds = u32::BITS - (n - 1).leading_zeros();
        let slots = 1u32 << rounds;
        let node_count = (slots - 1) as usize;

        let mut nodes = Vec::with_capacity(node_count);
        for i in 0..node_count {
            let depth = (i as u32 + 1).ilog2();
            let first_at_depth = (1usize << depth) - 1;
            nodes.push(BracketNode::new(
                rounds - depth,
                (i - first_at_depth) as u32 + 1,
            ));
        }

        let mut bracket = Bracket {
            tournament_id,
            rounds,
            participant_count: n,
            seeds: seeds.clone(),
            nodes,
        };

        // Fill first-round slots by standard seed placement.
        let first_leaf = (slots / 2 - 1) as usize;
        for (slot_index, seed_number) in standard_slot_order(slots).into_iter().enumerate() {
            let leaf = first_leaf + slot_index / 2;
            let side = slot_index % 2;
            bracket.nodes[leaf].slots[side] =
                (seed_number <= n).then(|| seeds[(seed_number - 1) as usize]);
        }

        // Byes decide their node without a match.
        for node in &mut bracket.nodes[first_leaf..] {
            if let (Some(p), None) | (None, Some(p)) = (node.slots[0], node.slots[1]) {
                node.decided = Some(p);
            }
        }

        // Pre-fill second-round slots from bye winners.
        for index in (1..node_count).rev() {
            if let Some(winner) = bracket.nodes[index].decided {
                let parent = (index - 1) / 2;
                let side = (index + 1) % 2;
                bracket.nodes[parent].slots[side] = Some(winner);
            }
        }

        Ok(bracket)
    }

    /// Propagates a decided match's winner into the parent node.
    pub fn advance(
        bracket: &mut Bracket,
        match_id: MatchId,
        winner: ParticipantId,
    ) -> Result<AdvanceOutcome, BracketError> {
        let index = bracket
            .node_of_match(match_id)
            .ok_or(BracketError::UnknownMatch { match_id })?;

        if bracket.nodes[index].decided.is_some() {
            return Err(BracketError::NodeAlreadyDecided { index });
        }
        if !bracket.nodes[index]
            .slots
            .iter()
            .any(|slot| *slot == Some(winner))
        {
            return Err(ValidationError::invalid(
                "winner",
                format!("participant {} does not occupy node {}", winner, index),
            )
            .into());
        }

        bracket.nodes[index].decided = Some(winner);

        let Some(parent) = bracket.parent(index) else {
            return Ok(AdvanceOutcome {
                node: index,
                filled_parent: None,
                champion: Some(winner),
            });
        };

        let side = (index + 1) % 2;
        bracket.nodes[parent].slots[side] = Some(winner);

        let filled_parent = (bracket.nodes[parent].is_full()
            && bracket.nodes[parent].match_id.is_none())
        .then_some(parent);

        Ok(AdvanceOutcome {
            node: index,
            filled_parent,
            champion: None,
        })
    }
}

/// Standard single-elimination slot order for a field of `slots` entries.
///
/// Returns the seed number occupying each slot; adjacent pairs form the
/// first-round pairings, e.g. for 8 slots: (1,8), (4,5), (2,7), (3,6).
fn standard_slot_order(slots: u32) -> Vec<u32> {
    let mut order = vec![1u32];
    let mut size = 1;
    while size < slots {
        size *= 2;
        let mut next = Vec::with_capacity(size as usize);
        for &seed in &order {
            next.push(seed);
            next.push(size + 1 - seed);
        }
        order = next;
    }
    order
}
