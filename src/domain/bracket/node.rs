//! Bracket tree structure.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MatchId, ParticipantId, TournamentId};

/// Index of a node within the bracket's heap-ordered node vector.
pub type NodeIndex = usize;

/// One node of the bracket tree.
///
/// A node holds (or will hold) one match. Its two slots fill either from
/// seeding (first round), from a bye, or from a child node's winner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BracketNode {
    /// Round number, 1-based; the final is the highest round.
    pub round: u32,
    /// Position within the round, 1-based.
    pub position: u32,
    /// The two participant slots, filled as the bracket progresses.
    pub slots: [Option<ParticipantId>; 2],
    /// The materialized match, once both slots are filled.
    pub match_id: Option<MatchId>,
    /// The winner once this node is decided. Byes decide first-round nodes
    /// without a match.
    pub decided: Option<ParticipantId>,
    /// Where the loser would advance to. Reserved for double elimination;
    /// never populated by this engine.
    pub loser_advances_to: Option<NodeIndex>,
}

impl BracketNode {
    pub(crate) fn new(round: u32, position: u32) -> Self {
        Self {
            round,
            position,
            slots: [None, None],
            match_id: None,
            decided: None,
            loser_advances_to: None,
        }
    }

    /// Returns true when both slots are filled.
    pub fn is_full(&self) -> bool {
        self.slots[0].is_some() && self.slots[1].is_some()
    }

    /// Returns true when this node still needs play to decide it.
    pub fn is_pending(&self) -> bool {
        self.decided.is_none()
    }
}

/// The bracket: an ordered forest of nodes in heap layout.
///
/// Index 0 is the final; children of node `i` sit at `2i + 1` and `2i + 2`.
/// First-round nodes occupy the last level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bracket {
    pub tournament_id: TournamentId,
    /// Total rounds; always `ceil(log2(participant_count))`.
    pub rounds: u32,
    pub participant_count: u32,
    /// Seed order: `seeds[0]` is seed 1.
    pub seeds: Vec<ParticipantId>,
    pub nodes: Vec<BracketNode>,
}

impl Bracket {
    /// Index of the final.
    pub const ROOT: NodeIndex = 0;

    /// Returns the parent index, or `None` for the root.
    pub fn parent(&self, index: NodeIndex) -> Option<NodeIndex> {
        if index == Self::ROOT {
            None
        } else {
            Some((index - 1) / 2)
        }
    }

    /// Returns the child indices, or `None` for first-round nodes.
    pub fn children(&self, index: NodeIndex) -> Option<(NodeIndex, NodeIndex)> {
        let left = 2 * index + 1;
        if left < self.nodes.len() {
            Some((left, left + 1))
        } else {
            None
        }
    }

    /// The champion, once the final is decided.
    pub fn champion(&self) -> Option<ParticipantId> {
        self.nodes[Self::ROOT].decided
    }

    /// Seed number (1-based) of a participant.
    pub fn seed_number(&self, participant: ParticipantId) -> Option<u32> {
        self.seeds
            .iter()
            .position(|&p| p == participant)
            .map(|i| i as u32 + 1)
    }

    /// Number of bye slots granted during generation.
    pub fn bye_count(&self) -> u32 {
        (1u32 << self.rounds) - self.participant_count
    }

    /// Nodes that are full but have no match attached yet.
    pub fn nodes_awaiting_match(&self) -> Vec<NodeIndex> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_full() && n.match_id.is_none() && n.is_pending())
            .map(|(i, _)| i)
            .collect()
    }

    /// Nodes whose outcome is still open (excluding byes, which decide
    /// without play).
    pub fn pending_nodes(&self) -> Vec<NodeIndex> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_pending())
            .map(|(i, _)| i)
            .collect()
    }

    /// Finds the node owning a match.
    pub fn node_of_match(&self, match_id: MatchId) -> Option<NodeIndex> {
        self.nodes
            .iter()
            .position(|n| n.match_id == Some(match_id))
    }

    /// Attaches a materialized match to a node.
    pub fn attach_match(&mut self, index: NodeIndex, match_id: MatchId) {
        self.nodes[index].match_id = Some(match_id);
    }

    /// Returns true once any decision beyond generation-time byes exists;
    /// used to refuse regeneration after play began.
    pub fn has_progress(&self) -> bool {
        self.nodes
            .iter()
            .any(|n| n.decided.is_some() && n.match_id.is_some())
            || self
                .nodes
                .iter()
                .any(|n| n.round > 1 && n.decided.is_some())
    }

    /// Node indices on the path from a first-round node up to the final,
    /// starting at `index` and ending at the root.
    pub fn path_to_root(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut path = vec![index];
        let mut current = index;
        while let Some(parent) = self.parent(current) {
            path.push(parent);
            current = parent;
        }
        path
    }
}
