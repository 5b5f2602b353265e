//! Final placement determination.

use std::collections::HashMap;

use crate::domain::bracket::Bracket;
use crate::domain::foundation::{
    MatchId, ParticipantId, StateMachine, Timestamp, ValidationError,
};
use crate::domain::matches::{Match, MatchState, Side};

use super::{
    DeterminationError, DeterminationMethod, Placement, TieBreakAudit, TieBreakOutcome,
    TieBreakRule, TournamentResult,
};

type RuleFn =
    fn(&Bracket, &HashMap<MatchId, Match>, ParticipantId, ParticipantId) -> (String, Option<ParticipantId>);

/// Computes final placements once every bracket match is terminal.
///
/// Pure over its inputs; persistence and the once-only guarantee live in
/// the application layer.
pub struct WinnerDeterminationEngine;

impl WinnerDeterminationEngine {
    /// Determines winner, runner-up, and third place.
    ///
    /// Fails with `Incomplete` while any node is still undecided without a
    /// terminal match. A final that ended without a winner (cancelled)
    /// sends the two finalists through the tie-break cascade; an exhausted
    /// cascade fails without producing a result.
    pub fn determine(
        bracket: &Bracket,
        matches: &HashMap<MatchId, Match>,
        now: Timestamp,
    ) -> Result<TournamentResult, DeterminationError> {
        let mut open = 0usize;
        for node in &bracket.nodes {
            if let Some(id) = node.match_id {
                let record = matches
                    .get(&id)
                    .ok_or(DeterminationError::MissingRecord { match_id: id })?;
                if node.is_pending() && !record.state.is_terminal() {
                    open += 1;
                }
            } else if node.is_pending() {
                open += 1;
            }
        }
        if open > 0 {
            return Err(DeterminationError::Incomplete { open });
        }

        let mut audit = Vec::new();
        let root = &bracket.nodes[Bracket::ROOT];

        let (winner, method) = match bracket.champion() {
            Some(champion) => (champion, DeterminationMethod::FinalMatch),
            // The final is terminal but produced no winner (cancelled).
            None => match (root.slots[0], root.slots[1]) {
                (Some(a), Some(b)) => {
                    let (winner, rule) =
                        Self::cascade(bracket, matches, Placement::Winner, a, b, &mut audit)?;
                    (winner, DeterminationMethod::TieBreak(rule))
                }
                _ => return Err(DeterminationError::Incomplete { open: 1 }),
            },
        };

        let runner_up = root
            .slots
            .iter()
            .flatten()
            .copied()
            .find(|p| *p != winner)
            .ok_or_else(|| {
                DeterminationError::from(ValidationError::invalid(
                    "bracket",
                    "final has no runner-up slot",
                ))
            })?;

        let third_place = if bracket.rounds < 2 {
            None
        } else {
            let mut candidates = Vec::new();
            if let Some((left, right)) = bracket.children(Bracket::ROOT) {
                for index in [left, right] {
                    if let Some(loser) = Self::node_loser(&bracket.nodes[index], matches) {
                        candidates.push(loser);
                    }
                }
            }
            match candidates.as_slice() {
                [] => None,
                [only] => Some(*only),
                [a, b, ..] => {
                    let (third, _) =
                        Self::cascade(bracket, matches, Placement::ThirdPlace, *a, *b, &mut audit)?;
                    Some(third)
                }
            }
        };

        let requires_review = Self::forfeit_heavy_path(bracket, matches, winner);

        Ok(TournamentResult {
            tournament_id: bracket.tournament_id,
            winner,
            runner_up,
            third_place,
            method,
            audit,
            requires_review,
            determined_at: now,
        })
    }

    fn node_loser(
        node: &crate::domain::bracket::BracketNode,
        matches: &HashMap<MatchId, Match>,
    ) -> Option<ParticipantId> {
        let record = matches.get(&node.match_id?)?;
        if record.state.is_decided() {
            record.loser
        } else {
            None
        }
    }

    /// Flags results where half or more of the played matches on the
    /// winner's path to the final were forfeits.
    fn forfeit_heavy_path(
        bracket: &Bracket,
        matches: &HashMap<MatchId, Match>,
        winner: ParticipantId,
    ) -> bool {
        let leaf = bracket
            .nodes
            .iter()
            .enumerate()
            .filter(|(index, _)| bracket.children(*index).is_none())
            .find(|(_, node)| node.slots.iter().any(|slot| *slot == Some(winner)))
            .map(|(index, _)| index);
        let Some(leaf) = leaf else {
            return false;
        };

        let mut played = 0u32;
        let mut forfeits = 0u32;
        for index in bracket.path_to_root(leaf) {
            let Some(id) = bracket.nodes[index].match_id else {
                continue;
            };
            let Some(record) = matches.get(&id) else {
                continue;
            };
            if record.state.is_decided() {
                played += 1;
                if record.state == MatchState::Forfeit {
                    forfeits += 1;
                }
            }
        }
        played > 0 && forfeits * 2 >= played
    }

    /// Runs the cascade for one placement, recording every consulted rule.
    fn cascade(
        bracket: &Bracket,
        matches: &HashMap<MatchId, Match>,
        placement: Placement,
        first: ParticipantId,
        second: ParticipantId,
        audit: &mut Vec<TieBreakAudit>,
    ) -> Result<(ParticipantId, TieBreakRule), DeterminationError> {
        let rules: [(TieBreakRule, RuleFn); 4] = [
            (TieBreakRule::HeadToHead, Self::head_to_head),
            (TieBreakRule::ScoreDifferential, Self::score_differential),
            (TieBreakRule::SeedPosition, Self::seed_position),
            (TieBreakRule::EarliestCompletion, Self::earliest_completion),
        ];

        for (rule, run) in rules {
            let (detail, decided) = run(bracket, matches, first, second);
            audit.push(TieBreakAudit {
                placement,
                rule,
                detail,
                outcome: match decided {
                    Some(p) => TieBreakOutcome::Decided(p),
                    None => TieBreakOutcome::Inconclusive,
                },
            });
            if let Some(winner) = decided {
                return Ok((winner, rule));
            }
        }

        Err(DeterminationError::TieBreakUnresolved { first, second })
    }

    fn head_to_head(
        _bracket: &Bracket,
        matches: &HashMap<MatchId, Match>,
        first: ParticipantId,
        second: ParticipantId,
    ) -> (String, Option<ParticipantId>) {
        let meeting = matches
            .values()
            .filter(|m| {
                m.state.is_decided() && m.side_of(first).is_some() && m.side_of(second).is_some()
            })
            .max_by_key(|m| m.completed_at);
        match meeting.and_then(|m| m.winner) {
            Some(winner) => (
                format!("{first} vs {second}: decided meeting won by {winner}"),
                Some(winner),
            ),
            None => (format!("{first} vs {second}: no decided meeting"), None),
        }
    }

    fn score_differential(
        _bracket: &Bracket,
        matches: &HashMap<MatchId, Match>,
        first: ParticipantId,
        second: ParticipantId,
    ) -> (String, Option<ParticipantId>) {
        let first_diff = Self::differential(matches, first);
        let second_diff = Self::differential(matches, second);
        let detail = format!("{first}: {first_diff:+}, {second}: {second_diff:+}");
        match first_diff.cmp(&second_diff) {
            std::cmp::Ordering::Greater => (detail, Some(first)),
            std::cmp::Ordering::Less => (detail, Some(second)),
            std::cmp::Ordering::Equal => (detail, None),
        }
    }

    /// Aggregate score differential across a participant's completed
    /// matches. Forfeits carry no score and do not contribute.
    fn differential(matches: &HashMap<MatchId, Match>, participant: ParticipantId) -> i64 {
        matches
            .values()
            .filter(|m| m.state == MatchState::Completed)
            .filter_map(|m| {
                let side = m.side_of(participant)?;
                let score = m.score?;
                Some(match side {
                    Side::Home => i64::from(score.home) - i64::from(score.away),
                    Side::Away => i64::from(score.away) - i64::from(score.home),
                })
            })
            .sum()
    }

    fn seed_position(
        bracket: &Bracket,
        _matches: &HashMap<MatchId, Match>,
        first: ParticipantId,
        second: ParticipantId,
    ) -> (String, Option<ParticipantId>) {
        match (bracket.seed_number(first), bracket.seed_number(second)) {
            (Some(a), Some(b)) if a < b => (format!("seed {a} vs seed {b}"), Some(first)),
            (Some(a), Some(b)) if b < a => (format!("seed {a} vs seed {b}"), Some(second)),
            _ => ("seed positions unavailable".to_string(), None),
        }
    }

    fn earliest_completion(
        _bracket: &Bracket,
        matches: &HashMap<MatchId, Match>,
        first: ParticipantId,
        second: ParticipantId,
    ) -> (String, Option<ParticipantId>) {
        let first_last = Self::last_completion(matches, first);
        let second_last = Self::last_completion(matches, second);
        match (first_last, second_last) {
            (Some(a), Some(b)) if a < b => {
                (format!("{} vs {}", a.to_rfc3339(), b.to_rfc3339()), Some(first))
            }
            (Some(a), Some(b)) if b < a => {
                (format!("{} vs {}", a.to_rfc3339(), b.to_rfc3339()), Some(second))
            }
            _ => ("completion times indistinguishable".to_string(), None),
        }
    }

    fn last_completion(
        matches: &HashMap<MatchId, Match>,
        participant: ParticipantId,
    ) -> Option<Timestamp> {
        matches
            .values()
            .filter(|m| m.state.is_decided() && m.side_of(participant).is_some())
            .filter_map(|m| m.completed_at)
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bracket::{BracketEngine, NodeIndex, SeedEntry, SeedingPolicy};
    use crate::domain::foundation::{CallerIdentity, Role, TournamentId, UserId};
    use crate::domain::matches::MatchScore;

    fn organizer() -> CallerIdentity {
        CallerIdentity::new(UserId::new("org-1").unwrap(), Role::Organizer, None)
    }

    fn bracket(n: i64) -> Bracket {
        let entries: Vec<SeedEntry> =
            (1..=n).map(|i| SeedEntry::new(ParticipantId::new(i))).collect();
        BracketEngine::generate(TournamentId::new(), &entries, &SeedingPolicy::SlotOrder).unwrap()
    }

    fn attach_all(bracket: &mut Bracket, matches: &mut HashMap<MatchId, Match>) {
        for index in bracket.nodes_awaiting_match() {
            let node = bracket.nodes[index].clone();
            let m = Match::new(
                MatchId::new(),
                bracket.tournament_id,
                node.round,
                node.position,
                node.slots[0].unwrap(),
                node.slots[1].unwrap(),
                None,
                None,
            )
            .unwrap();
            let id = m.id;
            bracket.attach_match(index, id);
            matches.insert(id, m);
        }
    }

    fn complete_node(
        bracket: &mut Bracket,
        matches: &mut HashMap<MatchId, Match>,
        index: NodeIndex,
        home: i64,
        away: i64,
        at: Timestamp,
    ) {
        let id = bracket.nodes[index].match_id.unwrap();
        let m = matches.get_mut(&id).unwrap();
        m.start(at).unwrap();
        let reporter = m.home;
        m.submit_result(reporter, MatchScore::new(home, away).unwrap(), false)
            .unwrap();
        m.confirm_result(&organizer(), at).unwrap();
        let winner = m.winner.unwrap();
        BracketEngine::advance(bracket, id, winner).unwrap();
    }

    fn forfeit_node(
        bracket: &mut Bracket,
        matches: &mut HashMap<MatchId, Match>,
        index: NodeIndex,
        winner_home: bool,
        at: Timestamp,
    ) {
        let node = bracket.nodes[index].clone();
        let mut m = Match::new(
            MatchId::new(),
            bracket.tournament_id,
            node.round,
            node.position,
            node.slots[0].unwrap(),
            node.slots[1].unwrap(),
            Some(at),
            Some(at.plus_secs(60)),
        )
        .unwrap();
        if winner_home {
            m.home_checked_in = true;
        } else {
            m.away_checked_in = true;
        }
        let winner = m.forfeit_no_show(at.plus_secs(120)).unwrap();
        let id = m.id;
        if let Some(old) = node.match_id {
            matches.remove(&old);
        }
        bracket.nodes[index].match_id = Some(id);
        matches.insert(id, m);
        BracketEngine::advance(bracket, id, winner).unwrap();
    }

    fn p(id: i64) -> ParticipantId {
        ParticipantId::new(id)
    }

    // ─── Full runs ───────────────────────────────────────────────────

    #[test]
    fn eight_player_run_places_all_three() {
        let mut b = bracket(8);
        let mut matches = HashMap::new();
        let t0 = Timestamp::from_unix_secs(1_700_000_000);

        // Round 1 pairings sit at leaves 3..=6: (1,8) (4,5) (2,7) (3,6).
        attach_all(&mut b, &mut matches);
        complete_node(&mut b, &mut matches, 3, 3, 0, t0);
        complete_node(&mut b, &mut matches, 4, 3, 2, t0.plus_secs(10));
        complete_node(&mut b, &mut matches, 5, 3, 1, t0.plus_secs(20));
        complete_node(&mut b, &mut matches, 6, 3, 0, t0.plus_secs(30));

        // Semifinals: (1,4) and (2,3).
        attach_all(&mut b, &mut matches);
        complete_node(&mut b, &mut matches, 1, 3, 1, t0.plus_secs(40));
        complete_node(&mut b, &mut matches, 2, 3, 2, t0.plus_secs(50));

        // Final: (1,2).
        attach_all(&mut b, &mut matches);
        complete_node(&mut b, &mut matches, 0, 3, 1, t0.plus_secs(60));

        let result =
            WinnerDeterminationEngine::determine(&b, &matches, t0.plus_secs(70)).unwrap();

        assert_eq!(result.winner, p(1));
        assert_eq!(result.runner_up, p(2));
        assert_eq!(result.method, DeterminationMethod::FinalMatch);
        assert!(!result.requires_review);

        // Third place falls between the semifinal losers 4 and 3. They
        // never met, so head-to-head passes and score differential
        // decides: 3 is at +2, 4 at -1.
        assert_eq!(result.third_place, Some(p(3)));
        assert_eq!(result.audit.len(), 2);
        assert_eq!(result.audit[0].placement, Placement::ThirdPlace);
        assert_eq!(result.audit[0].rule, TieBreakRule::HeadToHead);
        assert_eq!(result.audit[0].outcome, TieBreakOutcome::Inconclusive);
        assert_eq!(result.audit[1].rule, TieBreakRule::ScoreDifferential);
        assert_eq!(result.audit[1].outcome, TieBreakOutcome::Decided(p(3)));
    }

    #[test]
    fn bye_tournament_takes_sole_semifinal_loser_as_third() {
        let mut b = bracket(3);
        let mut matches = HashMap::new();
        let t0 = Timestamp::from_unix_secs(1_700_000_000);

        // Only (2,3) plays round 1; seed 1 has the bye.
        let semi = b.nodes_awaiting_match()[0];
        attach_all(&mut b, &mut matches);
        complete_node(&mut b, &mut matches, semi, 3, 1, t0);

        attach_all(&mut b, &mut matches);
        complete_node(&mut b, &mut matches, Bracket::ROOT, 2, 1, t0.plus_secs(10));

        let result =
            WinnerDeterminationEngine::determine(&b, &matches, t0.plus_secs(20)).unwrap();
        assert_eq!(result.winner, p(1));
        assert_eq!(result.runner_up, p(2));
        assert_eq!(result.third_place, Some(p(3)));
        assert!(result.audit.is_empty());
    }

    // ─── Completion guard ────────────────────────────────────────────

    #[test]
    fn open_nodes_block_determination() {
        let mut b = bracket(4);
        let mut matches = HashMap::new();
        attach_all(&mut b, &mut matches);
        complete_node(&mut b, &mut matches, 1, 2, 0, Timestamp::now());

        let err = WinnerDeterminationEngine::determine(&b, &matches, Timestamp::now()).unwrap_err();
        assert!(matches!(err, DeterminationError::Incomplete { .. }));
    }

    #[test]
    fn unconfirmed_result_blocks_determination() {
        let mut b = bracket(2);
        let mut matches = HashMap::new();
        let t0 = Timestamp::now();
        attach_all(&mut b, &mut matches);

        let id = b.nodes[Bracket::ROOT].match_id.unwrap();
        let m = matches.get_mut(&id).unwrap();
        m.start(t0).unwrap();
        let reporter = m.home;
        m.submit_result(reporter, MatchScore::new(2, 0).unwrap(), false)
            .unwrap();

        let err = WinnerDeterminationEngine::determine(&b, &matches, t0).unwrap_err();
        assert_eq!(err, DeterminationError::Incomplete { open: 1 });
    }

    #[test]
    fn dangling_match_reference_is_an_error() {
        let mut b = bracket(2);
        let mut matches = HashMap::new();
        attach_all(&mut b, &mut matches);
        matches.clear();

        let err = WinnerDeterminationEngine::determine(&b, &matches, Timestamp::now()).unwrap_err();
        assert!(matches!(err, DeterminationError::MissingRecord { .. }));
    }

    // ─── Forfeit-heavy paths ─────────────────────────────────────────

    #[test]
    fn forfeit_heavy_path_flags_review() {
        let mut b = bracket(4);
        let mut matches = HashMap::new();
        let t0 = Timestamp::from_unix_secs(1_700_000_000);

        attach_all(&mut b, &mut matches);
        forfeit_node(&mut b, &mut matches, 1, true, t0); // 1 over 4
        complete_node(&mut b, &mut matches, 2, 3, 1, t0.plus_secs(10)); // 2 over 3

        attach_all(&mut b, &mut matches);
        forfeit_node(&mut b, &mut matches, 0, true, t0.plus_secs(20)); // 1 over 2

        let result =
            WinnerDeterminationEngine::determine(&b, &matches, t0.plus_secs(30)).unwrap();
        assert_eq!(result.winner, p(1));
        assert!(result.requires_review);
    }

    #[test]
    fn single_forfeit_on_a_long_path_does_not_flag() {
        let mut b = bracket(8);
        let mut matches = HashMap::new();
        let t0 = Timestamp::from_unix_secs(1_700_000_000);

        attach_all(&mut b, &mut matches);
        forfeit_node(&mut b, &mut matches, 3, true, t0); // 1 over 8 by forfeit
        complete_node(&mut b, &mut matches, 4, 3, 2, t0.plus_secs(10));
        complete_node(&mut b, &mut matches, 5, 3, 1, t0.plus_secs(20));
        complete_node(&mut b, &mut matches, 6, 3, 0, t0.plus_secs(30));

        attach_all(&mut b, &mut matches);
        complete_node(&mut b, &mut matches, 1, 3, 1, t0.plus_secs(40));
        complete_node(&mut b, &mut matches, 2, 3, 2, t0.plus_secs(50));

        attach_all(&mut b, &mut matches);
        complete_node(&mut b, &mut matches, 0, 3, 1, t0.plus_secs(60));

        let result =
            WinnerDeterminationEngine::determine(&b, &matches, t0.plus_secs(70)).unwrap();
        assert_eq!(result.winner, p(1));
        // One forfeit out of three played matches stays under the bar.
        assert!(!result.requires_review);
    }

    // ─── Cascade ─────────────────────────────────────────────────────

    #[test]
    fn cancelled_final_falls_to_seed_position() {
        let mut b = bracket(2);
        let mut matches = HashMap::new();
        attach_all(&mut b, &mut matches);

        let id = b.nodes[Bracket::ROOT].match_id.unwrap();
        matches.get_mut(&id).unwrap().cancel().unwrap();

        let result = WinnerDeterminationEngine::determine(&b, &matches, Timestamp::now()).unwrap();
        assert_eq!(result.winner, p(1));
        assert_eq!(result.runner_up, p(2));
        assert_eq!(result.third_place, None);
        assert_eq!(
            result.method,
            DeterminationMethod::TieBreak(TieBreakRule::SeedPosition)
        );

        // Head-to-head and differential came back inconclusive first.
        let rules: Vec<TieBreakRule> = result.audit.iter().map(|a| a.rule).collect();
        assert_eq!(
            rules,
            vec![
                TieBreakRule::HeadToHead,
                TieBreakRule::ScoreDifferential,
                TieBreakRule::SeedPosition,
            ]
        );
        assert!(result.audit.iter().all(|a| a.placement == Placement::Winner));
    }

    #[test]
    fn earliest_completion_breaks_symmetric_records() {
        let mut b = bracket(4);
        let mut matches = HashMap::new();
        let t0 = Timestamp::from_unix_secs(1_700_000_000);

        // Both finalists win their semifinal 3-1, so differentials tie.
        attach_all(&mut b, &mut matches);
        complete_node(&mut b, &mut matches, 1, 3, 1, t0);
        complete_node(&mut b, &mut matches, 2, 3, 1, t0.plus_secs(60));

        attach_all(&mut b, &mut matches);
        let id = b.nodes[Bracket::ROOT].match_id.unwrap();
        matches.get_mut(&id).unwrap().cancel().unwrap();

        // Strip the seed table so the cascade has to reach rule four.
        b.seeds.clear();

        let result =
            WinnerDeterminationEngine::determine(&b, &matches, t0.plus_secs(120)).unwrap();
        assert_eq!(result.winner, p(1));
        assert_eq!(
            result.method,
            DeterminationMethod::TieBreak(TieBreakRule::EarliestCompletion)
        );
    }

    #[test]
    fn exhausted_cascade_yields_no_result() {
        let mut b = bracket(2);
        let mut matches = HashMap::new();
        attach_all(&mut b, &mut matches);

        let id = b.nodes[Bracket::ROOT].match_id.unwrap();
        matches.get_mut(&id).unwrap().cancel().unwrap();
        b.seeds.clear();

        let err = WinnerDeterminationEngine::determine(&b, &matches, Timestamp::now()).unwrap_err();
        assert!(matches!(
            err,
            DeterminationError::TieBreakUnresolved { .. }
        ));
    }
}
