// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::bracket::{Bracket, Match, MatchStatus, SlotIndex};
use crate::types::{Participant, ParticipantId, ParticipantStatus, Tiebreaker, TournamentFormat};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// One row of the standings table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    /// The participant.
    pub participant_id: ParticipantId,
    /// Their seed.
    pub seed: Option<u32>,
    /// Their status.
    pub status: ParticipantStatus,
    /// Completed matches played.
    pub played: u32,
    /// Completed matches won.
    pub wins: u32,
    /// Completed matches lost.
    pub losses: u32,
    /// Points scored across completed matches.
    pub points_for: u32,
    /// Points conceded across completed matches.
    pub points_against: u32,
    /// Final placement, once known.
    pub placement: Option<u32>,
}

impl Standing {
    fn new(participant: &Participant) -> Self {
        Self {
            participant_id: participant.id,
            seed: participant.seed,
            status: participant.status,
            played: 0,
            wins: 0,
            losses: 0,
            points_for: 0,
            points_against: 0,
            placement: participant.final_placement,
        }
    }

    fn differential(&self) -> i64 {
        i64::from(self.points_for) - i64::from(self.points_against)
    }
}

fn completed(bracket: &Bracket) -> impl Iterator<Item = &Match> {
    bracket
        .matches
        .iter()
        .filter(|m| m.status == MatchStatus::Completed)
}

fn bracket_members(bracket: &Bracket) -> HashSet<ParticipantId> {
    bracket
        .matches
        .iter()
        .flat_map(|m| m.slots.iter().filter_map(crate::bracket::Slot::participant))
        .collect()
}

fn tally(participants: &[Participant], bracket: Option<&Bracket>) -> Vec<Standing> {
    let Some(bracket) = bracket else {
        return participants
            .iter()
            .filter(|p| p.is_active())
            .map(Standing::new)
            .collect();
    };
    let members: HashSet<ParticipantId> = bracket_members(bracket);
    let mut rows: Vec<Standing> = participants
        .iter()
        .filter(|p| members.contains(&p.id))
        .map(Standing::new)
        .collect();
    let index: HashMap<ParticipantId, usize> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| (row.participant_id, idx))
        .collect();

    for m in completed(bracket) {
        let scores: [u32; 2] = [m.score_p1.unwrap_or(0), m.score_p2.unwrap_or(0)];
        for slot in [SlotIndex::First, SlotIndex::Second] {
            let Some(row) = m.participant(slot).and_then(|id| index.get(&id).copied()) else {
                continue;
            };
            let row: &mut Standing = &mut rows[row];
            row.played += 1;
            row.points_for += scores[slot.index()];
            row.points_against += scores[slot.other().index()];
            if m.winner == Some(row.participant_id) {
                row.wins += 1;
            } else {
                row.losses += 1;
            }
        }
    }
    rows
}

/// Computes the standings table.
///
/// Elimination formats are ordered by placement, then wins. Round robin is
/// ordered by wins descending, then by the tournament's tiebreakers.
///
/// # Arguments
///
/// * `participants` - All participants of the tournament
/// * `bracket` - The bracket, if generated
/// * `tiebreakers` - Round-robin tiebreak order
#[must_use]
pub fn compute_standings(
    participants: &[Participant],
    bracket: Option<&Bracket>,
    tiebreakers: &[Tiebreaker],
) -> Vec<Standing> {
    let mut rows: Vec<Standing> = tally(participants, bracket);
    match bracket {
        Some(bracket) if bracket.bracket_type == TournamentFormat::RoundRobin => {
            let order: Vec<ParticipantId> = rank_rows(&rows, bracket, tiebreakers);
            let position: HashMap<ParticipantId, usize> =
                order.into_iter().enumerate().map(|(i, id)| (id, i)).collect();
            rows.sort_by_key(|row| position.get(&row.participant_id).copied());
        }
        _ => {
            rows.sort_by_key(|row| {
                (
                    row.placement.is_none(),
                    row.placement,
                    std::cmp::Reverse(row.wins),
                    row.seed.is_none(),
                    row.seed,
                    row.participant_id,
                )
            });
        }
    }
    rows
}

/// Ranks round-robin participants from first to last.
///
/// Ties on wins are broken by applying `tiebreakers` in order. Whenever a
/// criterion splits a tied group, each resulting subgroup is re-examined from
/// the first criterion, so head-to-head is always computed among exactly the
/// participants still tied. Seed, then participant id, settles anything left.
#[must_use]
pub fn round_robin_ranking(
    participants: &[Participant],
    bracket: &Bracket,
    tiebreakers: &[Tiebreaker],
) -> Vec<ParticipantId> {
    let rows: Vec<Standing> = tally(participants, Some(bracket));
    rank_rows(&rows, bracket, tiebreakers)
}

fn rank_rows(
    rows: &[Standing],
    bracket: &Bracket,
    tiebreakers: &[Tiebreaker],
) -> Vec<ParticipantId> {
    let by_id: HashMap<ParticipantId, &Standing> =
        rows.iter().map(|row| (row.participant_id, row)).collect();
    let mut ordered: Vec<&Standing> = rows.iter().collect();
    ordered.sort_by_key(|row| std::cmp::Reverse(row.wins));

    let mut result: Vec<ParticipantId> = Vec::with_capacity(rows.len());
    for group in ordered.chunk_by(|a, b| a.wins == b.wins) {
        let ids: Vec<ParticipantId> = group.iter().map(|row| row.participant_id).collect();
        result.extend(break_ties(ids, &by_id, bracket, tiebreakers, tiebreakers));
    }
    result
}

fn break_ties(
    group: Vec<ParticipantId>,
    rows: &HashMap<ParticipantId, &Standing>,
    bracket: &Bracket,
    all: &[Tiebreaker],
    remaining: &[Tiebreaker],
) -> Vec<ParticipantId> {
    if group.len() <= 1 {
        return group;
    }
    let Some((criterion, rest)) = remaining.split_first() else {
        let mut group: Vec<ParticipantId> = group;
        group.sort_by_key(|id| {
            let seed: Option<u32> = rows.get(id).and_then(|row| row.seed);
            (seed.is_none(), seed, *id)
        });
        return group;
    };

    let members: HashSet<ParticipantId> = group.iter().copied().collect();
    let score = |id: &ParticipantId| -> i64 {
        match criterion {
            Tiebreaker::HeadToHead => completed(bracket)
                .filter(|m| m.winner == Some(*id))
                .filter(|m| m.loser().is_some_and(|loser| members.contains(&loser)))
                .fold(0, |acc: i64, _| acc + 1),
            Tiebreaker::ScoreDifferential => rows.get(id).map_or(0, |row| row.differential()),
            Tiebreaker::Seed => {
                -i64::from(rows.get(id).and_then(|row| row.seed).unwrap_or(u32::MAX))
            }
        }
    };

    let mut keyed: Vec<(i64, ParticipantId)> = group.iter().map(|id| (score(id), *id)).collect();
    keyed.sort_by_key(|(key, _)| std::cmp::Reverse(*key));
    let partitions: Vec<Vec<ParticipantId>> = keyed
        .chunk_by(|a, b| a.0 == b.0)
        .map(|chunk| chunk.iter().map(|(_, id)| *id).collect())
        .collect();

    if partitions.len() == 1 {
        return break_ties(group, rows, bracket, all, rest);
    }
    partitions
        .into_iter()
        .flat_map(|partition| break_ties(partition, rows, bracket, all, all))
        .collect()
}
