// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Double elimination.
//!
//! Round numbers are global. With `W` winners rounds, winners rounds are
//! `1..=W`, losers rounds are `W+1..=3W-2` and the grand final is `3W-1`.
//! A reset grand final (round `3W`) is only added during play.
//!
//! Losers round `k` alternates between consolidating its own survivors (odd
//! `k`) and absorbing the losers of winners round `k/2 + 1` (even `k`).
//! Dropped-in losers arrive in reversed order to postpone rematches.

use super::{push_winners_tree, seed_first_round};
use crate::bracket::{
    Bracket, BracketSide, Match, MatchId, SlotIndex, SlotRef, losers_round_count,
    losers_round_size,
};
use crate::error::DomainError;
use crate::seeding::rounds_for;
use crate::types::{ParticipantId, TournamentFormat};

pub(super) fn build(participants: &[ParticipantId], count: u32) -> Result<Bracket, DomainError> {
    let w: u32 = rounds_for(count);
    let size: u32 = 1 << w;
    let losers_rounds: u32 = losers_round_count(w);
    let grand_final: MatchId = MatchId::new(3 * w - 1, 1);

    let mut bracket: Bracket =
        Bracket::new(TournamentFormat::DoubleElimination, size, 3 * w - 1, w);
    push_winners_tree(&mut bracket, w, size);

    for m in &mut bracket.matches {
        let round: u32 = m.id.round;
        let number: u32 = m.id.number;
        if round == w {
            m.next_match_slot = Some(SlotRef::new(grand_final, SlotIndex::First));
        }
        m.loser_match_slot = Some(if w == 1 {
            SlotRef::new(grand_final, SlotIndex::Second)
        } else if round == 1 {
            SlotRef::new(
                MatchId::new(w + 1, number.div_ceil(2)),
                SlotIndex::by_parity(number),
            )
        } else {
            let k: u32 = 2 * (round - 1);
            let matches_in_round: u32 = losers_round_size(size, k);
            SlotRef::new(
                MatchId::new(w + k, matches_in_round + 1 - number),
                SlotIndex::Second,
            )
        });
    }

    for k in 1..=losers_rounds {
        for number in 1..=losers_round_size(size, k) {
            let mut m: Match = Match::new(MatchId::new(w + k, number), BracketSide::Losers);
            m.next_match_slot = Some(if k == losers_rounds {
                SlotRef::new(grand_final, SlotIndex::Second)
            } else if k % 2 == 1 {
                SlotRef::new(MatchId::new(w + k + 1, number), SlotIndex::First)
            } else {
                SlotRef::new(
                    MatchId::new(w + k + 1, number.div_ceil(2)),
                    SlotIndex::by_parity(number),
                )
            });
            bracket.matches.push(m);
        }
    }

    bracket
        .matches
        .push(Match::new(grand_final, BracketSide::GrandFinal));
    seed_first_round(&mut bracket, participants, size)?;
    Ok(bracket)
}
