// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::bracket::{Bracket, BracketSide, Match, MatchId, Slot};
use crate::error::DomainError;
use crate::types::{ParticipantId, TournamentFormat};

/// Circle method: the first entrant stays fixed while the others rotate one
/// position per round. An odd field gets a phantom entrant whose pairings
/// are skipped, giving each real entrant one bye round.
#[allow(clippy::unnecessary_wraps)]
pub(super) fn build(participants: &[ParticipantId], count: u32) -> Result<Bracket, DomainError> {
    let mut circle: Vec<Option<ParticipantId>> = participants.iter().copied().map(Some).collect();
    if circle.len() % 2 == 1 {
        circle.push(None);
    }
    let seats: usize = circle.len();
    let rounds: u32 = if count % 2 == 0 { count - 1 } else { count };

    let mut bracket: Bracket = Bracket::new(TournamentFormat::RoundRobin, count, rounds, rounds);
    for round in 1..=rounds {
        let mut number: u32 = 0;
        for i in 0..seats / 2 {
            let (Some(home), Some(away)) = (circle[i], circle[seats - 1 - i]) else {
                continue;
            };
            let (first, second) = if i == 0 && round % 2 == 0 {
                (away, home)
            } else {
                (home, away)
            };
            number += 1;
            let mut m: Match = Match::new(MatchId::new(round, number), BracketSide::RoundRobin);
            m.slots = [Slot::Participant(first), Slot::Participant(second)];
            bracket.matches.push(m);
        }
        circle[1..].rotate_right(1);
    }
    Ok(bracket)
}
