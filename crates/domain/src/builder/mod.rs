// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bracket construction.
//!
//! [`build_bracket`] dispatches on the tournament format into three
//! independent algorithms that share only the [`Bracket`] arena types.
//! Construction is pure and deterministic: the same ordered participant
//! list always yields the same bracket.

mod double_elimination;
mod round_robin;
mod single_elimination;

use crate::bracket::{Bracket, BracketSide, Match, MatchId, Slot, SlotIndex, SlotRef};
use crate::error::DomainError;
use crate::seeding::standard_seed_order;
use crate::types::{ParticipantId, TournamentFormat};

/// Minimum number of participants any bracket needs.
pub const MIN_PARTICIPANTS: u32 = 2;

/// Builds the initial bracket for a format.
///
/// # Arguments
///
/// * `format` - The competition structure
/// * `participants` - Participants in seeding order (rank 1 first)
///
/// # Returns
///
/// A bracket whose first-round byes are already resolved.
///
/// # Errors
///
/// Returns `InsufficientParticipants` for fewer than two participants, or
/// `CorruptBracket` if bye propagation finds an inconsistent slot graph.
pub fn build_bracket(
    format: TournamentFormat,
    participants: &[ParticipantId],
) -> Result<Bracket, DomainError> {
    let count: u32 = u32::try_from(participants.len())
        .map_err(|_| DomainError::InvalidCapacity(u32::MAX))?;
    if count < MIN_PARTICIPANTS {
        return Err(DomainError::InsufficientParticipants {
            required: MIN_PARTICIPANTS,
            actual: count,
        });
    }

    let mut bracket: Bracket = match format {
        TournamentFormat::SingleElimination => single_elimination::build(participants, count),
        TournamentFormat::DoubleElimination => double_elimination::build(participants, count),
        TournamentFormat::RoundRobin => round_robin::build(participants, count),
    }?;
    bracket.settle_all()?;
    bracket.refresh_current_round();
    Ok(bracket)
}

/// Appends a winners tree of `rounds` rounds over `size` slots. Each match
/// feeds round `r + 1`, match `ceil(m / 2)`; the final has no successor.
fn push_winners_tree(bracket: &mut Bracket, rounds: u32, size: u32) {
    for round in 1..=rounds {
        for number in 1..=(size >> round) {
            let mut m: Match = Match::new(MatchId::new(round, number), BracketSide::Winners);
            if round < rounds {
                m.next_match_slot = Some(SlotRef::new(
                    MatchId::new(round + 1, number.div_ceil(2)),
                    SlotIndex::by_parity(number),
                ));
            }
            bracket.matches.push(m);
        }
    }
}

/// Fills the first round using the standard seed order. Ranks beyond the
/// participant count become byes.
fn seed_first_round(
    bracket: &mut Bracket,
    participants: &[ParticipantId],
    size: u32,
) -> Result<(), DomainError> {
    let occupant = |rank: u32| -> Slot {
        usize::try_from(rank - 1)
            .ok()
            .and_then(|idx| participants.get(idx))
            .map_or(Slot::Bye, |id| Slot::Participant(*id))
    };
    for (pair, number) in standard_seed_order(size).chunks_exact(2).zip(1u32..) {
        let m: &mut Match = bracket.get_mut(MatchId::new(1, number))?;
        m.slots = [occupant(pair[0]), occupant(pair[1])];
    }
    Ok(())
}
