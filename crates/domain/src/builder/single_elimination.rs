// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{push_winners_tree, seed_first_round};
use crate::bracket::Bracket;
use crate::error::DomainError;
use crate::seeding::rounds_for;
use crate::types::{ParticipantId, TournamentFormat};

/// `ceil(log2(N))` rounds over the next power of two; the top seeds take the byes.
pub(super) fn build(participants: &[ParticipantId], count: u32) -> Result<Bracket, DomainError> {
    let rounds: u32 = rounds_for(count);
    let size: u32 = 1 << rounds;
    let mut bracket: Bracket =
        Bracket::new(TournamentFormat::SingleElimination, size, rounds, rounds);
    push_winners_tree(&mut bracket, rounds, size);
    seed_first_round(&mut bracket, participants, size)?;
    Ok(bracket)
}
