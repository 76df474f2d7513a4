// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{Participant, ParticipantId};
use std::collections::HashSet;

/// Returns the number of elimination rounds for `count` entrants: `ceil(log2(count))`.
///
/// Returns 0 for fewer than two entrants.
#[must_use]
pub const fn rounds_for(count: u32) -> u32 {
    if count < 2 {
        0
    } else {
        (count - 1).ilog2() + 1
    }
}

/// Returns the standard seed order for a power-of-two bracket of `size` slots.
///
/// Adjacent pairs of the result are the first-round pairings. Seeds 1 and 2
/// land in opposite halves, 1-4 in separate quarters, and so on recursively.
///
/// # Arguments
///
/// * `size` - The bracket size; must be a power of two
///
/// # Returns
///
/// A permutation of `1..=size`.
#[must_use]
pub fn standard_seed_order(size: u32) -> Vec<u32> {
    let mut order: Vec<u32> = vec![1];
    let mut current: u32 = 1;
    while current < size {
        current *= 2;
        order = order
            .iter()
            .flat_map(|seed| [*seed, current + 1 - *seed])
            .collect();
    }
    order
}

/// Orders participants for bracket placement.
///
/// Seeded participants come first by ascending seed; unseeded participants
/// follow in registration order (id order breaks exact ties).
#[must_use]
pub fn seeding_order(participants: &[&Participant]) -> Vec<ParticipantId> {
    let mut ranked: Vec<&Participant> = participants.to_vec();
    ranked.sort_by(|a, b| {
        let a_key = (a.seed.is_none(), a.seed, a.registered_at, a.id);
        let b_key = (b.seed.is_none(), b.seed, b.registered_at, b.id);
        a_key.cmp(&b_key)
    });
    ranked.into_iter().map(|p| p.id).collect()
}

/// Computes seed numbers for the active participants.
///
/// Ranked ids take seeds `1..` in ranking order; the remaining participants
/// follow in registration order.
///
/// # Arguments
///
/// * `active` - The active participants, in registration order
/// * `ranking` - An optional external ranking
///
/// # Returns
///
/// Pairs of participant id and assigned seed.
///
/// # Errors
///
/// Returns `NotRegistered` if the ranking names an unknown or inactive
/// participant, and `DuplicateParticipant` if it names one twice.
pub fn assign_seed_numbers(
    active: &[&Participant],
    ranking: Option<&[ParticipantId]>,
) -> Result<Vec<(ParticipantId, u32)>, DomainError> {
    let known: HashSet<ParticipantId> = active.iter().map(|p| p.id).collect();
    let mut seen: HashSet<ParticipantId> = HashSet::new();
    let mut ordered: Vec<ParticipantId> = Vec::with_capacity(active.len());

    for id in ranking.unwrap_or_default() {
        if !known.contains(id) {
            return Err(DomainError::NotRegistered(*id));
        }
        if !seen.insert(*id) {
            return Err(DomainError::DuplicateParticipant(id.to_string()));
        }
        ordered.push(*id);
    }

    let mut rest: Vec<&Participant> = active
        .iter()
        .copied()
        .filter(|p| !seen.contains(&p.id))
        .collect();
    rest.sort_by_key(|p| (p.registered_at, p.id));
    ordered.extend(rest.into_iter().map(|p| p.id));

    Ok(ordered
        .into_iter()
        .zip(1u32..)
        .collect())
}
