// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod bracket;
mod builder;
mod dispute;
mod error;
mod seeding;
mod standings;
mod types;
mod validation;

#[cfg(test)]
mod tests;

pub use bracket::{
    Bracket, BracketSide, Match, MatchId, MatchStatus, Slot, SlotIndex, SlotRef,
    losers_round_count, losers_round_size,
};
pub use builder::{MIN_PARTICIPANTS, build_bracket};
pub use dispute::{DisputeRecord, DisputeResolution, ReportedResult, final_scores};
pub use error::DomainError;
pub use seeding::{assign_seed_numbers, rounds_for, seeding_order, standard_seed_order};
pub use standings::{Standing, compute_standings, round_robin_ranking};

// Re-export public types
pub use types::{
    DEFAULT_DISPUTE_WINDOW_SECS, Entrant, Participant, ParticipantId, ParticipantStatus,
    Tiebreaker, Tournament, TournamentFormat, TournamentId, TournamentSettings, TournamentStatus,
};
pub use validation::{
    MAX_NAME_LENGTH, validate_capacity, validate_configuration, validate_entrant,
    validate_scores, validate_tournament_name,
};
