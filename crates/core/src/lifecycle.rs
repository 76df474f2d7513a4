// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tournament status transitions and bracket generation.

use crate::apply::require_organizer;
use crate::command::Caller;
use crate::error::CoreError;
use crate::state::TournamentState;
use time::OffsetDateTime;
use tourney_domain::{
    Bracket, DomainError, MIN_PARTICIPANTS, Participant, ParticipantId, ParticipantStatus,
    TournamentStatus, assign_seed_numbers, build_bracket, seeding_order, validate_configuration,
};
use tracing::info;

pub(crate) fn advance(
    state: &mut TournamentState,
    caller: &Caller,
    target: TournamentStatus,
    force_close: bool,
    now: OffsetDateTime,
) -> Result<Option<String>, CoreError> {
    require_organizer(caller, "advance the tournament status")?;
    let current: TournamentStatus = state.tournament.status;
    if !current.can_transition_to(target) {
        return Err(DomainError::InvalidTournamentState {
            operation: "advance status",
            status: current,
        }
        .into());
    }

    match target {
        TournamentStatus::Registration => {
            validate_configuration(&state.tournament.name, state.tournament.max_participants)?;
        }
        TournamentStatus::CheckIn => {
            if let Some(closes_at) = state
                .tournament
                .settings
                .registration_closes_at
                .filter(|closes_at| now < *closes_at && !force_close)
            {
                return Err(DomainError::RegistrationWindowOpen { closes_at }.into());
            }
        }
        TournamentStatus::InProgress => start(state)?,
        TournamentStatus::Completed => {
            if !state.bracket()?.completed {
                return Err(DomainError::BracketIncomplete.into());
            }
        }
        TournamentStatus::Draft => {}
    }

    state.tournament.status = target;
    info!(
        tournament_id = %state.tournament.id,
        from = %current,
        to = %target,
        "Tournament status advanced"
    );
    Ok(Some(format!("Advanced status from {current} to {target}")))
}

/// Closes check-in: no-shows withdraw, and the bracket is built unless one
/// was generated explicitly.
fn start(state: &mut TournamentState) -> Result<(), CoreError> {
    for participant in &mut state.participants {
        if participant.status == ParticipantStatus::Registered {
            participant.status = ParticipantStatus::Withdrawn;
        }
    }
    let checked_in: u32 = state.active_count();
    if checked_in < MIN_PARTICIPANTS {
        return Err(DomainError::InsufficientParticipants {
            required: MIN_PARTICIPANTS,
            actual: checked_in,
        }
        .into());
    }
    if state.bracket.is_none() {
        build(state)?;
    }
    Ok(())
}

pub(crate) fn generate_bracket(
    state: &mut TournamentState,
    caller: &Caller,
    force: bool,
) -> Result<Option<String>, CoreError> {
    require_organizer(caller, "generate the bracket")?;
    match state.tournament.status {
        TournamentStatus::CheckIn | TournamentStatus::InProgress => {}
        status => {
            return Err(DomainError::InvalidTournamentState {
                operation: "generate a bracket",
                status,
            }
            .into());
        }
    }
    let replaced: bool = state.bracket.is_some();
    if replaced && !force {
        return Err(DomainError::BracketAlreadyExists.into());
    }

    for participant in &mut state.participants {
        participant.reset_progress();
    }
    state.disputes.clear();
    build(state)?;

    if replaced {
        info!(tournament_id = %state.tournament.id, "Bracket regenerated");
        Ok(Some(String::from("Regenerated bracket")))
    } else {
        Ok(Some(String::from("Generated bracket")))
    }
}

/// Seeds checked-in participants by registration order if nobody holds a
/// seed, then builds the bracket over them.
fn build(state: &mut TournamentState) -> Result<(), CoreError> {
    let unseeded: bool = state
        .participants
        .iter()
        .filter(|p| p.status == ParticipantStatus::CheckedIn)
        .all(|p| p.seed.is_none());
    if unseeded {
        let checked_in: Vec<&Participant> = state
            .participants
            .iter()
            .filter(|p| p.status == ParticipantStatus::CheckedIn)
            .collect();
        let seeds: Vec<(ParticipantId, u32)> = assign_seed_numbers(&checked_in, None)?;
        for (id, seed) in seeds {
            state.participant_mut(id)?.seed = Some(seed);
        }
    }

    let entrants: Vec<&Participant> = state
        .participants
        .iter()
        .filter(|p| p.status == ParticipantStatus::CheckedIn)
        .collect();
    let order: Vec<ParticipantId> = seeding_order(&entrants);
    let bracket: Bracket = build_bracket(state.tournament.format, &order)?;
    info!(
        tournament_id = %state.tournament.id,
        format = %bracket.bracket_type,
        participants = order.len(),
        bracket_size = bracket.bracket_size,
        total_rounds = bracket.total_rounds,
        byes = bracket.initial_byes(),
        "Bracket built"
    );
    state.bracket = Some(bracket);
    Ok(())
}
