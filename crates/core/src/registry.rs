// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Participant registration, check-in, seeding and withdrawal.

use crate::apply::{require_organizer, require_status};
use crate::command::Caller;
use crate::error::CoreError;
use crate::progression;
use crate::state::TournamentState;
use time::OffsetDateTime;
use tourney_domain::{
    DomainError, Entrant, Participant, ParticipantId, ParticipantStatus, TournamentStatus,
    assign_seed_numbers, validate_entrant,
};
use tracing::info;

/// Fails with `Unauthorized` unless the caller is the participant or an organizer.
fn require_self_or_organizer(
    caller: &Caller,
    participant: &Participant,
    action: &'static str,
) -> Result<(), DomainError> {
    if caller.is_organizer || participant.entrant == caller.entrant {
        Ok(())
    } else {
        Err(DomainError::Unauthorized { action })
    }
}

fn require_seeding_window(state: &TournamentState, operation: &'static str) -> Result<(), DomainError> {
    match state.tournament.status {
        TournamentStatus::Registration | TournamentStatus::CheckIn => {}
        status => return Err(DomainError::InvalidTournamentState { operation, status }),
    }
    if state.bracket.is_some() {
        return Err(DomainError::BracketAlreadyExists);
    }
    Ok(())
}

pub(crate) fn register(
    state: &mut TournamentState,
    caller: &Caller,
    entrant: Entrant,
    now: OffsetDateTime,
) -> Result<Option<String>, CoreError> {
    require_status(state, TournamentStatus::Registration, "register")?;
    validate_entrant(&entrant)?;
    if !caller.is_organizer && caller.entrant != entrant {
        return Err(DomainError::Unauthorized {
            action: "register another entrant",
        }
        .into());
    }
    if state
        .participants
        .iter()
        .any(|p| p.is_active() && p.entrant == entrant)
    {
        return Err(DomainError::DuplicateParticipant(entrant.to_string()).into());
    }
    if state.active_count() >= state.tournament.max_participants {
        return Err(DomainError::CapacityExceeded {
            max_participants: state.tournament.max_participants,
        }
        .into());
    }

    let next_id: u32 = state
        .participants
        .iter()
        .map(|p| p.id.value())
        .max()
        .unwrap_or(0)
        + 1;
    let id: ParticipantId = ParticipantId::new(next_id);
    let details: String = format!("Registered {entrant} as participant {id}");
    state.participants.push(Participant::new(id, entrant, now));
    Ok(Some(details))
}

pub(crate) fn check_in(
    state: &mut TournamentState,
    caller: &Caller,
    participant_id: ParticipantId,
) -> Result<Option<String>, CoreError> {
    require_status(state, TournamentStatus::CheckIn, "check in")?;
    let participant: &mut Participant = state.participant_mut(participant_id)?;
    require_self_or_organizer(caller, participant, "check in another participant")?;
    match participant.status {
        ParticipantStatus::CheckedIn => Ok(None),
        ParticipantStatus::Registered => {
            participant.status = ParticipantStatus::CheckedIn;
            if state.bracket.take().is_some() {
                info!(
                    tournament_id = %state.tournament.id,
                    participant_id = %participant_id,
                    "Discarded bracket after late check-in"
                );
                return Ok(Some(format!(
                    "Checked in participant {participant_id} and discarded the bracket"
                )));
            }
            Ok(Some(format!("Checked in participant {participant_id}")))
        }
        ParticipantStatus::Withdrawn | ParticipantStatus::Eliminated => {
            Err(DomainError::NotRegistered(participant_id).into())
        }
    }
}

pub(crate) fn withdraw(
    state: &mut TournamentState,
    caller: &Caller,
    participant_id: ParticipantId,
    now: OffsetDateTime,
) -> Result<Option<String>, CoreError> {
    let participant: &Participant = state.participant(participant_id)?;
    require_self_or_organizer(caller, participant, "withdraw another participant")?;
    if !participant.is_active() {
        return Err(DomainError::NotRegistered(participant_id).into());
    }

    match state.tournament.status {
        TournamentStatus::Registration | TournamentStatus::CheckIn => {
            state.participant_mut(participant_id)?.status = ParticipantStatus::Withdrawn;
            if state.bracket.take().is_some() {
                info!(
                    tournament_id = %state.tournament.id,
                    participant_id = %participant_id,
                    "Discarded bracket after withdrawal during check-in"
                );
                return Ok(Some(format!(
                    "Withdrew participant {participant_id} and discarded the bracket"
                )));
            }
            Ok(Some(format!("Withdrew participant {participant_id}")))
        }
        TournamentStatus::InProgress => {
            progression::forfeit(state, caller, participant_id, now)?;
            Ok(Some(format!("Participant {participant_id} forfeited")))
        }
        status @ (TournamentStatus::Draft | TournamentStatus::Completed) => {
            Err(DomainError::InvalidTournamentState {
                operation: "withdraw",
                status,
            }
            .into())
        }
    }
}

pub(crate) fn assign_seeds(
    state: &mut TournamentState,
    caller: &Caller,
    ranking: Option<&[ParticipantId]>,
) -> Result<Option<String>, CoreError> {
    require_organizer(caller, "assign seeds")?;
    require_seeding_window(state, "assign seeds")?;
    if state.participants.iter().any(|p| p.seed.is_some()) {
        return Err(DomainError::AlreadySeeded.into());
    }

    let active: Vec<&Participant> = state.participants.iter().filter(|p| p.is_active()).collect();
    let seeds: Vec<(ParticipantId, u32)> = assign_seed_numbers(&active, ranking)?;
    for (id, seed) in &seeds {
        state.participant_mut(*id)?.seed = Some(*seed);
    }
    let source: &str = if ranking.is_some() {
        "external ranking"
    } else {
        "registration order"
    };
    Ok(Some(format!(
        "Seeded {} participants from {source}",
        seeds.len()
    )))
}

pub(crate) fn reset_seeds(
    state: &mut TournamentState,
    caller: &Caller,
) -> Result<Option<String>, CoreError> {
    require_organizer(caller, "reset seeds")?;
    require_seeding_window(state, "reset seeds")?;
    if state.participants.iter().all(|p| p.seed.is_none()) {
        return Ok(None);
    }
    for participant in &mut state.participants {
        participant.seed = None;
    }
    Ok(Some(String::from("Cleared all seeds")))
}
