// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::{Caller, Command};
use crate::error::CoreError;
use crate::state::{EngineEvent, TournamentConfig, TournamentState, TransitionResult};
use crate::{dispute, lifecycle, progression, registry};
use std::collections::HashMap;
use time::OffsetDateTime;
use tourney_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use tourney_domain::{
    Bracket, DomainError, MatchId, MatchStatus, ParticipantId, Slot, Tournament, TournamentId,
    TournamentStatus,
};

/// Creates a new tournament in `draft` status.
///
/// Configuration completeness is checked when registration opens, so a
/// draft may be created with a placeholder name.
///
/// # Arguments
///
/// * `id` - The store-assigned identifier
/// * `config` - The tournament configuration
/// * `caller` - The caller creating the tournament; recorded as organizer
/// * `cause` - The cause or reason for this action
/// * `now` - The current time
///
/// # Returns
///
/// The initial aggregate and its creation audit event.
///
/// # Errors
///
/// Returns an error if the name exceeds the maximum length.
pub fn create_tournament(
    id: TournamentId,
    config: TournamentConfig,
    caller: &Caller,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    if config.name.chars().count() > tourney_domain::MAX_NAME_LENGTH {
        return Err(CoreError::DomainViolation(
            DomainError::InvalidTournamentName(format!(
                "Name cannot exceed {} characters",
                tourney_domain::MAX_NAME_LENGTH
            )),
        ));
    }

    let tournament: Tournament = Tournament {
        id,
        name: config.name.trim().to_string(),
        format: config.format,
        max_participants: config.max_participants,
        status: TournamentStatus::Draft,
        settings: config.settings,
        created_at: now,
    };
    let details: String = format!(
        "Created {} tournament '{}' for up to {} participants",
        tournament.format, tournament.name, tournament.max_participants
    );
    let new_state: TournamentState = TournamentState::new(tournament);

    let audit_event: AuditEvent = AuditEvent::new(
        id,
        Actor::from_entrant(&caller.entrant, true),
        cause,
        Action::new(String::from("CreateTournament"), Some(details)),
        StateSnapshot::new(String::from("status=none")),
        new_state.to_snapshot(),
        now,
    );

    Ok(TransitionResult {
        new_state,
        audit_event: Some(audit_event),
        events: Vec::new(),
    })
}

/// Applies a command to the current tournament state.
///
/// The command is evaluated against a copy of `state`; on error the input
/// is untouched. A command that changes nothing (an identical score report,
/// a repeated check-in) yields an unchanged state with no audit event.
///
/// # Arguments
///
/// * `state` - The current aggregate (immutable)
/// * `command` - The command to apply
/// * `caller` - Who is invoking the command
/// * `cause` - The cause or reason for this action
/// * `now` - The current time
///
/// # Returns
///
/// * `Ok(TransitionResult)` containing the new state, audit event and notifications
/// * `Err(CoreError)` if the command is invalid
///
/// # Errors
///
/// Returns `DomainViolation` if the command breaks a tournament rule, and
/// `CorruptBracket` if the match graph is inconsistent.
pub fn apply(
    state: &TournamentState,
    command: Command,
    caller: &Caller,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    let action_name: &'static str = command.name();
    let mut new_state: TournamentState = state.clone();

    let details: Option<String> = match command {
        Command::AdvanceStatus {
            target,
            force_close,
        } => lifecycle::advance(&mut new_state, caller, target, force_close, now)?,
        Command::Register { entrant } => registry::register(&mut new_state, caller, entrant, now)?,
        Command::CheckIn { participant_id } => {
            registry::check_in(&mut new_state, caller, participant_id)?
        }
        Command::Withdraw { participant_id } => {
            registry::withdraw(&mut new_state, caller, participant_id, now)?
        }
        Command::AssignSeeds { ranking } => {
            registry::assign_seeds(&mut new_state, caller, ranking.as_deref())?
        }
        Command::ResetSeeds => registry::reset_seeds(&mut new_state, caller)?,
        Command::GenerateBracket { force } => {
            lifecycle::generate_bracket(&mut new_state, caller, force)?
        }
        Command::StartMatch { match_id } => {
            progression::start_match(&mut new_state, caller, match_id)?
        }
        Command::ReportScore {
            match_id,
            score_p1,
            score_p2,
        } => progression::report_score(&mut new_state, caller, match_id, score_p1, score_p2, now)?,
        Command::Dispute { match_id, reason } => {
            dispute::raise(&mut new_state, caller, match_id, reason, now)?
        }
        Command::ResolveDispute {
            match_id,
            final_winner,
            scores,
        } => dispute::resolve(&mut new_state, caller, match_id, final_winner, scores, now)?,
    };

    let Some(details) = details else {
        return Ok(TransitionResult {
            new_state: state.clone(),
            audit_event: None,
            events: Vec::new(),
        });
    };

    if let Some(bracket) = new_state.bracket.as_mut() {
        bracket.refresh_current_round();
    }

    let events: Vec<EngineEvent> = collect_events(state.bracket.as_ref(), &new_state);
    let audit_event: AuditEvent = AuditEvent::new(
        state.tournament.id,
        Actor::from_entrant(&caller.entrant, caller.is_organizer),
        cause,
        Action::new(action_name.to_string(), Some(details)),
        state.to_snapshot(),
        new_state.to_snapshot(),
        now,
    );

    Ok(TransitionResult {
        new_state,
        audit_event: Some(audit_event),
        events,
    })
}

/// Fails with `Unauthorized` unless the caller organizes the tournament.
pub(crate) const fn require_organizer(
    caller: &Caller,
    action: &'static str,
) -> Result<(), DomainError> {
    if caller.is_organizer {
        Ok(())
    } else {
        Err(DomainError::Unauthorized { action })
    }
}

/// Fails with `InvalidTournamentState` unless the tournament is in `expected`.
pub(crate) fn require_status(
    state: &TournamentState,
    expected: TournamentStatus,
    operation: &'static str,
) -> Result<(), DomainError> {
    if state.tournament.status == expected {
        Ok(())
    } else {
        Err(DomainError::InvalidTournamentState {
            operation,
            status: state.tournament.status,
        })
    }
}

/// Derives notifications by comparing match statuses before and after.
fn collect_events(before: Option<&Bracket>, after: &TournamentState) -> Vec<EngineEvent> {
    let Some(bracket) = after.bracket.as_ref() else {
        return Vec::new();
    };
    let previous: HashMap<MatchId, (MatchStatus, [Slot; 2])> = before
        .map(|b| {
            b.matches
                .iter()
                .map(|m| (m.id, (m.status, m.slots)))
                .collect()
        })
        .unwrap_or_default();

    let mut events: Vec<EngineEvent> = Vec::new();
    for m in &bracket.matches {
        let prior: Option<&(MatchStatus, [Slot; 2])> = previous.get(&m.id);
        match m.status {
            MatchStatus::Ready if prior != Some(&(MatchStatus::Ready, m.slots)) => {
                if let [Slot::Participant(first), Slot::Participant(second)] = m.slots {
                    events.push(EngineEvent::MatchReady {
                        match_id: m.id,
                        participants: [first, second],
                    });
                }
            }
            MatchStatus::Completed
                if prior.is_none_or(|(status, _)| *status != MatchStatus::Completed) =>
            {
                if let Some(winner) = m.winner {
                    events.push(EngineEvent::MatchCompleted {
                        match_id: m.id,
                        winner,
                    });
                }
            }
            _ => {}
        }
    }

    let was_completed: bool = before.is_some_and(|b| b.completed);
    if bracket.completed && !was_completed {
        let champion: Option<ParticipantId> = after
            .participants
            .iter()
            .find(|p| p.final_placement == Some(1))
            .map(|p| p.id);
        events.push(EngineEvent::TournamentCompleted { champion });
    }
    events
}
