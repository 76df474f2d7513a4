// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Match progression: starting matches, accepting results, advancing
//! winners and losers through the slot graph, forfeits and completion.

use crate::apply::require_status;
use crate::command::Caller;
use crate::error::CoreError;
use crate::state::TournamentState;
use time::OffsetDateTime;
use tourney_domain::{
    Bracket, BracketSide, DomainError, Entrant, Match, MatchId, MatchStatus, Participant,
    ParticipantId, ParticipantStatus, Slot, SlotIndex, SlotRef, TournamentFormat,
    TournamentStatus, round_robin_ranking, validate_scores,
};
use tracing::{debug, info};

fn corrupt(message: String) -> CoreError {
    CoreError::CorruptBracket(message)
}

pub(crate) fn start_match(
    state: &mut TournamentState,
    caller: &Caller,
    match_id: MatchId,
) -> Result<Option<String>, CoreError> {
    require_status(state, TournamentStatus::InProgress, "start a match")?;
    let m: &Match = state.bracket()?.get(match_id)?;
    if !caller.is_organizer && !state.plays_in(&caller.entrant, m) {
        return Err(DomainError::Unauthorized {
            action: "start a match",
        }
        .into());
    }
    let status: MatchStatus = m.status;
    match status {
        MatchStatus::InProgress => Ok(None),
        MatchStatus::Ready => {
            state.bracket_mut()?.get_mut(match_id)?.status = MatchStatus::InProgress;
            Ok(Some(format!("Started match {match_id}")))
        }
        status => Err(DomainError::InvalidMatchState {
            match_id,
            status,
            operation: "start",
        }
        .into()),
    }
}

pub(crate) fn report_score(
    state: &mut TournamentState,
    caller: &Caller,
    match_id: MatchId,
    score_p1: u32,
    score_p2: u32,
    now: OffsetDateTime,
) -> Result<Option<String>, CoreError> {
    require_status(state, TournamentStatus::InProgress, "report a score")?;
    let m: &Match = state.bracket()?.get(match_id)?;
    if !caller.is_organizer && !state.plays_in(&caller.entrant, m) {
        return Err(DomainError::UnauthorizedReporter { match_id }.into());
    }
    match m.status {
        MatchStatus::Completed if m.score_p1 == Some(score_p1) && m.score_p2 == Some(score_p2) => {
            return Ok(None);
        }
        MatchStatus::Ready | MatchStatus::InProgress => {}
        status => {
            return Err(DomainError::InvalidMatchState {
                match_id,
                status,
                operation: "report a score for",
            }
            .into());
        }
    }
    validate_scores(score_p1, score_p2)?;

    record_result(
        state,
        match_id,
        (score_p1, score_p2),
        Some(caller.entrant.clone()),
        None,
        now,
    )?;
    Ok(Some(format!(
        "Reported {score_p1}-{score_p2} for match {match_id}"
    )))
}

/// Stores a result on a playable match and applies its consequences.
fn record_result(
    state: &mut TournamentState,
    match_id: MatchId,
    scores: (u32, u32),
    reported_by: Option<Entrant>,
    forfeited_by: Option<ParticipantId>,
    now: OffsetDateTime,
) -> Result<(), CoreError> {
    let (score_p1, score_p2) = scores;
    let m: &mut Match = state.bracket_mut()?.get_mut(match_id)?;
    let winner_slot: SlotIndex = if score_p1 > score_p2 {
        SlotIndex::First
    } else {
        SlotIndex::Second
    };
    let winner: ParticipantId = m
        .participant(winner_slot)
        .ok_or_else(|| corrupt(format!("match {match_id} has no participant in the winning slot")))?;

    m.score_p1 = Some(score_p1);
    m.score_p2 = Some(score_p2);
    m.winner = Some(winner);
    m.status = MatchStatus::Completed;
    m.reported_by = reported_by;
    m.completed_at = Some(now);
    m.forfeited_by = forfeited_by;
    debug!(
        match_id = %match_id,
        winner = %winner,
        score_p1,
        score_p2,
        forfeit = forfeited_by.is_some(),
        "Match completed"
    );

    apply_outcome(state, match_id, true)
}

/// Applies a completed match's consequences: counters, eliminations,
/// placement bands, the grand-final reset and completion.
///
/// With `advance` unset, the winner and loser are assumed to already sit in
/// their destination slots (a dispute upheld the provisional result).
///
/// # Errors
///
/// Returns `CorruptBracket` if the match has no winner and loser or a
/// destination slot is already occupied.
pub(crate) fn apply_outcome(
    state: &mut TournamentState,
    match_id: MatchId,
    advance: bool,
) -> Result<(), CoreError> {
    let bracket: &Bracket = state.bracket()?;
    let m: Match = bracket.get(match_id)?.clone();
    let format: TournamentFormat = bracket.bracket_type;
    let band: Option<u32> = bracket.elimination_band(match_id);
    let winner: ParticipantId = m
        .winner
        .ok_or_else(|| corrupt(format!("match {match_id} has no winner")))?;
    let loser: ParticipantId = m
        .loser()
        .ok_or_else(|| corrupt(format!("match {match_id} has no loser")))?;

    state.participant_mut(winner)?.matches_won += 1;
    let loser_entry: &mut Participant = state.participant_mut(loser)?;
    loser_entry.matches_lost += 1;
    let loser_withdrawn: bool = loser_entry.status == ParticipantStatus::Withdrawn;

    if format.is_elimination() {
        let forces_reset: bool = m.side == BracketSide::GrandFinal
            && m.slot_of(winner) == Some(SlotIndex::Second)
            && !loser_withdrawn;
        if forces_reset {
            open_reset(state.bracket_mut()?, &m)?;
        } else {
            if let Some(next) = m.next_match_slot.filter(|_| advance) {
                state
                    .bracket_mut()?
                    .place(next, Slot::Participant(winner))?;
            }
            match m.loser_match_slot {
                Some(target) => {
                    if advance {
                        let occupant: Slot = if loser_withdrawn {
                            Slot::Bye
                        } else {
                            Slot::Participant(loser)
                        };
                        state.bracket_mut()?.place(target, occupant)?;
                    }
                    if loser_withdrawn {
                        state.participant_mut(loser)?.final_placement = band;
                    }
                }
                None => {
                    let loser_entry: &mut Participant = state.participant_mut(loser)?;
                    if !loser_withdrawn {
                        loser_entry.status = ParticipantStatus::Eliminated;
                    }
                    loser_entry.final_placement = band;
                    debug!(participant_id = %loser, placement = ?band, "Participant eliminated");
                }
            }
        }
    }

    update_completion(state)
}

/// Opens the second grand final after the losers-bracket champion wins the first.
fn open_reset(bracket: &mut Bracket, grand_final: &Match) -> Result<(), CoreError> {
    let reset_id: MatchId = MatchId::new(grand_final.id.round + 1, 1);
    let mut reset: Match = Match::new(reset_id, BracketSide::GrandFinalReset);
    reset.slots = grand_final.slots;
    bracket.insert_match(reset)?;
    bracket.total_rounds += 1;
    bracket.settle(reset_id)?;
    debug!(match_id = %reset_id, "Grand final reset opened");
    Ok(())
}

/// Marks the bracket completed once its final result is known and assigns
/// the remaining placements.
pub(crate) fn update_completion(state: &mut TournamentState) -> Result<(), CoreError> {
    let bracket: &Bracket = state.bracket()?;
    if bracket.completed {
        return Ok(());
    }

    let placements: Vec<(ParticipantId, u32)> = match bracket.bracket_type {
        TournamentFormat::RoundRobin => {
            if !bracket.all_resolved() {
                return Ok(());
            }
            round_robin_ranking(
                &state.participants,
                bracket,
                &state.tournament.settings.tiebreakers,
            )
            .into_iter()
            .zip(1u32..)
            .collect()
        }
        TournamentFormat::SingleElimination | TournamentFormat::DoubleElimination => {
            match bracket.champion() {
                Some(champion) => vec![(champion, 1)],
                None => return Ok(()),
            }
        }
    };

    for (id, placement) in &placements {
        state.participant_mut(*id)?.final_placement = Some(*placement);
    }
    let bracket: &mut Bracket = state.bracket_mut()?;
    bracket.completed = true;
    bracket.current_round = bracket.total_rounds;
    info!(
        tournament_id = %state.tournament.id,
        champion = ?placements.first().map(|(id, _)| *id),
        "Bracket completed"
    );
    Ok(())
}

/// Reverses what [`apply_outcome`] did for a completed match, leaving the
/// winner and loser in their destination slots.
///
/// # Errors
///
/// Returns `DownstreamMatchStarted` if a grand-final reset opened by this
/// match has already begun.
pub(crate) fn undo_outcome(state: &mut TournamentState, match_id: MatchId) -> Result<(), CoreError> {
    let bracket: &Bracket = state.bracket()?;
    let m: Match = bracket.get(match_id)?.clone();
    let format: TournamentFormat = bracket.bracket_type;
    let winner: ParticipantId = m
        .winner
        .ok_or_else(|| corrupt(format!("match {match_id} has no winner")))?;
    let loser: ParticipantId = m
        .loser()
        .ok_or_else(|| corrupt(format!("match {match_id} has no loser")))?;
    let champion: Option<ParticipantId> = bracket.champion();
    let reopen: bool = bracket.completed;

    let reset_id: MatchId = MatchId::new(match_id.round + 1, 1);
    let opened_reset: Option<MatchStatus> = if m.side == BracketSide::GrandFinal {
        bracket
            .get(reset_id)
            .ok()
            .filter(|reset| reset.side == BracketSide::GrandFinalReset)
            .map(|reset| reset.status)
    } else {
        None
    };
    if opened_reset.is_some_and(|status| status.has_started()) {
        return Err(DomainError::DownstreamMatchStarted { match_id: reset_id }.into());
    }

    if reopen {
        match format {
            TournamentFormat::RoundRobin => {
                for participant in &mut state.participants {
                    participant.final_placement = None;
                }
            }
            TournamentFormat::SingleElimination | TournamentFormat::DoubleElimination => {
                if let Some(champion) = champion {
                    state.participant_mut(champion)?.final_placement = None;
                }
            }
        }
        state.bracket_mut()?.completed = false;
    }

    let winner_entry: &mut Participant = state.participant_mut(winner)?;
    winner_entry.matches_won = winner_entry.matches_won.saturating_sub(1);
    let loser_entry: &mut Participant = state.participant_mut(loser)?;
    loser_entry.matches_lost = loser_entry.matches_lost.saturating_sub(1);

    if format.is_elimination() {
        if opened_reset.is_some() {
            let bracket: &mut Bracket = state.bracket_mut()?;
            bracket.remove_match(reset_id)?;
            bracket.total_rounds -= 1;
            bracket.current_round = bracket.current_round.min(bracket.total_rounds);
        } else {
            let loser_entry: &mut Participant = state.participant_mut(loser)?;
            loser_entry.final_placement = None;
            if loser_entry.status == ParticipantStatus::Eliminated {
                loser_entry.status = ParticipantStatus::CheckedIn;
            }
        }
    }
    Ok(())
}

/// Withdraws a participant from a running bracket.
///
/// Elimination formats: a playable match is lost 0-1, a pending slot turns
/// into a bye. Round robin: every unplayed match is lost 0-1.
///
/// # Errors
///
/// Returns `ParticipantNotActive` if the participant has no unplayed match,
/// and `InvalidMatchState` if their next match is frozen by a dispute.
pub(crate) fn forfeit(
    state: &mut TournamentState,
    caller: &Caller,
    participant_id: ParticipantId,
    now: OffsetDateTime,
) -> Result<(), CoreError> {
    state.participant_mut(participant_id)?.status = ParticipantStatus::Withdrawn;
    let bracket: &Bracket = state.bracket()?;

    let open: Vec<(MatchId, MatchStatus, SlotIndex, bool)> = bracket
        .matches
        .iter()
        .filter(|m| {
            matches!(
                m.status,
                MatchStatus::Pending | MatchStatus::Ready | MatchStatus::InProgress
            )
        })
        .filter_map(|m| {
            m.slot_of(participant_id)
                .map(|slot| (m.id, m.status, slot, m.blocked))
        })
        .collect();
    let targets: Vec<(MatchId, MatchStatus, SlotIndex, bool)> =
        if bracket.bracket_type == TournamentFormat::RoundRobin {
            open
        } else {
            open.into_iter().take(1).collect()
        };
    if targets.is_empty() {
        return Err(DomainError::ParticipantNotActive(participant_id).into());
    }

    for (match_id, status, slot, blocked) in targets {
        if status == MatchStatus::Pending {
            if blocked {
                return Err(DomainError::InvalidMatchState {
                    match_id,
                    status,
                    operation: "forfeit",
                }
                .into());
            }
            let bracket: &mut Bracket = state.bracket_mut()?;
            bracket.get_mut(match_id)?.slots[slot.index()] = Slot::Bye;
            bracket.settle(match_id)?;
            let band: Option<u32> = bracket.elimination_band(match_id);
            state.participant_mut(participant_id)?.final_placement = band;
            debug!(match_id = %match_id, participant_id = %participant_id, "Forfeit turned slot into a bye");
        } else {
            let scores: (u32, u32) = match slot {
                SlotIndex::First => (0, 1),
                SlotIndex::Second => (1, 0),
            };
            record_result(
                state,
                match_id,
                scores,
                Some(caller.entrant.clone()),
                Some(participant_id),
                now,
            )?;
        }
    }

    update_completion(state)
}

/// Returns the destinations a completed match fed.
pub(crate) fn destinations(m: &Match) -> Vec<SlotRef> {
    [m.next_match_slot, m.loser_match_slot]
        .into_iter()
        .flatten()
        .collect()
}
