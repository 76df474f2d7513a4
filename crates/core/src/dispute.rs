// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Raising and resolving disputes over completed results.
//!
//! Raising a dispute reverses the result's counters and eliminations but
//! leaves the provisionally advanced participants in place, frozen.
//! Resolution either confirms them or retracts them and advances the
//! organizer's winner instead.

use crate::apply::{require_organizer, require_status};
use crate::command::Caller;
use crate::error::CoreError;
use crate::progression::{apply_outcome, destinations, undo_outcome};
use crate::state::TournamentState;
use time::{Duration, OffsetDateTime};
use tourney_domain::{
    Bracket, DisputeRecord, DisputeResolution, DomainError, Match, MatchId, MatchStatus,
    ParticipantId, ReportedResult, SlotIndex, SlotRef, TournamentStatus, final_scores,
};
use tracing::info;

pub(crate) fn raise(
    state: &mut TournamentState,
    caller: &Caller,
    match_id: MatchId,
    reason: String,
    now: OffsetDateTime,
) -> Result<Option<String>, CoreError> {
    require_status(state, TournamentStatus::InProgress, "dispute a result")?;
    let bracket: &Bracket = state.bracket()?;
    let m: &Match = bracket.get(match_id)?;
    if !caller.is_organizer && !state.plays_in(&caller.entrant, m) {
        return Err(DomainError::Unauthorized {
            action: "dispute a result",
        }
        .into());
    }
    if m.status != MatchStatus::Completed {
        return Err(DomainError::InvalidMatchState {
            match_id,
            status: m.status,
            operation: "dispute",
        }
        .into());
    }

    let original: ReportedResult = ReportedResult::capture(m)?;
    let window: Duration = state.tournament.settings.dispute_window();
    if now - original.completed_at > window {
        return Err(DomainError::DisputeWindowClosed { match_id }.into());
    }
    let targets: Vec<SlotRef> = destinations(m);
    for target in &targets {
        if let Some(started) = bracket.started_downstream(*target)? {
            return Err(DomainError::DownstreamMatchStarted { match_id: started }.into());
        }
    }

    undo_outcome(state, match_id)?;
    let bracket: &mut Bracket = state.bracket_mut()?;
    for target in &targets {
        bracket.freeze(*target)?;
    }
    let m: &mut Match = bracket.get_mut(match_id)?;
    m.status = MatchStatus::Disputed;
    m.winner = None;

    info!(
        tournament_id = %state.tournament.id,
        match_id = %match_id,
        raised_by = %caller.entrant,
        "Dispute raised"
    );
    state.disputes.push(DisputeRecord::new(
        match_id,
        caller.entrant.clone(),
        reason,
        now,
        original,
    ));
    Ok(Some(format!("Disputed result of match {match_id}")))
}

pub(crate) fn resolve(
    state: &mut TournamentState,
    caller: &Caller,
    match_id: MatchId,
    final_winner: ParticipantId,
    scores: Option<(u32, u32)>,
    now: OffsetDateTime,
) -> Result<Option<String>, CoreError> {
    require_organizer(caller, "resolve a dispute")?;
    require_status(state, TournamentStatus::InProgress, "resolve a dispute")?;
    let m: &Match = state.bracket()?.get(match_id)?;
    if m.status != MatchStatus::Disputed {
        return Err(DomainError::InvalidMatchState {
            match_id,
            status: m.status,
            operation: "resolve",
        }
        .into());
    }
    let winner_slot: SlotIndex =
        m.slot_of(final_winner)
            .ok_or(DomainError::InvalidWinner {
                match_id,
                participant_id: final_winner,
            })?;
    let targets: Vec<SlotRef> = destinations(m);

    let record: usize = state
        .disputes
        .iter()
        .rposition(|d| d.match_id == match_id && d.is_open())
        .ok_or_else(|| {
            CoreError::CorruptBracket(format!("match {match_id} is disputed without a record"))
        })?;
    let original: ReportedResult = state.disputes[record].original.clone();
    let overturned: bool = final_winner != original.winner;
    let (score_p1, score_p2) = final_scores(&original, winner_slot, overturned, scores)?;

    let bracket: &mut Bracket = state.bracket_mut()?;
    for target in &targets {
        bracket.thaw(*target)?;
    }
    if overturned {
        for target in &targets {
            bracket.retract(*target)?;
        }
    }
    let m: &mut Match = bracket.get_mut(match_id)?;
    m.score_p1 = Some(score_p1);
    m.score_p2 = Some(score_p2);
    m.winner = Some(final_winner);
    m.status = MatchStatus::Completed;
    if overturned {
        m.forfeited_by = None;
    }

    apply_outcome(state, match_id, overturned)?;
    state.disputes[record].resolution = Some(DisputeResolution {
        resolved_by: caller.entrant.clone(),
        final_winner,
        score_p1,
        score_p2,
        overturned,
        resolved_at: now,
    });

    info!(
        tournament_id = %state.tournament.id,
        match_id = %match_id,
        winner = %final_winner,
        overturned,
        "Dispute resolved"
    );
    let verdict: &str = if overturned { "overturned" } else { "upheld" };
    Ok(Some(format!(
        "Resolved dispute on match {match_id}: {verdict}, winner {final_winner} ({score_p1}-{score_p2})"
    )))
}
