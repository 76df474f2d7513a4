// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{
    BASE_TIME, get_match, mid, organizer, pid, player, run, started_tournament, try_run,
    try_run_at, win,
};
use crate::{Caller, Command, CoreError, TournamentState, TransitionResult};
use time::Duration;
use tourney_domain::{
    DisputeRecord, DomainError, Match, MatchId, MatchStatus, ParticipantId, ParticipantStatus,
    Slot, TournamentFormat,
};

fn dispute_command(match_id: MatchId) -> Command {
    Command::Dispute {
        match_id,
        reason: String::from("score was entered backwards"),
    }
}

fn resolve_command(
    match_id: MatchId,
    final_winner: ParticipantId,
    scores: Option<(u32, u32)>,
) -> Command {
    Command::ResolveDispute {
        match_id,
        final_winner,
        scores,
    }
}

fn dispute(state: &TournamentState, match_id: MatchId, caller: &Caller) -> TournamentState {
    run(state, dispute_command(match_id), caller)
}

/// Four-player single elimination with R1M1 won 2-1 by participant 1 and disputed.
fn disputed_opening_match() -> TournamentState {
    let state: TournamentState = win(&started_tournament(TournamentFormat::SingleElimination, 4), 1, 4);
    dispute(&state, mid(1, 1), &player(4))
}

#[test]
fn test_dispute_reverses_counters_and_freezes_downstream() {
    let state: TournamentState = disputed_opening_match();

    let m: &Match = get_match(&state, mid(1, 1));
    assert_eq!(m.status, MatchStatus::Disputed);
    assert_eq!(m.winner, None);
    assert_eq!((m.score_p1, m.score_p2), (Some(2), Some(1)));
    let p4 = state.participant(pid(4)).unwrap();
    assert_eq!(p4.status, ParticipantStatus::CheckedIn);
    assert_eq!(p4.matches_lost, 0);
    assert_eq!(p4.final_placement, None);
    assert_eq!(state.participant(pid(1)).unwrap().matches_won, 0);

    let next: &Match = get_match(&state, mid(2, 1));
    assert!(next.blocked);
    assert_eq!(next.slots[0], Slot::Participant(pid(1)));

    let record: &DisputeRecord = state.disputes_for(mid(1, 1)).next().unwrap();
    assert!(record.is_open());
    assert_eq!(record.raised_by, player(4).entrant);
    assert_eq!(record.original.winner, pid(1));
    assert_eq!(record.original.reported_by, Some(organizer().entrant));
}

#[test]
fn test_upheld_dispute_restores_result() {
    let state: TournamentState = disputed_opening_match();

    let state: TournamentState = run(
        &state,
        resolve_command(mid(1, 1), pid(1), None),
        &organizer(),
    );

    let m: &Match = get_match(&state, mid(1, 1));
    assert_eq!(m.status, MatchStatus::Completed);
    assert_eq!(m.winner, Some(pid(1)));
    assert_eq!((m.score_p1, m.score_p2), (Some(2), Some(1)));
    assert_eq!(state.participant(pid(1)).unwrap().matches_won, 1);
    let p4 = state.participant(pid(4)).unwrap();
    assert_eq!(p4.status, ParticipantStatus::Eliminated);
    assert_eq!(p4.matches_lost, 1);
    assert_eq!(p4.final_placement, Some(3));
    assert!(!get_match(&state, mid(2, 1)).blocked);

    let record: &DisputeRecord = state.disputes_for(mid(1, 1)).next().unwrap();
    let resolution = record.resolution.as_ref().unwrap();
    assert!(!resolution.overturned);
    assert_eq!(resolution.final_winner, pid(1));
}

#[test]
fn test_overturned_dispute_swaps_advancement() {
    let state: TournamentState = disputed_opening_match();

    let state: TournamentState = run(
        &state,
        resolve_command(mid(1, 1), pid(4), None),
        &organizer(),
    );

    let m: &Match = get_match(&state, mid(1, 1));
    assert_eq!(m.winner, Some(pid(4)));
    assert_eq!((m.score_p1, m.score_p2), (Some(1), Some(2)));
    assert_eq!(get_match(&state, mid(2, 1)).slots[0], Slot::Participant(pid(4)));
    let p1 = state.participant(pid(1)).unwrap();
    assert_eq!(p1.matches_won, 0);
    assert_eq!(p1.matches_lost, 1);
    assert_eq!(p1.status, ParticipantStatus::Eliminated);
    let p4 = state.participant(pid(4)).unwrap();
    assert_eq!(p4.matches_won, 1);
    assert_eq!(p4.matches_lost, 0);
    assert_eq!(p4.status, ParticipantStatus::CheckedIn);

    let record: &DisputeRecord = state.disputes_for(mid(1, 1)).next().unwrap();
    assert!(record.resolution.as_ref().unwrap().overturned);
    assert_eq!(record.original.winner, pid(1));
}

#[test]
fn test_corrected_scores_must_favour_final_winner() {
    let state: TournamentState = disputed_opening_match();

    let err: CoreError = try_run(
        &state,
        resolve_command(mid(1, 1), pid(4), Some((3, 0))),
        &organizer(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        CoreError::DomainViolation(DomainError::InvalidScores(_))
    ));

    let state: TournamentState = run(
        &state,
        resolve_command(mid(1, 1), pid(4), Some((0, 3))),
        &organizer(),
    );
    let m: &Match = get_match(&state, mid(1, 1));
    assert_eq!((m.score_p1, m.score_p2), (Some(0), Some(3)));
}

#[test]
fn test_resolve_rejects_non_participant_winner() {
    let state: TournamentState = disputed_opening_match();

    let err: CoreError = try_run(
        &state,
        resolve_command(mid(1, 1), pid(2), None),
        &organizer(),
    )
    .unwrap_err();

    assert_eq!(
        err,
        CoreError::DomainViolation(DomainError::InvalidWinner {
            match_id: mid(1, 1),
            participant_id: pid(2),
        })
    );
}

#[test]
fn test_only_organizer_resolves() {
    let state: TournamentState = disputed_opening_match();

    let err: CoreError = try_run(
        &state,
        resolve_command(mid(1, 1), pid(4), None),
        &player(4),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        CoreError::DomainViolation(DomainError::Unauthorized { .. })
    ));
}

#[test]
fn test_resolve_requires_disputed_match() {
    let state: TournamentState = win(&started_tournament(TournamentFormat::SingleElimination, 4), 1, 4);

    let err: CoreError = try_run(
        &state,
        resolve_command(mid(1, 1), pid(1), None),
        &organizer(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        CoreError::DomainViolation(DomainError::InvalidMatchState {
            status: MatchStatus::Completed,
            ..
        })
    ));
}

#[test]
fn test_dispute_after_window_fails() {
    let state: TournamentState = win(&started_tournament(TournamentFormat::SingleElimination, 4), 1, 4);

    let inside: TransitionResult = try_run_at(
        &state,
        dispute_command(mid(1, 1)),
        &player(4),
        BASE_TIME + Duration::minutes(15),
    )
    .unwrap();
    let outside: CoreError = try_run_at(
        &state,
        dispute_command(mid(1, 1)),
        &player(4),
        BASE_TIME + Duration::minutes(16),
    )
    .unwrap_err();

    assert!(inside.changed());
    assert_eq!(
        outside,
        CoreError::DomainViolation(DomainError::DisputeWindowClosed {
            match_id: mid(1, 1)
        })
    );
}

#[test]
fn test_dispute_rejected_once_downstream_started() {
    let mut state: TournamentState = started_tournament(TournamentFormat::SingleElimination, 4);
    state = win(&state, 1, 4);
    state = win(&state, 2, 3);
    state = run(
        &state,
        Command::StartMatch {
            match_id: mid(2, 1),
        },
        &organizer(),
    );

    let err: CoreError = try_run(&state, dispute_command(mid(1, 1)), &player(4)).unwrap_err();

    assert_eq!(
        err,
        CoreError::DomainViolation(DomainError::DownstreamMatchStarted {
            match_id: mid(2, 1)
        })
    );
}

#[test]
fn test_frozen_match_cannot_be_played_until_resolution() {
    let mut state: TournamentState = started_tournament(TournamentFormat::SingleElimination, 4);
    state = win(&state, 1, 4);
    state = win(&state, 2, 3);
    assert_eq!(get_match(&state, mid(2, 1)).status, MatchStatus::Ready);

    state = dispute(&state, mid(1, 2), &player(3));
    assert_eq!(get_match(&state, mid(2, 1)).status, MatchStatus::Pending);
    let err: CoreError = try_run(
        &state,
        Command::ReportScore {
            match_id: mid(2, 1),
            score_p1: 2,
            score_p2: 0,
        },
        &organizer(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        CoreError::DomainViolation(DomainError::InvalidMatchState { .. })
    ));

    state = run(&state, resolve_command(mid(1, 2), pid(3), None), &organizer());
    let final_match: &Match = get_match(&state, mid(2, 1));
    assert_eq!(final_match.status, MatchStatus::Ready);
    assert_eq!(
        final_match.slots,
        [Slot::Participant(pid(1)), Slot::Participant(pid(3))]
    );
}

#[test]
fn test_outsider_cannot_dispute() {
    let state: TournamentState = win(&started_tournament(TournamentFormat::SingleElimination, 4), 1, 4);

    let err: CoreError = try_run(&state, dispute_command(mid(1, 1)), &player(2)).unwrap_err();

    assert!(matches!(
        err,
        CoreError::DomainViolation(DomainError::Unauthorized { .. })
    ));
}

#[test]
fn test_disputing_the_final_reopens_the_bracket() {
    let state: TournamentState = win(&started_tournament(TournamentFormat::SingleElimination, 2), 1, 2);
    assert!(state.bracket().unwrap().completed);

    let state: TournamentState = dispute(&state, mid(1, 1), &player(2));
    assert!(!state.bracket().unwrap().completed);
    assert_eq!(state.participant(pid(1)).unwrap().final_placement, None);
    assert_eq!(state.participant(pid(2)).unwrap().final_placement, None);

    let result: TransitionResult = try_run(
        &state,
        resolve_command(mid(1, 1), pid(2), None),
        &organizer(),
    )
    .unwrap();
    let state: TournamentState = result.new_state;
    assert!(state.bracket().unwrap().completed);
    assert_eq!(state.participant(pid(2)).unwrap().final_placement, Some(1));
    assert_eq!(state.participant(pid(1)).unwrap().final_placement, Some(2));
}

#[test]
fn test_disputing_grand_final_removes_reset() {
    let mut state: TournamentState = started_tournament(TournamentFormat::DoubleElimination, 4);
    state = win(&state, 1, 4);
    state = win(&state, 2, 3);
    state = win(&state, 4, 3);
    state = win(&state, 1, 2);
    state = win(&state, 2, 4);
    state = win(&state, 2, 1);
    assert!(state.bracket().unwrap().get(mid(6, 1)).is_ok());
    assert_eq!(state.bracket().unwrap().current_round, 6);

    state = dispute(&state, mid(5, 1), &player(1));
    assert!(state.bracket().unwrap().get(mid(6, 1)).is_err());
    assert_eq!(state.bracket().unwrap().total_rounds, 5);
    assert_eq!(state.bracket().unwrap().current_round, 5);

    state = run(&state, resolve_command(mid(5, 1), pid(1), None), &organizer());
    assert!(state.bracket().unwrap().completed);
    assert_eq!(state.participant(pid(1)).unwrap().final_placement, Some(1));
    assert_eq!(state.participant(pid(2)).unwrap().final_placement, Some(2));
}

#[test]
fn test_overturned_winners_match_reroutes_both_sides_through_bye() {
    let mut state: TournamentState = started_tournament(TournamentFormat::DoubleElimination, 3);
    state = win(&state, 2, 3);
    assert_eq!(
        get_match(&state, mid(4, 1)).slots[0],
        Slot::Participant(pid(3))
    );

    state = dispute(&state, mid(1, 2), &player(3));
    let winners_final: &Match = get_match(&state, mid(2, 1));
    assert!(winners_final.blocked);
    assert_eq!(winners_final.status, MatchStatus::Pending);
    assert_eq!(winners_final.slots[1], Slot::Participant(pid(2)));
    assert!(get_match(&state, mid(3, 1)).blocked);
    let losers_final: &Match = get_match(&state, mid(4, 1));
    assert!(losers_final.blocked);
    assert_eq!(losers_final.slots[0], Slot::Participant(pid(3)));
    assert_eq!(state.participant(pid(2)).unwrap().matches_won, 0);
    assert_eq!(state.participant(pid(3)).unwrap().matches_lost, 0);

    state = run(&state, resolve_command(mid(1, 2), pid(3), None), &organizer());

    let overturned: &Match = get_match(&state, mid(1, 2));
    assert_eq!(overturned.winner, Some(pid(3)));
    assert_eq!((overturned.score_p1, overturned.score_p2), (Some(1), Some(2)));
    let winners_final: &Match = get_match(&state, mid(2, 1));
    assert!(!winners_final.blocked);
    assert_eq!(winners_final.status, MatchStatus::Ready);
    assert_eq!(
        winners_final.slots,
        [Slot::Participant(pid(1)), Slot::Participant(pid(3))]
    );
    assert!(!get_match(&state, mid(3, 1)).blocked);
    let losers_final: &Match = get_match(&state, mid(4, 1));
    assert!(!losers_final.blocked);
    assert_eq!(losers_final.slots[0], Slot::Participant(pid(2)));
    let p3 = state.participant(pid(3)).unwrap();
    assert_eq!((p3.matches_won, p3.matches_lost), (1, 0));
    let p2 = state.participant(pid(2)).unwrap();
    assert_eq!((p2.matches_won, p2.matches_lost), (0, 1));
    assert_eq!(p2.status, ParticipantStatus::CheckedIn);
}
