// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    Caller, Command, CoreError, TournamentConfig, TournamentState, TransitionResult, apply,
    create_tournament,
};
use time::OffsetDateTime;
use time::macros::datetime;
use tourney_audit::Cause;
use tourney_domain::{
    Entrant, Match, MatchId, MatchStatus, ParticipantId, SlotIndex, TournamentFormat, TournamentId,
    TournamentSettings, TournamentStatus,
};

pub const BASE_TIME: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);

pub fn organizer() -> Caller {
    Caller::organizer(Entrant::User(String::from("organizer")))
}

pub fn player(n: u32) -> Caller {
    Caller::competitor(player_entrant(n))
}

pub fn player_entrant(n: u32) -> Entrant {
    Entrant::User(format!("player-{n}"))
}

pub fn pid(value: u32) -> ParticipantId {
    ParticipantId::new(value)
}

pub fn mid(round: u32, number: u32) -> MatchId {
    MatchId::new(round, number)
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-1"), String::from("Test request"))
}

pub fn create_test_config(format: TournamentFormat, max_participants: u32) -> TournamentConfig {
    TournamentConfig {
        name: String::from("Spring Open"),
        format,
        max_participants,
        settings: TournamentSettings::default(),
    }
}

/// Applies a command at `BASE_TIME`.
pub fn try_run(
    state: &TournamentState,
    command: Command,
    caller: &Caller,
) -> Result<TransitionResult, CoreError> {
    try_run_at(state, command, caller, BASE_TIME)
}

pub fn try_run_at(
    state: &TournamentState,
    command: Command,
    caller: &Caller,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    apply(state, command, caller, create_test_cause(), now)
}

/// Applies a command that is expected to succeed and returns the new state.
pub fn run(state: &TournamentState, command: Command, caller: &Caller) -> TournamentState {
    try_run(state, command, caller)
        .expect("command succeeds")
        .new_state
}

pub fn advance(state: &TournamentState, target: TournamentStatus) -> TournamentState {
    run(
        state,
        Command::AdvanceStatus {
            target,
            force_close: false,
        },
        &organizer(),
    )
}

pub fn draft_tournament(format: TournamentFormat, max_participants: u32) -> TournamentState {
    create_tournament(
        TournamentId::new(1),
        create_test_config(format, max_participants),
        &organizer(),
        create_test_cause(),
        BASE_TIME,
    )
    .expect("tournament is created")
    .new_state
}

/// A tournament in registration with players `1..=count` registered as
/// participants `1..=count`.
pub fn registered_tournament(format: TournamentFormat, count: u32) -> TournamentState {
    let mut state: TournamentState = advance(
        &draft_tournament(format, count.max(2) + 4),
        TournamentStatus::Registration,
    );
    for n in 1..=count {
        state = run(
            &state,
            Command::Register {
                entrant: player_entrant(n),
            },
            &player(n),
        );
    }
    state
}

/// A tournament in check-in with every participant checked in.
pub fn checked_in_tournament(format: TournamentFormat, count: u32) -> TournamentState {
    let mut state: TournamentState =
        advance(&registered_tournament(format, count), TournamentStatus::CheckIn);
    for n in 1..=count {
        state = run(
            &state,
            Command::CheckIn {
                participant_id: pid(n),
            },
            &player(n),
        );
    }
    state
}

/// A running tournament with `count` participants seeded by registration order.
pub fn started_tournament(format: TournamentFormat, count: u32) -> TournamentState {
    advance(
        &checked_in_tournament(format, count),
        TournamentStatus::InProgress,
    )
}

pub fn get_match(state: &TournamentState, id: MatchId) -> &Match {
    state.bracket().unwrap().get(id).unwrap()
}

/// Finds the playable match between two participants.
pub fn match_between(state: &TournamentState, a: u32, b: u32) -> MatchId {
    state
        .bracket()
        .unwrap()
        .matches
        .iter()
        .find(|m| {
            matches!(m.status, MatchStatus::Ready | MatchStatus::InProgress)
                && m.involves(pid(a))
                && m.involves(pid(b))
        })
        .map(|m| m.id)
        .expect("playable match between participants")
}

/// Reports a 2-1 win for `winner` over `loser` as the organizer.
pub fn win(state: &TournamentState, winner: u32, loser: u32) -> TournamentState {
    try_win(state, winner, loser)
        .expect("result accepted")
        .new_state
}

pub fn try_win(
    state: &TournamentState,
    winner: u32,
    loser: u32,
) -> Result<TransitionResult, CoreError> {
    let match_id: MatchId = match_between(state, winner, loser);
    let (score_p1, score_p2) = if get_match(state, match_id).slot_of(pid(winner)) == Some(SlotIndex::First) {
        (2, 1)
    } else {
        (1, 2)
    };
    try_run(
        state,
        Command::ReportScore {
            match_id,
            score_p1,
            score_p2,
        },
        &organizer(),
    )
}
