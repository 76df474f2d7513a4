// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::OffsetDateTime;
use time::macros::datetime;
use tourney::{Caller, Command, TournamentConfig, TransitionResult, apply, create_tournament};
use tourney_audit::Cause;
use tourney_domain::{
    Entrant, TournamentFormat, TournamentId, TournamentSettings, TournamentStatus,
};

pub const BASE_TIME: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);

pub fn organizer() -> Caller {
    Caller::organizer(Entrant::User(String::from("organizer")))
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-1"), String::from("Test request"))
}

/// A freshly created single-elimination draft and its creation event.
pub fn created(id: u64) -> TransitionResult {
    create_tournament(
        TournamentId::new(id),
        TournamentConfig {
            name: String::from("Spring Open"),
            format: TournamentFormat::SingleElimination,
            max_participants: 8,
            settings: TournamentSettings::default(),
        },
        &organizer(),
        create_test_cause(),
        BASE_TIME,
    )
    .expect("tournament is created")
}

/// The transition that opens registration on a created tournament.
pub fn opened(created: &TransitionResult) -> TransitionResult {
    apply(
        &created.new_state,
        Command::AdvanceStatus {
            target: TournamentStatus::Registration,
            force_close: false,
        },
        &organizer(),
        create_test_cause(),
        BASE_TIME,
    )
    .expect("registration opens")
}

/// The transition that registers `user` on top of `previous`.
pub fn registered(previous: &TransitionResult, user: &str) -> TransitionResult {
    apply(
        &previous.new_state,
        Command::Register {
            entrant: Entrant::User(String::from(user)),
        },
        &Caller::competitor(Entrant::User(String::from(user))),
        create_test_cause(),
        BASE_TIME,
    )
    .expect("entrant registers")
}
