// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    Bracket, Entrant, Match, MatchId, MatchStatus, Participant, ParticipantId, ParticipantStatus,
    SlotIndex,
};
use time::OffsetDateTime;
use time::macros::datetime;

pub const BASE_TIME: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);

pub fn ids(count: u32) -> Vec<ParticipantId> {
    (1..=count).map(ParticipantId::new).collect()
}

pub fn pid(value: u32) -> ParticipantId {
    ParticipantId::new(value)
}

/// Participants registered one minute apart, seeded by id, all checked in.
pub fn create_test_participants(count: u32) -> Vec<Participant> {
    (1..=count)
        .map(|n| {
            let mut participant: Participant = Participant::new(
                ParticipantId::new(n),
                Entrant::User(format!("player-{n}")),
                BASE_TIME + time::Duration::minutes(i64::from(n)),
            );
            participant.status = ParticipantStatus::CheckedIn;
            participant.seed = Some(n);
            participant
        })
        .collect()
}

/// Records a result directly on the match between `a` and `b`.
pub fn record_result(bracket: &mut Bracket, a: u32, b: u32, winner: u32, scores: (u32, u32)) {
    let m: &mut Match = bracket
        .matches
        .iter_mut()
        .find(|m| m.involves(pid(a)) && m.involves(pid(b)))
        .expect("pairing exists");
    let (winner_score, loser_score) = scores;
    let winner_slot: SlotIndex = m.slot_of(pid(winner)).expect("winner plays");
    if winner_slot == SlotIndex::First {
        m.score_p1 = Some(winner_score);
        m.score_p2 = Some(loser_score);
    } else {
        m.score_p1 = Some(loser_score);
        m.score_p2 = Some(winner_score);
    }
    m.winner = Some(pid(winner));
    m.status = MatchStatus::Completed;
    m.completed_at = Some(BASE_TIME);
}

pub fn mid(round: u32, number: u32) -> MatchId {
    MatchId::new(round, number)
}
