// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{ids, mid, pid};
use crate::{
    Bracket, BracketSide, DomainError, Match, MatchStatus, Slot, SlotIndex, SlotRef,
    TournamentFormat, build_bracket,
};

#[test]
fn test_get_unknown_match_is_not_found() {
    let bracket: Bracket = build_bracket(TournamentFormat::SingleElimination, &ids(4)).unwrap();
    assert_eq!(
        bracket.get(mid(9, 1)).unwrap_err(),
        DomainError::MatchNotFound(mid(9, 1))
    );
}

#[test]
fn test_place_into_occupied_slot_is_corruption() {
    let mut bracket: Bracket =
        build_bracket(TournamentFormat::SingleElimination, &ids(4)).unwrap();
    let result = bracket.place(
        SlotRef::new(mid(1, 1), SlotIndex::First),
        Slot::Participant(pid(3)),
    );
    assert!(matches!(result, Err(DomainError::CorruptBracket(_))));
}

#[test]
fn test_place_makes_match_ready_when_both_slots_resolved() {
    let mut bracket: Bracket =
        build_bracket(TournamentFormat::SingleElimination, &ids(4)).unwrap();
    let final_first: SlotRef = SlotRef::new(mid(2, 1), SlotIndex::First);
    let final_second: SlotRef = SlotRef::new(mid(2, 1), SlotIndex::Second);

    bracket.place(final_first, Slot::Participant(pid(1))).unwrap();
    assert_eq!(bracket.get(mid(2, 1)).unwrap().status, MatchStatus::Pending);

    bracket.place(final_second, Slot::Participant(pid(2))).unwrap();
    assert_eq!(bracket.get(mid(2, 1)).unwrap().status, MatchStatus::Ready);
}

#[test]
fn test_retract_empties_slot_and_reverts_ready() {
    let mut bracket: Bracket =
        build_bracket(TournamentFormat::SingleElimination, &ids(4)).unwrap();
    let target: SlotRef = SlotRef::new(mid(2, 1), SlotIndex::First);
    bracket.place(target, Slot::Participant(pid(1))).unwrap();
    bracket
        .place(SlotRef::new(mid(2, 1), SlotIndex::Second), Slot::Participant(pid(2)))
        .unwrap();

    bracket.retract(target).unwrap();

    let final_match: &Match = bracket.get(mid(2, 1)).unwrap();
    assert_eq!(final_match.slots, [Slot::Empty, Slot::Participant(pid(2))]);
    assert_eq!(final_match.status, MatchStatus::Pending);
}

#[test]
fn test_retract_rejects_started_match() {
    let mut bracket: Bracket =
        build_bracket(TournamentFormat::SingleElimination, &ids(4)).unwrap();
    let target: SlotRef = SlotRef::new(mid(2, 1), SlotIndex::First);
    bracket.place(target, Slot::Participant(pid(1))).unwrap();
    bracket
        .place(SlotRef::new(mid(2, 1), SlotIndex::Second), Slot::Participant(pid(2)))
        .unwrap();
    bracket.get_mut(mid(2, 1)).unwrap().status = MatchStatus::InProgress;

    assert_eq!(
        bracket.retract(target).unwrap_err(),
        DomainError::DownstreamMatchStarted {
            match_id: mid(2, 1)
        }
    );
}

#[test]
fn test_retract_unwinds_bye_advancement() {
    // Seven entrants: seed 1 has a bye in R1M1 and waits in R2M1.
    let mut bracket: Bracket =
        build_bracket(TournamentFormat::SingleElimination, &ids(7)).unwrap();
    // Give R2M1 a bye on the other side so seed 1 rolls on into the final.
    bracket.get_mut(mid(1, 2)).unwrap().status = MatchStatus::Bye;
    bracket
        .place(SlotRef::new(mid(2, 1), SlotIndex::Second), Slot::Bye)
        .unwrap();
    assert_eq!(bracket.get(mid(2, 1)).unwrap().status, MatchStatus::Bye);
    assert_eq!(
        bracket.get(mid(3, 1)).unwrap().slots[0],
        Slot::Participant(pid(1))
    );

    bracket
        .retract(SlotRef::new(mid(2, 1), SlotIndex::Second))
        .unwrap();

    assert_eq!(bracket.get(mid(2, 1)).unwrap().status, MatchStatus::Pending);
    assert_eq!(bracket.get(mid(3, 1)).unwrap().slots[0], Slot::Empty);
}

#[test]
fn test_freeze_and_thaw_ready_match() {
    let mut bracket: Bracket =
        build_bracket(TournamentFormat::SingleElimination, &ids(4)).unwrap();
    let target: SlotRef = SlotRef::new(mid(2, 1), SlotIndex::First);
    bracket.place(target, Slot::Participant(pid(1))).unwrap();
    bracket
        .place(SlotRef::new(mid(2, 1), SlotIndex::Second), Slot::Participant(pid(2)))
        .unwrap();

    bracket.freeze(target).unwrap();
    let frozen: &Match = bracket.get(mid(2, 1)).unwrap();
    assert!(frozen.blocked);
    assert_eq!(frozen.status, MatchStatus::Pending);

    // Settling a blocked match is a no-op.
    bracket.settle(mid(2, 1)).unwrap();
    assert_eq!(bracket.get(mid(2, 1)).unwrap().status, MatchStatus::Pending);

    bracket.thaw(target).unwrap();
    let thawed: &Match = bracket.get(mid(2, 1)).unwrap();
    assert!(!thawed.blocked);
    assert_eq!(thawed.status, MatchStatus::Ready);
}

#[test]
fn test_started_downstream_detection() {
    let mut bracket: Bracket =
        build_bracket(TournamentFormat::SingleElimination, &ids(4)).unwrap();
    let target: SlotRef = SlotRef::new(mid(2, 1), SlotIndex::First);
    assert_eq!(bracket.started_downstream(target).unwrap(), None);

    bracket.get_mut(mid(2, 1)).unwrap().status = MatchStatus::InProgress;
    assert_eq!(bracket.started_downstream(target).unwrap(), Some(mid(2, 1)));
}

#[test]
fn test_single_elimination_bands() {
    let bracket: Bracket = build_bracket(TournamentFormat::SingleElimination, &ids(8)).unwrap();
    assert_eq!(bracket.elimination_band(mid(1, 1)), Some(5));
    assert_eq!(bracket.elimination_band(mid(2, 1)), Some(3));
    assert_eq!(bracket.elimination_band(mid(3, 1)), Some(2));
}

#[test]
fn test_double_elimination_bands() {
    let bracket: Bracket = build_bracket(TournamentFormat::DoubleElimination, &ids(8)).unwrap();
    assert_eq!(bracket.elimination_band(mid(4, 1)), Some(7));
    assert_eq!(bracket.elimination_band(mid(5, 1)), Some(5));
    assert_eq!(bracket.elimination_band(mid(6, 1)), Some(4));
    assert_eq!(bracket.elimination_band(mid(7, 1)), Some(3));
    assert_eq!(bracket.elimination_band(mid(8, 1)), Some(2));
    // A winners-bracket match is banded by where its loser drops.
    assert_eq!(bracket.elimination_band(mid(1, 1)), Some(7));
    assert_eq!(bracket.elimination_band(mid(3, 1)), Some(3));
}

#[test]
fn test_round_robin_has_no_bands() {
    let bracket: Bracket = build_bracket(TournamentFormat::RoundRobin, &ids(4)).unwrap();
    assert_eq!(bracket.elimination_band(mid(1, 1)), None);
}

#[test]
fn test_current_round_never_decreases() {
    let mut bracket: Bracket =
        build_bracket(TournamentFormat::SingleElimination, &ids(4)).unwrap();
    bracket.current_round = 2;
    bracket.refresh_current_round();
    assert_eq!(bracket.current_round, 2);

    for m in &mut bracket.matches {
        m.status = MatchStatus::Bye;
    }
    bracket.refresh_current_round();
    assert_eq!(bracket.current_round, bracket.total_rounds);
}

#[test]
fn test_insert_and_remove_keep_order() {
    let mut bracket: Bracket =
        build_bracket(TournamentFormat::DoubleElimination, &ids(4)).unwrap();
    let reset: Match = Match::new(mid(6, 1), BracketSide::GrandFinalReset);
    bracket.insert_match(reset.clone()).unwrap();
    assert_eq!(bracket.final_match().map(|m| m.id), Some(mid(6, 1)));
    assert!(matches!(
        bracket.insert_match(reset),
        Err(DomainError::CorruptBracket(_))
    ));

    let removed: Match = bracket.remove_match(mid(6, 1)).unwrap();
    assert_eq!(removed.side, BracketSide::GrandFinalReset);
    assert_eq!(bracket.final_match().map(|m| m.id), Some(mid(5, 1)));
}

#[test]
fn test_champion_of_completed_final() {
    let mut bracket: Bracket =
        build_bracket(TournamentFormat::SingleElimination, &ids(2)).unwrap();
    assert_eq!(bracket.champion(), None);

    let final_match: &mut Match = bracket.get_mut(mid(1, 1)).unwrap();
    final_match.status = MatchStatus::Completed;
    final_match.winner = Some(pid(2));
    assert_eq!(bracket.champion(), Some(pid(2)));
    assert_eq!(bracket.get(mid(1, 1)).unwrap().loser(), Some(pid(1)));
}
