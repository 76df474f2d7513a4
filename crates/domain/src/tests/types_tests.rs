// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::create_test_participants;
use crate::{
    DEFAULT_DISPUTE_WINDOW_SECS, DomainError, Entrant, Participant, ParticipantStatus, Tiebreaker,
    TournamentFormat, TournamentSettings, TournamentStatus,
};
use std::str::FromStr;

#[test]
fn test_status_transitions_are_forward_only() {
    use TournamentStatus::{CheckIn, Completed, Draft, InProgress, Registration};

    assert!(Draft.can_transition_to(Registration));
    assert!(Registration.can_transition_to(CheckIn));
    assert!(CheckIn.can_transition_to(InProgress));
    assert!(InProgress.can_transition_to(Completed));

    assert!(!Draft.can_transition_to(CheckIn));
    assert!(!CheckIn.can_transition_to(Registration));
    assert!(!Completed.can_transition_to(Draft));
    assert!(!Registration.can_transition_to(Registration));
}

#[test]
fn test_status_next() {
    assert_eq!(
        TournamentStatus::Draft.next(),
        Some(TournamentStatus::Registration)
    );
    assert_eq!(TournamentStatus::Completed.next(), None);
}

#[test]
fn test_status_parse() {
    assert_eq!(
        TournamentStatus::from_str("check_in").unwrap(),
        TournamentStatus::CheckIn
    );
    assert_eq!(
        TournamentStatus::from_str("CheckIn").unwrap_err(),
        DomainError::InvalidStatus(String::from("CheckIn"))
    );
}

#[test]
fn test_format_parse_and_display() {
    let format: TournamentFormat = TournamentFormat::from_str("double_elimination").unwrap();
    assert_eq!(format, TournamentFormat::DoubleElimination);
    assert_eq!(format.to_string(), "double_elimination");
    assert!(format.is_elimination());
    assert!(!TournamentFormat::RoundRobin.is_elimination());
    assert!(TournamentFormat::from_str("swiss").is_err());
}

#[test]
fn test_entrant_serializes_as_tagged_reference() {
    let json: String = serde_json::to_string(&Entrant::Team(String::from("red"))).unwrap();
    assert_eq!(json, r#"{"team":"red"}"#);

    let parsed: Entrant = serde_json::from_str(r#"{"user":"alice"}"#).unwrap();
    assert_eq!(parsed, Entrant::User(String::from("alice")));
    assert_eq!(parsed.reference(), "alice");
}

#[test]
fn test_settings_defaults_when_omitted() {
    let settings: TournamentSettings = serde_json::from_str("{}").unwrap();
    assert_eq!(settings, TournamentSettings::default());
    assert_eq!(settings.dispute_window_secs, DEFAULT_DISPUTE_WINDOW_SECS);
    assert_eq!(
        settings.tiebreakers,
        vec![Tiebreaker::HeadToHead, Tiebreaker::Seed]
    );
    assert_eq!(settings.dispute_window(), time::Duration::minutes(15));
}

#[test]
fn test_participant_status_activity() {
    assert!(ParticipantStatus::Registered.is_active());
    assert!(ParticipantStatus::CheckedIn.is_active());
    assert!(!ParticipantStatus::Withdrawn.is_active());
    assert!(!ParticipantStatus::Eliminated.is_active());
}

#[test]
fn test_reset_progress_restores_eliminated_participant() {
    let mut participant: Participant = create_test_participants(1).remove(0);
    participant.status = ParticipantStatus::Eliminated;
    participant.matches_won = 2;
    participant.matches_lost = 1;
    participant.final_placement = Some(3);

    participant.reset_progress();

    assert_eq!(participant.status, ParticipantStatus::CheckedIn);
    assert_eq!(participant.matches_won + participant.matches_lost, 0);
    assert_eq!(participant.final_placement, None);
}
