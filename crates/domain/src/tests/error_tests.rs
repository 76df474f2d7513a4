// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{mid, pid};
use crate::{DomainError, MatchStatus, TournamentStatus};

#[test]
fn test_domain_error_display() {
    let err: DomainError = DomainError::CapacityExceeded {
        max_participants: 8,
    };
    assert_eq!(
        format!("{err}"),
        "Tournament is full: 8 active participants allowed"
    );

    let err: DomainError = DomainError::InvalidTournamentState {
        operation: "check in",
        status: TournamentStatus::Draft,
    };
    assert_eq!(format!("{err}"), "Cannot check in while tournament is 'draft'");

    let err: DomainError = DomainError::InsufficientParticipants {
        required: 2,
        actual: 1,
    };
    assert_eq!(
        format!("{err}"),
        "Insufficient participants: need at least 2, have 1"
    );

    let err: DomainError = DomainError::TiedScoreRejected { score: 2 };
    assert_eq!(format!("{err}"), "Tied score 2-2 rejected: draws are not allowed");

    let err: DomainError = DomainError::NotRegistered(pid(4));
    assert_eq!(format!("{err}"), "Participant #4 is not registered");

    let err: DomainError = DomainError::InvalidMatchState {
        match_id: mid(2, 1),
        status: MatchStatus::Pending,
        operation: "report",
    };
    assert_eq!(format!("{err}"), "Cannot report match R2M1 while it is 'pending'");

    let err: DomainError = DomainError::DownstreamMatchStarted {
        match_id: mid(3, 1),
    };
    assert_eq!(
        format!("{err}"),
        "Match R3M1 has already started using the disputed result"
    );
}

#[test]
fn test_domain_error_is_error_trait() {
    let err: DomainError = DomainError::BracketIncomplete;
    let as_error: &dyn std::error::Error = &err;
    assert_eq!(as_error.to_string(), "Bracket has not been completed");
}
