// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::builder::MIN_PARTICIPANTS;
use crate::error::DomainError;
use crate::types::Entrant;

/// Longest accepted tournament name, in characters.
pub const MAX_NAME_LENGTH: usize = 120;

/// Validates a tournament name.
///
/// # Errors
///
/// Returns `InvalidTournamentName` if the name is blank or too long.
pub fn validate_tournament_name(name: &str) -> Result<(), DomainError> {
    if name.trim().is_empty() {
        return Err(DomainError::InvalidTournamentName(String::from(
            "Name cannot be empty",
        )));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(DomainError::InvalidTournamentName(format!(
            "Name cannot exceed {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validates a tournament capacity.
///
/// # Errors
///
/// Returns `InvalidCapacity` if fewer than two participants could register.
pub const fn validate_capacity(max_participants: u32) -> Result<(), DomainError> {
    if max_participants < MIN_PARTICIPANTS {
        return Err(DomainError::InvalidCapacity(max_participants));
    }
    Ok(())
}

/// Checks that a tournament is ready to open registration.
///
/// # Errors
///
/// Returns `IncompleteConfiguration` naming the first missing piece.
pub fn validate_configuration(name: &str, max_participants: u32) -> Result<(), DomainError> {
    validate_tournament_name(name)
        .and_then(|()| validate_capacity(max_participants))
        .map_err(|err| DomainError::IncompleteConfiguration(err.to_string()))
}

/// Validates a reported score pair.
///
/// # Errors
///
/// Returns `TiedScoreRejected` if the scores are equal.
pub const fn validate_scores(score_p1: u32, score_p2: u32) -> Result<(), DomainError> {
    if score_p1 == score_p2 {
        return Err(DomainError::TiedScoreRejected { score: score_p1 });
    }
    Ok(())
}

/// Validates a user or team reference.
///
/// # Errors
///
/// Returns `InvalidEntrant` if the reference is blank.
pub fn validate_entrant(entrant: &Entrant) -> Result<(), DomainError> {
    if entrant.reference().trim().is_empty() {
        return Err(DomainError::InvalidEntrant(String::from(
            "Reference cannot be empty",
        )));
    }
    Ok(())
}
