// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::bracket::{MatchId, MatchStatus};
use crate::types::{ParticipantId, TournamentId, TournamentStatus};
use time::OffsetDateTime;

/// Errors that can occur while validating or mutating a tournament.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The tournament already holds `max_participants` active participants.
    CapacityExceeded {
        /// The configured capacity.
        max_participants: u32,
    },
    /// The operation is not legal in the tournament's current status.
    InvalidTournamentState {
        /// The operation that was attempted.
        operation: &'static str,
        /// The status the tournament was in.
        status: TournamentStatus,
    },
    /// The registration window has not yet elapsed and force-close was not requested.
    RegistrationWindowOpen {
        /// When the registration window closes.
        closes_at: OffsetDateTime,
    },
    /// Too few participants to build a bracket.
    InsufficientParticipants {
        /// The minimum number of participants.
        required: u32,
        /// The number of participants available.
        actual: u32,
    },
    /// The bracket has not produced a champion yet.
    BracketIncomplete,
    /// A bracket already exists and regeneration was not forced.
    BracketAlreadyExists,
    /// The tournament has no bracket yet.
    NoBracket,
    /// Both scores were equal. Draws are not a supported outcome.
    TiedScoreRejected {
        /// The tied score.
        score: u32,
    },
    /// The reporter is neither a participant of the match nor an organizer.
    UnauthorizedReporter {
        /// The match being reported.
        match_id: MatchId,
    },
    /// The caller may not perform the action.
    Unauthorized {
        /// The action that was attempted.
        action: &'static str,
    },
    /// The user or team is already an active participant.
    DuplicateParticipant(String),
    /// The participant is not registered (or not in a state that allows the operation).
    NotRegistered(ParticipantId),
    /// Seeds were already assigned.
    AlreadySeeded,
    /// The tournament configuration is missing required values.
    IncompleteConfiguration(String),
    /// The capacity is not a usable value.
    InvalidCapacity(u32),
    /// The tournament name is empty or too long.
    InvalidTournamentName(String),
    /// The user or team reference is empty.
    InvalidEntrant(String),
    /// No tournament exists with this id.
    TournamentNotFound(TournamentId),
    /// No participant exists with this id.
    ParticipantNotFound(ParticipantId),
    /// The participant has no live match to forfeit or is no longer competing.
    ParticipantNotActive(ParticipantId),
    /// No match exists with this id.
    MatchNotFound(MatchId),
    /// The match is not in a status that allows the operation.
    InvalidMatchState {
        /// The match.
        match_id: MatchId,
        /// The status the match was in.
        status: MatchStatus,
        /// The operation that was attempted.
        operation: &'static str,
    },
    /// The dispute window for the match has elapsed.
    DisputeWindowClosed {
        /// The match.
        match_id: MatchId,
    },
    /// A match fed by the disputed result has already started or finished.
    DownstreamMatchStarted {
        /// The downstream match that has progressed.
        match_id: MatchId,
    },
    /// The chosen winner is not one of the match participants.
    InvalidWinner {
        /// The match.
        match_id: MatchId,
        /// The participant that was named as winner.
        participant_id: ParticipantId,
    },
    /// Corrected scores are inconsistent with the chosen winner.
    InvalidScores(String),
    /// A status string could not be parsed.
    InvalidStatus(String),
    /// A format string could not be parsed.
    InvalidFormat(String),
    /// The match slot graph is inconsistent. This is a programming error.
    CorruptBracket(String),
}

impl std::fmt::Display for DomainError {
    #[allow(clippy::too_many_lines)]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CapacityExceeded { max_participants } => {
                write!(
                    f,
                    "Tournament is full: {max_participants} active participants allowed"
                )
            }
            Self::InvalidTournamentState { operation, status } => {
                write!(f, "Cannot {operation} while tournament is '{status}'")
            }
            Self::RegistrationWindowOpen { closes_at } => {
                write!(f, "Registration window is open until {closes_at}")
            }
            Self::InsufficientParticipants { required, actual } => {
                write!(
                    f,
                    "Insufficient participants: need at least {required}, have {actual}"
                )
            }
            Self::BracketIncomplete => write!(f, "Bracket has not been completed"),
            Self::BracketAlreadyExists => {
                write!(f, "A bracket already exists; regeneration must be forced")
            }
            Self::NoBracket => write!(f, "No bracket has been generated"),
            Self::TiedScoreRejected { score } => {
                write!(f, "Tied score {score}-{score} rejected: draws are not allowed")
            }
            Self::UnauthorizedReporter { match_id } => {
                write!(
                    f,
                    "Reporter is neither a participant of match {match_id} nor an organizer"
                )
            }
            Self::Unauthorized { action } => write!(f, "Not authorized to {action}"),
            Self::DuplicateParticipant(entrant) => {
                write!(f, "'{entrant}' is already an active participant")
            }
            Self::NotRegistered(id) => write!(f, "Participant {id} is not registered"),
            Self::AlreadySeeded => {
                write!(f, "Seeds are already assigned; reset them before re-seeding")
            }
            Self::IncompleteConfiguration(msg) => {
                write!(f, "Tournament configuration incomplete: {msg}")
            }
            Self::InvalidCapacity(value) => {
                write!(
                    f,
                    "Invalid capacity {value}: a tournament needs room for at least 2 participants"
                )
            }
            Self::InvalidTournamentName(msg) => write!(f, "Invalid tournament name: {msg}"),
            Self::InvalidEntrant(msg) => write!(f, "Invalid entrant: {msg}"),
            Self::TournamentNotFound(id) => write!(f, "Tournament {id} not found"),
            Self::ParticipantNotFound(id) => write!(f, "Participant {id} not found"),
            Self::ParticipantNotActive(id) => {
                write!(f, "Participant {id} is not competing in any open match")
            }
            Self::MatchNotFound(id) => write!(f, "Match {id} not found"),
            Self::InvalidMatchState {
                match_id,
                status,
                operation,
            } => {
                write!(f, "Cannot {operation} match {match_id} while it is '{status}'")
            }
            Self::DisputeWindowClosed { match_id } => {
                write!(f, "Dispute window for match {match_id} has closed")
            }
            Self::DownstreamMatchStarted { match_id } => {
                write!(
                    f,
                    "Match {match_id} has already started using the disputed result"
                )
            }
            Self::InvalidWinner {
                match_id,
                participant_id,
            } => {
                write!(
                    f,
                    "Participant {participant_id} did not play in match {match_id}"
                )
            }
            Self::InvalidScores(msg) => write!(f, "Invalid scores: {msg}"),
            Self::InvalidStatus(value) => write!(f, "Unknown status '{value}'"),
            Self::InvalidFormat(value) => write!(f, "Unknown tournament format '{value}'"),
            Self::CorruptBracket(msg) => write!(f, "Bracket graph is corrupted: {msg}"),
        }
    }
}

impl std::error::Error for DomainError {}
