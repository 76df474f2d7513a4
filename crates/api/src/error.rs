// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use tourney::CoreError;
use tourney_domain::DomainError;
use tourney_persistence::PersistenceError;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The caller could not be identified.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// The caller lacks the role the action requires.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
        }
    }
}

impl std::error::Error for AuthError {}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Authentication failed.
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the caller does not have permission.
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A tournament rule was violated.
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// A concurrent write won and the retry lost as well.
    Conflict {
        /// A human-readable description of the conflict.
        message: String,
    },
    /// An internal error occurred.
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AuthenticationFailed { reason } => {
                write!(f, "Authentication failed: {reason}")
            }
            Self::Unauthorized {
                action,
                required_role,
            } => {
                write!(f, "Unauthorized: '{action}' requires {required_role} role")
            }
            Self::DomainRuleViolation { rule, message } => {
                write!(f, "Domain rule violation ({rule}): {message}")
            }
            Self::InvalidInput { field, message } => {
                write!(f, "Invalid input for field '{field}': {message}")
            }
            Self::ResourceNotFound {
                resource_type,
                message,
            } => {
                write!(f, "{resource_type} not found: {message}")
            }
            Self::Conflict { message } => write!(f, "Conflict: {message}"),
            Self::Internal { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for ApiError {}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

fn rule(rule: &str, message: String) -> ApiError {
    ApiError::DomainRuleViolation {
        rule: String::from(rule),
        message,
    }
}

fn input(field: &str, message: String) -> ApiError {
    ApiError::InvalidInput {
        field: String::from(field),
        message,
    }
}

fn not_found(resource_type: &str, message: String) -> ApiError {
    ApiError::ResourceNotFound {
        resource_type: String::from(resource_type),
        message,
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    match err {
        DomainError::CapacityExceeded { .. } => rule("capacity", message),
        DomainError::InvalidTournamentState { .. } => rule("tournament_state", message),
        DomainError::RegistrationWindowOpen { .. } => rule("registration_window", message),
        DomainError::InsufficientParticipants { .. } => rule("minimum_participants", message),
        DomainError::BracketIncomplete => rule("bracket_incomplete", message),
        DomainError::BracketAlreadyExists => rule("single_bracket", message),
        DomainError::TiedScoreRejected { .. } => rule("no_ties", message),
        DomainError::DuplicateParticipant(_) => rule("unique_participant", message),
        DomainError::NotRegistered(_) => rule("registered_participant", message),
        DomainError::AlreadySeeded => rule("seeding_window", message),
        DomainError::IncompleteConfiguration(_) => rule("complete_configuration", message),
        DomainError::ParticipantNotActive(_) => rule("active_participant", message),
        DomainError::InvalidMatchState { .. } => rule("match_state", message),
        DomainError::DisputeWindowClosed { .. } => rule("dispute_window", message),
        DomainError::DownstreamMatchStarted { .. } => rule("downstream_not_started", message),
        DomainError::UnauthorizedReporter { .. } => ApiError::Unauthorized {
            action: String::from("report a score"),
            required_role: String::from("match participant or organizer"),
        },
        DomainError::Unauthorized { action } => ApiError::Unauthorized {
            action: String::from(action),
            required_role: String::from("organizer"),
        },
        DomainError::InvalidCapacity(_) => input("max_participants", message),
        DomainError::InvalidTournamentName(_) => input("name", message),
        DomainError::InvalidEntrant(_) => input("entrant", message),
        DomainError::InvalidWinner { .. } => input("final_winner", message),
        DomainError::InvalidScores(_) => input("scores", message),
        DomainError::InvalidStatus(_) => input("status", message),
        DomainError::InvalidFormat(_) => input("format", message),
        DomainError::TournamentNotFound(_) => not_found("Tournament", message),
        DomainError::ParticipantNotFound(_) => not_found("Participant", message),
        DomainError::MatchNotFound(_) => not_found("Match", message),
        DomainError::NoBracket => not_found("Bracket", message),
        DomainError::CorruptBracket(msg) => ApiError::Internal {
            message: format!("Bracket is inconsistent: {msg}"),
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::CorruptBracket(msg) => ApiError::Internal {
            message: format!("Bracket is inconsistent: {msg}"),
        },
    }
}

/// Translates a persistence error into an API error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    let message: String = err.to_string();
    match err {
        PersistenceError::NotFound(id) => ApiError::ResourceNotFound {
            resource_type: String::from("Tournament"),
            message: format!("Tournament {id} does not exist"),
        },
        PersistenceError::VersionConflict { .. } => ApiError::Conflict { message },
        PersistenceError::Database(detail)
        | PersistenceError::Connection(detail)
        | PersistenceError::Migration(detail)
        | PersistenceError::Serialization(detail) => ApiError::Internal {
            message: format!("Persistence error: {detail}"),
        },
        PersistenceError::LockPoisoned => ApiError::Internal {
            message: format!("Persistence error: {message}"),
        },
    }
}
