// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Caller identification and role checks.
//!
//! Identity comes from outside the engine: the transport hands over a
//! `Caller` naming a user or team and whether it organizes the tournament.
//! This module rejects unusable identities and gates organizer-only
//! commands before any state is loaded. Participant-scoped rules (reporting
//! only your own match, withdrawing only yourself) are enforced by the
//! engine, which knows who plays where.

use tourney::{Caller, Command};
use tourney_domain::validate_entrant;

use crate::error::AuthError;

/// Caller roles for authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Runs the tournament: lifecycle, seeding, bracket generation,
    /// dispute resolution, and reporting on anyone's behalf.
    Organizer,
    /// Plays in the tournament: registers, checks in, reports and disputes
    /// their own matches.
    Competitor,
}

impl Role {
    /// Returns the role of a caller.
    #[must_use]
    pub const fn of(caller: &Caller) -> Self {
        if caller.is_organizer {
            Self::Organizer
        } else {
            Self::Competitor
        }
    }

    /// Returns the role name used in error messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Organizer => "organizer",
            Self::Competitor => "competitor",
        }
    }
}

/// Validates caller identities.
pub struct AuthenticationService;

impl AuthenticationService {
    /// Accepts a caller whose entrant reference is usable.
    ///
    /// # Arguments
    ///
    /// * `caller` - The identity supplied by the transport
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationFailed` if the entrant reference is blank.
    pub fn authenticate(caller: Caller) -> Result<Caller, AuthError> {
        validate_entrant(&caller.entrant).map_err(|e| AuthError::AuthenticationFailed {
            reason: e.to_string(),
        })?;
        Ok(caller)
    }
}

/// Role checks for service operations.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Checks that the caller may create tournaments.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` unless the caller is an organizer.
    pub fn authorize_create_tournament(caller: &Caller) -> Result<(), AuthError> {
        Self::require(caller, Role::Organizer, "create tournament")
    }

    /// Checks that the caller may issue a command.
    ///
    /// Organizer-only commands are rejected here. Commands open to
    /// competitors pass through to the engine's own checks.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if the command needs a role the caller lacks.
    pub fn authorize(caller: &Caller, command: &Command) -> Result<(), AuthError> {
        match command {
            Command::AdvanceStatus { .. } => {
                Self::require(caller, Role::Organizer, "advance tournament status")
            }
            Command::AssignSeeds { .. } => Self::require(caller, Role::Organizer, "assign seeds"),
            Command::ResetSeeds => Self::require(caller, Role::Organizer, "reset seeds"),
            Command::GenerateBracket { .. } => {
                Self::require(caller, Role::Organizer, "generate bracket")
            }
            Command::ResolveDispute { .. } => {
                Self::require(caller, Role::Organizer, "resolve dispute")
            }
            Command::Register { .. }
            | Command::CheckIn { .. }
            | Command::Withdraw { .. }
            | Command::StartMatch { .. }
            | Command::ReportScore { .. }
            | Command::Dispute { .. } => Ok(()),
        }
    }

    fn require(caller: &Caller, required: Role, action: &str) -> Result<(), AuthError> {
        if Role::of(caller) == required {
            return Ok(());
        }
        Err(AuthError::Unauthorized {
            action: String::from(action),
            required_role: String::from(required.as_str()),
        })
    }
}
