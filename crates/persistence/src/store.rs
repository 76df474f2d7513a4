// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::PersistenceError;
use tourney::TournamentState;
use tourney_audit::AuditEvent;
use tourney_domain::TournamentId;

/// Version assigned to a tournament when it is first stored.
pub const INITIAL_VERSION: i64 = 1;

/// A tournament aggregate together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTournament {
    /// The aggregate.
    pub state: TournamentState,
    /// Optimistic concurrency version. Every commit increments it.
    pub version: i64,
}

/// Durable storage for tournament aggregates and their audit trail.
///
/// Each write stores the new aggregate and its audit event atomically.
/// Implementations are shared across request handlers, so every method
/// takes `&self`.
pub trait TournamentStore: Send + Sync {
    /// Returns an identifier no stored tournament uses yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn next_tournament_id(&self) -> Result<TournamentId, PersistenceError>;

    /// Stores a newly created tournament at `INITIAL_VERSION`.
    ///
    /// # Arguments
    ///
    /// * `state` - The new aggregate
    /// * `event` - The creation audit event
    ///
    /// # Returns
    ///
    /// The identifier assigned to the audit event.
    ///
    /// # Errors
    ///
    /// Returns `VersionConflict` if the id is already taken.
    fn insert(&self, state: &TournamentState, event: &AuditEvent)
    -> Result<i64, PersistenceError>;

    /// Loads a tournament and its current version.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no tournament has this id.
    fn load(&self, id: TournamentId) -> Result<StoredTournament, PersistenceError>;

    /// Replaces a tournament if it is still at `expected_version`.
    ///
    /// # Arguments
    ///
    /// * `expected_version` - The version the caller loaded
    /// * `state` - The new aggregate
    /// * `event` - The audit event describing the transition
    ///
    /// # Returns
    ///
    /// The new version.
    ///
    /// # Errors
    ///
    /// Returns `VersionConflict` if another write landed first and
    /// `NotFound` if the tournament does not exist.
    fn commit(
        &self,
        expected_version: i64,
        state: &TournamentState,
        event: &AuditEvent,
    ) -> Result<i64, PersistenceError>;

    /// Returns the audit trail of a tournament, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no tournament has this id.
    fn audit_trail(&self, id: TournamentId) -> Result<Vec<AuditEvent>, PersistenceError>;
}
