// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use tourney_domain::TournamentId;

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    /// A query or statement failed.
    #[error("Database error: {0}")]
    Database(String),
    /// The database could not be opened.
    #[error("Database connection failed: {0}")]
    Connection(String),
    /// Embedded migrations could not be applied.
    #[error("Migration failed: {0}")]
    Migration(String),
    /// A stored document could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// No tournament is stored under this id.
    #[error("Tournament {0} not found")]
    NotFound(TournamentId),
    /// The stored version no longer matches the one the caller loaded.
    #[error("Tournament {tournament_id} was modified concurrently (expected version {expected})")]
    VersionConflict {
        /// The tournament being written.
        tournament_id: TournamentId,
        /// The version the caller based its write on.
        expected: i64,
    },
    /// A thread panicked while holding the store lock.
    #[error("Store lock poisoned")]
    LockPoisoned,
}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::Connection(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<time::error::Format> for PersistenceError {
    fn from(err: time::error::Format) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<time::error::Parse> for PersistenceError {
    fn from(err: time::error::Parse) -> Self {
        Self::Serialization(err.to_string())
    }
}
