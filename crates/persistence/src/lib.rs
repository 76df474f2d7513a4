// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the tournament engine.
//!
//! Tournaments are stored as whole aggregates: one row per tournament
//! holding the `serde_json` document of its `TournamentState`, plus an
//! append-only `audit_events` table. Every write commits the aggregate and
//! its audit event in one transaction.
//!
//! ## Optimistic versioning
//!
//! Each tournament row carries a `version`. A commit names the version it
//! was computed from and only lands if that is still the stored version;
//! otherwise it fails with `PersistenceError::VersionConflict` and the
//! caller decides whether to reload and retry.
//!
//! ## Backends
//!
//! - `SqliteStore` uses Diesel with embedded migrations. File databases
//!   run in WAL mode; `new_in_memory()` gives every call its own isolated
//!   shared-cache database.
//! - `InMemoryStore` keeps everything in a mutex-guarded map with the same
//!   version semantics.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};
use tourney::TournamentState;
use tourney_audit::AuditEvent;
use tourney_domain::TournamentId;

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod memory;
mod mutations;
mod queries;
mod store;

#[cfg(test)]
mod tests;

pub use backend::sqlite::MIGRATIONS;
pub use error::PersistenceError;
pub use memory::InMemoryStore;
pub use store::{INITIAL_VERSION, StoredTournament, TournamentStore};

/// Atomic counter for generating unique in-memory database names.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Diesel-backed `SQLite` store.
pub struct SqliteStore {
    conn: Mutex<SqliteConnection>,
}

impl SqliteStore {
    /// Creates a store over a fresh in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_tourney_{db_id}?mode=memory&cache=shared");
        let conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates a store over a file-based `SQLite` database, creating and
    /// migrating it as needed.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path
            .as_ref()
            .to_str()
            .ok_or_else(|| PersistenceError::Connection(String::from("Invalid database path")))?;
        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, SqliteConnection>, PersistenceError> {
        self.conn.lock().map_err(|_| PersistenceError::LockPoisoned)
    }
}

impl TournamentStore for SqliteStore {
    fn next_tournament_id(&self) -> Result<TournamentId, PersistenceError> {
        queries::next_tournament_id(&mut *self.conn()?)
    }

    fn insert(
        &self,
        state: &TournamentState,
        event: &AuditEvent,
    ) -> Result<i64, PersistenceError> {
        mutations::insert_tournament(&mut *self.conn()?, state, event)
    }

    fn load(&self, id: TournamentId) -> Result<StoredTournament, PersistenceError> {
        queries::load_tournament(&mut *self.conn()?, id)
    }

    fn commit(
        &self,
        expected_version: i64,
        state: &TournamentState,
        event: &AuditEvent,
    ) -> Result<i64, PersistenceError> {
        mutations::commit_tournament(&mut *self.conn()?, expected_version, state, event)
    }

    fn audit_trail(&self, id: TournamentId) -> Result<Vec<AuditEvent>, PersistenceError> {
        queries::audit_trail(&mut *self.conn()?, id)
    }
}
