// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use tourney::TournamentState;
use tourney_audit::AuditEvent;
use tourney_domain::TournamentId;
use tracing::debug;

use crate::error::PersistenceError;
use crate::store::{INITIAL_VERSION, StoredTournament, TournamentStore};

#[derive(Debug, Default)]
struct Inner {
    tournaments: BTreeMap<TournamentId, StoredTournament>,
    audit_events: Vec<AuditEvent>,
}

impl Inner {
    fn append(&mut self, event: &AuditEvent) -> i64 {
        let event_id: i64 = i64::try_from(self.audit_events.len()).unwrap_or(i64::MAX - 1) + 1;
        self.audit_events
            .push(event.clone().with_event_id(event_id));
        event_id
    }
}

/// A store that keeps everything in process memory.
///
/// Behaves like the `SQLite` store, including version checks, but nothing
/// survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
}

impl InMemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, PersistenceError> {
        self.inner.lock().map_err(|_| PersistenceError::LockPoisoned)
    }
}

impl TournamentStore for InMemoryStore {
    fn next_tournament_id(&self) -> Result<TournamentId, PersistenceError> {
        let inner: MutexGuard<'_, Inner> = self.lock()?;
        let highest: u64 = inner
            .tournaments
            .keys()
            .next_back()
            .map_or(0, TournamentId::value);
        Ok(TournamentId::new(highest + 1))
    }

    fn insert(
        &self,
        state: &TournamentState,
        event: &AuditEvent,
    ) -> Result<i64, PersistenceError> {
        let mut inner: MutexGuard<'_, Inner> = self.lock()?;
        let id: TournamentId = state.tournament.id;
        if inner.tournaments.contains_key(&id) {
            return Err(PersistenceError::VersionConflict {
                tournament_id: id,
                expected: 0,
            });
        }
        inner.tournaments.insert(
            id,
            StoredTournament {
                state: state.clone(),
                version: INITIAL_VERSION,
            },
        );
        Ok(inner.append(event))
    }

    fn load(&self, id: TournamentId) -> Result<StoredTournament, PersistenceError> {
        self.lock()?
            .tournaments
            .get(&id)
            .cloned()
            .ok_or(PersistenceError::NotFound(id))
    }

    fn commit(
        &self,
        expected_version: i64,
        state: &TournamentState,
        event: &AuditEvent,
    ) -> Result<i64, PersistenceError> {
        let mut inner: MutexGuard<'_, Inner> = self.lock()?;
        let id: TournamentId = state.tournament.id;
        let stored: &mut StoredTournament = inner
            .tournaments
            .get_mut(&id)
            .ok_or(PersistenceError::NotFound(id))?;
        if stored.version != expected_version {
            return Err(PersistenceError::VersionConflict {
                tournament_id: id,
                expected: expected_version,
            });
        }
        stored.state = state.clone();
        stored.version = expected_version + 1;
        let version: i64 = stored.version;
        let event_id: i64 = inner.append(event);
        debug!(tournament_id = %id, version, event_id, "Committed tournament in memory");
        Ok(version)
    }

    fn audit_trail(&self, id: TournamentId) -> Result<Vec<AuditEvent>, PersistenceError> {
        let inner: MutexGuard<'_, Inner> = self.lock()?;
        if !inner.tournaments.contains_key(&id) {
            return Err(PersistenceError::NotFound(id));
        }
        Ok(inner
            .audit_events
            .iter()
            .filter(|event| event.tournament_id == id)
            .cloned()
            .collect())
    }
}
