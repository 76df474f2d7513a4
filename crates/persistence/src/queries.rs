// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::dsl::{exists, max};
use diesel::prelude::*;
use tourney::TournamentState;
use tourney_audit::AuditEvent;
use tourney_domain::TournamentId;

use crate::data_models::{AuditEventRow, decode_audit_event, from_db_id, to_db_id};
use crate::diesel_schema::{audit_events, tournaments};
use crate::error::PersistenceError;
use crate::store::StoredTournament;

/// Returns whether a tournament row exists.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn tournament_exists(conn: &mut SqliteConnection, raw_id: i64) -> Result<bool, PersistenceError> {
    Ok(diesel::select(exists(
        tournaments::table.filter(tournaments::tournament_id.eq(raw_id)),
    ))
    .get_result(conn)?)
}

/// Returns one past the highest stored tournament id.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn next_tournament_id(conn: &mut SqliteConnection) -> Result<TournamentId, PersistenceError> {
    let highest: Option<i64> = tournaments::table
        .select(max(tournaments::tournament_id))
        .first(conn)?;
    from_db_id(highest.unwrap_or(0) + 1)
}

/// Loads a tournament aggregate and its version.
///
/// # Errors
///
/// Returns `NotFound` if the row does not exist.
pub fn load_tournament(
    conn: &mut SqliteConnection,
    id: TournamentId,
) -> Result<StoredTournament, PersistenceError> {
    let row: Option<(i64, String)> = tournaments::table
        .filter(tournaments::tournament_id.eq(to_db_id(id)?))
        .select((tournaments::version, tournaments::aggregate_json))
        .first(conn)
        .optional()?;
    let (version, aggregate_json) = row.ok_or(PersistenceError::NotFound(id))?;
    let state: TournamentState = serde_json::from_str(&aggregate_json)?;
    Ok(StoredTournament { state, version })
}

/// Loads the audit trail of a tournament, oldest first.
///
/// # Errors
///
/// Returns `NotFound` if the tournament does not exist.
pub fn audit_trail(
    conn: &mut SqliteConnection,
    id: TournamentId,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    let raw_id: i64 = to_db_id(id)?;
    if !tournament_exists(conn, raw_id)? {
        return Err(PersistenceError::NotFound(id));
    }
    let rows: Vec<AuditEventRow> = audit_events::table
        .filter(audit_events::tournament_id.eq(raw_id))
        .order(audit_events::event_id.asc())
        .select((
            audit_events::event_id,
            audit_events::tournament_id,
            audit_events::actor_json,
            audit_events::cause_json,
            audit_events::action_json,
            audit_events::before_snapshot,
            audit_events::after_snapshot,
            audit_events::created_at,
        ))
        .load(conn)?;
    rows.into_iter().map(decode_audit_event).collect()
}
