// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tourney::TournamentState;
use tourney_audit::AuditEvent;
use tourney_domain::TournamentId;
use tracing::{debug, info};

use crate::data_models::{AuditEventData, format_timestamp, to_db_id};
use crate::diesel_schema::{audit_events, tournaments};
use crate::error::PersistenceError;
use crate::queries;
use crate::store::INITIAL_VERSION;

/// Appends an audit event and returns its assigned id.
///
/// # Errors
///
/// Returns an error if the event cannot be encoded or inserted.
pub fn insert_audit_event(
    conn: &mut SqliteConnection,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    let data: AuditEventData = AuditEventData::encode(event)?;
    let event_id: i64 = diesel::insert_into(audit_events::table)
        .values((
            audit_events::tournament_id.eq(to_db_id(event.tournament_id)?),
            audit_events::actor_json.eq(&data.actor_json),
            audit_events::cause_json.eq(&data.cause_json),
            audit_events::action_json.eq(&data.action_json),
            audit_events::before_snapshot.eq(&event.before.data),
            audit_events::after_snapshot.eq(&event.after.data),
            audit_events::created_at.eq(&data.created_at),
        ))
        .returning(audit_events::event_id)
        .get_result(conn)?;
    debug!(event_id, action = %event.action.name, "Persisted audit event");
    Ok(event_id)
}

/// Inserts a new tournament row and its creation event in one transaction.
///
/// # Errors
///
/// Returns `VersionConflict` if the id is already taken.
pub fn insert_tournament(
    conn: &mut SqliteConnection,
    state: &TournamentState,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    let tournament_id: TournamentId = state.tournament.id;
    let raw_id: i64 = to_db_id(tournament_id)?;
    let aggregate_json: String = serde_json::to_string(state)?;
    let updated_at: String = format_timestamp(event.occurred_at)?;

    conn.transaction::<i64, PersistenceError, _>(|conn| {
        if queries::tournament_exists(conn, raw_id)? {
            return Err(PersistenceError::VersionConflict {
                tournament_id,
                expected: 0,
            });
        }
        diesel::insert_into(tournaments::table)
            .values((
                tournaments::tournament_id.eq(raw_id),
                tournaments::name.eq(&state.tournament.name),
                tournaments::format.eq(state.tournament.format.as_str()),
                tournaments::status.eq(state.tournament.status.as_str()),
                tournaments::version.eq(INITIAL_VERSION),
                tournaments::aggregate_json.eq(&aggregate_json),
                tournaments::updated_at.eq(&updated_at),
            ))
            .execute(conn)
            .map_err(|e| match e {
                DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                    PersistenceError::VersionConflict {
                        tournament_id,
                        expected: 0,
                    }
                }
                other => PersistenceError::from(other),
            })?;
        let event_id: i64 = insert_audit_event(conn, event)?;
        info!(%tournament_id, event_id, "Stored new tournament");
        Ok(event_id)
    })
}

/// Replaces a tournament row if its version still matches, appending the
/// audit event in the same transaction.
///
/// # Errors
///
/// Returns `VersionConflict` on a version mismatch and `NotFound` if the
/// row does not exist.
pub fn commit_tournament(
    conn: &mut SqliteConnection,
    expected_version: i64,
    state: &TournamentState,
    event: &AuditEvent,
) -> Result<i64, PersistenceError> {
    let tournament_id: TournamentId = state.tournament.id;
    let raw_id: i64 = to_db_id(tournament_id)?;
    let aggregate_json: String = serde_json::to_string(state)?;
    let updated_at: String = format_timestamp(event.occurred_at)?;
    let new_version: i64 = expected_version + 1;

    conn.transaction::<i64, PersistenceError, _>(|conn| {
        let updated: usize = diesel::update(
            tournaments::table
                .filter(tournaments::tournament_id.eq(raw_id))
                .filter(tournaments::version.eq(expected_version)),
        )
        .set((
            tournaments::name.eq(&state.tournament.name),
            tournaments::status.eq(state.tournament.status.as_str()),
            tournaments::version.eq(new_version),
            tournaments::aggregate_json.eq(&aggregate_json),
            tournaments::updated_at.eq(&updated_at),
        ))
        .execute(conn)?;

        if updated == 0 {
            if queries::tournament_exists(conn, raw_id)? {
                return Err(PersistenceError::VersionConflict {
                    tournament_id,
                    expected: expected_version,
                });
            }
            return Err(PersistenceError::NotFound(tournament_id));
        }

        let event_id: i64 = insert_audit_event(conn, event)?;
        info!(
            %tournament_id,
            version = new_version,
            event_id,
            action = %event.action.name,
            "Committed tournament transition"
        );
        Ok(new_version)
    })
}
