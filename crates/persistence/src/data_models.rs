// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::PersistenceError;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tourney_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use tourney_domain::TournamentId;

/// Row of `audit_events` in column order.
pub type AuditEventRow = (i64, i64, String, String, String, String, String, String);

/// Converts a tournament id to its column value.
///
/// # Errors
///
/// Returns `Serialization` if the id does not fit in a signed 64-bit column.
pub fn to_db_id(id: TournamentId) -> Result<i64, PersistenceError> {
    i64::try_from(id.value())
        .map_err(|_| PersistenceError::Serialization(format!("tournament id {id} out of range")))
}

/// Converts a column value back to a tournament id.
///
/// # Errors
///
/// Returns `Serialization` for negative values.
pub fn from_db_id(raw: i64) -> Result<TournamentId, PersistenceError> {
    u64::try_from(raw)
        .map(TournamentId::new)
        .map_err(|_| PersistenceError::Serialization(format!("invalid tournament id {raw}")))
}

/// Formats a timestamp for a `TEXT` column.
///
/// # Errors
///
/// Returns `Serialization` if the timestamp cannot be represented.
pub fn format_timestamp(at: OffsetDateTime) -> Result<String, PersistenceError> {
    Ok(at.format(&Rfc3339)?)
}

/// Serialized columns of an audit event.
pub struct AuditEventData {
    pub actor_json: String,
    pub cause_json: String,
    pub action_json: String,
    pub created_at: String,
}

impl AuditEventData {
    /// Encodes the structured parts of an audit event.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` if any part fails to encode.
    pub fn encode(event: &AuditEvent) -> Result<Self, PersistenceError> {
        Ok(Self {
            actor_json: serde_json::to_string(&event.actor)?,
            cause_json: serde_json::to_string(&event.cause)?,
            action_json: serde_json::to_string(&event.action)?,
            created_at: format_timestamp(event.occurred_at)?,
        })
    }
}

/// Rebuilds an audit event from its stored row.
///
/// # Errors
///
/// Returns `Serialization` if a column fails to decode.
pub fn decode_audit_event(row: AuditEventRow) -> Result<AuditEvent, PersistenceError> {
    let (event_id, tournament_id, actor_json, cause_json, action_json, before, after, created_at) =
        row;
    let actor: Actor = serde_json::from_str(&actor_json)?;
    let cause: Cause = serde_json::from_str(&cause_json)?;
    let action: Action = serde_json::from_str(&action_json)?;
    let occurred_at: OffsetDateTime = OffsetDateTime::parse(&created_at, &Rfc3339)?;
    Ok(AuditEvent::new(
        from_db_id(tournament_id)?,
        actor,
        cause,
        action,
        StateSnapshot::new(before),
        StateSnapshot::new(after),
        occurred_at,
    )
    .with_event_id(event_id))
}
