// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Request and response types for the service boundary.
//!
//! Every mutating request names its `caller`. Responses carry the domain
//! types directly; their serde shapes are the wire format.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tourney::Caller;
use tourney_audit::AuditEvent;
use tourney_domain::{
    Bracket, DisputeRecord, Entrant, Match, Participant, ParticipantId, Standing, Tiebreaker,
    Tournament, TournamentFormat, TournamentId, TournamentStatus,
};

/// Request to create a tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTournamentRequest {
    /// The organizer creating the tournament.
    pub caller: Caller,
    /// Display name.
    pub name: String,
    /// Competition structure.
    pub format: TournamentFormat,
    /// Capacity.
    pub max_participants: u32,
    /// When registration may close without force.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub registration_closes_at: Option<OffsetDateTime>,
    /// Dispute window; the service default applies when absent.
    #[serde(default)]
    pub dispute_window_secs: Option<u64>,
    /// Round-robin tiebreak order; the engine default applies when absent.
    #[serde(default)]
    pub tiebreakers: Option<Vec<Tiebreaker>>,
}

/// Request carrying nothing but the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerRequest {
    /// Who is acting.
    pub caller: Caller,
}

/// Request to move a tournament to its next status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceStatusRequest {
    /// Who is acting.
    pub caller: Caller,
    /// The requested status.
    pub target: TournamentStatus,
    /// Close registration before its scheduled time.
    #[serde(default)]
    pub force_close: bool,
}

/// Request to register an entrant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Who is acting.
    pub caller: Caller,
    /// The entrant to register. Defaults to the caller.
    #[serde(default)]
    pub entrant: Option<Entrant>,
}

/// Request to assign seeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignSeedsRequest {
    /// Who is acting.
    pub caller: Caller,
    /// External ranking, best first. Registration order when absent.
    #[serde(default)]
    pub ranking: Option<Vec<ParticipantId>>,
}

/// Request to generate the bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateBracketRequest {
    /// Who is acting.
    pub caller: Caller,
    /// Replace an existing bracket.
    #[serde(default)]
    pub force: bool,
}

/// Request to report a final score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportScoreRequest {
    /// Who is reporting.
    pub caller: Caller,
    /// Score of slot 1.
    pub score_p1: u32,
    /// Score of slot 2.
    pub score_p2: u32,
}

/// Request to contest a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeRequest {
    /// Who is disputing.
    pub caller: Caller,
    /// Why.
    pub reason: String,
}

/// Request to settle a dispute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveDisputeRequest {
    /// The organizer deciding.
    pub caller: Caller,
    /// The confirmed winner.
    pub final_winner: ParticipantId,
    /// Corrected score of slot 1. Must be given together with `score_p2`.
    #[serde(default)]
    pub score_p1: Option<u32>,
    /// Corrected score of slot 2. Must be given together with `score_p1`.
    #[serde(default)]
    pub score_p2: Option<u32>,
}

/// A tournament with its participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentResponse {
    /// Identity, configuration and status.
    pub tournament: Tournament,
    /// Every participant, in registration order.
    pub participants: Vec<Participant>,
    /// Stored version the response was read at.
    pub version: i64,
}

/// A single participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantResponse {
    /// The tournament.
    pub tournament_id: TournamentId,
    /// The participant after the operation.
    pub participant: Participant,
}

/// The participant list after a seeding change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantsResponse {
    /// The tournament.
    pub tournament_id: TournamentId,
    /// Every participant, in registration order.
    pub participants: Vec<Participant>,
}

/// The bracket projection: structure plus the dispute record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketResponse {
    /// The tournament.
    pub tournament_id: TournamentId,
    /// The bracket.
    pub bracket: Bracket,
    /// Every dispute raised, open and resolved.
    pub disputes: Vec<DisputeRecord>,
}

/// A single match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResponse {
    /// The tournament.
    pub tournament_id: TournamentId,
    /// The match after the operation.
    #[serde(rename = "match")]
    pub match_state: Match,
}

/// The standings table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandingsResponse {
    /// The tournament.
    pub tournament_id: TournamentId,
    /// Rows, best first.
    pub standings: Vec<Standing>,
}

/// One audit trail entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEventInfo {
    /// Store-assigned identifier.
    pub event_id: Option<i64>,
    /// Who acted.
    pub actor_id: String,
    /// Their role.
    pub actor_type: String,
    /// Request identifier.
    pub cause_id: String,
    /// Request description.
    pub cause_description: String,
    /// The action name.
    pub action: String,
    /// Action details.
    pub details: Option<String>,
    /// Summary before the transition.
    pub before_snapshot: String,
    /// Summary after the transition.
    pub after_snapshot: String,
    /// When it happened.
    #[serde(with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,
}

impl From<AuditEvent> for AuditEventInfo {
    fn from(event: AuditEvent) -> Self {
        Self {
            event_id: event.event_id,
            actor_id: event.actor.id,
            actor_type: event.actor.actor_type,
            cause_id: event.cause.id,
            cause_description: event.cause.description,
            action: event.action.name,
            details: event.action.details,
            before_snapshot: event.before.data,
            after_snapshot: event.after.data,
            occurred_at: event.occurred_at,
        }
    }
}

/// The audit trail of a tournament, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditTrailResponse {
    /// The tournament.
    pub tournament_id: TournamentId,
    /// Every recorded transition.
    pub events: Vec<AuditEventInfo>,
}
