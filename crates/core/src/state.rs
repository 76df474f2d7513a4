// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};
use tourney_audit::{AuditEvent, StateSnapshot};
use tourney_domain::{
    Bracket, DisputeRecord, DomainError, Entrant, Match, MatchId, MatchStatus, Participant,
    ParticipantId, Standing, Tournament, TournamentSettings, TournamentFormat, compute_standings,
};

/// Configuration supplied when creating a tournament.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentConfig {
    /// Display name.
    pub name: String,
    /// Competition structure.
    pub format: TournamentFormat,
    /// Capacity.
    pub max_participants: u32,
    /// Additional settings.
    #[serde(default)]
    pub settings: TournamentSettings,
}

/// The tournament aggregate: everything one tournament owns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentState {
    /// Identity, configuration and lifecycle status.
    pub tournament: Tournament,
    /// Every participant ever registered, in registration order.
    pub participants: Vec<Participant>,
    /// The bracket, once generated.
    pub bracket: Option<Bracket>,
    /// Dispute records, open and resolved.
    pub disputes: Vec<DisputeRecord>,
}

impl TournamentState {
    /// Creates the aggregate for a freshly created tournament.
    #[must_use]
    pub const fn new(tournament: Tournament) -> Self {
        Self {
            tournament,
            participants: Vec::new(),
            bracket: None,
            disputes: Vec::new(),
        }
    }

    /// Looks up a participant.
    ///
    /// # Errors
    ///
    /// Returns `ParticipantNotFound` if no participant has this id.
    pub fn participant(&self, id: ParticipantId) -> Result<&Participant, DomainError> {
        self.participants
            .iter()
            .find(|p| p.id == id)
            .ok_or(DomainError::ParticipantNotFound(id))
    }

    pub(crate) fn participant_mut(
        &mut self,
        id: ParticipantId,
    ) -> Result<&mut Participant, DomainError> {
        self.participants
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(DomainError::ParticipantNotFound(id))
    }

    /// Counts participants that occupy capacity.
    #[must_use]
    pub fn active_count(&self) -> u32 {
        let count: usize = self.participants.iter().filter(|p| p.is_active()).count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Returns the bracket.
    ///
    /// # Errors
    ///
    /// Returns `NoBracket` if none has been generated.
    pub fn bracket(&self) -> Result<&Bracket, DomainError> {
        self.bracket.as_ref().ok_or(DomainError::NoBracket)
    }

    pub(crate) fn bracket_mut(&mut self) -> Result<&mut Bracket, DomainError> {
        self.bracket.as_mut().ok_or(DomainError::NoBracket)
    }

    /// Returns whether the entrant holds one of the match's slots under any
    /// of their participant records.
    #[must_use]
    pub fn plays_in(&self, entrant: &Entrant, m: &Match) -> bool {
        self.participants
            .iter()
            .filter(|p| &p.entrant == entrant)
            .any(|p| m.involves(p.id))
    }

    /// Returns the dispute records of a match, oldest first.
    pub fn disputes_for(&self, match_id: MatchId) -> impl Iterator<Item = &DisputeRecord> {
        self.disputes.iter().filter(move |d| d.match_id == match_id)
    }

    /// Computes the current standings table.
    #[must_use]
    pub fn standings(&self) -> Vec<Standing> {
        compute_standings(
            &self.participants,
            self.bracket.as_ref(),
            &self.tournament.settings.tiebreakers,
        )
    }

    /// Converts the aggregate to an audit snapshot.
    #[must_use]
    pub fn to_snapshot(&self) -> StateSnapshot {
        let (completed, total): (usize, usize) = self.bracket.as_ref().map_or((0, 0), |b| {
            let done: usize = b
                .matches
                .iter()
                .filter(|m| m.status == MatchStatus::Completed)
                .count();
            (done, b.matches.len())
        });
        let open_disputes: usize = self.disputes.iter().filter(|d| d.is_open()).count();
        StateSnapshot::new(format!(
            "status={} participants={} active={} matches_completed={completed}/{total} open_disputes={open_disputes}",
            self.tournament.status,
            self.participants.len(),
            self.active_count(),
        ))
    }
}

/// Something collaborators may want to hear about after a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Both participants of a match are known.
    MatchReady {
        /// The match.
        match_id: MatchId,
        /// Slot 1 and slot 2.
        participants: [ParticipantId; 2],
    },
    /// A result was accepted.
    MatchCompleted {
        /// The match.
        match_id: MatchId,
        /// The winner.
        winner: ParticipantId,
    },
    /// The bracket produced its final result.
    TournamentCompleted {
        /// The champion, for elimination formats; the round-robin leader otherwise.
        champion: Option<ParticipantId>,
    },
}

/// The result of a successful state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The new aggregate.
    pub new_state: TournamentState,
    /// The audit event. `None` when the command was an idempotent no-op.
    pub audit_event: Option<AuditEvent>,
    /// Notifications produced by the transition.
    pub events: Vec<EngineEvent>,
}

impl TransitionResult {
    /// Returns whether the transition changed anything.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.audit_event.is_some()
    }
}
