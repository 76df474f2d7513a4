// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The tournament service: the single entry point for callers.
//!
//! Mutations follow one path: authenticate the caller, check its role,
//! take the tournament's lock, load the aggregate, `apply` the command and
//! commit the result with its audit event. A commit that loses an optimistic
//! version race is recomputed once against the latest state; a second loss
//! surfaces as `Conflict`. Notifications go out only after a successful
//! commit.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use time::OffsetDateTime;
use tourney::{
    Caller, Command, EngineEvent, TournamentConfig, TournamentState, TransitionResult, apply,
    create_tournament,
};
use tourney_audit::{AuditEvent, Cause};
use tourney_domain::{
    Bracket, DomainError, Entrant, Match, MatchId, Participant, ParticipantId, TournamentId,
    TournamentSettings,
};
use tourney_persistence::{INITIAL_VERSION, PersistenceError, StoredTournament, TournamentStore};
use tracing::{debug, info, warn};

use crate::auth::{AuthenticationService, AuthorizationService};
use crate::clock::Clock;
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::notifier::Notifier;
use crate::request_response::{
    AdvanceStatusRequest, AssignSeedsRequest, AuditEventInfo, AuditTrailResponse,
    BracketResponse, CallerRequest, CreateTournamentRequest, DisputeRequest,
    GenerateBracketRequest, MatchResponse, ParticipantResponse, ParticipantsResponse,
    RegisterRequest, ReportScoreRequest, ResolveDisputeRequest, StandingsResponse,
    TournamentResponse,
};

/// Outcome of one load-apply-commit attempt.
enum Attempt {
    /// The state now stored, and its version.
    Committed(TournamentState, i64),
    /// Another writer got there first.
    Conflict(PersistenceError),
}

fn lock_poisoned() -> ApiError {
    ApiError::Internal {
        message: String::from("Tournament lock poisoned"),
    }
}

/// Serializes and persists every operation on tournaments.
pub struct TournamentService<S, N, C> {
    store: S,
    notifier: N,
    clock: C,
    default_dispute_window_secs: u64,
    /// Locks of tournaments with an operation in flight. Entries whose
    /// last holder has finished are pruned on the next lookup.
    locks: Mutex<HashMap<TournamentId, Weak<Mutex<()>>>>,
}

impl<S: TournamentStore, N: Notifier, C: Clock> TournamentService<S, N, C> {
    /// Creates a service.
    ///
    /// # Arguments
    ///
    /// * `store` - Where tournaments are kept
    /// * `notifier` - Receives engine events after each commit
    /// * `clock` - Source of transition timestamps
    /// * `default_dispute_window_secs` - Dispute window for tournaments created without one
    #[must_use]
    pub fn new(store: S, notifier: N, clock: C, default_dispute_window_secs: u64) -> Self {
        Self {
            store,
            notifier,
            clock,
            default_dispute_window_secs,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    fn lock_for(&self, tournament_id: TournamentId) -> Result<Arc<Mutex<()>>, ApiError> {
        let mut locks: MutexGuard<'_, HashMap<TournamentId, Weak<Mutex<()>>>> =
            self.locks.lock().map_err(|_| lock_poisoned())?;
        locks.retain(|_, lock| lock.strong_count() > 0);
        if let Some(lock) = locks.get(&tournament_id).and_then(Weak::upgrade) {
            return Ok(lock);
        }
        let lock: Arc<Mutex<()>> = Arc::new(Mutex::new(()));
        locks.insert(tournament_id, Arc::downgrade(&lock));
        Ok(lock)
    }

    /// Number of tournament locks currently tracked.
    #[cfg(test)]
    pub(crate) fn tracked_locks(&self) -> usize {
        self.locks.lock().map_or(0, |locks| {
            locks.values().filter(|lock| lock.strong_count() > 0).count()
        })
    }

    fn load(&self, tournament_id: TournamentId) -> Result<StoredTournament, ApiError> {
        self.store
            .load(tournament_id)
            .map_err(translate_persistence_error)
    }

    fn dispatch(&self, tournament_id: TournamentId, events: &[EngineEvent]) {
        for event in events {
            if let Err(err) = self.notifier.notify(tournament_id, event) {
                warn!(%tournament_id, ?event, error = %err, "Notification failed");
            }
        }
    }

    fn attempt(
        &self,
        tournament_id: TournamentId,
        caller: &Caller,
        command: Command,
        cause: Cause,
    ) -> Result<Attempt, ApiError> {
        let stored: StoredTournament = self.load(tournament_id)?;
        let action: &'static str = command.name();
        let now: OffsetDateTime = self.clock.now();
        let result: TransitionResult =
            apply(&stored.state, command, caller, cause, now).map_err(translate_core_error)?;

        let Some(event) = result.audit_event.as_ref() else {
            debug!(%tournament_id, action, "Command changed nothing");
            return Ok(Attempt::Committed(result.new_state, stored.version));
        };
        match self.store.commit(stored.version, &result.new_state, event) {
            Ok(version) => {
                self.dispatch(tournament_id, &result.events);
                Ok(Attempt::Committed(result.new_state, version))
            }
            Err(err @ PersistenceError::VersionConflict { .. }) => Ok(Attempt::Conflict(err)),
            Err(err) => Err(translate_persistence_error(err)),
        }
    }

    fn execute(
        &self,
        tournament_id: TournamentId,
        caller: Caller,
        command: Command,
        cause: Cause,
    ) -> Result<(TournamentState, i64), ApiError> {
        let caller: Caller = AuthenticationService::authenticate(caller)?;
        AuthorizationService::authorize(&caller, &command)?;

        let lock: Arc<Mutex<()>> = self.lock_for(tournament_id)?;
        let _guard: MutexGuard<'_, ()> = lock.lock().map_err(|_| lock_poisoned())?;

        match self.attempt(tournament_id, &caller, command.clone(), cause.clone())? {
            Attempt::Committed(state, version) => Ok((state, version)),
            Attempt::Conflict(err) => {
                warn!(%tournament_id, error = %err, "Retrying against the latest version");
                match self.attempt(tournament_id, &caller, command, cause)? {
                    Attempt::Committed(state, version) => Ok((state, version)),
                    Attempt::Conflict(err) => Err(translate_persistence_error(err)),
                }
            }
        }
    }

    fn insert_new(
        &self,
        config: TournamentConfig,
        caller: &Caller,
        cause: Cause,
    ) -> Result<Attempt, ApiError> {
        let tournament_id: TournamentId = self
            .store
            .next_tournament_id()
            .map_err(translate_persistence_error)?;
        let result: TransitionResult =
            create_tournament(tournament_id, config, caller, cause, self.clock.now())
                .map_err(translate_core_error)?;
        let Some(event) = result.audit_event.as_ref() else {
            return Err(ApiError::Internal {
                message: String::from("Tournament creation produced no audit event"),
            });
        };
        match self.store.insert(&result.new_state, event) {
            Ok(_) => Ok(Attempt::Committed(result.new_state, INITIAL_VERSION)),
            Err(err @ PersistenceError::VersionConflict { .. }) => Ok(Attempt::Conflict(err)),
            Err(err) => Err(translate_persistence_error(err)),
        }
    }

    /// Creates a tournament in `draft` status.
    ///
    /// # Arguments
    ///
    /// * `request` - The configuration and the organizer creating it
    /// * `cause` - The reason for this action
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an organizer, the name is too
    /// long, or the store fails.
    pub fn create_tournament(
        &self,
        request: CreateTournamentRequest,
        cause: Cause,
    ) -> Result<TournamentResponse, ApiError> {
        let caller: Caller = AuthenticationService::authenticate(request.caller)?;
        AuthorizationService::authorize_create_tournament(&caller)?;

        let defaults: TournamentSettings = TournamentSettings::default();
        let config: TournamentConfig = TournamentConfig {
            name: request.name,
            format: request.format,
            max_participants: request.max_participants,
            settings: TournamentSettings {
                registration_closes_at: request.registration_closes_at,
                dispute_window_secs: request
                    .dispute_window_secs
                    .unwrap_or(self.default_dispute_window_secs),
                tiebreakers: request.tiebreakers.unwrap_or(defaults.tiebreakers),
            },
        };

        let (state, version): (TournamentState, i64) =
            match self.insert_new(config.clone(), &caller, cause.clone())? {
                Attempt::Committed(state, version) => (state, version),
                Attempt::Conflict(err) => {
                    warn!(error = %err, "Tournament id taken; retrying with a fresh id");
                    match self.insert_new(config, &caller, cause)? {
                        Attempt::Committed(state, version) => (state, version),
                        Attempt::Conflict(err) => return Err(translate_persistence_error(err)),
                    }
                }
            };

        info!(
            tournament_id = %state.tournament.id,
            format = %state.tournament.format,
            max_participants = state.tournament.max_participants,
            "Created tournament"
        );
        Ok(tournament_response(state, version))
    }

    /// Moves a tournament to its next lifecycle status.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an organizer or the transition
    /// is not allowed.
    pub fn advance_tournament_state(
        &self,
        tournament_id: TournamentId,
        request: AdvanceStatusRequest,
        cause: Cause,
    ) -> Result<TournamentResponse, ApiError> {
        let command: Command = Command::AdvanceStatus {
            target: request.target,
            force_close: request.force_close,
        };
        let (state, version): (TournamentState, i64) =
            self.execute(tournament_id, request.caller, command, cause)?;
        Ok(tournament_response(state, version))
    }

    /// Registers an entrant, defaulting to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if registration is closed, the tournament is full,
    /// or the entrant is already active.
    pub fn register(
        &self,
        tournament_id: TournamentId,
        request: RegisterRequest,
        cause: Cause,
    ) -> Result<ParticipantResponse, ApiError> {
        let entrant: Entrant = request
            .entrant
            .unwrap_or_else(|| request.caller.entrant.clone());
        let command: Command = Command::Register {
            entrant: entrant.clone(),
        };
        let (state, _): (TournamentState, i64) =
            self.execute(tournament_id, request.caller, command, cause)?;
        let participant: &Participant = state
            .participants
            .iter()
            .rev()
            .find(|p| p.entrant == entrant && p.is_active())
            .ok_or_else(|| ApiError::Internal {
                message: format!("Registered entrant {entrant} is missing"),
            })?;
        Ok(ParticipantResponse {
            tournament_id,
            participant: participant.clone(),
        })
    }

    /// Confirms a participant's attendance.
    ///
    /// # Errors
    ///
    /// Returns an error if check-in is not open or the participant is unknown.
    pub fn check_in(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
        request: CallerRequest,
        cause: Cause,
    ) -> Result<ParticipantResponse, ApiError> {
        let command: Command = Command::CheckIn { participant_id };
        let (state, _): (TournamentState, i64) =
            self.execute(tournament_id, request.caller, command, cause)?;
        participant_response(&state, participant_id)
    }

    /// Withdraws a participant, forfeiting their open match once play has
    /// started.
    ///
    /// # Errors
    ///
    /// Returns an error if the participant is unknown or no longer active.
    pub fn withdraw(
        &self,
        tournament_id: TournamentId,
        participant_id: ParticipantId,
        request: CallerRequest,
        cause: Cause,
    ) -> Result<ParticipantResponse, ApiError> {
        let command: Command = Command::Withdraw { participant_id };
        let (state, _): (TournamentState, i64) =
            self.execute(tournament_id, request.caller, command, cause)?;
        participant_response(&state, participant_id)
    }

    /// Assigns seeds from an external ranking or registration order.
    ///
    /// # Errors
    ///
    /// Returns an error if seeding is closed or the ranking is invalid.
    pub fn assign_seeds(
        &self,
        tournament_id: TournamentId,
        request: AssignSeedsRequest,
        cause: Cause,
    ) -> Result<ParticipantsResponse, ApiError> {
        let command: Command = Command::AssignSeeds {
            ranking: request.ranking,
        };
        let (state, _): (TournamentState, i64) =
            self.execute(tournament_id, request.caller, command, cause)?;
        Ok(ParticipantsResponse {
            tournament_id,
            participants: state.participants,
        })
    }

    /// Clears all seeds.
    ///
    /// # Errors
    ///
    /// Returns an error if seeding is closed.
    pub fn reset_seeds(
        &self,
        tournament_id: TournamentId,
        request: CallerRequest,
        cause: Cause,
    ) -> Result<ParticipantsResponse, ApiError> {
        let (state, _): (TournamentState, i64) =
            self.execute(tournament_id, request.caller, Command::ResetSeeds, cause)?;
        Ok(ParticipantsResponse {
            tournament_id,
            participants: state.participants,
        })
    }

    /// Builds the bracket from the checked-in participants.
    ///
    /// # Errors
    ///
    /// Returns an error if a bracket exists and `force` is not set, or too
    /// few participants have checked in.
    pub fn generate_bracket(
        &self,
        tournament_id: TournamentId,
        request: GenerateBracketRequest,
        cause: Cause,
    ) -> Result<BracketResponse, ApiError> {
        let command: Command = Command::GenerateBracket {
            force: request.force,
        };
        let (state, _): (TournamentState, i64) =
            self.execute(tournament_id, request.caller, command, cause)?;
        bracket_response(state)
    }

    /// Marks a ready match as being played.
    ///
    /// # Errors
    ///
    /// Returns an error if the match is not ready or the caller is not one
    /// of its participants or an organizer.
    pub fn start_match(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        request: CallerRequest,
        cause: Cause,
    ) -> Result<MatchResponse, ApiError> {
        let (state, _): (TournamentState, i64) = self.execute(
            tournament_id,
            request.caller,
            Command::StartMatch { match_id },
            cause,
        )?;
        match_response(&state, match_id)
    }

    /// Reports a final score and advances the bracket.
    ///
    /// Replaying the exact accepted result returns the match unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error for tied scores, unauthorized reporters, or matches
    /// that are not playable.
    pub fn report_score(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        request: ReportScoreRequest,
        cause: Cause,
    ) -> Result<MatchResponse, ApiError> {
        let command: Command = Command::ReportScore {
            match_id,
            score_p1: request.score_p1,
            score_p2: request.score_p2,
        };
        let (state, _): (TournamentState, i64) =
            self.execute(tournament_id, request.caller, command, cause)?;
        match_response(&state, match_id)
    }

    /// Contests a completed result.
    ///
    /// # Errors
    ///
    /// Returns an error if the window has closed, a downstream match has
    /// started, or the caller did not play the match.
    pub fn dispute(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        request: DisputeRequest,
        cause: Cause,
    ) -> Result<MatchResponse, ApiError> {
        let command: Command = Command::Dispute {
            match_id,
            reason: request.reason,
        };
        let (state, _): (TournamentState, i64) =
            self.execute(tournament_id, request.caller, command, cause)?;
        match_response(&state, match_id)
    }

    /// Settles a disputed match.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if only one corrected score is given, and an
    /// error if the match is not disputed or the winner did not play it.
    pub fn resolve_dispute(
        &self,
        tournament_id: TournamentId,
        match_id: MatchId,
        request: ResolveDisputeRequest,
        cause: Cause,
    ) -> Result<MatchResponse, ApiError> {
        let scores: Option<(u32, u32)> = match (request.score_p1, request.score_p2) {
            (Some(score_p1), Some(score_p2)) => Some((score_p1, score_p2)),
            (None, None) => None,
            _ => {
                return Err(ApiError::InvalidInput {
                    field: String::from("scores"),
                    message: String::from("score_p1 and score_p2 must be given together"),
                });
            }
        };
        let command: Command = Command::ResolveDispute {
            match_id,
            final_winner: request.final_winner,
            scores,
        };
        let (state, _): (TournamentState, i64) =
            self.execute(tournament_id, request.caller, command, cause)?;
        match_response(&state, match_id)
    }

    /// Returns a tournament with its participants.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the tournament does not exist.
    pub fn get_tournament(
        &self,
        tournament_id: TournamentId,
    ) -> Result<TournamentResponse, ApiError> {
        let stored: StoredTournament = self.load(tournament_id)?;
        Ok(tournament_response(stored.state, stored.version))
    }

    /// Returns the bracket together with every dispute raised on it.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the tournament or its bracket does not exist.
    pub fn get_bracket(&self, tournament_id: TournamentId) -> Result<BracketResponse, ApiError> {
        bracket_response(self.load(tournament_id)?.state)
    }

    /// Returns the standings table.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the tournament does not exist.
    pub fn get_standings(
        &self,
        tournament_id: TournamentId,
    ) -> Result<StandingsResponse, ApiError> {
        let stored: StoredTournament = self.load(tournament_id)?;
        Ok(StandingsResponse {
            tournament_id,
            standings: stored.state.standings(),
        })
    }

    /// Returns the audit trail, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the tournament does not exist.
    pub fn get_audit_trail(
        &self,
        tournament_id: TournamentId,
    ) -> Result<AuditTrailResponse, ApiError> {
        let events: Vec<AuditEvent> = self
            .store
            .audit_trail(tournament_id)
            .map_err(translate_persistence_error)?;
        Ok(AuditTrailResponse {
            tournament_id,
            events: events.into_iter().map(AuditEventInfo::from).collect(),
        })
    }
}

fn tournament_response(state: TournamentState, version: i64) -> TournamentResponse {
    TournamentResponse {
        tournament: state.tournament,
        participants: state.participants,
        version,
    }
}

fn participant_response(
    state: &TournamentState,
    participant_id: ParticipantId,
) -> Result<ParticipantResponse, ApiError> {
    let participant: &Participant = state
        .participant(participant_id)
        .map_err(translate_domain_error)?;
    Ok(ParticipantResponse {
        tournament_id: state.tournament.id,
        participant: participant.clone(),
    })
}

fn bracket_response(state: TournamentState) -> Result<BracketResponse, ApiError> {
    let tournament_id: TournamentId = state.tournament.id;
    let bracket: Bracket = state
        .bracket
        .ok_or_else(|| translate_domain_error(DomainError::NoBracket))?;
    Ok(BracketResponse {
        tournament_id,
        bracket,
        disputes: state.disputes,
    })
}

fn match_response(state: &TournamentState, match_id: MatchId) -> Result<MatchResponse, ApiError> {
    let found: &Match = state
        .bracket()
        .and_then(|bracket| bracket.get(match_id))
        .map_err(translate_domain_error)?;
    Ok(MatchResponse {
        tournament_id: state.tournament.id,
        match_state: found.clone(),
    })
}
