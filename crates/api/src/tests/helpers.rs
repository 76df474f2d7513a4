// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use time::macros::datetime;
use time::{Duration, OffsetDateTime};
use tourney::{Caller, EngineEvent, TournamentState};
use tourney_audit::{AuditEvent, Cause};
use tourney_domain::{
    DEFAULT_DISPUTE_WINDOW_SECS, Entrant, MatchId, ParticipantId, TournamentFormat,
    TournamentId, TournamentStatus,
};
use tourney_persistence::{InMemoryStore, PersistenceError, StoredTournament, TournamentStore};

use crate::{
    AdvanceStatusRequest, CallerRequest, Clock, CreateTournamentRequest, NotificationError,
    Notifier, RegisterRequest, ReportScoreRequest, TournamentService,
};

pub const BASE_TIME: OffsetDateTime = datetime!(2026-03-01 12:00 UTC);

/// A clock tests can move by hand.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<OffsetDateTime>>,
}

impl ManualClock {
    pub fn new(now: OffsetDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        *self.now.lock().unwrap()
    }
}

/// Remembers every delivered event.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    events: Arc<Mutex<Vec<(TournamentId, EngineEvent)>>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<EngineEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(
        &self,
        tournament_id: TournamentId,
        event: &EngineEvent,
    ) -> Result<(), NotificationError> {
        self.events
            .lock()
            .unwrap()
            .push((tournament_id, event.clone()));
        Ok(())
    }
}

/// Fails every delivery.
pub struct FailingNotifier;

impl Notifier for FailingNotifier {
    fn notify(&self, _: TournamentId, _: &EngineEvent) -> Result<(), NotificationError> {
        Err(NotificationError::new(String::from("endpoint unreachable")))
    }
}

/// Wraps an in-memory store and reports a version conflict on the next
/// `conflicts` commits without writing anything.
pub struct ConflictingStore {
    inner: InMemoryStore,
    conflicts: AtomicU32,
}

impl ConflictingStore {
    pub fn new(conflicts: u32) -> Self {
        Self {
            inner: InMemoryStore::new(),
            conflicts: AtomicU32::new(conflicts),
        }
    }

    pub fn arm(&self, conflicts: u32) {
        self.conflicts.store(conflicts, Ordering::SeqCst);
    }
}

impl TournamentStore for ConflictingStore {
    fn next_tournament_id(&self) -> Result<TournamentId, PersistenceError> {
        self.inner.next_tournament_id()
    }

    fn insert(
        &self,
        state: &TournamentState,
        event: &AuditEvent,
    ) -> Result<i64, PersistenceError> {
        self.inner.insert(state, event)
    }

    fn load(&self, id: TournamentId) -> Result<StoredTournament, PersistenceError> {
        self.inner.load(id)
    }

    fn commit(
        &self,
        expected_version: i64,
        state: &TournamentState,
        event: &AuditEvent,
    ) -> Result<i64, PersistenceError> {
        let pending: u32 = self.conflicts.load(Ordering::SeqCst);
        if pending > 0 {
            self.conflicts.store(pending - 1, Ordering::SeqCst);
            return Err(PersistenceError::VersionConflict {
                tournament_id: state.tournament.id,
                expected: expected_version,
            });
        }
        self.inner.commit(expected_version, state, event)
    }

    fn audit_trail(&self, id: TournamentId) -> Result<Vec<AuditEvent>, PersistenceError> {
        self.inner.audit_trail(id)
    }
}

pub type TestService = TournamentService<InMemoryStore, RecordingNotifier, ManualClock>;

pub struct Harness {
    pub service: TestService,
    pub clock: ManualClock,
    pub notifier: RecordingNotifier,
}

pub fn harness() -> Harness {
    let clock: ManualClock = ManualClock::new(BASE_TIME);
    let notifier: RecordingNotifier = RecordingNotifier::default();
    let service: TestService = TournamentService::new(
        InMemoryStore::new(),
        notifier.clone(),
        clock.clone(),
        DEFAULT_DISPUTE_WINDOW_SECS,
    );
    Harness {
        service,
        clock,
        notifier,
    }
}

pub fn organizer() -> Caller {
    Caller::organizer(Entrant::User(String::from("organizer")))
}

pub fn player_entrant(n: u32) -> Entrant {
    Entrant::User(format!("player-{n}"))
}

pub fn player(n: u32) -> Caller {
    Caller::competitor(player_entrant(n))
}

pub fn pid(value: u32) -> ParticipantId {
    ParticipantId::new(value)
}

pub fn mid(round: u32, number: u32) -> MatchId {
    MatchId::new(round, number)
}

pub fn cause() -> Cause {
    Cause::new(String::from("req-1"), String::from("Test request"))
}

pub fn create_request(format: TournamentFormat, max_participants: u32) -> CreateTournamentRequest {
    CreateTournamentRequest {
        caller: organizer(),
        name: String::from("Spring Open"),
        format,
        max_participants,
        registration_closes_at: None,
        dispute_window_secs: None,
        tiebreakers: None,
    }
}

pub fn as_organizer() -> CallerRequest {
    CallerRequest {
        caller: organizer(),
    }
}

pub fn as_player(n: u32) -> CallerRequest {
    CallerRequest { caller: player(n) }
}

pub fn advance<S: TournamentStore, N: Notifier, C: Clock>(
    service: &TournamentService<S, N, C>,
    id: TournamentId,
    target: TournamentStatus,
) {
    service
        .advance_tournament_state(
            id,
            AdvanceStatusRequest {
                caller: organizer(),
                target,
                force_close: false,
            },
            cause(),
        )
        .expect("status advances");
}

/// Creates a tournament with players `1..=count` registered.
pub fn registered<S: TournamentStore, N: Notifier, C: Clock>(
    service: &TournamentService<S, N, C>,
    format: TournamentFormat,
    count: u32,
) -> TournamentId {
    let id: TournamentId = service
        .create_tournament(create_request(format, count + 4), cause())
        .expect("tournament is created")
        .tournament
        .id;
    advance(service, id, TournamentStatus::Registration);
    for n in 1..=count {
        service
            .register(
                id,
                RegisterRequest {
                    caller: player(n),
                    entrant: None,
                },
                cause(),
            )
            .expect("player registers");
    }
    id
}

/// Creates a tournament in progress with players `1..=count` checked in.
pub fn started<S: TournamentStore, N: Notifier, C: Clock>(
    service: &TournamentService<S, N, C>,
    format: TournamentFormat,
    count: u32,
) -> TournamentId {
    let id: TournamentId = registered(service, format, count);
    advance(service, id, TournamentStatus::CheckIn);
    for n in 1..=count {
        service
            .check_in(id, pid(n), as_player(n), cause())
            .expect("player checks in");
    }
    advance(service, id, TournamentStatus::InProgress);
    id
}

pub fn report(caller: Caller, score_p1: u32, score_p2: u32) -> ReportScoreRequest {
    ReportScoreRequest {
        caller,
        score_p1,
        score_p2,
    }
}
