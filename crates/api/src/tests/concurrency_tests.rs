// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::thread;

use tourney_domain::{
    DEFAULT_DISPUTE_WINDOW_SECS, MatchStatus, ParticipantId, TournamentFormat, TournamentId,
};
use tourney_persistence::{InMemoryStore, SqliteStore};

use super::helpers::{
    BASE_TIME, ConflictingStore, ManualClock, RecordingNotifier, cause, mid, player, registered,
    report, started,
};
use crate::{ApiError, RegisterRequest, TournamentService};

fn conflicting_service(
    conflicts: u32,
) -> TournamentService<ConflictingStore, RecordingNotifier, ManualClock> {
    TournamentService::new(
        ConflictingStore::new(conflicts),
        RecordingNotifier::default(),
        ManualClock::new(BASE_TIME),
        DEFAULT_DISPUTE_WINDOW_SECS,
    )
}

#[test]
fn test_single_conflict_is_retried() {
    let service = conflicting_service(0);
    let id: TournamentId = started(&service, TournamentFormat::SingleElimination, 4);
    let version_before: i64 = service.get_tournament(id).unwrap().version;
    service.store().arm(1);

    let reported = service
        .report_score(id, mid(1, 1), report(player(1), 2, 1), cause())
        .unwrap();

    assert_eq!(reported.match_state.status, MatchStatus::Completed);
    assert_eq!(
        service.get_tournament(id).unwrap().version,
        version_before + 1
    );
}

#[test]
fn test_repeated_conflict_is_reported() {
    let service = conflicting_service(0);
    let id: TournamentId = started(&service, TournamentFormat::SingleElimination, 4);
    let version_before: i64 = service.get_tournament(id).unwrap().version;
    service.store().arm(2);

    let result = service.report_score(id, mid(1, 1), report(player(1), 2, 1), cause());

    assert!(matches!(result, Err(ApiError::Conflict { .. })));
    assert_eq!(service.get_tournament(id).unwrap().version, version_before);
    let bracket = service.get_bracket(id).unwrap();
    assert_eq!(
        bracket.bracket.get(mid(1, 1)).unwrap().status,
        MatchStatus::Ready
    );
}

#[test]
fn test_conflict_sends_no_notifications_for_the_lost_attempt() {
    let notifier: RecordingNotifier = RecordingNotifier::default();
    let service: TournamentService<ConflictingStore, RecordingNotifier, ManualClock> =
        TournamentService::new(
            ConflictingStore::new(0),
            notifier.clone(),
            ManualClock::new(BASE_TIME),
            DEFAULT_DISPUTE_WINDOW_SECS,
        );
    let id: TournamentId = started(&service, TournamentFormat::SingleElimination, 4);
    notifier.clear();
    service.store().arm(2);

    let result = service.report_score(id, mid(1, 1), report(player(1), 2, 1), cause());

    assert!(result.is_err());
    assert!(notifier.events().is_empty());
}

fn register_concurrently<S: tourney_persistence::TournamentStore>(
    service: &TournamentService<S, RecordingNotifier, ManualClock>,
    id: TournamentId,
    players: u32,
) -> Vec<Result<ParticipantId, ApiError>> {
    thread::scope(|scope| {
        let handles: Vec<_> = (1..=players)
            .map(|n| {
                scope.spawn(move || {
                    service
                        .register(
                            id,
                            RegisterRequest {
                                caller: player(n),
                                entrant: None,
                            },
                            cause(),
                        )
                        .map(|response| response.participant.id)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    })
}

#[test]
fn test_concurrent_registrations_all_land_in_memory() {
    let service: TournamentService<InMemoryStore, RecordingNotifier, ManualClock> =
        TournamentService::new(
            InMemoryStore::new(),
            RecordingNotifier::default(),
            ManualClock::new(BASE_TIME),
            DEFAULT_DISPUTE_WINDOW_SECS,
        );
    let id: TournamentId = registered(&service, TournamentFormat::RoundRobin, 0);

    let results: Vec<Result<ParticipantId, ApiError>> = register_concurrently(&service, id, 4);

    assert!(results.iter().all(Result::is_ok));
    let mut ids: Vec<u32> = results
        .into_iter()
        .map(|r| r.unwrap().value())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert_eq!(service.get_tournament(id).unwrap().participants.len(), 4);
}

#[test]
fn test_concurrent_registrations_all_land_in_sqlite() {
    let service: TournamentService<SqliteStore, RecordingNotifier, ManualClock> =
        TournamentService::new(
            SqliteStore::new_in_memory().unwrap(),
            RecordingNotifier::default(),
            ManualClock::new(BASE_TIME),
            DEFAULT_DISPUTE_WINDOW_SECS,
        );
    let id: TournamentId = registered(&service, TournamentFormat::RoundRobin, 0);

    let results: Vec<Result<ParticipantId, ApiError>> = register_concurrently(&service, id, 4);

    assert!(results.iter().all(Result::is_ok));
    let tournament = service.get_tournament(id).unwrap();
    assert_eq!(tournament.participants.len(), 4);
    assert_eq!(service.get_audit_trail(id).unwrap().events.len(), 6);
}

#[test]
fn test_locks_are_released_after_each_operation() {
    let service = conflicting_service(0);
    let id: TournamentId = registered(&service, TournamentFormat::SingleElimination, 2);
    assert_eq!(service.tracked_locks(), 0);

    for n in 100..110 {
        let result = service.register(
            TournamentId::new(n),
            RegisterRequest {
                caller: player(1),
                entrant: None,
            },
            cause(),
        );
        assert!(matches!(result, Err(ApiError::ResourceNotFound { .. })));
    }
    assert_eq!(service.tracked_locks(), 0);

    service.store().arm(1);
    service
        .register(
            id,
            RegisterRequest {
                caller: player(3),
                entrant: None,
            },
            cause(),
        )
        .unwrap();
    assert_eq!(service.tracked_locks(), 0);
}
