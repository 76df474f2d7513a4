// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Fire-and-forget delivery of engine events.
//!
//! Notifications are dispatched after the transition has been committed.
//! A failed delivery is logged and never undoes the transition.

use tourney::EngineEvent;
use tourney_domain::TournamentId;
use tracing::info;

/// A notification could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Notification delivery failed: {message}")]
pub struct NotificationError {
    /// What went wrong.
    pub message: String,
}

impl NotificationError {
    /// Creates a delivery error.
    #[must_use]
    pub const fn new(message: String) -> Self {
        Self { message }
    }
}

/// Receives engine events for a tournament.
pub trait Notifier: Send + Sync {
    /// Delivers one event.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError` if delivery failed.
    fn notify(&self, tournament_id: TournamentId, event: &EngineEvent)
    -> Result<(), NotificationError>;
}

/// Writes every event to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(
        &self,
        tournament_id: TournamentId,
        event: &EngineEvent,
    ) -> Result<(), NotificationError> {
        match event {
            EngineEvent::MatchReady {
                match_id,
                participants,
            } => info!(
                %tournament_id,
                %match_id,
                first = %participants[0],
                second = %participants[1],
                "Match ready"
            ),
            EngineEvent::MatchCompleted { match_id, winner } => {
                info!(%tournament_id, %match_id, %winner, "Match completed");
            }
            EngineEvent::TournamentCompleted { champion } => {
                info!(%tournament_id, champion = ?champion, "Tournament completed");
            }
        }
        Ok(())
    }
}
