// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Service boundary for the tournament engine.
//!
//! [`TournamentService`] is what transports call. It authenticates and
//! authorizes callers, serializes writes per tournament, commits through a
//! [`tourney_persistence::TournamentStore`], and hands engine events to a
//! [`Notifier`]. Errors from lower layers are translated into [`ApiError`]
//! explicitly; domain errors never cross this boundary.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod clock;
mod error;
mod notifier;
mod request_response;
mod service;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticationService, AuthorizationService, Role};
pub use clock::{Clock, SystemClock};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error,
    translate_persistence_error,
};
pub use notifier::{LogNotifier, NotificationError, Notifier};
pub use request_response::{
    AdvanceStatusRequest, AssignSeedsRequest, AuditEventInfo, AuditTrailResponse,
    BracketResponse, CallerRequest, CreateTournamentRequest, DisputeRequest,
    GenerateBracketRequest, MatchResponse, ParticipantResponse, ParticipantsResponse,
    RegisterRequest, ReportScoreRequest, ResolveDisputeRequest, StandingsResponse,
    TournamentResponse,
};
pub use service::TournamentService;
