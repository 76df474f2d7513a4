// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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

use axum::{
    Json, Router,
    extract::{Path, State as AxumState},
    http::{HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tourney_api::{
    AdvanceStatusRequest, ApiError, AssignSeedsRequest, AuditTrailResponse, BracketResponse,
    CallerRequest, CreateTournamentRequest, DisputeRequest, GenerateBracketRequest, LogNotifier,
    MatchResponse, ParticipantResponse, ParticipantsResponse, RegisterRequest, ReportScoreRequest,
    ResolveDisputeRequest, StandingsResponse, SystemClock, TournamentResponse, TournamentService,
};
use tourney_audit::Cause;
use tourney_domain::{DEFAULT_DISPUTE_WINDOW_SECS, MatchId, ParticipantId, TournamentId};
use tourney_persistence::SqliteStore;
use tracing::{error, info};

/// Tournament server - HTTP front end for the bracket engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Dispute window for tournaments created without one, in seconds
    #[arg(long, default_value_t = DEFAULT_DISPUTE_WINDOW_SECS)]
    dispute_window_secs: u64,
}

type Service = TournamentService<SqliteStore, LogNotifier, SystemClock>;

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The tournament service. It serializes writes per tournament itself.
    service: Arc<Service>,
    /// Source of request identifiers when the client sends none.
    next_request: Arc<AtomicU64>,
}

impl AppState {
    fn new(store: SqliteStore, default_dispute_window_secs: u64) -> Self {
        Self {
            service: Arc::new(TournamentService::new(
                store,
                LogNotifier,
                SystemClock,
                default_dispute_window_secs,
            )),
            next_request: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Builds the audit cause for a request, preferring the client's
    /// `x-request-id` header.
    fn cause(&self, headers: &HeaderMap, method: &Method, uri: &Uri) -> Cause {
        let id: String = headers
            .get("x-request-id")
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.trim().is_empty())
            .map_or_else(
                || format!("req-{}", self.next_request.fetch_add(1, Ordering::SeqCst)),
                String::from,
            );
        Cause::new(id, format!("{method} {}", uri.path()))
    }
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Always `true`.
    error: bool,
    /// What went wrong.
    message: String,
}

/// HTTP error wrapper that maps API errors to status codes.
#[derive(Debug)]
struct HttpError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error while handling request");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// Runs a service call on the blocking pool.
///
/// The service talks to `SQLite` synchronously and holds per-tournament
/// locks, so it must not run on the async workers.
async fn run<T, F>(app_state: &AppState, call: F) -> Result<Json<T>, HttpError>
where
    T: Send + 'static,
    F: FnOnce(&Service) -> Result<T, ApiError> + Send + 'static,
{
    let service: Arc<Service> = Arc::clone(&app_state.service);
    let outcome: Result<T, ApiError> = tokio::task::spawn_blocking(move || call(&service))
        .await
        .map_err(|e| HttpError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("Request task failed: {e}"),
        })?;
    Ok(Json(outcome?))
}

/// Handler for POST `/tournaments`.
async fn handle_create_tournament(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
    method: Method,
    uri: Uri,
    Json(req): Json<CreateTournamentRequest>,
) -> Result<Json<TournamentResponse>, HttpError> {
    info!(
        caller = %req.caller.entrant,
        format = %req.format,
        max_participants = req.max_participants,
        "Handling create_tournament request"
    );
    let cause: Cause = app_state.cause(&headers, &method, &uri);
    run(&app_state, move |service| service.create_tournament(req, cause)).await
}

/// Handler for GET `/tournaments/{id}`.
async fn handle_get_tournament(
    AxumState(app_state): AxumState<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<TournamentResponse>, HttpError> {
    run(&app_state, move |service| {
        service.get_tournament(TournamentId::new(id))
    })
    .await
}

/// Handler for POST `/tournaments/{id}/status`.
async fn handle_advance_status(
    AxumState(app_state): AxumState<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    method: Method,
    uri: Uri,
    Json(req): Json<AdvanceStatusRequest>,
) -> Result<Json<TournamentResponse>, HttpError> {
    info!(tournament_id = id, target = %req.target, "Handling advance_status request");
    let cause: Cause = app_state.cause(&headers, &method, &uri);
    run(&app_state, move |service| {
        service.advance_tournament_state(TournamentId::new(id), req, cause)
    })
    .await
}

/// Handler for POST `/tournaments/{id}/participants`.
async fn handle_register(
    AxumState(app_state): AxumState<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    method: Method,
    uri: Uri,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<ParticipantResponse>, HttpError> {
    let cause: Cause = app_state.cause(&headers, &method, &uri);
    run(&app_state, move |service| {
        service.register(TournamentId::new(id), req, cause)
    })
    .await
}

/// Handler for POST `/tournaments/{id}/participants/{pid}/check-in`.
async fn handle_check_in(
    AxumState(app_state): AxumState<AppState>,
    Path((id, pid)): Path<(u64, u32)>,
    headers: HeaderMap,
    method: Method,
    uri: Uri,
    Json(req): Json<CallerRequest>,
) -> Result<Json<ParticipantResponse>, HttpError> {
    let cause: Cause = app_state.cause(&headers, &method, &uri);
    run(&app_state, move |service| {
        service.check_in(TournamentId::new(id), ParticipantId::new(pid), req, cause)
    })
    .await
}

/// Handler for POST `/tournaments/{id}/participants/{pid}/withdraw`.
async fn handle_withdraw(
    AxumState(app_state): AxumState<AppState>,
    Path((id, pid)): Path<(u64, u32)>,
    headers: HeaderMap,
    method: Method,
    uri: Uri,
    Json(req): Json<CallerRequest>,
) -> Result<Json<ParticipantResponse>, HttpError> {
    info!(tournament_id = id, participant_id = pid, "Handling withdraw request");
    let cause: Cause = app_state.cause(&headers, &method, &uri);
    run(&app_state, move |service| {
        service.withdraw(TournamentId::new(id), ParticipantId::new(pid), req, cause)
    })
    .await
}

/// Handler for POST `/tournaments/{id}/seeds`.
async fn handle_assign_seeds(
    AxumState(app_state): AxumState<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    method: Method,
    uri: Uri,
    Json(req): Json<AssignSeedsRequest>,
) -> Result<Json<ParticipantsResponse>, HttpError> {
    let cause: Cause = app_state.cause(&headers, &method, &uri);
    run(&app_state, move |service| {
        service.assign_seeds(TournamentId::new(id), req, cause)
    })
    .await
}

/// Handler for POST `/tournaments/{id}/seeds/reset`.
async fn handle_reset_seeds(
    AxumState(app_state): AxumState<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    method: Method,
    uri: Uri,
    Json(req): Json<CallerRequest>,
) -> Result<Json<ParticipantsResponse>, HttpError> {
    let cause: Cause = app_state.cause(&headers, &method, &uri);
    run(&app_state, move |service| {
        service.reset_seeds(TournamentId::new(id), req, cause)
    })
    .await
}

/// Handler for POST `/tournaments/{id}/bracket`.
async fn handle_generate_bracket(
    AxumState(app_state): AxumState<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    method: Method,
    uri: Uri,
    Json(req): Json<GenerateBracketRequest>,
) -> Result<Json<BracketResponse>, HttpError> {
    info!(tournament_id = id, force = req.force, "Handling generate_bracket request");
    let cause: Cause = app_state.cause(&headers, &method, &uri);
    run(&app_state, move |service| {
        service.generate_bracket(TournamentId::new(id), req, cause)
    })
    .await
}

/// Handler for GET `/tournaments/{id}/bracket`.
async fn handle_get_bracket(
    AxumState(app_state): AxumState<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<BracketResponse>, HttpError> {
    run(&app_state, move |service| {
        service.get_bracket(TournamentId::new(id))
    })
    .await
}

/// Handler for GET `/tournaments/{id}/standings`.
async fn handle_get_standings(
    AxumState(app_state): AxumState<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<StandingsResponse>, HttpError> {
    run(&app_state, move |service| {
        service.get_standings(TournamentId::new(id))
    })
    .await
}

/// Handler for GET `/tournaments/{id}/audit`.
async fn handle_get_audit_trail(
    AxumState(app_state): AxumState<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<AuditTrailResponse>, HttpError> {
    run(&app_state, move |service| {
        service.get_audit_trail(TournamentId::new(id))
    })
    .await
}

/// Handler for POST `/tournaments/{id}/matches/{round}/{number}/start`.
async fn handle_start_match(
    AxumState(app_state): AxumState<AppState>,
    Path((id, round, number)): Path<(u64, u32, u32)>,
    headers: HeaderMap,
    method: Method,
    uri: Uri,
    Json(req): Json<CallerRequest>,
) -> Result<Json<MatchResponse>, HttpError> {
    let cause: Cause = app_state.cause(&headers, &method, &uri);
    run(&app_state, move |service| {
        service.start_match(
            TournamentId::new(id),
            MatchId::new(round, number),
            req,
            cause,
        )
    })
    .await
}

/// Handler for POST `/tournaments/{id}/matches/{round}/{number}/score`.
async fn handle_report_score(
    AxumState(app_state): AxumState<AppState>,
    Path((id, round, number)): Path<(u64, u32, u32)>,
    headers: HeaderMap,
    method: Method,
    uri: Uri,
    Json(req): Json<ReportScoreRequest>,
) -> Result<Json<MatchResponse>, HttpError> {
    info!(
        tournament_id = id,
        round,
        number,
        score_p1 = req.score_p1,
        score_p2 = req.score_p2,
        "Handling report_score request"
    );
    let cause: Cause = app_state.cause(&headers, &method, &uri);
    run(&app_state, move |service| {
        service.report_score(
            TournamentId::new(id),
            MatchId::new(round, number),
            req,
            cause,
        )
    })
    .await
}

/// Handler for POST `/tournaments/{id}/matches/{round}/{number}/dispute`.
async fn handle_dispute(
    AxumState(app_state): AxumState<AppState>,
    Path((id, round, number)): Path<(u64, u32, u32)>,
    headers: HeaderMap,
    method: Method,
    uri: Uri,
    Json(req): Json<DisputeRequest>,
) -> Result<Json<MatchResponse>, HttpError> {
    info!(tournament_id = id, round, number, "Handling dispute request");
    let cause: Cause = app_state.cause(&headers, &method, &uri);
    run(&app_state, move |service| {
        service.dispute(
            TournamentId::new(id),
            MatchId::new(round, number),
            req,
            cause,
        )
    })
    .await
}

/// Handler for POST `/tournaments/{id}/matches/{round}/{number}/resolve`.
async fn handle_resolve_dispute(
    AxumState(app_state): AxumState<AppState>,
    Path((id, round, number)): Path<(u64, u32, u32)>,
    headers: HeaderMap,
    method: Method,
    uri: Uri,
    Json(req): Json<ResolveDisputeRequest>,
) -> Result<Json<MatchResponse>, HttpError> {
    info!(tournament_id = id, round, number, "Handling resolve_dispute request");
    let cause: Cause = app_state.cause(&headers, &method, &uri);
    run(&app_state, move |service| {
        service.resolve_dispute(
            TournamentId::new(id),
            MatchId::new(round, number),
            req,
            cause,
        )
    })
    .await
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/tournaments", post(handle_create_tournament))
        .route("/tournaments/{id}", get(handle_get_tournament))
        .route("/tournaments/{id}/status", post(handle_advance_status))
        .route("/tournaments/{id}/participants", post(handle_register))
        .route(
            "/tournaments/{id}/participants/{pid}/check-in",
            post(handle_check_in),
        )
        .route(
            "/tournaments/{id}/participants/{pid}/withdraw",
            post(handle_withdraw),
        )
        .route("/tournaments/{id}/seeds", post(handle_assign_seeds))
        .route("/tournaments/{id}/seeds/reset", post(handle_reset_seeds))
        .route(
            "/tournaments/{id}/bracket",
            post(handle_generate_bracket).get(handle_get_bracket),
        )
        .route("/tournaments/{id}/standings", get(handle_get_standings))
        .route("/tournaments/{id}/audit", get(handle_get_audit_trail))
        .route(
            "/tournaments/{id}/matches/{round}/{number}/start",
            post(handle_start_match),
        )
        .route(
            "/tournaments/{id}/matches/{round}/{number}/score",
            post(handle_report_score),
        )
        .route(
            "/tournaments/{id}/matches/{round}/{number}/dispute",
            post(handle_dispute),
        )
        .route(
            "/tournaments/{id}/matches/{round}/{number}/resolve",
            post(handle_resolve_dispute),
        )
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing tournament server");

    let store: SqliteStore = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        SqliteStore::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        SqliteStore::new_in_memory()?
    };

    let app_state: AppState = AppState::new(store, args.dispute_window_secs);
    let app: Router = build_router(app_state);

    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!(
        dispute_window_secs = args.dispute_window_secs,
        "Server listening on {}", addr
    );

    let listener: tokio::net::TcpListener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
