use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Path, Query, Request, State},
    http::StatusCode,
    middleware::Next,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::store::{Message, Role, Session};

/// Lowest session id reachable over HTTP. Smaller ids are reserved for
/// internal and test use and fail path validation.
const MIN_PUBLIC_SESSION_ID: u64 = 1000;

const MIN_USER_LEN: usize = 3;
const MAX_USER_LEN: usize = 20;
const MIN_CONTENT_LEN: usize = 3;

/// Build the HTTP router over an injected state.
///
/// Kept separate from [`start_server`] so tests can drive the router with a
/// fresh state and no listening socket.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/sessions", get(list_sessions).post(create_session))
        .route("/sessions/{session_id}", get(get_session))
        .route(
            "/sessions/{session_id}/messages",
            get(get_messages).post(add_message),
        )
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .with_state(state)
}

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let state = AppState::new();
    let app = app(state);

    // Router types change per layer, so instead of conditionally applying
    // the timeout we always apply it with an absurd duration when disabled.
    let timeout_duration = if config.resilience.timeout_disabled {
        Duration::from_secs(365 * 24 * 60 * 60)
    } else {
        Duration::from_secs(30)
    };

    let app = app.layer(axum::middleware::from_fn(
        move |req: Request, next: Next| {
            let duration = timeout_duration;
            async move {
                match tokio::time::timeout(duration, next.run(req)).await {
                    Ok(res) => res,
                    Err(_) => (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response(),
                }
            }
        },
    ));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Parse and range-check a path session id.
///
/// Ids are extracted as raw strings because both a non-integer and a
/// sub-1000 value are schema-level failures (422), distinct from the 404
/// for a well-formed id that simply does not exist.
fn parse_session_id(raw: &str) -> Result<u64, ApiError> {
    let session_id: u64 = raw.parse().map_err(|_| {
        ApiError::Validation(format!("session_id must be an integer, got {raw:?}"))
    })?;
    if session_id < MIN_PUBLIC_SESSION_ID {
        return Err(ApiError::Validation(format!(
            "session_id must be greater than or equal to {MIN_PUBLIC_SESSION_ID}"
        )));
    }
    Ok(session_id)
}

/// GET /health - Liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// GET /sessions - List all sessions in insertion order.
async fn list_sessions(State(state): State<AppState>) -> Json<Vec<Session>> {
    Json(state.sessions.get_all())
}

/// Request body for session creation.
#[derive(Debug, Deserialize)]
struct CreateSessionRequest {
    /// Owning user; normalized (trimmed and lowercased) before storage.
    session_user: String,
}

/// POST /sessions - Create a session and seed its empty chat log.
async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let session_user = req.session_user.trim().to_lowercase();
    let len = session_user.chars().count();
    if !(MIN_USER_LEN..=MAX_USER_LEN).contains(&len) {
        return Err(ApiError::Validation(format!(
            "session_user must be {MIN_USER_LEN} to {MAX_USER_LEN} characters after trimming"
        )));
    }

    let session = state.sessions.create(session_user);
    state.chats.init(session.session_id);

    info!(
        name: "session.created",
        session_id = session.session_id,
        session_user = %session.session_user,
        "Session created"
    );

    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /sessions/{session_id} - Get session details.
async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Session>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    state
        .sessions
        .get(session_id)
        .map(Json)
        .ok_or(ApiError::SessionNotFound)
}

/// Query parameters for message retrieval.
#[derive(Debug, Deserialize)]
struct MessagesQuery {
    /// Optional role filter; empty or absent means no filtering.
    #[serde(default)]
    role: Option<String>,
}

impl MessagesQuery {
    fn role_filter(&self) -> Result<Option<Role>, ApiError> {
        match self.role.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(ApiError::Validation),
        }
    }
}

/// GET /sessions/{session_id}/messages - Get the session's messages,
/// optionally filtered by role.
async fn get_messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    if !state.sessions.is_valid(session_id) {
        return Err(ApiError::SessionNotFound);
    }

    let messages = state
        .chats
        .get_filtered(session_id, query.role_filter()?)
        .ok_or(ApiError::ChatNotFound)?;
    Ok(Json(messages))
}

/// Request body for appending a message.
#[derive(Debug, Deserialize)]
struct NewMessage {
    role: Role,
    content: String,
}

/// POST /sessions/{session_id}/messages - Append a message to the session.
async fn add_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(message): Json<NewMessage>,
) -> Result<StatusCode, ApiError> {
    let session_id = parse_session_id(&session_id)?;
    // Schema-level checks (422) come before the existence check (404) and
    // the writable-role check (400).
    if message.content.chars().count() < MIN_CONTENT_LEN {
        return Err(ApiError::Validation(format!(
            "content must be at least {MIN_CONTENT_LEN} characters"
        )));
    }
    if !state.sessions.is_valid(session_id) {
        return Err(ApiError::SessionNotFound);
    }
    if !message.role.is_writable() {
        return Err(ApiError::InvalidRole);
    }

    info!(
        name: "message.appended",
        session_id,
        role = %message.role,
        content_length = message.content.len(),
        "Message appended"
    );

    state.chats.append(
        session_id,
        Message {
            role: message.role,
            content: message.content,
        },
    );

    Ok(StatusCode::CREATED)
}
