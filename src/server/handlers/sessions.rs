use crate::{
    error::{AdrollError, Result},
    metrics,
    sequencer::{Outcome, PlaybackEvent},
    server::state::AppState,
    session::SessionView,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

/// Body of `POST /sessions`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSessionRequest {
    pub content_source: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Body of `PUT /sessions/{id}/source`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSourceRequest {
    pub content_source: String,
}

/// Reply to a delivered playback event
#[derive(Debug, Serialize)]
pub struct EventResponse {
    pub outcome: Outcome,
    pub session: SessionView,
}

fn require_source(source: &str) -> Result<String> {
    let source = source.trim();
    if source.is_empty() {
        return Err(AdrollError::InvalidRequest(
            "contentSource must not be empty".to_string(),
        ));
    }
    Ok(source.to_string())
}

/// Open (or resume) a playback session with a freshly loaded ad pool
pub async fn open_session(
    State(state): State<AppState>,
    body: std::result::Result<Json<OpenSessionRequest>, JsonRejection>,
) -> Result<Response> {
    let start = Instant::now();
    let Json(body) = body?;
    let content_source = require_source(&body.content_source)?;
    if let Some(id) = &body.session_id
        && id.trim().is_empty()
    {
        return Err(AdrollError::InvalidRequest(
            "sessionId must not be empty".to_string(),
        ));
    }

    let pool = state.pool_provider.fetch_pool().await;
    let view = state.sessions.open(body.session_id, content_source, pool);
    info!(
        "Session {} open in {:?}",
        view.session_id, view.render.mode
    );

    metrics::record_request("session_open", 201);
    metrics::record_duration("session_open", start);

    Ok((StatusCode::CREATED, Json(view)).into_response())
}

pub async fn get_session(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<SessionView>> {
    let view = state
        .sessions
        .view(&session_id)
        .ok_or(AdrollError::SessionNotFound(session_id))?;
    metrics::record_request("session_get", 200);
    Ok(Json(view))
}

/// Switch a session to a new content source; the sequencer restarts from scratch
pub async fn change_source(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
    body: std::result::Result<Json<ChangeSourceRequest>, JsonRejection>,
) -> Result<Json<SessionView>> {
    let Json(body) = body?;
    let content_source = require_source(&body.content_source)?;
    if state.sessions.view(&session_id).is_none() {
        return Err(AdrollError::SessionNotFound(session_id));
    }

    let pool = state.pool_provider.fetch_pool().await;
    let view = state
        .sessions
        .change_source(&session_id, content_source, pool)
        .ok_or(AdrollError::SessionNotFound(session_id))?;

    metrics::record_request("session_source", 200);
    Ok(Json(view))
}

/// Deliver one playback event
pub async fn post_event(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
    event: std::result::Result<Json<PlaybackEvent>, JsonRejection>,
) -> Result<Json<EventResponse>> {
    let start = Instant::now();
    let Json(event) = event?;
    let (outcome, session) = state
        .sessions
        .dispatch(&session_id, event)
        .ok_or(AdrollError::SessionNotFound(session_id))?;

    metrics::record_playback_event(event.kind(), outcome.label());
    metrics::record_request("session_event", 200);
    metrics::record_duration("session_event", start);

    Ok(Json(EventResponse { outcome, session }))
}

pub async fn close_session(
    Path(session_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode> {
    if state.sessions.remove(&session_id) {
        info!("Session {} closed", session_id);
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AdrollError::SessionNotFound(session_id))
    }
}
