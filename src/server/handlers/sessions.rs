//! Editing session handlers.
//!
//! Each session owns one [`Editor`]. Events are applied in arrival order
//! under the session lock, so concurrent requests for the same session are
//! serialized.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::Html,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::content::ContentFields;
use crate::editor::{Editor, EditorState, Event};
use crate::render::RenderedCanvas;

use super::super::state::{AppState, EditorSession};
use super::{HandlerError, into_response_error, parse_session_id, session_not_found};

/// Request body for session creation.
#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    /// Layout to open with (default: first catalog entry).
    #[serde(default)]
    pub layout: Option<String>,
    /// Initial content (default: sample content).
    #[serde(default)]
    pub content: Option<ContentFields>,
}

/// One event or an ordered batch.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum EventBatch {
    One(Event),
    Many(Vec<Event>),
}

impl EventBatch {
    fn into_events(self) -> Vec<Event> {
        match self {
            EventBatch::One(event) => vec![event],
            EventBatch::Many(events) => events,
        }
    }
}

/// Session state plus the live canvas.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub state: EditorState,
    pub canvas: RenderedCanvas,
    /// Live pointer-move/up subscriptions (1 while dragging).
    pub pointer_listeners: usize,
}

impl SessionView {
    fn of(id: Uuid, editor: &Editor) -> Self {
        Self {
            id,
            state: editor.state().clone(),
            canvas: editor.render_display(),
            pointer_listeners: editor.listeners().active(),
        }
    }
}

impl CreateSessionRequest {
    /// An empty body opens the default layout with sample content.
    fn parse(body: &[u8]) -> Result<Self, HandlerError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                format!("Invalid session request: {}", e),
            )
        })
    }
}

/// POST /api/sessions - Open an editor.
pub async fn create(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<SessionView>), HandlerError> {
    let request = CreateSessionRequest::parse(&body)?;

    let mut editor = match &request.layout {
        Some(layout) => {
            Editor::with_layout(state.catalog.clone(), layout).map_err(into_response_error)?
        }
        None => Editor::new(state.catalog.clone()),
    };
    if let Some(content) = request.content {
        editor.set_content(content);
    }

    let id = Uuid::new_v4();
    let view = SessionView::of(id, &editor);
    state
        .sessions
        .write()
        .await
        .insert(id, EditorSession::new(editor));

    tracing::info!(session = %id, layout = %view.state.layout.id, "session created");
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/sessions/:id - Current state and canvas.
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, HandlerError> {
    let id = parse_session_id(&id)?;
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(session_not_found)?;
    session.touch();
    Ok(Json(SessionView::of(id, &session.editor)))
}

/// DELETE /api/sessions/:id - Close an editor.
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, HandlerError> {
    let id = parse_session_id(&id)?;
    match state.sessions.write().await.remove(&id) {
        Some(_) => {
            tracing::info!(session = %id, "session closed");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(session_not_found()),
    }
}

/// POST /api/sessions/:id/events - Apply events in order.
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(batch): Json<EventBatch>,
) -> Result<Json<SessionView>, HandlerError> {
    let id = parse_session_id(&id)?;
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(session_not_found)?;
    session.touch();

    let events = batch.into_events();
    tracing::debug!(session = %id, count = events.len(), "dispatching events");
    for event in events {
        session.editor.dispatch(event);
    }
    Ok(Json(SessionView::of(id, &session.editor)))
}

/// GET /api/sessions/:id/canvas - Display render tree only.
pub async fn canvas(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RenderedCanvas>, HandlerError> {
    let id = parse_session_id(&id)?;
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(session_not_found)?;
    session.touch();
    Ok(Json(session.editor.render_display()))
}

/// GET /api/sessions/:id/preview - Standalone HTML preview.
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Html<String>, HandlerError> {
    let id = parse_session_id(&id)?;
    let origin = state.config.origin();
    let mut sessions = state.sessions.write().await;
    let session = sessions.get_mut(&id).ok_or_else(session_not_found)?;
    session.touch();
    Ok(Html(session.editor.preview_html(Some(&origin))))
}
