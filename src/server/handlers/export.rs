//! PNG export handler.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use std::sync::Arc;

use super::super::state::AppState;
use super::{HandlerError, into_response_error, parse_session_id, session_not_found};

/// POST /api/sessions/:id/export - Render the current layout to PNG.
///
/// The snapshot is taken under the session lock; rasterization runs after
/// the lock is released, so edits made meanwhile do not affect this export.
pub async fn export(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HandlerError> {
    let id = parse_session_id(&id)?;

    let snapshot = {
        let mut sessions = state.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or_else(session_not_found)?;
        session.touch();
        session.editor.export_snapshot()
    };

    let artifact = state
        .exporter
        .export(snapshot)
        .await
        .map_err(into_response_error)?;

    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", artifact.filename.replace('"', "")),
            ),
        ],
        artifact.png,
    ))
}
