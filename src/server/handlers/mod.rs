//! HTTP handlers for the server.

pub mod export;
pub mod sessions;
pub mod templates;

use axum::http::StatusCode;
use uuid::Uuid;

use crate::error::TripcardError;

pub(crate) type HandlerError = (StatusCode, String);

pub(crate) fn parse_session_id(id: &str) -> Result<Uuid, HandlerError> {
    Uuid::parse_str(id).map_err(|_| (StatusCode::BAD_REQUEST, "Invalid session ID".to_string()))
}

pub(crate) fn session_not_found() -> HandlerError {
    (
        StatusCode::NOT_FOUND,
        "Session not found or expired".to_string(),
    )
}

/// Status code for a crate error surfacing through a handler.
pub(crate) fn into_response_error(err: TripcardError) -> HandlerError {
    let status = match err {
        TripcardError::Template(_) | TripcardError::Json(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}
