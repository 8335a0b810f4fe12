//! Template catalog handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use crate::catalog::TemplateSummary;
use crate::model::TemplateLayout;

use super::super::state::AppState;
use super::HandlerError;

/// GET /api/templates - List the catalog in order.
pub async fn list(State(state): State<Arc<AppState>>) -> Json<Vec<TemplateSummary>> {
    Json(state.catalog.summaries())
}

/// GET /api/templates/:id - Full layout definition.
pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<TemplateLayout>, HandlerError> {
    state
        .catalog
        .by_id(&id)
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("Unknown template: {}", id)))
}
