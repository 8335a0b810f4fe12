//! # HTTP Server for the Template Editor
//!
//! Exposes the editor as a JSON API: each browser tab opens a session, sends
//! UI events and gets the re-rendered canvas back. Previews are served as
//! HTML, exports as PNG downloads.
//!
//! ## Usage
//!
//! ```bash
//! tripcard serve --listen 0.0.0.0:3000 --assets ./public
//! ```
//!
//! | Method | Path | |
//! |--------|------|-|
//! | GET | `/api/templates` | catalog summaries |
//! | GET | `/api/templates/:id` | one layout |
//! | POST | `/api/sessions` | open an editor |
//! | GET/DELETE | `/api/sessions/:id` | state and canvas / close |
//! | POST | `/api/sessions/:id/events` | apply one event or a batch |
//! | GET | `/api/sessions/:id/canvas` | display render tree |
//! | GET | `/api/sessions/:id/preview` | standalone HTML |
//! | POST | `/api/sessions/:id/export` | PNG attachment |
//! | GET | `/images/*` | background images from the asset directory |

mod handlers;
mod state;

pub use state::{AppState, EditorSession, SESSION_EXPIRATION_SECS, ServerConfig};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::error::TripcardError;

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/api/templates", get(handlers::templates::list))
        .route("/api/templates/:id", get(handlers::templates::get))
        .route("/api/sessions", post(handlers::sessions::create))
        .route(
            "/api/sessions/:id",
            get(handlers::sessions::get).delete(handlers::sessions::remove),
        )
        .route("/api/sessions/:id/events", post(handlers::sessions::dispatch))
        .route("/api/sessions/:id/canvas", get(handlers::sessions::canvas))
        .route("/api/sessions/:id/preview", get(handlers::sessions::preview))
        .route("/api/sessions/:id/export", post(handlers::export::export));

    if let Some(dir) = &state.config.asset_dir {
        app = app.nest_service("/images", ServeDir::new(dir.join("images")));
    }

    app.layer(TraceLayer::new_for_http()).with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use tripcard::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), tripcard::error::TripcardError> {
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:3000".to_string(),
///     asset_dir: Some("./public".into()),
///     ..ServerConfig::default()
/// };
///
/// serve(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), TripcardError> {
    let catalog = config.load_catalog()?;
    let app_state = Arc::new(AppState::new(config.clone(), catalog)?);

    tokio::spawn(cleanup_sessions(app_state.clone()));

    let app = router(app_state.clone());

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            TripcardError::Transport(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    tracing::info!(
        listen = %config.listen_addr,
        origin = %config.origin(),
        assets = ?config.asset_dir,
        templates = app_state.catalog.len(),
        "tripcard server started"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| TripcardError::Transport(format!("Server error: {}", e)))?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}

/// Background task dropping idle sessions and cached images.
async fn cleanup_sessions(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(Duration::from_secs(60));
    let expiration = Duration::from_secs(SESSION_EXPIRATION_SECS);

    loop {
        interval.tick().await;
        let now = Instant::now();
        let removed = expire_sessions(&state, now, expiration).await;
        if removed > 0 {
            tracing::info!(removed, "cleaned up expired editing sessions");
        }
        let evicted = state.exporter.resolver().expire(now, expiration).await;
        if evicted > 0 {
            tracing::debug!(evicted, "evicted idle background images");
        }
    }
}

/// Remove sessions idle for at least `expiration`; returns how many went.
async fn expire_sessions(state: &AppState, now: Instant, expiration: Duration) -> usize {
    let mut sessions = state.sessions.write().await;
    let before = sessions.len();
    sessions.retain(|_, s| now.duration_since(s.last_accessed) < expiration);
    before - sessions.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app_state() -> Arc<AppState> {
        Arc::new(AppState::new(ServerConfig::default(), Catalog::builtin()).unwrap())
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn open_session(app: &Router, body: Option<Value>) -> String {
        let (status, bytes) = send(app, "POST", "/api/sessions", body).await;
        assert_eq!(status, StatusCode::CREATED);
        let view: Value = serde_json::from_slice(&bytes).unwrap();
        view["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn lists_templates_in_catalog_order() {
        let app = router(app_state());
        let (status, bytes) = send(&app, "GET", "/api/templates", None).await;
        assert_eq!(status, StatusCode::OK);
        let list: Value = serde_json::from_slice(&bytes).unwrap();
        let ids: Vec<&str> = list
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, ["square", "story", "portrait"]);

        let (status, _) = send(&app, "GET", "/api/templates/banner", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn events_update_the_canvas() {
        let app = router(app_state());
        let id = open_session(&app, None).await;

        let (status, bytes) = send(
            &app,
            "POST",
            &format!("/api/sessions/{}/events", id),
            Some(json!([
                {"type": "setField", "field": "price", "value": "49"},
                {"type": "selectElement", "id": "price"}
            ])),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let view: Value = serde_json::from_slice(&bytes).unwrap();
        let price = view["canvas"]["boxes"]
            .as_array()
            .unwrap()
            .iter()
            .find(|b| b["elementId"] == "price")
            .unwrap()
            .clone();
        assert_eq!(price["text"], "$49");
        assert_eq!(price["selected"], true);
        assert_eq!(view["state"]["selected"], "price");
    }

    #[tokio::test]
    async fn drag_over_http_tracks_listeners() {
        let app = router(app_state());
        let id = open_session(&app, None).await;
        let events = format!("/api/sessions/{}/events", id);

        let (_, bytes) = send(
            &app,
            "POST",
            &events,
            Some(json!({"type": "pointerDown", "id": "price", "pointer": {"x": 225, "y": 195}})),
        )
        .await;
        let view: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(view["pointerListeners"], 1);

        let (_, bytes) = send(
            &app,
            "POST",
            &events,
            Some(json!([
                {"type": "pointerMove", "pointer": {"x": 275, "y": 205}},
                {"type": "pointerUp"}
            ])),
        )
        .await;
        let view: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(view["pointerListeners"], 0);
        let price = view["state"]["layout"]["elements"]
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["id"] == "price")
            .unwrap()
            .clone();
        let x = price["position"]["x"].as_f64().unwrap();
        assert!((x - 183.333).abs() < 0.001);
    }

    #[tokio::test]
    async fn preview_is_html_with_absolute_backgrounds() {
        let app = router(app_state());
        let id = open_session(&app, Some(json!({"layout": "story"}))).await;
        let (status, bytes) = send(&app, "GET", &format!("/api/sessions/{}/preview", id), None).await;
        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(bytes).unwrap();
        assert!(html.contains("url('http://127.0.0.1:3000/images/1.jpg')"));
    }

    #[tokio::test]
    async fn export_returns_png_attachment() {
        let app = router(app_state());
        let id = open_session(&app, Some(json!({"layout": "square"}))).await;
        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/sessions/{}/export", id))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"amazing-bali-adventure-square-1080x1080.png\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[tokio::test]
    async fn export_header_survives_control_characters() {
        let app = router(app_state());
        let id = open_session(&app, Some(json!({"layout": "square"}))).await;
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/sessions/{}/events", id),
            Some(json!({"type": "setField", "field": "title", "value": "Bali\u{1} \"Deal\"/2"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let request = Request::builder()
            .method("POST")
            .uri(format!("/api/sessions/{}/export", id))
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"bali-deal2-square-1080x1080.png\""
        );
    }

    #[tokio::test]
    async fn unknown_and_malformed_sessions() {
        let app = router(app_state());
        let (status, _) = send(&app, "GET", "/api/sessions/not-a-uuid", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&app, "GET", &format!("/api/sessions/{}", uuid::Uuid::new_v4()), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, "POST", "/api/sessions", Some(json!({"layout": "banner"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_create_body_is_rejected() {
        let state = app_state();
        let app = router(state.clone());

        let (status, bytes) = send(
            &app,
            "POST",
            "/api/sessions",
            Some(json!({"layout": "story", "content": {"title": 5}})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(String::from_utf8_lossy(&bytes).contains("Invalid session request"));

        let request = Request::builder()
            .method("POST")
            .uri("/api/sessions")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"layout\": "))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(state.sessions.read().await.is_empty());

        // no body at all still opens the default layout
        let (status, bytes) = send(&app, "POST", "/api/sessions", None).await;
        assert_eq!(status, StatusCode::CREATED);
        let view: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(view["state"]["layout"]["id"], "square");
    }

    #[tokio::test]
    async fn idle_sessions_expire() {
        let state = app_state();
        let app = router(state.clone());
        let id = open_session(&app, None).await;

        let later = Instant::now() + Duration::from_secs(SESSION_EXPIRATION_SECS + 1);
        let removed = expire_sessions(&state, later, Duration::from_secs(SESSION_EXPIRATION_SECS)).await;
        assert_eq!(removed, 1);
        let (status, _) = send(&app, "GET", &format!("/api/sessions/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
