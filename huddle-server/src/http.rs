//! HTTP surface: liveness probe and WebSocket upgrade on `/`

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::{IntoResponse, Response};
use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;

use crate::AppState;
use crate::ws::handle_socket;

/// Plain-text body returned to non-WebSocket requests on `/`
pub const LIVENESS_TEXT: &str = "WebSocket backend running";

/// Create the HTTP router with all routes configured
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Upgrade WebSocket requests into chat sessions, answer anything else with
/// the liveness text
async fn root(ws: Option<WebSocketUpgrade>, State(state): State<Arc<AppState>>) -> Response {
    match ws {
        Some(ws) => ws.on_upgrade(move |socket| handle_socket(socket, state)),
        None => LIVENESS_TEXT.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use axum::http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN};
    use axum_test::TestServer;

    #[tokio::test]
    async fn test_root_returns_liveness_text() {
        let state = Arc::new(AppState::new());
        let server = TestServer::new(create_router(state)).unwrap();

        let response = server.get("/").await;

        response.assert_status_ok();
        response.assert_text(LIVENESS_TEXT);
    }

    #[tokio::test]
    async fn test_root_allows_any_origin() {
        let state = Arc::new(AppState::new());
        let server = TestServer::new(create_router(state)).unwrap();

        let response = server
            .get("/")
            .add_header(ORIGIN, HeaderValue::from_static("http://example.com"))
            .await;

        response.assert_status_ok();
        assert_eq!(response.header(ACCESS_CONTROL_ALLOW_ORIGIN), "*");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let state = Arc::new(AppState::new());
        let server = TestServer::new(create_router(state)).unwrap();

        let response = server.get("/api/health").expect_failure().await;

        response.assert_status_not_found();
    }
}
