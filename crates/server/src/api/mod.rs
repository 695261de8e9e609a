//! HTTP entry adapter — the streamable MCP endpoint and liveness surface.

pub mod health;
pub mod mcp;

use axum::http::{header, HeaderName, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::state::AppState;

/// Header carrying the session id on every `/mcp` exchange.
pub const SESSION_HEADER: &str = "mcp-session-id";

/// Build the full HTTP router.
///
/// CORS is fully permissive so browser-hosted editors can connect; the
/// session header must be both allowed and exposed for the streamable
/// transport handshake to work cross-origin.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/mcp",
            axum::routing::post(mcp::post_mcp)
                .get(mcp::get_mcp)
                .delete(mcp::delete_mcp)
                .options(mcp::preflight),
        )
        .route("/health", get(health::health))
        .fallback(not_found)
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    let session_header = HeaderName::from_static(SESSION_HEADER);
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, session_header.clone()])
        .expose_headers([session_header])
}

/// Unknown-route fallback listing the endpoints this server actually has.
async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "Not found",
            "endpoints": {
                "POST /mcp": "MCP JSON-RPC endpoint",
                "GET /mcp": "SSE stream (requires mcp-session-id header)",
                "DELETE /mcp": "Close session",
                "GET /health": "Health check",
            },
        })),
    )
}
