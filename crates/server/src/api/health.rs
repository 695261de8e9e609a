//! Liveness + status endpoint (public, no session required).

use axum::extract::State;
use axum::response::{IntoResponse, Json};

use crate::state::AppState;
use crate::SERVER_NAME;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "server": SERVER_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "activeSessions": state.sessions.count(),
        "wikijsApi": state.wiki_api_url,
    }))
}
