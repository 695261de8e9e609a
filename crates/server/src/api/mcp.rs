//! `/mcp` handlers — session routing for the streamable HTTP transport.
//!
//! - `POST /mcp`    — JSON-RPC request (no session header ⇒ new session)
//! - `GET /mcp`     — SSE stream for server-initiated messages
//! - `DELETE /mcp`  — close a session
//! - `OPTIONS /mcp` — CORS pre-flight
//!
//! Routing failures (unknown session, missing header, malformed body)
//! are reported through HTTP status codes; tool failures never reach
//! this layer — they travel inside successful JSON-RPC envelopes.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

use wm_domain::protocol::JsonRpcRequest;

use crate::state::AppState;

use super::SESSION_HEADER;

// ── Helpers ────────────────────────────────────────────────────────

/// Build a standardized JSON error response: `{ "error": "<message>" }`.
fn api_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": message.into() }))).into_response()
}

fn session_id_from(headers: &HeaderMap) -> Option<&str> {
    headers.get(SESSION_HEADER)?.to_str().ok()
}

/// Echo the bound session id back on the response.
fn with_session_header(mut response: Response, id: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(id) {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    response
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /mcp
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn post_mcp(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = body else {
        return api_error(StatusCode::BAD_REQUEST, "Invalid JSON body");
    };

    // No header: first contact, open a fresh session. A header naming a
    // session we do not know is a hard 404 — it never creates one.
    let session = match session_id_from(&headers) {
        Some(id) => match state.sessions.get(id) {
            Some(session) => session,
            None => return api_error(StatusCode::NOT_FOUND, "Session not found"),
        },
        None => state.sessions.create(),
    };

    let request: JsonRpcRequest = match serde_json::from_value(body) {
        Ok(request) => request,
        Err(e) => {
            let response = api_error(
                StatusCode::BAD_REQUEST,
                format!("Invalid JSON-RPC envelope: {e}"),
            );
            return with_session_header(response, session.id());
        }
    };

    let response = match state.sessions.dispatch(&session, request).await {
        Some(reply) => (StatusCode::OK, Json(reply)).into_response(),
        // Notifications are accepted without a body.
        None => StatusCode::ACCEPTED.into_response(),
    };
    with_session_header(response, session.id())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /mcp (SSE)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn get_mcp(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let Some(session) = session_id_from(&headers).and_then(|id| state.sessions.get(id)) else {
        return api_error(
            StatusCode::BAD_REQUEST,
            "Missing or invalid mcp-session-id header for SSE stream",
        );
    };

    let Some(mut rx) = session.take_stream() else {
        return api_error(
            StatusCode::CONFLICT,
            "SSE stream already established for this session",
        );
    };

    let stream = async_stream::stream! {
        while let Some(note) = rx.recv().await {
            yield Event::default().event("message").json_data(&note);
        }
    };

    let response = Sse::new(stream)
        .keep_alive(KeepAlive::default())
        .into_response();
    with_session_header(response, session.id())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// DELETE /mcp
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn delete_mcp(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match session_id_from(&headers) {
        Some(id) if state.sessions.close(id) => {
            with_session_header(StatusCode::NO_CONTENT.into_response(), id)
        }
        _ => api_error(StatusCode::NOT_FOUND, "Session not found"),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// OPTIONS /mcp
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Pre-flight succeeds regardless of session state.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::app_state;
    use axum::body::to_bytes;
    use serde_json::json;

    fn headers_with_session(id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(SESSION_HEADER, HeaderValue::from_str(id).unwrap());
        headers
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn rpc(id: i64, method: &str) -> Value {
        json!({ "jsonrpc": "2.0", "id": id, "method": method })
    }

    #[tokio::test]
    async fn post_without_header_opens_a_session() {
        let (state, _) = app_state();
        let response = post_mcp(State(state.clone()), HeaderMap::new(), Ok(Json(rpc(1, "ping"))))
            .await;

        assert_eq!(response.status(), StatusCode::OK);
        let id = response
            .headers()
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .expect("session header present")
            .to_string();
        assert!(state.sessions.get(&id).is_some());

        let body = body_json(response).await;
        assert_eq!(body["jsonrpc"], "2.0");
        assert!(body["result"].is_object());
    }

    #[tokio::test]
    async fn each_headerless_post_gets_a_distinct_session() {
        let (state, _) = app_state();
        let first = post_mcp(State(state.clone()), HeaderMap::new(), Ok(Json(rpc(1, "ping")))).await;
        let second = post_mcp(State(state.clone()), HeaderMap::new(), Ok(Json(rpc(2, "ping")))).await;

        let a = first.headers().get(SESSION_HEADER).unwrap();
        let b = second.headers().get(SESSION_HEADER).unwrap();
        assert_ne!(a, b);
        assert_eq!(state.sessions.count(), 2);
    }

    #[tokio::test]
    async fn post_with_live_session_reuses_it() {
        let (state, _) = app_state();
        let session = state.sessions.create();

        let response = post_mcp(
            State(state.clone()),
            headers_with_session(session.id()),
            Ok(Json(rpc(1, "tools/list"))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(SESSION_HEADER).unwrap().to_str().unwrap(),
            session.id()
        );
        assert_eq!(state.sessions.count(), 1);
    }

    #[tokio::test]
    async fn post_with_unknown_session_is_404_and_creates_nothing() {
        let (state, _) = app_state();
        let response = post_mcp(
            State(state.clone()),
            headers_with_session("ghost"),
            Ok(Json(rpc(1, "ping"))),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(state.sessions.count(), 0);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Session not found");
    }

    #[tokio::test]
    async fn notification_post_is_accepted_without_body() {
        let (state, _) = app_state();
        let session = state.sessions.create();
        let note = json!({ "jsonrpc": "2.0", "method": "notifications/initialized" });

        let response = post_mcp(
            State(state),
            headers_with_session(session.id()),
            Ok(Json(note)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn malformed_envelope_is_a_transport_error() {
        let (state, _) = app_state();
        let session = state.sessions.create();

        let response = post_mcp(
            State(state),
            headers_with_session(session.id()),
            Ok(Json(json!({ "no": "method" }))),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_without_session_is_400() {
        let (state, _) = app_state();
        let response = get_mcp(State(state), HeaderMap::new()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("mcp-session-id"));
    }

    #[tokio::test]
    async fn get_with_unknown_session_is_400() {
        let (state, _) = app_state();
        let response = get_mcp(State(state), headers_with_session("ghost")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_with_live_session_streams() {
        let (state, _) = app_state();
        let session = state.sessions.create();

        let response = get_mcp(State(state), headers_with_session(session.id())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/event-stream"
        );
        assert!(response.headers().get(SESSION_HEADER).is_some());
    }

    #[tokio::test]
    async fn second_stream_claim_conflicts() {
        let (state, _) = app_state();
        let session = state.sessions.create();

        let first = get_mcp(State(state.clone()), headers_with_session(session.id())).await;
        assert_eq!(first.status(), StatusCode::OK);

        let second = get_mcp(State(state), headers_with_session(session.id())).await;
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn delete_closes_and_the_id_stays_dead() {
        let (state, _) = app_state();
        let session = state.sessions.create();
        let id = session.id().to_string();

        let response = delete_mcp(State(state.clone()), headers_with_session(&id)).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        // Any follow-up on the closed id is a 404.
        let post = post_mcp(
            State(state.clone()),
            headers_with_session(&id),
            Ok(Json(rpc(1, "ping"))),
        )
        .await;
        assert_eq!(post.status(), StatusCode::NOT_FOUND);

        let delete_again = delete_mcp(State(state), headers_with_session(&id)).await;
        assert_eq!(delete_again.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_without_header_is_404() {
        let (state, _) = app_state();
        let response = delete_mcp(State(state), HeaderMap::new()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn preflight_is_always_no_content() {
        assert_eq!(preflight().await, StatusCode::NO_CONTENT);
    }
}
