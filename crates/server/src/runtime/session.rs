//! HTTP session table — one transport per `mcp-session-id`.
//!
//! The manager owns the only mutable shared state in the process: the
//! map from session id to live transport. Mutation happens at exactly
//! three points: insert on create, remove on close, drain on shutdown.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use uuid::Uuid;

use wm_domain::protocol::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse};

use super::McpService;

/// Bound on queued server-initiated messages per session.
const OUTBOUND_BUFFER: usize = 64;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Session
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One live session: an opaque id bound to exactly one transport.
///
/// Inbound messages are serialized through `handle_lock` (arrival order
/// within a session); server-initiated messages flow through the
/// outbound channel to an optional SSE sink.
pub struct Session {
    id: String,
    created_at: DateTime<Utc>,
    handle_lock: tokio::sync::Mutex<()>,
    outbound_tx: Mutex<Option<mpsc::Sender<JsonRpcNotification>>>,
    outbound_rx: Mutex<Option<mpsc::Receiver<JsonRpcNotification>>>,
}

impl Session {
    fn new() -> Arc<Self> {
        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
        Arc::new(Self {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            handle_lock: tokio::sync::Mutex::new(()),
            outbound_tx: Mutex::new(Some(tx)),
            outbound_rx: Mutex::new(Some(rx)),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Queue a server-initiated message for the streaming sink.
    /// Returns `false` once the session is closed or the sink is gone.
    pub async fn notify(&self, note: JsonRpcNotification) -> bool {
        let tx = self.outbound_tx.lock().clone();
        match tx {
            Some(tx) => tx.send(note).await.is_ok(),
            None => false,
        }
    }

    /// Claim the streaming receiver — exactly once per session. A second
    /// claim returns `None` (the transport is exclusively owned).
    pub fn take_stream(&self) -> Option<mpsc::Receiver<JsonRpcNotification>> {
        self.outbound_rx.lock().take()
    }

    /// Drop the outbound sender so any attached stream ends.
    fn close(&self) {
        self.outbound_tx.lock().take();
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SessionManager
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub struct SessionManager {
    service: Arc<McpService>,
    sessions: RwLock<HashMap<String, Arc<Session>>>,
    shutting_down: AtomicBool,
}

impl SessionManager {
    pub fn new(service: Arc<McpService>) -> Self {
        Self {
            service,
            sessions: RwLock::new(HashMap::new()),
            shutting_down: AtomicBool::new(false),
        }
    }

    /// Open a new session with a freshly generated id. Ids are random
    /// UUIDs and are never reused after a session closes.
    pub fn create(&self) -> Arc<Session> {
        let session = Session::new();
        self.sessions
            .write()
            .insert(session.id().to_string(), session.clone());
        tracing::info!(
            session_id = %session.id(),
            active = self.count(),
            "session opened"
        );
        session
    }

    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.read().get(id).cloned()
    }

    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Close one session. Returns `false` when the id is unknown — a
    /// closed id stays unknown forever.
    pub fn close(&self, id: &str) -> bool {
        let removed = self.sessions.write().remove(id);
        match removed {
            Some(session) => {
                session.close();
                tracing::info!(session_id = %id, active = self.count(), "session closed");
                true
            }
            None => false,
        }
    }

    /// Deliver one decoded message on a session. Messages on the same
    /// session are processed in arrival order; different sessions
    /// interleave freely.
    pub async fn dispatch(
        &self,
        session: &Session,
        req: JsonRpcRequest,
    ) -> Option<JsonRpcResponse> {
        let _guard = session.handle_lock.lock().await;
        self.service.handle(req).await
    }

    /// Close every live session and clear the table. Idempotent: a
    /// second call while a shutdown is running is a no-op.
    pub fn shutdown(&self) {
        if self.shutting_down.swap(true, Ordering::SeqCst) {
            return;
        }

        let drained: Vec<(String, Arc<Session>)> = {
            let mut sessions = self.sessions.write();
            sessions.drain().collect()
        };
        for (id, session) in drained {
            session.close();
            tracing::info!(session_id = %id, "session closed during shutdown");
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{manager, request};
    use std::collections::HashSet;

    #[test]
    fn session_ids_are_unique() {
        let mgr = manager();
        let mut seen = HashSet::new();
        for _ in 0..1000 {
            let session = mgr.create();
            assert!(seen.insert(session.id().to_string()), "id reused");
        }
        assert_eq!(mgr.count(), 1000);
    }

    #[test]
    fn closed_sessions_are_never_resurrected() {
        let mgr = manager();
        let session = mgr.create();
        let id = session.id().to_string();

        assert!(mgr.get(&id).is_some());
        assert!(mgr.close(&id));
        assert!(mgr.get(&id).is_none());

        // Closing again reports unknown, and the id stays dead.
        assert!(!mgr.close(&id));
        assert!(mgr.get(&id).is_none());
    }

    #[test]
    fn close_on_unknown_id_is_rejected() {
        let mgr = manager();
        assert!(!mgr.close("no-such-session"));
    }

    #[tokio::test]
    async fn dispatch_answers_on_the_right_session() {
        let mgr = manager();
        let a = mgr.create();
        let b = mgr.create();

        let (ra, rb) = tokio::join!(
            mgr.dispatch(&a, request(1, "ping", None)),
            mgr.dispatch(&b, request(2, "ping", None)),
        );
        assert!(ra.unwrap().result.is_some());
        assert!(rb.unwrap().result.is_some());

        // Neither dispatch disturbed the table.
        assert_eq!(mgr.count(), 2);
        assert!(mgr.get(a.id()).is_some());
        assert!(mgr.get(b.id()).is_some());
    }

    #[tokio::test]
    async fn closing_one_session_leaves_others_running() {
        let mgr = manager();
        let a = mgr.create();
        let b = mgr.create();

        assert!(mgr.close(a.id()));
        assert!(mgr.get(b.id()).is_some());
        let resp = mgr.dispatch(&b, request(3, "ping", None)).await;
        assert!(resp.unwrap().result.is_some());
    }

    #[tokio::test]
    async fn stream_receives_notifications_until_close() {
        let mgr = manager();
        let session = mgr.create();
        let mut rx = session.take_stream().expect("first claim succeeds");
        assert!(session.take_stream().is_none(), "stream is exclusively owned");

        let note = JsonRpcNotification::new("notifications/message", None);
        assert!(session.notify(note.clone()).await);
        assert_eq!(rx.recv().await.unwrap(), note);

        mgr.close(session.id());
        assert!(rx.recv().await.is_none(), "stream ends on close");
        assert!(!session.notify(note).await, "closed sessions drop messages");
    }

    #[test]
    fn shutdown_closes_everything_once() {
        let mgr = manager();
        for _ in 0..5 {
            mgr.create();
        }
        assert_eq!(mgr.count(), 5);

        mgr.shutdown();
        assert_eq!(mgr.count(), 0);

        // Second call is a guarded no-op.
        mgr.shutdown();
        assert_eq!(mgr.count(), 0);
    }
}
