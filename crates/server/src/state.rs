//! Shared application state passed to every HTTP handler.

use std::sync::Arc;

use crate::runtime::{McpService, SessionManager};

#[derive(Clone)]
pub struct AppState {
    /// Dispatch service shared by both entry adapters.
    pub service: Arc<McpService>,
    /// HTTP session table. The stdio adapter never touches it.
    pub sessions: Arc<SessionManager>,
    /// Upstream endpoint, echoed on `/health`.
    pub wiki_api_url: String,
}
