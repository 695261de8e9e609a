//! Shared runtime construction used by both entry adapters.

use std::sync::Arc;

use wm_domain::config::WikiConfig;
use wm_domain::Result;
use wm_wiki_client::{GraphQlWikiClient, WikiProvider};

use crate::runtime::{McpService, SessionManager};
use crate::state::AppState;
use crate::tools::ToolRegistry;

/// Wire up the Wiki.js client, the tool registry, the dispatch service
/// and the session table, and return the fully built [`AppState`].
pub fn build_app_state(config: &WikiConfig) -> Result<AppState> {
    let client = GraphQlWikiClient::new(&config.api_url, &config.api_token)?;
    let wiki: Arc<dyn WikiProvider> = Arc::new(client);
    tracing::info!(api = %config.api_url, "Wiki.js client ready");

    let registry = ToolRegistry::new();
    tracing::info!(tools = registry.len(), "tool registry ready");

    let service = Arc::new(McpService::new(registry, wiki));
    let sessions = Arc::new(SessionManager::new(service.clone()));

    Ok(AppState {
        service,
        sessions,
        wiki_api_url: config.api_url.clone(),
    })
}
