//! JSON-RPC dispatch shared by the stdio and HTTP entry adapters.
//!
//! The service resolves one decoded message to at most one response.
//! Tool failures (unknown name, bad arguments, upstream errors) are
//! folded into the `tools/call` result envelope; only malformed
//! envelopes and unknown methods become JSON-RPC errors.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use wm_domain::protocol::{
    InitializeResult, JsonRpcRequest, JsonRpcResponse, RequestId, ServerInfo, ToolCallResult,
    ToolsListResult, INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND,
};
use wm_wiki_client::WikiProvider;

use crate::tools::ToolRegistry;
use crate::SERVER_NAME;

pub struct McpService {
    registry: ToolRegistry,
    wiki: Arc<dyn WikiProvider>,
}

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

impl McpService {
    pub fn new(registry: ToolRegistry, wiki: Arc<dyn WikiProvider>) -> Self {
        Self { registry, wiki }
    }

    pub fn server_info() -> ServerInfo {
        ServerInfo {
            name: SERVER_NAME.into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }

    /// Handle one decoded message. Notifications produce no response.
    pub async fn handle(&self, req: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let Some(id) = req.id else {
            tracing::debug!(method = %req.method, "notification received");
            return None;
        };

        let response = match req.method.as_str() {
            "initialize" => self.initialize(id),
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            "tools/list" => self.list_tools(id),
            "tools/call" => self.call_tool(id, req.params).await,
            other => {
                JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("method not found: {other}"))
            }
        };
        Some(response)
    }

    fn initialize(&self, id: RequestId) -> JsonRpcResponse {
        let result = InitializeResult::new(Self::server_info());
        into_success(id, &result)
    }

    fn list_tools(&self, id: RequestId) -> JsonRpcResponse {
        let result = ToolsListResult {
            tools: self.registry.definitions(),
        };
        into_success(id, &result)
    }

    async fn call_tool(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams =
            match serde_json::from_value(params.unwrap_or(Value::Null)) {
                Ok(p) => p,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        INVALID_PARAMS,
                        format!("invalid tools/call params: {e}"),
                    );
                }
            };

        let result = match self.registry.get(&params.name) {
            None => {
                tracing::warn!(tool = %params.name, "unknown tool requested");
                ToolCallResult::failure(format!("Unknown tool: {}", params.name))
            }
            Some(tool) => {
                tracing::info!(tool = %params.name, "invoking tool");
                match tool.run(self.wiki.as_ref(), params.arguments).await {
                    Ok(payload) => ToolCallResult::success(&payload),
                    Err(e) => {
                        tracing::warn!(tool = %params.name, error = %e, "tool call failed");
                        ToolCallResult::failure(e.to_string())
                    }
                }
            }
        };

        into_success(id, &result)
    }
}

fn into_success<T: serde::Serialize>(id: RequestId, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, format!("serialization failed: {e}")),
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
