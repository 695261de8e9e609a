//! JSON-RPC 2.0 types for the MCP protocol.
//!
//! Messages arrive either as single newline-delimited JSON lines (stdio)
//! or as HTTP POST bodies (streamable HTTP); both decode into the same
//! types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JSONRPC_VERSION: &str = "2.0";
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC 2.0 error codes.
pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Requests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A request id. Peers may send numbers or strings; the id is echoed
/// back verbatim. `Null` only appears on parse-error responses where no
/// id could be recovered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
    Null,
}

/// An inbound JSON-RPC 2.0 message. With an `id` it is a request that
/// expects a response; without one it is a fire-and-forget notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: RequestId, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            id: Some(id),
            method: method.into(),
            params,
        }
    }

    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// A server-initiated JSON-RPC 2.0 notification (no `id`), delivered to
/// clients over the per-session streaming channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcNotification {
    pub jsonrpc: String,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            method: method.into(),
            params,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Responses
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A JSON-RPC 2.0 response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: RequestId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: RequestId, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.into(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "JSON-RPC error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for JsonRpcError {}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// MCP-specific payloads
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Server identity reported during `initialize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// The result payload for `initialize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: Value,
    pub server_info: ServerInfo,
}

impl InitializeResult {
    pub fn new(server_info: ServerInfo) -> Self {
        Self {
            protocol_version: MCP_PROTOCOL_VERSION.into(),
            capabilities: serde_json::json!({ "tools": {} }),
            server_info,
        }
    }
}

/// A single tool definition returned by `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDef {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub input_schema: Value,
}

/// The result payload for `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsListResult {
    pub tools: Vec<ToolDef>,
}

/// A single content item in a `tools/call` result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub text: String,
}

impl ToolContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content_type: "text".into(),
            text: text.into(),
        }
    }
}

/// The result payload for `tools/call`.
///
/// Tool failures travel inside this envelope (`is_error: true`); they
/// never become JSON-RPC or transport errors, so the session stays
/// usable after any number of failed calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub content: Vec<ToolContent>,
    #[serde(default, rename = "isError", skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Wrap a success payload as a pretty-printed JSON text block.
    pub fn success(payload: &Value) -> Self {
        let text = serde_json::to_string_pretty(payload)
            .unwrap_or_else(|e| format!("{{\"success\":true,\"note\":\"unserializable: {e}\"}}"));
        Self {
            content: vec![ToolContent::text(text)],
            is_error: false,
        }
    }

    /// Wrap a failure message as `{success: false, error}`.
    pub fn failure(message: impl Into<String>) -> Self {
        let message: String = message.into();
        let payload = serde_json::json!({
            "success": false,
            "error": message,
        });
        let text = serde_json::to_string_pretty(&payload)
            .unwrap_or_else(|_| payload.to_string());
        Self {
            content: vec![ToolContent::text(text)],
            is_error: true,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_request_with_numeric_id() {
        let raw = r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05"}}"#;
        let req: JsonRpcRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(req.id, Some(RequestId::Number(1)));
        assert_eq!(req.method, "initialize");
        assert!(!req.is_notification());
    }

    #[test]
    fn deserialize_request_with_string_id() {
        let raw = r#"{"jsonrpc":"2.0","id":"abc-1","method":"tools/list"}"#;
        let req: JsonRpcRequest = serde_json::from_str(raw).unwrap();
        assert_eq!(req.id, Some(RequestId::String("abc-1".into())));
    }

    #[test]
    fn notification_has_no_id() {
        let raw = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;
        let req: JsonRpcRequest = serde_json::from_str(raw).unwrap();
        assert!(req.is_notification());
    }

    #[test]
    fn response_id_is_echoed_verbatim() {
        let resp = JsonRpcResponse::success(
            RequestId::String("abc-1".into()),
            serde_json::json!({"ok": true}),
        );
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"id\":\"abc-1\""));
        assert!(!json.contains("error"));
    }

    #[test]
    fn null_id_serializes_as_json_null() {
        let resp = JsonRpcResponse::error(RequestId::Null, PARSE_ERROR, "bad json");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"id\":null"));
        assert!(json.contains("-32700"));
    }

    #[test]
    fn error_response_roundtrip() {
        let resp = JsonRpcResponse::error(RequestId::Number(7), METHOD_NOT_FOUND, "nope");
        let parsed: JsonRpcResponse = serde_json::from_str(&serde_json::to_string(&resp).unwrap()).unwrap();
        assert!(parsed.is_error());
        assert_eq!(parsed.error.unwrap().code, -32601);
    }

    #[test]
    fn notification_serializes_without_id() {
        let note = JsonRpcNotification::new("notifications/message", None);
        let json = serde_json::to_string(&note).unwrap();
        assert!(!json.contains("\"id\""));
        assert!(!json.contains("params"));
    }

    #[test]
    fn initialize_result_shape() {
        let result = InitializeResult::new(ServerInfo {
            name: "wikijs-mcp-server".into(),
            version: "2.0.0".into(),
        });
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["protocolVersion"], "2024-11-05");
        assert!(value["capabilities"]["tools"].is_object());
        assert_eq!(value["serverInfo"]["name"], "wikijs-mcp-server");
    }

    #[test]
    fn tool_def_uses_camel_case_schema_key() {
        let def = ToolDef {
            name: "get_page".into(),
            description: "Fetch a page".into(),
            input_schema: serde_json::json!({"type": "object"}),
        };
        let json = serde_json::to_string(&def).unwrap();
        assert!(json.contains("inputSchema"));
    }

    #[test]
    fn tool_call_success_wraps_pretty_json() {
        let result = ToolCallResult::success(&serde_json::json!({"success": true, "id": 3}));
        assert!(!result.is_error);
        assert_eq!(result.content.len(), 1);
        assert_eq!(result.content[0].content_type, "text");
        let parsed: serde_json::Value = serde_json::from_str(&result.content[0].text).unwrap();
        assert_eq!(parsed["success"], true);
    }

    #[test]
    fn tool_call_failure_sets_error_flag() {
        let result = ToolCallResult::failure("Unknown tool: bogus");
        assert!(result.is_error);
        let parsed: serde_json::Value = serde_json::from_str(&result.content[0].text).unwrap();
        assert_eq!(parsed["success"], false);
        assert_eq!(parsed["error"], "Unknown tool: bogus");
    }

    #[test]
    fn is_error_flag_omitted_when_false() {
        let result = ToolCallResult::success(&serde_json::json!({"success": true}));
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("isError"));
    }
}
