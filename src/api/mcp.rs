//! MCP JSON-RPC endpoint
//!
//! Exposes the three timer commands as MCP tools and the status views as
//! MCP resources. Every reply, including protocol errors, is sent with HTTP
//! 200 and a JSON-RPC body.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, response::Json};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::{
    error::TimerError,
    services::{CommandService, ControlTimerRequest, Envelope, StartTimerRequest},
    state::AppState,
};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

pub const PARSE_ERROR: i64 = -32700;
pub const INVALID_REQUEST: i64 = -32600;
pub const METHOD_NOT_FOUND: i64 = -32601;
pub const INVALID_PARAMS: i64 = -32602;
pub const INTERNAL_ERROR: i64 = -32603;

const STATUS_URI: &str = "timers://status";
const PRESETS_URI: &str = "timers://presets";
const HISTORY_URI: &str = "timers://history";

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.unwrap_or(Value::Null),
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id: id.unwrap_or(Value::Null),
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ResourceReadParams {
    uri: String,
}

/// Handle POST /mcp
pub async fn mcp_handler(State(state): State<Arc<AppState>>, body: Bytes) -> Json<JsonRpcResponse> {
    let raw: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            warn!("Unparseable MCP message: {}", e);
            return Json(JsonRpcResponse::error(None, PARSE_ERROR, format!("Parse error: {}", e)));
        }
    };

    let id = raw.get("id").cloned();
    let request: JsonRpcRequest = match serde_json::from_value(raw) {
        Ok(request) => request,
        Err(e) => {
            warn!("Malformed MCP request: {}", e);
            return Json(JsonRpcResponse::error(
                id,
                INVALID_REQUEST,
                format!("Invalid request: {}", e),
            ));
        }
    };

    Json(handle_request(&state.commands, request))
}

/// Dispatch one JSON-RPC request against the command service
pub fn handle_request(commands: &CommandService, request: JsonRpcRequest) -> JsonRpcResponse {
    info!("Received MCP request: {}", request.method);
    let id = request.id;

    match request.method.as_str() {
        "initialize" => JsonRpcResponse::success(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {},
                    "resources": {
                        "subscribe": false,
                        "listChanged": false
                    }
                },
                "serverInfo": {
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        ),
        "notifications/initialized" => {
            info!("MCP client initialized");
            JsonRpcResponse::success(id, json!({}))
        }
        "ping" => JsonRpcResponse::success(id, json!({})),
        "tools/list" => JsonRpcResponse::success(id, json!({ "tools": tool_definitions() })),
        "tools/call" => match parse_params::<ToolCallParams>(request.params) {
            Ok(params) => call_tool(commands, id, params),
            Err(message) => JsonRpcResponse::error(id, INVALID_PARAMS, message),
        },
        "resources/list" => {
            JsonRpcResponse::success(id, json!({ "resources": resource_definitions() }))
        }
        "resources/read" => match parse_params::<ResourceReadParams>(request.params) {
            Ok(params) => read_resource(commands, id, &params.uri),
            Err(message) => JsonRpcResponse::error(id, INVALID_PARAMS, message),
        },
        other => {
            warn!("Unknown MCP method: {}", other);
            JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("Method not found: {}", other))
        }
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, String> {
    let params = params.ok_or_else(|| "Missing params".to_string())?;
    serde_json::from_value(params).map_err(|e| format!("Invalid params: {}", e))
}

fn tool_definitions() -> Vec<Value> {
    vec![
        json!({
            "name": "startTimer",
            "description": "Start a new countdown timer",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "name": {
                        "type": "string",
                        "description": "Display name; defaults to 'Timer N'"
                    },
                    "durationSeconds": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": 7200,
                        "description": "Countdown length in seconds"
                    }
                },
                "required": ["durationSeconds"]
            }
        }),
        json!({
            "name": "controlTimer",
            "description": "Pause, resume or stop an active timer",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "timerId": { "type": "string" },
                    "action": { "type": "string", "enum": ["pause", "resume", "stop"] }
                },
                "required": ["timerId", "action"]
            }
        }),
        json!({
            "name": "getTimerStatus",
            "description": "List active timers, recent history and presets",
            "inputSchema": {
                "type": "object",
                "properties": {},
                "required": []
            }
        }),
    ]
}

fn resource_definitions() -> Vec<Value> {
    vec![
        json!({
            "uri": STATUS_URI,
            "name": "Timer Status",
            "description": "Active timers, recent history and presets",
            "mimeType": "application/json"
        }),
        json!({
            "uri": PRESETS_URI,
            "name": "Timer Presets",
            "description": "Named duration templates",
            "mimeType": "application/json"
        }),
        json!({
            "uri": HISTORY_URI,
            "name": "Timer History",
            "description": "Most recently stopped or completed timers",
            "mimeType": "application/json"
        }),
    ]
}

fn call_tool(commands: &CommandService, id: Option<Value>, params: ToolCallParams) -> JsonRpcResponse {
    let arguments = params.arguments.unwrap_or_else(|| json!({}));
    debug!("Calling tool {} with {}", params.name, arguments);

    let outcome = match params.name.as_str() {
        "startTimer" => {
            decode_arguments::<StartTimerRequest>(arguments).and_then(|r| commands.start_timer(&r))
        }
        "controlTimer" => decode_arguments::<ControlTimerRequest>(arguments)
            .and_then(|r| commands.control_timer(&r)),
        "getTimerStatus" => commands.get_timer_status(),
        other => {
            warn!("Unknown tool: {}", other);
            return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Unknown tool: {}", other));
        }
    };

    let envelope = outcome.unwrap_or_else(|e| Envelope::failure(&e));
    JsonRpcResponse::success(id, tool_result(&envelope))
}

fn decode_arguments<T: DeserializeOwned>(arguments: Value) -> crate::error::Result<T> {
    serde_json::from_value(arguments).map_err(|e| TimerError::InvalidRequest(e.to_string()))
}

fn tool_result(envelope: &Envelope) -> Value {
    let text = serde_json::to_string_pretty(envelope).unwrap_or_else(|_| envelope.message.clone());
    json!({
        "content": [{ "type": "text", "text": text }],
        "structuredContent": envelope,
        "isError": !envelope.success
    })
}

fn read_resource(commands: &CommandService, id: Option<Value>, uri: &str) -> JsonRpcResponse {
    let payload = match uri {
        STATUS_URI => commands.get_timer_status().map(|envelope| json!(envelope)),
        PRESETS_URI => Ok(json!(commands.presets())),
        HISTORY_URI => commands
            .get_timer_status()
            .map(|envelope| json!(envelope.history)),
        other => {
            return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Unknown resource: {}", other))
        }
    };

    match payload {
        Ok(payload) => JsonRpcResponse::success(
            id,
            json!({
                "contents": [{
                    "uri": uri,
                    "mimeType": "application/json",
                    "text": payload.to_string()
                }]
            }),
        ),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, e.to_string()),
    }
}
