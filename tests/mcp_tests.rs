use axum::http::StatusCode;
use serde_json::{json, Value};

mod common;
use common::TestApp;

async fn rpc(app: &TestApp, method: &str, params: Value) -> Value {
    let (status, body) = app
        .post(
            "/mcp",
            json!({ "jsonrpc": "2.0", "id": 7, "method": method, "params": params }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["jsonrpc"], "2.0");
    body
}

fn tool_payload(response: &Value) -> Value {
    response["result"]["structuredContent"].clone()
}

#[tokio::test]
async fn test_initialize() {
    let app = TestApp::new();
    let response = rpc(&app, "initialize", json!({})).await;

    assert_eq!(response["id"], 7);
    assert_eq!(response["result"]["protocolVersion"], "2024-11-05");
    assert_eq!(response["result"]["serverInfo"]["name"], "countdown-tools");
    assert!(response["result"]["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn test_unknown_method_is_32601_with_http_200() {
    let app = TestApp::new();
    let response = rpc(&app, "timers/teleport", json!({})).await;

    assert_eq!(response["error"]["code"], -32601);
    assert!(response.get("result").is_none());
}

#[tokio::test]
async fn test_parse_error() {
    let app = TestApp::new();
    let (status, body) = app.post_raw("/mcp", "{{{{").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["error"]["code"], -32700);
    assert_eq!(body["id"], Value::Null);
}

#[tokio::test]
async fn test_tool_calls_share_state_with_rest() {
    let app = TestApp::new();

    let started = rpc(
        &app,
        "tools/call",
        json!({ "name": "startTimer", "arguments": { "name": "Tea", "durationSeconds": 180 } }),
    )
    .await;
    let payload = tool_payload(&started);
    assert_eq!(started["result"]["isError"], false);
    assert_eq!(payload["timer"]["minutesLeft"], 3);
    let id = payload["timer"]["id"].as_str().unwrap().to_string();

    let text = started["result"]["content"][0]["text"].as_str().unwrap();
    let decoded: Value = serde_json::from_str(text).unwrap();
    assert_eq!(decoded["timer"]["id"], id.as_str());

    let paused = rpc(
        &app,
        "tools/call",
        json!({ "name": "controlTimer", "arguments": { "timerId": id, "action": "pause" } }),
    )
    .await;
    assert_eq!(tool_payload(&paused)["success"], true);

    let (_, rest_status) = app.get("/tools/getTimerStatus").await;
    assert_eq!(rest_status["activeTimers"][0]["status"], "paused");
}

#[tokio::test]
async fn test_failed_control_is_flagged() {
    let app = TestApp::new();
    let response = rpc(
        &app,
        "tools/call",
        json!({ "name": "controlTimer", "arguments": { "timerId": "nope", "action": "resume" } }),
    )
    .await;

    assert_eq!(response["result"]["isError"], true);
    assert_eq!(
        tool_payload(&response)["message"],
        "Timer not found or not paused"
    );
}

#[tokio::test]
async fn test_resources_list_and_read_status() {
    let app = TestApp::new();
    app.post("/tools/startTimer", json!({ "durationSeconds": 90 }))
        .await;

    let listed = rpc(&app, "resources/list", json!({})).await;
    let uris: Vec<&str> = listed["result"]["resources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["uri"].as_str().unwrap())
        .collect();
    assert!(uris.contains(&"timers://status"));

    let read = rpc(&app, "resources/read", json!({ "uri": "timers://status" })).await;
    let content = &read["result"]["contents"][0];
    assert_eq!(content["mimeType"], "application/json");
    let status: Value = serde_json::from_str(content["text"].as_str().unwrap()).unwrap();
    assert_eq!(status["activeTimers"][0]["remainingSeconds"], 90);
}

#[tokio::test]
async fn test_history_resource_after_completion() {
    let app = TestApp::new();
    app.post("/tools/startTimer", json!({ "name": "blip", "durationSeconds": 2 }))
        .await;
    app.tick(2);

    let read = rpc(&app, "resources/read", json!({ "uri": "timers://history" })).await;
    let text = read["result"]["contents"][0]["text"].as_str().unwrap();
    let history: Vec<Value> = serde_json::from_str(text).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["name"], "blip");
    assert_eq!(history[0]["status"], "completed");
}
