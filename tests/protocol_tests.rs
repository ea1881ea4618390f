//! Protocol-level tests: initialization, lifecycle, and dispatch.

mod common;

use common::start_fake;
use serde_json::json;

#[tokio::test]
async fn initialize_returns_server_info() {
    let (mut conn, _engine, _installer) = start_fake();

    let response = conn.initialize().await;
    let result = &response["result"];

    assert_eq!(result["protocolVersion"], json!("2024-11-05"));
    assert_eq!(result["serverInfo"]["name"], json!("python-repl"));
    assert!(result["capabilities"]["tools"].is_object());
}

#[tokio::test]
async fn ping_works_before_initialize() {
    let (mut conn, _engine, _installer) = start_fake();

    let response = conn.request("ping", json!({})).await;
    assert_eq!(response["result"], json!({}));
}

#[tokio::test]
async fn requests_before_initialize_are_rejected() {
    let (mut conn, _engine, _installer) = start_fake();

    let response = conn.request("tools/list", json!({})).await;
    assert_eq!(response["error"]["code"], json!(-32002));
}

#[tokio::test]
async fn tools_list_returns_the_three_tools() {
    let (mut conn, _engine, _installer) = start_fake();
    conn.initialize().await;

    let response = conn.request("tools/list", json!({})).await;
    let tools = response["result"]["tools"].as_array().unwrap();

    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["execute_python", "list_variables", "install_package"]);

    let execute = &tools[0];
    assert_eq!(execute["inputSchema"]["required"], json!(["code"]));
    assert_eq!(
        execute["inputSchema"]["properties"]["reset"]["type"],
        json!("boolean")
    );
}

#[tokio::test]
async fn unknown_method_is_not_found() {
    let (mut conn, _engine, _installer) = start_fake();
    conn.initialize().await;

    let response = conn.request("resources/list", json!({})).await;
    assert_eq!(response["error"]["code"], json!(-32601));
}

#[tokio::test]
async fn unparseable_input_yields_parse_error_with_null_id() {
    let (mut conn, _engine, _installer) = start_fake();

    let response = conn.send_raw("this is not json").await;
    assert_eq!(response["error"]["code"], json!(-32700));
    assert!(response["id"].is_null());
}

#[tokio::test]
async fn wrong_jsonrpc_version_is_invalid() {
    let (mut conn, _engine, _installer) = start_fake();

    let response = conn
        .send_raw(r#"{"jsonrpc":"1.0","id":7,"method":"ping"}"#)
        .await;
    assert_eq!(response["error"]["code"], json!(-32600));
    assert_eq!(response["id"], json!(7));
}

#[tokio::test]
async fn notifications_get_no_response() {
    let (mut conn, _engine, _installer) = start_fake();

    // An unknown notification is ignored; the next response must belong to
    // the ping that follows it.
    conn.notify("notifications/cancelled").await;
    let response = conn.request("ping", json!({})).await;
    assert_eq!(response["result"], json!({}));
}

#[tokio::test]
async fn string_request_ids_are_echoed() {
    let (mut conn, _engine, _installer) = start_fake();

    let response = conn
        .send_raw(r#"{"jsonrpc":"2.0","id":"req-1","method":"ping"}"#)
        .await;
    assert_eq!(response["id"], json!("req-1"));
    assert_eq!(response["result"], json!({}));
}

#[tokio::test]
async fn tools_call_without_name_is_invalid_params() {
    let (mut conn, _engine, _installer) = start_fake();
    conn.initialize().await;

    let response = conn.request("tools/call", json!({})).await;
    assert_eq!(response["error"]["code"], json!(-32602));
}
