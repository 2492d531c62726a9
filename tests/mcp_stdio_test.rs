// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Integration tests for discovery and invocation over stdio.
//!
//! These spawn the `mcp_test_server` helper binary built from
//! `tests/helpers/mcp_test_server/main.rs`.

use mcp_router::mcp::{
    build_functions, default_parameter_schema, discover_tools, ConnectionManager, McpConfig,
    McpError, McpSession, ParameterSchema, ServerConfig, ToolBackend,
};
use serde_json::json;

const TEST_SERVER: &str = env!("CARGO_BIN_EXE_mcp_test_server");

fn test_server(flags: &[&str]) -> ServerConfig {
    ServerConfig::stdio(TEST_SERVER)
        .with_args(flags.iter().copied())
        .with_timeouts(10, 10)
}

fn single_server(name: &str, config: ServerConfig) -> McpConfig {
    let mut mcp = McpConfig::new();
    mcp.add_server(name, config);
    mcp
}

#[tokio::test]
async fn test_discovers_test_server_tools() {
    let catalog = discover_tools(&single_server("files", test_server(&[]))).await;

    assert_eq!(catalog.tool_count(), 3);
    assert!(catalog.contains_tool("files", "list"));
    assert!(catalog.contains_tool("files", "echo"));
    assert!(catalog.contains_tool("files", "get_today_sentence"));

    let list = catalog.get("files", "list").unwrap();
    assert_eq!(list.description, "List files in the workspace");
    assert_eq!(list.parameter_schema, ParameterSchema::Absent);

    let functions = build_functions(&catalog);
    let names: Vec<_> = functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["files_echo", "files_get_today_sentence", "files_list"]);

    let list_fn = functions.iter().find(|f| f.name == "files_list").unwrap();
    assert_eq!(list_fn.parameters, default_parameter_schema());

    let echo_fn = functions.iter().find(|f| f.name == "files_echo").unwrap();
    assert_eq!(echo_fn.parameters["required"], json!(["message"]));
}

#[tokio::test]
async fn test_discovery_isolates_failing_servers() {
    let mut config = McpConfig::new();
    config.add_server("broken", ServerConfig::stdio("mcp-router-no-such-server-binary"));
    config.add_server("refusing", test_server(&["--fail-initialize"]));
    config.add_server("files", test_server(&[]));

    let catalog = discover_tools(&config).await;

    assert_eq!(
        catalog.server_names().collect::<Vec<_>>(),
        vec!["broken", "files", "refusing"]
    );
    assert!(catalog.server_tools("broken").unwrap().is_empty());
    assert!(catalog.server_tools("refusing").unwrap().is_empty());
    assert_eq!(catalog.server_tools("files").unwrap().len(), 3);

    let functions = build_functions(&catalog);
    assert_eq!(functions.len(), 3);
    assert!(functions.iter().all(|f| f.name.starts_with("files_")));
}

#[tokio::test]
async fn test_reinitialize_replaces_catalog() {
    let mut manager = ConnectionManager::new(single_server("files", test_server(&[])));

    let first = manager.initialize().await.clone();
    let first_functions = manager.functions().to_vec();

    let second = manager.initialize().await.clone();

    assert_eq!(first, second);
    assert_eq!(manager.functions(), first_functions.as_slice());
    assert_eq!(manager.functions().len(), 3);
}

#[tokio::test]
async fn test_skips_notifications_and_log_lines() {
    let mut manager = ConnectionManager::new(single_server("files", test_server(&["--noisy"])));
    manager.initialize().await;
    assert_eq!(manager.catalog().tool_count(), 3);

    let result = manager.call_tool("files", "list", json!({})).await.unwrap();
    assert_eq!(result.as_text(), "notes.txt\ntodo.md");
}

#[tokio::test]
async fn test_follows_tools_list_pagination() {
    let catalog = discover_tools(&single_server("files", test_server(&["--paginate"]))).await;
    assert_eq!(catalog.tool_count(), 3);
}

#[tokio::test]
async fn test_call_tool_returns_result() {
    let mut manager = ConnectionManager::new(single_server("files", test_server(&[])));
    manager.initialize().await;

    let result = manager.call_tool("files", "list", json!({})).await.unwrap();
    assert!(result.success());
    assert_eq!(result.as_text(), "notes.txt\ntodo.md");

    let result = manager
        .call_tool("files", "echo", json!({"message": "hello there"}))
        .await
        .unwrap();
    assert_eq!(result.as_text(), "hello there");

    let result = manager
        .call_tool("files", "get_today_sentence", json!({}))
        .await
        .unwrap();
    assert_eq!(result.to_string(), "Arroyave feels smart today");
}

#[tokio::test]
async fn test_call_tool_through_backend_trait() {
    let mut manager = ConnectionManager::new(single_server("files", test_server(&[])));
    manager.initialize().await;

    let backend: &dyn ToolBackend = &manager;
    assert_eq!(backend.functions().len(), 3);

    let result = backend.call_tool("files", "echo", json!({"message": "hi"})).await.unwrap();
    assert_eq!(result.as_text(), "hi");
}

#[tokio::test]
async fn test_call_unconfigured_server() {
    let mut manager = ConnectionManager::new(single_server("files", test_server(&[])));
    manager.initialize().await;

    let err = manager.call_tool("weather", "forecast", json!({})).await.unwrap_err();
    assert!(matches!(err, McpError::ServerNotConfigured(ref s) if s == "weather"));
}

#[tokio::test]
async fn test_call_unknown_tool() {
    let mut manager = ConnectionManager::new(single_server("files", test_server(&[])));
    manager.initialize().await;

    let err = manager.call_tool("files", "delete", json!({})).await.unwrap_err();
    match err {
        McpError::ToolNotFound { server, tool } => {
            assert_eq!(server, "files");
            assert_eq!(tool, "delete");
        }
        other => panic!("expected ToolNotFound, got {}", other),
    }
}

#[tokio::test]
async fn test_call_before_discovery_is_not_found() {
    let manager = ConnectionManager::new(single_server("files", test_server(&[])));

    let err = manager.call_tool("files", "list", json!({})).await.unwrap_err();
    assert!(matches!(err, McpError::ToolNotFound { .. }));
}

#[tokio::test]
async fn test_call_tool_timeout() {
    let config = test_server(&["--hang-on-call"]).with_timeouts(10, 1);
    let mut manager = ConnectionManager::new(single_server("files", config));
    manager.initialize().await;

    let err = manager.call_tool("files", "list", json!({})).await.unwrap_err();
    assert!(matches!(err, McpError::ToolCallTimeout { timeout_secs: 1, .. }));
}

#[tokio::test]
async fn test_failed_handshake_on_invoke() {
    let manager = ConnectionManager::new(single_server(
        "files",
        test_server(&["--fail-initialize"]),
    ));

    let err = manager.call_tool("files", "list", json!({})).await.unwrap_err();
    assert!(matches!(err, McpError::InitializationFailed { .. }));
}

#[tokio::test]
async fn test_session_reports_server_info_and_tool_errors() {
    let mut session = McpSession::connect("files", &test_server(&[])).await.unwrap();
    assert_eq!(session.server(), "files");
    assert_eq!(session.server_info().name, "mcp-test-server");
    assert_eq!(session.server_info().protocol_version.as_deref(), Some("2024-11-05"));

    let tools = session.list_tools().await.unwrap();
    assert_eq!(tools.len(), 3);

    // The server answers unknown tools with a JSON-RPC error.
    let result = session.call_tool("missing", json!({})).await.unwrap();
    assert!(result.is_error);
    assert!(result.as_text().contains("Unknown tool"));

    session.close().await;
}
