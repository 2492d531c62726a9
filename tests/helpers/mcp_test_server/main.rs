// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! MCP test server binary for integration tests.
//!
//! A minimal MCP server speaking newline-delimited JSON-RPC on stdin/stdout.
//!
//! # Tools
//!
//! - `list` - no input schema; returns a fixed file listing.
//! - `echo` - echoes the `message` argument.
//! - `get_today_sentence` - returns a fixed sentence.
//!
//! Calling any other tool returns a JSON-RPC `-32602` error.
//!
//! # Flags
//!
//! - `--fail-initialize` - answer `initialize` with an error.
//! - `--noisy` - write a non-JSON line and a notification before every
//!   response.
//! - `--paginate` - split `tools/list` into two pages.
//! - `--hang-on-call` - never answer `tools/call`.

use std::io::{self, BufRead, Write};

use serde_json::{json, Value};

/// Listing returned by the `list` tool.
const FILE_LISTING: &str = "notes.txt\ntodo.md";

#[derive(Default)]
struct Options {
    fail_initialize: bool,
    noisy: bool,
    paginate: bool,
    hang_on_call: bool,
}

fn main() {
    let mut options = Options::default();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--fail-initialize" => options.fail_initialize = true,
            "--noisy" => options.noisy = true,
            "--paginate" => options.paginate = true,
            "--hang-on-call" => options.hang_on_call = true,
            other => eprintln!("mcp_test_server: ignoring unknown flag {}", other),
        }
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let request: Value = match serde_json::from_str(trimmed) {
            Ok(v) => v,
            Err(_) => {
                let response = make_error(&Value::Null, -32700, "Parse error");
                if send(&mut out, &response).is_err() {
                    break;
                }
                continue;
            }
        };

        let method = request.get("method").and_then(|m| m.as_str()).unwrap_or("");
        let id = request.get("id").cloned().unwrap_or(Value::Null);

        // Notifications get no response.
        if request.get("id").is_none() {
            continue;
        }

        let response = match method {
            "initialize" if options.fail_initialize => {
                make_error(&id, -32603, "initialization refused")
            }
            "initialize" => handle_initialize(&id),
            "tools/list" => handle_tools_list(&id, &request, options.paginate),
            "tools/call" if options.hang_on_call => continue,
            "tools/call" => handle_tools_call(&id, &request),
            "ping" => json!({"jsonrpc": "2.0", "id": id, "result": {}}),
            _ => make_error(&id, -32601, &format!("Method not found: {}", method)),
        };

        if options.noisy {
            let _ = writeln!(out, "test server log line: handling {}", method);
            let _ = send(
                &mut out,
                &json!({
                    "jsonrpc": "2.0",
                    "method": "notifications/message",
                    "params": {"level": "info", "data": method}
                }),
            );
        }

        if send(&mut out, &response).is_err() {
            break;
        }
    }
}

fn send(out: &mut impl Write, message: &Value) -> io::Result<()> {
    let serialized = serde_json::to_string(message).map_err(io::Error::other)?;
    writeln!(out, "{}", serialized)?;
    out.flush()
}

fn handle_initialize(id: &Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": {
            "protocolVersion": "2024-11-05",
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": "mcp-test-server",
                "version": "0.1.0"
            }
        }
    })
}

fn all_tools() -> Vec<Value> {
    vec![
        json!({
            "name": "list",
            "description": "List files in the workspace"
        }),
        json!({
            "name": "echo",
            "description": "Echoes input",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "message": {"type": "string"}
                },
                "required": ["message"]
            }
        }),
        json!({
            "name": "get_today_sentence",
            "description": "Get today sentence",
            "inputSchema": {
                "type": "object",
                "properties": {}
            }
        }),
    ]
}

fn handle_tools_list(id: &Value, request: &Value, paginate: bool) -> Value {
    let tools = all_tools();

    let result = if !paginate {
        json!({ "tools": tools })
    } else {
        let cursor = request
            .get("params")
            .and_then(|p| p.get("cursor"))
            .and_then(|c| c.as_str());
        let (first, rest) = tools.split_at(1);
        match cursor {
            None => json!({ "tools": first, "nextCursor": "page-2" }),
            Some(_) => json!({ "tools": rest }),
        }
    };

    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}

fn handle_tools_call(id: &Value, request: &Value) -> Value {
    let params = request.get("params").unwrap_or(&Value::Null);
    let tool_name = params.get("name").and_then(|n| n.as_str()).unwrap_or("");
    let arguments = params.get("arguments").unwrap_or(&Value::Null);

    let text = match tool_name {
        "list" => FILE_LISTING.to_string(),
        "echo" => arguments
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("")
            .to_string(),
        "get_today_sentence" => "Arroyave feels smart today".to_string(),
        _ => return make_error(id, -32602, &format!("Unknown tool: {}", tool_name)),
    };

    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": {
            "content": [
                {"type": "text", "text": text}
            ],
            "isError": false
        }
    })
}

fn make_error(id: &Value, code: i32, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {
            "code": code,
            "message": message
        }
    })
}
