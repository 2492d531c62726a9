// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! MCP client implementation.
//!
//! `McpSession` is a short-lived stdio connection to one server: spawn,
//! handshake, one or more requests, close. Sessions are never pooled; every
//! discovery pass and every tool call opens its own.
//!
//! `ConnectionManager` owns the registry, the tool catalog built by
//! discovery, and the function list derived from it.

use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, error, info, instrument, trace};

use super::config::{McpConfig, ServerConfig};
use super::error::McpError;
use super::tools::{build_functions, ToolBackend};
use super::types::{McpToolResult, ServerInfo, ToolCatalog, ToolDescriptor};
use crate::types::FunctionDescriptor;

/// MCP protocol revision sent during the handshake.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Client name reported to servers.
const CLIENT_NAME: &str = "mcp-router";

/// Grace period for a server to exit after its stdin is closed.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// A transient stdio connection to a single MCP server.
pub struct McpSession {
    /// Server name.
    server: String,

    /// Child process.
    child: Child,

    /// Request pipe. `None` once closed.
    stdin: Option<ChildStdin>,

    /// Response pipe, buffered once for the whole session.
    stdout: BufReader<ChildStdout>,

    /// Server info from the handshake.
    server_info: ServerInfo,

    /// Request ID counter.
    request_id: u64,
}

impl McpSession {
    /// Spawn the server process and complete the MCP handshake.
    ///
    /// The process is reaped if the handshake fails.
    pub async fn connect(server: &str, config: &ServerConfig) -> Result<Self, McpError> {
        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args)
            .envs(&config.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        if let Some(cwd) = &config.cwd {
            cmd.current_dir(cwd);
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| McpError::connection_failed(server, e.to_string()))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpError::connection_failed(server, "Failed to get stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| McpError::connection_failed(server, "Failed to get stdout"))?;

        let mut session = Self {
            server: server.to_string(),
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout),
            server_info: ServerInfo::default(),
            request_id: 0,
        };

        match session.initialize().await {
            Ok(info) => {
                debug!(
                    server = %server,
                    remote = %info.name,
                    version = %info.version,
                    "MCP handshake complete"
                );
                session.server_info = info;
                Ok(session)
            }
            Err(e) => {
                session.close().await;
                Err(e)
            }
        }
    }

    /// Get the server name.
    pub fn server(&self) -> &str {
        &self.server
    }

    /// Get server info reported during the handshake.
    pub fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    fn next_request_id(&mut self) -> u64 {
        self.request_id += 1;
        self.request_id
    }

    async fn initialize(&mut self) -> Result<ServerInfo, McpError> {
        let params = serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": CLIENT_NAME,
                "version": crate::VERSION
            }
        });

        let result = match self.request("initialize", Some(params)).await {
            Ok(result) => result,
            Err(McpError::Protocol { code, message }) => {
                return Err(McpError::init_failed(
                    &self.server,
                    format!("code={}, message={}", code, message),
                ));
            }
            Err(e) => return Err(e),
        };

        self.notify("notifications/initialized").await?;

        Ok(ServerInfo::from_initialize_result(&result))
    }

    /// Fetch every tool the server exposes, following pagination cursors.
    pub async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>, McpError> {
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let params = cursor
                .as_ref()
                .map(|c| serde_json::json!({ "cursor": c }));
            let result = self.request("tools/list", params).await?;

            let page = result
                .get("tools")
                .and_then(|t| t.as_array())
                .ok_or_else(|| {
                    McpError::InvalidResponse("Missing tools in tools/list response".to_string())
                })?;

            tools.extend(
                page.iter()
                    .filter_map(|t| ToolDescriptor::from_listing(&self.server, t)),
            );

            cursor = result
                .get("nextCursor")
                .and_then(|c| c.as_str())
                .map(|c| c.to_string());
            if cursor.is_none() {
                break;
            }
        }

        Ok(tools)
    }

    /// Call a tool on this server.
    ///
    /// A JSON-RPC error reply becomes an error-flagged result rather than an
    /// `Err`; transport failures are still errors.
    pub async fn call_tool(
        &mut self,
        tool: &str,
        arguments: serde_json::Value,
    ) -> Result<McpToolResult, McpError> {
        let params = serde_json::json!({
            "name": tool,
            "arguments": arguments
        });

        let result = match self.request("tools/call", Some(params)).await {
            Ok(result) => result,
            Err(McpError::Protocol { message, .. }) => return Ok(McpToolResult::error(message)),
            Err(McpError::ConnectionFailed { message, .. }) => {
                return Err(McpError::tool_failed(tool, message));
            }
            Err(e) => return Err(e),
        };

        serde_json::from_value(result)
            .map_err(|e| McpError::InvalidResponse(format!("tools/call result: {}", e)))
    }

    /// Send a request and wait for the response with the matching id.
    ///
    /// Returns the `result` member, or `McpError::Protocol` for an `error`
    /// member. Notifications, server-initiated requests, and lines that are
    /// not JSON are skipped.
    async fn request(
        &mut self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, McpError> {
        let id = self.next_request_id();
        let mut request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method
        });
        if let Some(params) = params {
            request["params"] = params;
        }

        let start = Instant::now();
        self.send(&request).await?;

        let mut line = String::new();
        loop {
            line.clear();
            let read = self
                .stdout
                .read_line(&mut line)
                .await
                .map_err(|e| McpError::connection_failed(&self.server, e.to_string()))?;
            if read == 0 {
                return Err(McpError::connection_failed(
                    &self.server,
                    format!("server closed the connection during {}", method),
                ));
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let message: serde_json::Value = match serde_json::from_str(trimmed) {
                Ok(value) => value,
                Err(_) => {
                    trace!(server = %self.server, line = %trimmed, "Skipping non-JSON output");
                    continue;
                }
            };

            if message.get("id").and_then(|v| v.as_u64()) != Some(id)
                || message.get("method").is_some()
            {
                trace!(server = %self.server, "Skipping unrelated message");
                continue;
            }

            debug!(
                server = %self.server,
                method = %method,
                bytes = read,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "MCP response"
            );

            if let Some(error) = message.get("error") {
                let code = error.get("code").and_then(|v| v.as_i64()).unwrap_or(-1) as i32;
                let message = error
                    .get("message")
                    .and_then(|v| v.as_str())
                    .unwrap_or("Unknown error");
                return Err(McpError::protocol(code, message));
            }

            return message.get("result").cloned().ok_or_else(|| {
                McpError::InvalidResponse(format!("Missing result in {} response", method))
            });
        }
    }

    async fn notify(&mut self, method: &str) -> Result<(), McpError> {
        let notification = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method
        });
        self.send(&notification).await
    }

    async fn send(&mut self, message: &serde_json::Value) -> Result<(), McpError> {
        let mut line = serde_json::to_string(message)?;
        line.push('\n');

        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| McpError::connection_failed(&self.server, "session is closed"))?;
        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| McpError::connection_failed(&self.server, e.to_string()))?;
        stdin
            .flush()
            .await
            .map_err(|e| McpError::connection_failed(&self.server, e.to_string()))
    }

    /// Close the session: end stdin, give the server a moment to exit, then
    /// kill it if it is still running.
    pub async fn close(mut self) {
        drop(self.stdin.take());

        match tokio::time::timeout(SHUTDOWN_GRACE, self.child.wait()).await {
            Ok(Ok(status)) => {
                trace!(server = %self.server, %status, "MCP server exited");
            }
            Ok(Err(e)) => {
                debug!(server = %self.server, error = %e, "Failed to wait for MCP server");
            }
            Err(_) => {
                if let Err(e) = self.child.kill().await {
                    debug!(server = %self.server, error = %e, "Failed to kill MCP server");
                }
            }
        }
    }
}

/// Discover the tools of one server over a fresh session.
///
/// Spawn, handshake, and listing share the server's startup timeout.
pub async fn discover_server(
    server: &str,
    config: &ServerConfig,
) -> Result<Vec<ToolDescriptor>, McpError> {
    let timeout_secs = config.startup_timeout_sec;

    tokio::time::timeout(Duration::from_secs(timeout_secs), async {
        let mut session = McpSession::connect(server, config).await?;
        let tools = session.list_tools().await;
        session.close().await;
        tools
    })
    .await
    .map_err(|_| McpError::ConnectionTimeout {
        server: server.to_string(),
        timeout_secs,
    })?
}

/// Discover tools on every enabled server.
///
/// A server that fails is logged and recorded with no tools; the others are
/// still discovered.
#[instrument(skip_all, fields(servers = config.enabled_servers().count()))]
pub async fn discover_tools(config: &McpConfig) -> ToolCatalog {
    let mut catalog = ToolCatalog::new();

    for (name, server_config) in config.enabled_servers() {
        match discover_server(name, server_config).await {
            Ok(tools) => {
                info!(server = %name, tools = tools.len(), "Discovered MCP tools");
                for tool in &tools {
                    debug!(server = %name, tool = %tool.name, "Tool available");
                }
                catalog.insert_server(name.as_str(), tools);
            }
            Err(e) => {
                error!(server = %name, error = %e, "Failed to initialize MCP server");
                catalog.insert_server(name.as_str(), Vec::new());
            }
        }
    }

    catalog
}

/// Manager for the configured MCP servers.
pub struct ConnectionManager {
    config: McpConfig,
    catalog: ToolCatalog,
    functions: Vec<FunctionDescriptor>,
}

impl ConnectionManager {
    /// Create a manager for a registry. No servers are contacted until
    /// [`ConnectionManager::initialize`].
    pub fn new(config: McpConfig) -> Self {
        Self {
            config,
            catalog: ToolCatalog::new(),
            functions: Vec::new(),
        }
    }

    /// Run discovery and rebuild the function list.
    ///
    /// The previous catalog is replaced, so repeated calls do not accumulate
    /// entries.
    pub async fn initialize(&mut self) -> &ToolCatalog {
        self.catalog = discover_tools(&self.config).await;
        self.functions = build_functions(&self.catalog);

        info!(
            servers = self.catalog.server_names().count(),
            functions = self.functions.len(),
            "MCP tool discovery finished"
        );

        &self.catalog
    }

    /// Get the server registry.
    pub fn config(&self) -> &McpConfig {
        &self.config
    }

    /// Get the tool catalog from the last discovery pass.
    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// Call a tool over a fresh session.
    ///
    /// Fails with `ServerNotConfigured` before spawning anything when the
    /// server is unknown, and with `ToolNotFound` after the handshake when
    /// the tool was not discovered.
    #[instrument(skip(self, arguments))]
    pub async fn call_tool(
        &self,
        server: &str,
        tool: &str,
        arguments: serde_json::Value,
    ) -> Result<McpToolResult, McpError> {
        let config = self
            .config
            .get(server)
            .ok_or_else(|| McpError::ServerNotConfigured(server.to_string()))?;

        let startup_secs = config.startup_timeout_sec;
        let mut session = tokio::time::timeout(
            Duration::from_secs(startup_secs),
            McpSession::connect(server, config),
        )
        .await
        .map_err(|_| McpError::ConnectionTimeout {
            server: server.to_string(),
            timeout_secs: startup_secs,
        })??;

        if !self.catalog.contains_tool(server, tool) {
            session.close().await;
            return Err(McpError::tool_not_found(server, tool));
        }

        let start = Instant::now();
        let tool_secs = config.tool_timeout_sec;
        let result = tokio::time::timeout(
            Duration::from_secs(tool_secs),
            session.call_tool(tool, arguments),
        )
        .await;
        session.close().await;

        let result = result.map_err(|_| McpError::ToolCallTimeout {
            tool: tool.to_string(),
            timeout_secs: tool_secs,
        })??;

        debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            is_error = result.is_error,
            "Tool call finished"
        );

        Ok(result)
    }
}

#[async_trait]
impl ToolBackend for ConnectionManager {
    fn functions(&self) -> &[FunctionDescriptor] {
        &self.functions
    }

    async fn call_tool(
        &self,
        server: &str,
        tool: &str,
        arguments: serde_json::Value,
    ) -> Result<McpToolResult, McpError> {
        ConnectionManager::call_tool(self, server, tool, arguments).await
    }
}
