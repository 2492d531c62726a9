// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! MCP server registry.
//!
//! Server launch parameters are read once at startup from a JSON (or YAML)
//! file and stay read-only for the life of the process.
//!
//! # Example Configuration
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "files": {
//!       "command": "npx",
//!       "args": ["-y", "@modelcontextprotocol/server-filesystem", "/tmp"],
//!       "env": { "NODE_ENV": "production" }
//!     },
//!     "weather": {
//!       "command": "uv",
//!       "args": ["run", "weather.py"],
//!       "tool_timeout_sec": 60
//!     }
//!   }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;
use crate::types::QUALIFIED_NAME_SEPARATOR;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "mcp_config.json";

/// Registry of every configured MCP server, keyed by unique server name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct McpConfig {
    /// Map of server name to launch parameters.
    #[serde(rename = "mcpServers", default)]
    pub servers: BTreeMap<String, ServerConfig>,
}

impl McpConfig {
    /// Create an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file.
    ///
    /// `.yaml`/`.yml` files are parsed as YAML, everything else as JSON.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::NotFound(path.display().to_string()),
            _ => ConfigError::IoError(format!("{}: {}", path.display(), e)),
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml(&content),
            _ => Self::from_json(&content),
        }
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.warn_ambiguous_names();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.warn_ambiguous_names();
        Ok(config)
    }

    /// Look up an enabled server by name.
    pub fn get(&self, name: &str) -> Option<&ServerConfig> {
        self.servers.get(name).filter(|c| c.enabled)
    }

    /// Get enabled servers, in name order.
    pub fn enabled_servers(&self) -> impl Iterator<Item = (&String, &ServerConfig)> {
        self.servers.iter().filter(|(_, c)| c.enabled)
    }

    /// Add a server configuration.
    pub fn add_server(&mut self, name: impl Into<String>, config: ServerConfig) {
        self.servers.insert(name.into(), config);
    }

    /// Server names that contain the qualified-name separator.
    ///
    /// Tools on these servers are discovered but can never be routed to,
    /// since the qualified name splits on the first separator.
    pub fn ambiguous_server_names(&self) -> Vec<&str> {
        self.servers
            .keys()
            .filter(|name| name.contains(QUALIFIED_NAME_SEPARATOR))
            .map(|name| name.as_str())
            .collect()
    }

    fn warn_ambiguous_names(&self) {
        for name in self.ambiguous_server_names() {
            warn!(
                server = %name,
                separator = %QUALIFIED_NAME_SEPARATOR,
                "Server name contains the function-name separator; its tools cannot be selected"
            );
        }
    }
}

/// Launch parameters for a single stdio MCP server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Executable to spawn.
    pub command: String,

    /// Arguments passed to the executable.
    #[serde(default)]
    pub args: Vec<String>,

    /// Extra environment variables, layered over the inherited environment.
    #[serde(default)]
    pub env: HashMap<String, String>,

    /// Working directory for the process.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,

    /// Whether this server is enabled.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Bound on spawn + handshake + tools/list, in seconds.
    #[serde(default = "default_startup_timeout")]
    pub startup_timeout_sec: u64,

    /// Bound on a single tools/call exchange, in seconds.
    #[serde(default = "default_tool_timeout")]
    pub tool_timeout_sec: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_startup_timeout() -> u64 {
    30
}

fn default_tool_timeout() -> u64 {
    300
}

impl ServerConfig {
    /// Create a configuration that spawns `command` with no arguments.
    pub fn stdio(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            env: HashMap::new(),
            cwd: None,
            enabled: true,
            startup_timeout_sec: default_startup_timeout(),
            tool_timeout_sec: default_tool_timeout(),
        }
    }

    /// Add command arguments.
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(|s| s.into()).collect();
        self
    }

    /// Set environment variables.
    pub fn with_env(
        mut self,
        env: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        self.env = env
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Set working directory.
    pub fn with_cwd(mut self, cwd: impl Into<String>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Set both timeouts.
    pub fn with_timeouts(mut self, startup_secs: u64, tool_secs: u64) -> Self {
        self.startup_timeout_sec = startup_secs;
        self.tool_timeout_sec = tool_secs;
        self
    }
}
