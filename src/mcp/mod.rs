// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Model Context Protocol (MCP) client support.
//!
//! Tools live on external MCP servers launched as child processes and spoken
//! to over newline-delimited JSON-RPC on stdio.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  ConnectionManager                    │
//! │   McpConfig ──discover──▶ ToolCatalog ──▶ functions   │
//! └──────────┬───────────────────────────────┬───────────┘
//!            │ initialize()                  │ call_tool()
//!     ┌──────▼──────┐                 ┌──────▼──────┐
//!     │ McpSession  │  one per server │ McpSession  │  one per call
//!     │ (transient) │                 │ (transient) │
//!     └─────────────┘                 └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_router::mcp::{ConnectionManager, McpConfig};
//!
//! let config = McpConfig::load_from_file("mcp_config.json")?;
//! let mut manager = ConnectionManager::new(config);
//!
//! // Discover tools on every server
//! manager.initialize().await;
//!
//! // Call a tool
//! let result = manager.call_tool("files", "list", serde_json::json!({})).await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod tools;
pub mod types;

pub use client::{discover_tools, ConnectionManager, McpSession};
pub use config::{McpConfig, ServerConfig};
pub use error::McpError;
pub use tools::{build_functions, default_parameter_schema, ToolBackend};
pub use types::*;
