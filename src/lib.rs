// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! mcp-router - route chat requests to tools on MCP servers.
//!
//! Tools are discovered at startup on every configured Model Context
//! Protocol server. For each user message a language model picks the single
//! most relevant tool (or none); the tool is invoked over a fresh stdio
//! session and the model phrases the result as a reply.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - [`types`] - Core type definitions (Message, FunctionDescriptor, Provider, etc.)
//! - [`error`] - Error types and result aliases
//! - [`mcp`] - Server registry, tool discovery, function schemas, tool invocation
//! - [`providers`] - Model service implementations (OpenAI-compatible)
//! - [`agent`] - One conversation turn: select, invoke, synthesize
//! - [`repl`] - Interactive session loop
//! - [`telemetry`] - Structured logging setup
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_router::agent::{Agent, AgentConfig};
//! use mcp_router::mcp::{ConnectionManager, McpConfig};
//! use mcp_router::providers::{api_key_from_env, create_provider};
//! use mcp_router::types::ProviderConfig;
//!
//! let mut manager = ConnectionManager::new(McpConfig::load_from_file("mcp_config.json")?);
//! manager.initialize().await;
//!
//! let provider = create_provider(ProviderConfig::new(api_key_from_env()?, "o4-mini"))?;
//! let agent = Agent::new(provider, AgentConfig::default());
//!
//! let outcome = agent.handle_turn(&manager, "what files do I have?").await?;
//! println!("{}", outcome.reply);
//! ```

pub mod agent;
pub mod error;
pub mod mcp;
pub mod providers;
pub mod repl;
pub mod telemetry;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{AgentError, ConfigError, ProviderError};
pub use providers::{create_provider, OpenAIProvider};
pub use types::{
    BoxedProvider, FunctionCall, FunctionDescriptor, Message, Provider, ProviderConfig,
    ProviderResponse, Role, TokenUsage,
};

/// Crate version, reported to MCP servers during the handshake.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_public_exports() {
        let _msg = Message::user("test");
        let _response = ProviderResponse::default();
        let _ = std::any::type_name::<mcp::ConnectionManager>();
    }
}
