// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Agent module - one conversation turn at a time.
//!
//! Each turn talks to the model at most twice. The first request offers
//! every discovered function and lets the model pick one (or none). If a
//! tool was picked it is invoked, and a second request turns the raw tool
//! output into a reply. Otherwise the second request answers the user
//! directly. Tool output never reaches the selection request.
//!
//! No history is kept between turns.
//!
//! # Example
//!
//! ```rust,ignore
//! use mcp_router::agent::{Agent, AgentConfig};
//! use mcp_router::mcp::{ConnectionManager, McpConfig};
//!
//! let mut manager = ConnectionManager::new(McpConfig::load_from_file("mcp_config.json")?);
//! manager.initialize().await;
//!
//! let agent = Agent::new(provider, AgentConfig::default());
//! let outcome = agent.handle_turn(&manager, "what files do I have?").await?;
//! println!("{}", outcome.reply);
//! ```

mod types;

pub use types::{
    synthesis_prompt, AgentConfig, SelectedTool, TurnOutcome, DEFAULT_SELECTION_INSTRUCTION,
};

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::error::AgentError;
use crate::mcp::ToolBackend;
use crate::types::{split_qualified_name, BoxedProvider, FunctionCall, Message};

/// The Agent routes user requests to MCP tools through the model.
pub struct Agent {
    /// Model provider.
    provider: BoxedProvider,
    /// Configuration.
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent.
    pub fn new(provider: BoxedProvider, config: AgentConfig) -> Self {
        Self { provider, config }
    }

    /// Get the provider.
    pub fn provider(&self) -> &BoxedProvider {
        &self.provider
    }

    /// Get the configuration.
    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Handle one user utterance.
    ///
    /// Model failures and tool invocation failures end the turn with an
    /// error; no fallback reply is produced for them. Unparseable arguments
    /// from the model are replaced by `{}`.
    pub async fn handle_turn(
        &self,
        tools: &dyn ToolBackend,
        input: &str,
    ) -> Result<TurnOutcome, AgentError> {
        let start = Instant::now();
        let user_msg = Message::user(input);

        let selection = self
            .provider
            .select_function(
                &[
                    Message::system(self.config.selection_instruction.as_str()),
                    user_msg.clone(),
                ],
                tools.functions(),
            )
            .await?;

        let selected = selection.function_call.as_ref().and_then(resolve_call);

        let Some(selected) = selected else {
            info!("No specific tool selected, using general model response");
            let response = self.provider.complete(&[user_msg]).await?;
            return Ok(TurnOutcome {
                reply: response.content,
                tool_call: None,
                duration_ms: start.elapsed().as_millis() as u64,
            });
        };

        info!(server = %selected.server, tool = %selected.tool, "Selected MCP tool");
        debug!(arguments = %selected.arguments, "Tool arguments");

        let result = tools
            .call_tool(&selected.server, &selected.tool, selected.arguments.clone())
            .await?;

        if result.is_error {
            warn!(tool = %selected.tool, "Tool reported an error result");
        }

        let prompt = synthesis_prompt(input, &selected.tool, &result);
        let response = self.provider.complete(&[Message::system(prompt)]).await?;

        Ok(TurnOutcome {
            reply: response.content,
            tool_call: Some(selected),
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }
}

/// Turn a function-call proposal into a tool target.
///
/// Returns `None` when the name does not split into a server and a tool.
fn resolve_call(call: &FunctionCall) -> Option<SelectedTool> {
    let Some((server, tool)) = split_qualified_name(&call.name) else {
        debug!(name = %call.name, "Function name does not name a server tool");
        return None;
    };

    Some(SelectedTool {
        server: server.to_string(),
        tool: tool.to_string(),
        arguments: parse_arguments(&call.arguments),
    })
}

/// Parse the model's argument payload, substituting `{}` when it is not a
/// JSON object.
pub fn parse_arguments(raw: &str) -> serde_json::Value {
    let empty = || serde_json::Value::Object(serde_json::Map::new());

    if raw.trim().is_empty() {
        return empty();
    }

    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value @ serde_json::Value::Object(_)) => value,
        Ok(other) => {
            warn!(arguments = %other, "Tool arguments are not an object, using empty arguments");
            empty()
        }
        Err(e) => {
            warn!(error = %e, "Failed to parse tool arguments, using empty arguments");
            empty()
        }
    }
}
