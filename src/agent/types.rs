// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Agent types and configuration.

use crate::mcp::McpToolResult;

/// Instruction sent ahead of the user message when asking the model to pick
/// a function.
pub const DEFAULT_SELECTION_INSTRUCTION: &str = "Analyze the user's request and *all* available \
tools (functions). Select the *most relevant* tool based on the specific intent. If multiple \
tools seem applicable, choose the one that best fits the context. Ensure your choice is the \
most appropriate.";

/// Configuration for the agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// System instruction for the selection request.
    pub selection_instruction: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            selection_instruction: DEFAULT_SELECTION_INSTRUCTION.to_string(),
        }
    }
}

impl AgentConfig {
    /// Replace the selection instruction.
    pub fn with_selection_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.selection_instruction = instruction.into();
        self
    }
}

/// The tool the model chose for a turn, with its parsed arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedTool {
    pub server: String,
    pub tool: String,
    /// Always a JSON object.
    pub arguments: serde_json::Value,
}

/// Result of one conversation turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Text shown to the user.
    pub reply: String,
    /// The tool invoked during the turn, if any.
    pub tool_call: Option<SelectedTool>,
    /// Duration of the turn in milliseconds.
    pub duration_ms: u64,
}

impl TurnOutcome {
    /// Check if a tool was invoked during the turn.
    pub fn used_tool(&self) -> bool {
        self.tool_call.is_some()
    }
}

/// Build the prompt that asks the model to phrase a tool result for the user.
pub fn synthesis_prompt(user_input: &str, tool: &str, result: &McpToolResult) -> String {
    format!(
        "User asked: '{}'. Tool '{}' returned: {}. Respond with a friendly answer.",
        user_input, tool, result
    )
}
