// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Model-facing function descriptors for discovered MCP tools.
//!
//! Every tool in the catalog becomes one [`FunctionDescriptor`] named
//! `server_tool`. The [`ToolBackend`] trait is the seam the agent uses to
//! see those functions and to call the tools behind them.

use async_trait::async_trait;

use super::error::McpError;
use super::types::{McpToolResult, ParameterSchema, ToolCatalog, ToolDescriptor};
use crate::types::{qualified_name, FunctionDescriptor};

/// Description of the fallback `query` parameter.
const DEFAULT_QUERY_DESCRIPTION: &str = "Input for tool";

/// Schema used for tools that report no object-shaped input schema:
/// one required string field named `query`.
pub fn default_parameter_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "query": {
                "type": "string",
                "description": DEFAULT_QUERY_DESCRIPTION
            }
        },
        "required": ["query"]
    })
}

/// Convert one discovered tool into its function descriptor.
pub fn function_for(tool: &ToolDescriptor) -> FunctionDescriptor {
    let parameters = match &tool.parameter_schema {
        ParameterSchema::Present(schema) => serde_json::Value::Object(schema.clone()),
        ParameterSchema::Absent => default_parameter_schema(),
    };

    FunctionDescriptor::new(
        qualified_name(&tool.server, &tool.name),
        tool.description.clone(),
        parameters,
    )
}

/// Flatten the catalog into the function list offered to the model,
/// ordered by server then tool.
pub fn build_functions(catalog: &ToolCatalog) -> Vec<FunctionDescriptor> {
    catalog.tools().map(function_for).collect()
}

/// Source of callable tools for a conversation turn.
#[async_trait]
pub trait ToolBackend: Send + Sync {
    /// Functions offered to the model for selection.
    fn functions(&self) -> &[FunctionDescriptor];

    /// Invoke `tool` on `server` with structured arguments.
    async fn call_tool(
        &self,
        server: &str,
        tool: &str,
        arguments: serde_json::Value,
    ) -> Result<McpToolResult, McpError>;
}
