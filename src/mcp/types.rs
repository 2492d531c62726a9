// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! MCP types for tool discovery and tool results.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Parameter schema of a tool as reported by its server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "schema", rename_all = "lowercase")]
pub enum ParameterSchema {
    /// An object-shaped JSON Schema.
    Present(serde_json::Map<String, serde_json::Value>),
    /// No schema, or one that is not a JSON object.
    Absent,
}

impl ParameterSchema {
    /// Classify a raw `inputSchema` value.
    pub fn from_value(value: Option<&serde_json::Value>) -> Self {
        match value {
            Some(serde_json::Value::Object(map)) => Self::Present(map.clone()),
            _ => Self::Absent,
        }
    }

    /// Check whether a schema was supplied.
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }
}

/// A tool discovered on an MCP server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Server this tool belongs to.
    pub server: String,

    /// Tool name.
    pub name: String,

    /// Tool description (empty when the server gave none).
    pub description: String,

    /// Input schema.
    pub parameter_schema: ParameterSchema,
}

impl ToolDescriptor {
    /// Create a tool descriptor.
    pub fn new(
        server: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        parameter_schema: ParameterSchema,
    ) -> Self {
        Self {
            server: server.into(),
            name: name.into(),
            description: description.into(),
            parameter_schema,
        }
    }

    /// Parse one entry of a `tools/list` result.
    ///
    /// Entries without a string `name` are skipped by returning `None`.
    pub fn from_listing(server: &str, tool: &serde_json::Value) -> Option<Self> {
        let name = tool.get("name")?.as_str()?;
        let description = tool
            .get("description")
            .and_then(|d| d.as_str())
            .unwrap_or_default();

        Some(Self::new(
            server,
            name,
            description,
            ParameterSchema::from_value(tool.get("inputSchema")),
        ))
    }
}

/// Tools discovered across every server: server name → tool name → tool.
///
/// Servers whose discovery failed are present with an empty tool set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolCatalog {
    servers: BTreeMap<String, BTreeMap<String, ToolDescriptor>>,
}

impl ToolCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tools for a server, replacing anything recorded before.
    pub fn insert_server(
        &mut self,
        server: impl Into<String>,
        tools: impl IntoIterator<Item = ToolDescriptor>,
    ) {
        let tools = tools
            .into_iter()
            .map(|tool| (tool.name.clone(), tool))
            .collect();
        self.servers.insert(server.into(), tools);
    }

    /// Tools of one server, if the server was discovered.
    pub fn server_tools(&self, server: &str) -> Option<&BTreeMap<String, ToolDescriptor>> {
        self.servers.get(server)
    }

    /// Look up a single tool.
    pub fn get(&self, server: &str, tool: &str) -> Option<&ToolDescriptor> {
        self.servers.get(server)?.get(tool)
    }

    /// Check whether a server exposes a tool.
    pub fn contains_tool(&self, server: &str, tool: &str) -> bool {
        self.get(server, tool).is_some()
    }

    /// Names of every discovered server, in order.
    pub fn server_names(&self) -> impl Iterator<Item = &str> {
        self.servers.keys().map(|s| s.as_str())
    }

    /// Every tool, ordered by server then tool name.
    pub fn tools(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.servers.values().flat_map(|tools| tools.values())
    }

    /// Total number of tools.
    pub fn tool_count(&self) -> usize {
        self.servers.values().map(|tools| tools.len()).sum()
    }

    /// Check if no tools were discovered.
    pub fn is_empty(&self) -> bool {
        self.tool_count() == 0
    }
}

/// Result of a `tools/call` exchange, returned to the caller unmodified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpToolResult {
    /// Result content (text, images, etc.).
    #[serde(default)]
    pub content: Vec<McpContent>,

    /// Whether the tool reported an error.
    #[serde(default)]
    pub is_error: bool,

    /// Optional structured payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_content: Option<serde_json::Value>,
}

impl McpToolResult {
    /// Create a successful text result.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![McpContent::Text { text: text.into() }],
            ..Default::default()
        }
    }

    /// Create an error result.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![McpContent::Text {
                text: message.into(),
            }],
            is_error: true,
            structured_content: None,
        }
    }

    /// Whether the call succeeded.
    pub fn success(&self) -> bool {
        !self.is_error
    }

    /// Get the text content as a single string.
    pub fn as_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|c| match c {
                McpContent::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for McpToolResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_error {
            write!(f, "[error] ")?;
        }

        if self.content.is_empty() {
            return match &self.structured_content {
                Some(value) => write!(f, "{}", value),
                None => write!(f, "(no content)"),
            };
        }

        for (i, item) in self.content.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", item)?;
        }
        Ok(())
    }
}

/// Content types that can be returned by MCP tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum McpContent {
    /// Plain text content.
    Text {
        /// The text content.
        text: String,
    },

    /// Image content.
    Image {
        /// Base64-encoded image data.
        #[serde(default)]
        data: String,
        /// MIME type of the image; empty when the server omitted it.
        #[serde(rename = "mimeType", default)]
        mime_type: String,
    },

    /// Embedded resource.
    Resource {
        resource: EmbeddedResource,
    },

    /// Any content type this client does not model.
    #[serde(other)]
    Unsupported,
}

impl fmt::Display for McpContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text { text } => write!(f, "{}", text),
            Self::Image { mime_type, .. } if mime_type.is_empty() => write!(f, "[image]"),
            Self::Image { mime_type, .. } => write!(f, "[image: {}]", mime_type),
            Self::Resource { resource } => match &resource.text {
                Some(text) => write!(f, "{}", text),
                None => write!(f, "[resource: {}]", resource.uri),
            },
            Self::Unsupported => write!(f, "[unsupported content]"),
        }
    }
}

/// Resource embedded in a tool result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbeddedResource {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Server information reported during initialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,

    /// Server version.
    pub version: String,

    /// Protocol version supported.
    #[serde(default)]
    pub protocol_version: Option<String>,
}

impl ServerInfo {
    /// Extract server info from an `initialize` result.
    pub fn from_initialize_result(result: &serde_json::Value) -> Self {
        let info = result.get("serverInfo");
        Self {
            name: info
                .and_then(|s| s.get("name"))
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string(),
            version: info
                .and_then(|s| s.get("version"))
                .and_then(|v| v.as_str())
                .unwrap_or("0.0.0")
                .to_string(),
            protocol_version: result
                .get("protocolVersion")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
        }
    }
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: "unknown".to_string(),
            version: "0.0.0".to_string(),
            protocol_version: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parameter_schema_classification() {
        let schema = json!({"type": "object", "properties": {}});
        assert!(ParameterSchema::from_value(Some(&schema)).is_present());

        assert_eq!(ParameterSchema::from_value(None), ParameterSchema::Absent);
        assert_eq!(
            ParameterSchema::from_value(Some(&json!("string schema"))),
            ParameterSchema::Absent
        );
        assert_eq!(
            ParameterSchema::from_value(Some(&json!([1, 2]))),
            ParameterSchema::Absent
        );
    }

    #[test]
    fn test_tool_descriptor_from_listing() {
        let listing = json!({
            "name": "read_file",
            "description": "Read a file",
            "inputSchema": {
                "type": "object",
                "properties": {"path": {"type": "string"}},
                "required": ["path"]
            }
        });

        let tool = ToolDescriptor::from_listing("files", &listing).unwrap();
        assert_eq!(tool.server, "files");
        assert_eq!(tool.name, "read_file");
        assert_eq!(tool.description, "Read a file");
        assert!(tool.parameter_schema.is_present());

        let bare = ToolDescriptor::from_listing("files", &json!({"name": "list"})).unwrap();
        assert_eq!(bare.description, "");
        assert_eq!(bare.parameter_schema, ParameterSchema::Absent);

        assert!(ToolDescriptor::from_listing("files", &json!({"description": "nameless"})).is_none());
    }

    #[test]
    fn test_catalog_replaces_server_entries() {
        let mut catalog = ToolCatalog::new();
        catalog.insert_server(
            "files",
            vec![
                ToolDescriptor::new("files", "list", "", ParameterSchema::Absent),
                ToolDescriptor::new("files", "read", "", ParameterSchema::Absent),
            ],
        );
        assert_eq!(catalog.tool_count(), 2);

        catalog.insert_server(
            "files",
            vec![ToolDescriptor::new("files", "stat", "", ParameterSchema::Absent)],
        );
        assert_eq!(catalog.tool_count(), 1);
        assert!(catalog.contains_tool("files", "stat"));
        assert!(!catalog.contains_tool("files", "list"));
    }

    #[test]
    fn test_catalog_empty_server() {
        let mut catalog = ToolCatalog::new();
        catalog.insert_server("broken", Vec::new());

        assert!(catalog.is_empty());
        assert_eq!(catalog.server_names().collect::<Vec<_>>(), vec!["broken"]);
        assert!(catalog.server_tools("broken").unwrap().is_empty());
        assert!(catalog.server_tools("missing").is_none());
    }

    #[test]
    fn test_tool_result_text() {
        let result = McpToolResult::text("Hello, world!");
        assert!(result.success());
        assert_eq!(result.as_text(), "Hello, world!");
        assert_eq!(result.to_string(), "Hello, world!");
    }

    #[test]
    fn test_tool_result_error() {
        let result = McpToolResult::error("Something went wrong");
        assert!(!result.success());
        assert_eq!(result.to_string(), "[error] Something went wrong");
    }

    #[test]
    fn test_tool_result_deserialize() {
        let raw = json!({
            "content": [
                {"type": "text", "text": "a.txt"},
                {"type": "image", "data": "aGk=", "mimeType": "image/png"},
                {"type": "resource", "resource": {"uri": "file:///b.txt", "text": "b contents"}},
                {"type": "audio", "data": "xx", "mimeType": "audio/wav"}
            ],
            "isError": false
        });

        let result: McpToolResult = serde_json::from_value(raw).unwrap();
        assert_eq!(result.content.len(), 4);
        assert_eq!(result.content[3], McpContent::Unsupported);
        assert_eq!(
            result.to_string(),
            "a.txt\n[image: image/png]\nb contents\n[unsupported content]"
        );
    }

    #[test]
    fn test_image_without_mime_type() {
        let raw = json!({
            "content": [
                {"type": "text", "text": "chart below"},
                {"type": "image", "data": "aGk="}
            ]
        });

        let result: McpToolResult = serde_json::from_value(raw).unwrap();
        assert_eq!(result.to_string(), "chart below\n[image]");
    }

    #[test]
    fn test_tool_result_structured_only() {
        let raw = json!({"content": [], "structuredContent": {"temp": 21}});
        let result: McpToolResult = serde_json::from_value(raw).unwrap();
        assert_eq!(result.to_string(), r#"{"temp":21}"#);
    }

    #[test]
    fn test_server_info_from_initialize() {
        let result = json!({
            "protocolVersion": "2024-11-05",
            "serverInfo": {"name": "files", "version": "1.2.0"}
        });
        let info = ServerInfo::from_initialize_result(&result);
        assert_eq!(info.name, "files");
        assert_eq!(info.version, "1.2.0");
        assert_eq!(info.protocol_version.as_deref(), Some("2024-11-05"));

        assert_eq!(ServerInfo::from_initialize_result(&json!({})), ServerInfo::default());
    }
}
