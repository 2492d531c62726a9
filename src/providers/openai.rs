// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! OpenAI-compatible provider implementation.
//!
//! Talks to the Chat Completions endpoint of OpenAI or any compatible
//! server. Function selection uses the `tools` API with automatic tool
//! choice; replies to older servers that still answer with the legacy
//! `function_call` field are understood too.
//!
//! # API Reference
//!
//! See [OpenAI Chat Completions API](https://platform.openai.com/docs/api-reference/chat)

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ProviderError;
use crate::types::{
    FunctionCall, FunctionDescriptor, Message, Provider, ProviderConfig, ProviderResponse,
    TokenUsage,
};

/// Default OpenAI API base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// OpenAI-compatible provider.
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
    provider_name: String,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        config: ProviderConfig,
    ) -> Result<Self, ProviderError> {
        let timeout = config
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        let provider_name = Self::detect_provider_name(&base_url);

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url,
            timeout,
            provider_name,
        })
    }

    /// Create a provider for OpenAI.
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, ProviderError> {
        Self::new(api_key, model, OPENAI_BASE_URL, ProviderConfig::default())
    }

    /// Create a provider from a [`ProviderConfig`].
    pub fn from_config(config: ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| ProviderError::NotConfigured("missing API key".to_string()))?;
        let model = config
            .model
            .clone()
            .ok_or_else(|| ProviderError::NotConfigured("missing model".to_string()))?;
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| OPENAI_BASE_URL.to_string());

        Self::new(api_key, model, base_url, config)
    }

    /// Detect provider name from base URL.
    fn detect_provider_name(base_url: &str) -> String {
        if base_url.contains("openai.com") {
            "OpenAI".to_string()
        } else if base_url.contains("localhost:11434") || base_url.contains("ollama") {
            "Ollama".to_string()
        } else if base_url.contains("azure") {
            "Azure OpenAI".to_string()
        } else {
            "OpenAI-Compatible".to_string()
        }
    }

    /// Build the request body for the Chat Completions API.
    fn build_request(
        &self,
        messages: &[Message],
        functions: Option<&[FunctionDescriptor]>,
    ) -> ChatRequest {
        let tools: Option<Vec<ChatTool>> = functions
            .filter(|f| !f.is_empty())
            .map(|f| f.iter().map(ChatTool::from).collect());
        let tool_choice = tools.as_ref().map(|_| "auto".to_string());

        ChatRequest {
            model: self.model.clone(),
            messages: messages.iter().map(ChatMessage::from).collect(),
            tools,
            tool_choice,
        }
    }

    async fn send(&self, request: &ChatRequest) -> Result<ProviderResponse, ProviderError> {
        let start = Instant::now();
        debug!(
            model = %self.model,
            messages = request.messages.len(),
            tools = request.tools.as_ref().map_or(0, |t| t.len()),
            "Sending chat request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::handle_error_response(status.as_u16(), &error_text));
        }

        let api_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        let provider_response = ProviderResponse::from(api_response);

        debug!(
            model = %self.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            input_tokens = provider_response.usage.as_ref().map_or(0, |u| u.input_tokens),
            output_tokens = provider_response.usage.as_ref().map_or(0, |u| u.output_tokens),
            function_call = provider_response.has_function_call(),
            "Chat response received"
        );

        Ok(provider_response)
    }

    fn map_transport_error(&self, error: reqwest::Error) -> ProviderError {
        if error.is_timeout() {
            ProviderError::Timeout(self.timeout.as_millis() as u64)
        } else {
            ProviderError::NetworkError(error.to_string())
        }
    }

    /// Handle an error response from the API.
    fn handle_error_response(status_code: u16, body: &str) -> ProviderError {
        if let Ok(error) = serde_json::from_str::<ApiError>(body) {
            let message = error.error.message;
            let kind = error.error.code.as_deref().or(error.error.error_type.as_deref());
            match kind {
                Some("authentication_error") | Some("invalid_api_key") => {
                    ProviderError::AuthError(message)
                }
                Some("rate_limit_error") | Some("rate_limit_exceeded") => {
                    ProviderError::RateLimited(message)
                }
                Some("model_not_found") => ProviderError::ModelNotFound(message),
                _ => match status_code {
                    401 => ProviderError::AuthError(message),
                    429 => ProviderError::RateLimited(message),
                    _ => ProviderError::api(message, status_code),
                },
            }
        } else {
            ProviderError::api(body.to_string(), status_code)
        }
    }
}

#[async_trait]
impl Provider for OpenAIProvider {
    async fn select_function(
        &self,
        messages: &[Message],
        functions: &[FunctionDescriptor],
    ) -> Result<ProviderResponse, ProviderError> {
        let request = self.build_request(messages, Some(functions));
        self.send(&request).await
    }

    async fn complete(&self, messages: &[Message]) -> Result<ProviderResponse, ProviderError> {
        let request = self.build_request(messages, None);
        self.send(&request).await
    }

    fn name(&self) -> &str {
        &self.provider_name
    }

    fn model(&self) -> &str {
        &self.model
    }
}

// ============================================================================
// API Types
// ============================================================================

/// Request body for Chat Completions API.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ChatTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
}

/// Chat message format.
#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Message as returned in a response.
#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ChatToolCall>>,
    /// Legacy single-function field.
    #[serde(default)]
    function_call: Option<ChatFunction>,
}

/// Tool call in a message.
#[derive(Debug, Deserialize)]
struct ChatToolCall {
    #[serde(default)]
    function: Option<ChatFunction>,
}

/// Function details in a tool call.
#[derive(Debug, Deserialize)]
struct ChatFunction {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

/// Tool definition in Chat API format.
#[derive(Debug, Serialize)]
struct ChatTool {
    #[serde(rename = "type")]
    tool_type: String,
    function: ChatToolFunction,
}

/// Function definition within a tool.
#[derive(Debug, Serialize)]
struct ChatToolFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

/// Chat completion response.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

/// A choice in the response.
#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

/// Token usage.
#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// API error response.
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

// ============================================================================
// Type Conversions
// ============================================================================

impl From<&Message> for ChatMessage {
    fn from(msg: &Message) -> Self {
        Self {
            role: msg.role.as_str().to_string(),
            content: msg.content.clone(),
        }
    }
}

impl From<&FunctionDescriptor> for ChatTool {
    fn from(function: &FunctionDescriptor) -> Self {
        Self {
            tool_type: "function".to_string(),
            function: ChatToolFunction {
                name: function.name.clone(),
                description: function.description.clone(),
                parameters: function.parameters.clone(),
            },
        }
    }
}

impl ChatFunction {
    /// A proposal without a name is treated as no proposal.
    fn into_call(self) -> Option<FunctionCall> {
        let name = self.name.filter(|n| !n.is_empty())?;
        Some(FunctionCall::new(name, self.arguments.unwrap_or_default()))
    }
}

impl From<ChatResponse> for ProviderResponse {
    fn from(response: ChatResponse) -> Self {
        let usage = response.usage.map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        });

        let Some(choice) = response.choices.into_iter().next() else {
            return Self {
                usage,
                ..Default::default()
            };
        };

        let message = choice.message;
        let function_call = message
            .tool_calls
            .and_then(|calls| calls.into_iter().next())
            .and_then(|call| call.function)
            .or(message.function_call)
            .and_then(ChatFunction::into_call);

        Self {
            content: message.content.unwrap_or_default(),
            function_call,
            usage,
        }
    }
}
