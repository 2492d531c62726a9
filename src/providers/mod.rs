// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Model service providers.
//!
//! - [`openai::OpenAIProvider`] - OpenAI and OpenAI-compatible APIs
//!
//! # Quick Start
//!
//! ```bash
//! export OPENAI_API_KEY=your-key
//! ```
//!
//! ```rust,ignore
//! use mcp_router::providers::{api_key_from_env, create_provider};
//! use mcp_router::types::ProviderConfig;
//!
//! let config = ProviderConfig::new(api_key_from_env()?, "o4-mini");
//! let provider = create_provider(config)?;
//! ```

pub mod openai;

pub use openai::OpenAIProvider;

use crate::error::{ConfigError, ProviderError};
use crate::types::{BoxedProvider, ProviderConfig};

/// Environment variable holding the model service credential.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Model used when none is given.
pub const DEFAULT_MODEL: &str = "o4-mini";

/// Read the API key from the process environment.
///
/// A missing or blank variable is a fatal startup error.
pub fn api_key_from_env() -> Result<String, ConfigError> {
    api_key_from(|name| std::env::var(name).ok())
}

fn api_key_from(lookup: impl Fn(&str) -> Option<String>) -> Result<String, ConfigError> {
    lookup(OPENAI_API_KEY_ENV)
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or_else(|| ConfigError::MissingCredential(OPENAI_API_KEY_ENV.to_string()))
}

/// Create a provider instance from configuration.
///
/// The model defaults to [`DEFAULT_MODEL`] and the base URL to the public
/// OpenAI endpoint.
pub fn create_provider(config: ProviderConfig) -> Result<BoxedProvider, ProviderError> {
    let api_key = config
        .api_key
        .clone()
        .ok_or_else(|| ProviderError::NotConfigured("API key required for OpenAI".to_string()))?;

    let model = config
        .model
        .clone()
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());

    let base_url = config
        .base_url
        .clone()
        .unwrap_or_else(|| openai::OPENAI_BASE_URL.to_string());

    Ok(Box::new(OpenAIProvider::new(api_key, model, base_url, config)?))
}
