//! Judge provider abstractions for llm-judge-runtime.
//!
//! A judge provider turns a [`JudgeRequest`] into the judge model's raw
//! text. It knows nothing about schemas or scoring; the runner feeds its
//! output through the format gate.
//!
//! ## Security
//!
//! All providers use the [`secrets`] module for credential handling.
//! See [`ApiCredential`] for the recommended patterns.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

use llm_judge_core::{JudgeRequest, Rubric};

mod factory;
pub mod secrets;

#[cfg(feature = "gemini")]
mod gemini;
#[cfg(feature = "openai")]
mod openai;

pub use factory::{JudgeFactory, JudgeRegistry};
pub use secrets::{ApiCredential, CredentialSource};

#[cfg(feature = "gemini")]
pub use gemini::{GeminiJudge, GeminiJudgeFactory, GEMINI_API_KEY_ENV, GEMINI_DEFAULT_MODEL};
#[cfg(feature = "openai")]
pub use openai::{OpenAiJudge, OpenAiJudgeFactory, OPENAI_API_KEY_ENV, OPENAI_DEFAULT_MODEL};

/// Errors from judge providers.
///
/// Every variant is fatal for the evaluation that hit it.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    ParseError(String),

    #[error("{provider} returned no content")]
    EmptyResponse { provider: String },

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Unknown provider: '{name}'. Available: {available:?}")]
    UnknownProvider { name: String, available: Vec<String> },
}

/// Per-run overrides for a judge provider.
///
/// Serializes to the JSON configuration accepted by every
/// [`JudgeFactory`]; unset fields fall back to the provider defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JudgeOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl JudgeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the judge model.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Override the sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Point the provider at a different API endpoint.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Provider configuration as handed to a factory.
    pub fn to_config(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }
}

/// The two prompt halves sent to a judge model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgePrompt {
    pub system: String,
    pub user: String,
}

impl JudgePrompt {
    /// Assemble the prompt for a request from the rubric templates.
    pub fn build(rubric: &Rubric, request: &JudgeRequest) -> Self {
        Self {
            system: rubric.system_prompt().to_string(),
            user: rubric.build_user_prompt(request),
        }
    }
}

/// Provider abstraction allows swapping judge backends.
///
/// Implementations hold their own client handle and model settings.
/// They must not retry or time out on their own; a failed call is
/// reported to the caller as is.
#[async_trait]
pub trait JudgeProvider: Send + Sync {
    /// Ask the judge model to evaluate a request, returning its raw text.
    async fn evaluate(&self, request: &JudgeRequest) -> Result<String, ProviderError>;

    /// Provider name, as registered.
    fn provider(&self) -> &str;

    /// Model the provider sends requests to.
    fn model_name(&self) -> &str;

    /// Entry point used by the runner.
    async fn judge(&self, request: &JudgeRequest) -> Result<String, ProviderError> {
        self.evaluate(request).await
    }
}

/// Read a `temperature` from provider config, defaulting to deterministic.
pub(crate) fn config_temperature(config: &JsonValue) -> f32 {
    config["temperature"].as_f64().map(|t| t as f32).unwrap_or(0.0)
}

/// Reject a `base_url` that is not an http(s) URL.
pub(crate) fn validate_base_url(config: &JsonValue) -> Result<(), ProviderError> {
    if let Some(url) = config["base_url"].as_str() {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ProviderError::NotConfigured(
                "base_url must start with http:// or https://".to_string(),
            ));
        }
    }
    Ok(())
}
