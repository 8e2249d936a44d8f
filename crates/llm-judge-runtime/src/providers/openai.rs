//! Chat-completion style judge (OpenAI).
//!
//! Sends the system and user prompts as two chat messages and asks for a
//! JSON object response. The first choice's message content is the
//! judge's raw text.

use super::{
    config_temperature,
    factory::JudgeFactory,
    secrets::{ApiCredential, CredentialSource},
    validate_base_url, JudgePrompt, JudgeProvider, ProviderError,
};
use async_trait::async_trait;
use llm_judge_core::{JudgeRequest, Rubric};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;

/// Environment variable name for the OpenAI API key.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o";

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const PROVIDER: &str = "openai";

/// OpenAI judge provider.
pub struct OpenAiJudge {
    credential: ApiCredential,
    base_url: String,
    model: String,
    temperature: f32,
    rubric: Arc<Rubric>,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiJudge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiJudge")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl OpenAiJudge {
    /// Create a judge with an explicit API key and default settings.
    pub fn new(api_key: impl Into<String>, rubric: Arc<Rubric>) -> Result<Self, ProviderError> {
        let credential =
            ApiCredential::new(api_key, CredentialSource::Programmatic, "OpenAI API key");
        Self::with_credential(
            credential,
            DEFAULT_BASE_URL.to_string(),
            OPENAI_DEFAULT_MODEL.to_string(),
            0.0,
            rubric,
        )
    }

    /// Create from JSON configuration, falling back to `OPENAI_API_KEY`.
    pub fn from_config(config: &JsonValue, rubric: Arc<Rubric>) -> Result<Self, ProviderError> {
        let credential = ApiCredential::from_config_or_env(
            config,
            "api_key",
            OPENAI_API_KEY_ENV,
            "OpenAI API key",
        )?;

        let base_url = config["base_url"]
            .as_str()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        let model = config["model"]
            .as_str()
            .unwrap_or(OPENAI_DEFAULT_MODEL)
            .to_string();

        Self::with_credential(credential, base_url, model, config_temperature(config), rubric)
    }

    fn with_credential(
        credential: ApiCredential,
        base_url: String,
        model: String,
        temperature: f32,
        rubric: Arc<Rubric>,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ProviderError::HttpError(e.to_string()))?;

        Ok(Self {
            credential,
            base_url,
            model,
            temperature,
            rubric,
            client,
        })
    }

    fn request_body(&self, prompt: JudgePrompt) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt.user,
                },
            ],
            temperature: self.temperature,
            response_format: ResponseFormat {
                type_: "json_object",
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    type_: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiError {
    error: OpenAiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct OpenAiErrorDetail {
    message: String,
}

/// Pull the first choice's content out of a response.
fn first_choice_content(body: ChatResponse) -> Result<String, ProviderError> {
    body.choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.is_empty())
        .ok_or_else(|| ProviderError::EmptyResponse {
            provider: PROVIDER.to_string(),
        })
}

#[async_trait]
impl JudgeProvider for OpenAiJudge {
    async fn evaluate(&self, request: &JudgeRequest) -> Result<String, ProviderError> {
        let body = self.request_body(JudgePrompt::build(&self.rubric, request));

        tracing::debug!(
            request_id = %request.request_id,
            model = %self.model,
            "sending chat completion request"
        );

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<OpenAiError>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        first_choice_content(body)
    }

    fn provider(&self) -> &str {
        PROVIDER
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Factory for OpenAI judges.
///
/// ## Configuration Format
/// ```json
/// {
///   "api_key": "sk-...",            // Optional, falls back to OPENAI_API_KEY env
///   "base_url": "https://...",      // Optional, custom API endpoint
///   "model": "gpt-4o",              // Optional
///   "temperature": 0.0              // Optional
/// }
/// ```
pub struct OpenAiJudgeFactory;

impl JudgeFactory for OpenAiJudgeFactory {
    fn provider_type(&self) -> &'static str {
        PROVIDER
    }

    fn create(
        &self,
        config: &JsonValue,
        rubric: Arc<Rubric>,
    ) -> Result<Arc<dyn JudgeProvider>, ProviderError> {
        validate_base_url(config)?;
        Ok(Arc::new(OpenAiJudge::from_config(config, rubric)?))
    }

    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError> {
        if !ApiCredential::is_available(config, "api_key", OPENAI_API_KEY_ENV) {
            return Err(ProviderError::NotConfigured(format!(
                "OpenAI API key required: set 'api_key' in config or {} env",
                OPENAI_API_KEY_ENV
            )));
        }
        validate_base_url(config)
    }

    fn default_config(&self) -> JsonValue {
        serde_json::json!({
            "model": OPENAI_DEFAULT_MODEL,
            "temperature": 0.0
        })
    }

    fn description(&self) -> &'static str {
        "OpenAI chat-completion judge with JSON response format"
    }
}
