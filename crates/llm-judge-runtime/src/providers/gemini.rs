//! Generative-content style judge (Google Gemini).
//!
//! The system prompt goes in `systemInstruction`, the user prompt is the
//! single content turn, and `generationConfig` requests a JSON response.

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

/// Environment variable name for the Gemini API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

pub const GEMINI_DEFAULT_MODEL: &str = "gemini-1.5-pro";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const PROVIDER: &str = "gemini";

/// Gemini judge provider.
pub struct GeminiJudge {
    credential: ApiCredential,
    base_url: String,
    model: String,
    temperature: f32,
    rubric: Arc<Rubric>,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiJudge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiJudge")
            .field("credential", &self.credential)
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl GeminiJudge {
    /// Create a judge with an explicit API key and default settings.
    pub fn new(api_key: impl Into<String>, rubric: Arc<Rubric>) -> Result<Self, ProviderError> {
        let credential =
            ApiCredential::new(api_key, CredentialSource::Programmatic, "Gemini API key");
        Self::with_credential(
            credential,
            DEFAULT_BASE_URL.to_string(),
            GEMINI_DEFAULT_MODEL.to_string(),
            0.0,
            rubric,
        )
    }

    /// Create from JSON configuration, falling back to `GEMINI_API_KEY`.
    pub fn from_config(config: &JsonValue, rubric: Arc<Rubric>) -> Result<Self, ProviderError> {
        let credential = ApiCredential::from_config_or_env(
            config,
            "api_key",
            GEMINI_API_KEY_ENV,
            "Gemini API key",
        )?;

        let base_url = config["base_url"]
            .as_str()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        let model = config["model"]
            .as_str()
            .unwrap_or(GEMINI_DEFAULT_MODEL)
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

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn request_body(&self, prompt: JudgePrompt) -> GenerateRequest {
        GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: prompt.system }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt.user }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                response_mime_type: "application/json",
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    system_instruction: Content,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

/// Concatenate the text parts of the first candidate.
fn first_candidate_text(body: GenerateResponse) -> Result<String, ProviderError> {
    let text: String = body
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.is_empty() {
        return Err(ProviderError::EmptyResponse {
            provider: PROVIDER.to_string(),
        });
    }
    Ok(text)
}

#[async_trait]
impl JudgeProvider for GeminiJudge {
    async fn evaluate(&self, request: &JudgeRequest) -> Result<String, ProviderError> {
        let body = self.request_body(JudgePrompt::build(&self.rubric, request));

        tracing::debug!(
            request_id = %request.request_id,
            model = %self.model,
            "sending generate content request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GeminiError>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        first_candidate_text(body)
    }

    fn provider(&self) -> &str {
        PROVIDER
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Factory for Gemini judges.
///
/// ## Configuration Format
/// ```json
/// {
///   "api_key": "...",               // Optional, falls back to GEMINI_API_KEY env
///   "base_url": "https://...",      // Optional, custom API endpoint
///   "model": "gemini-1.5-pro",      // Optional
///   "temperature": 0.0              // Optional
/// }
/// ```
pub struct GeminiJudgeFactory;

impl JudgeFactory for GeminiJudgeFactory {
    fn provider_type(&self) -> &'static str {
        PROVIDER
    }

    fn create(
        &self,
        config: &JsonValue,
        rubric: Arc<Rubric>,
    ) -> Result<Arc<dyn JudgeProvider>, ProviderError> {
        validate_base_url(config)?;
        Ok(Arc::new(GeminiJudge::from_config(config, rubric)?))
    }

    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError> {
        if !ApiCredential::is_available(config, "api_key", GEMINI_API_KEY_ENV) {
            return Err(ProviderError::NotConfigured(format!(
                "Gemini API key required: set 'api_key' in config or {} env",
                GEMINI_API_KEY_ENV
            )));
        }
        validate_base_url(config)
    }

    fn default_config(&self) -> JsonValue {
        serde_json::json!({
            "model": GEMINI_DEFAULT_MODEL,
            "temperature": 0.0
        })
    }

    fn description(&self) -> &'static str {
        "Google Gemini generative-content judge with JSON response type"
    }
}
