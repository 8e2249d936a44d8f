//! Judge factories and the registry that maps provider names to them.
//!
//! New providers are added by registering a factory, not by editing an
//! enum:
//!
//! ```ignore
//! let mut registry = JudgeRegistry::new();
//! registry.register(Arc::new(OpenAiJudgeFactory));
//!
//! let judge = registry.create("openai", &JudgeOptions::new().to_config(), rubric)?;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use llm_judge_core::Rubric;

use super::{JudgeProvider, ProviderError};

/// Creates judge providers from JSON configuration.
///
/// Recognised configuration keys are `model`, `temperature`, `api_key`
/// and `base_url`; all are optional.
pub trait JudgeFactory: Send + Sync {
    /// Name the provider is registered under, e.g. `"openai"`.
    fn provider_type(&self) -> &'static str;

    /// Create a provider. The rubric supplies the prompts it sends.
    fn create(
        &self,
        config: &JsonValue,
        rubric: Arc<Rubric>,
    ) -> Result<Arc<dyn JudgeProvider>, ProviderError>;

    /// Validate configuration without creating a provider.
    fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError>;

    fn default_config(&self) -> JsonValue {
        serde_json::json!({})
    }

    fn description(&self) -> &'static str {
        "Judge provider"
    }
}

/// Registry of available judge factories, keyed by provider name.
#[derive(Default, Clone)]
pub struct JudgeRegistry {
    factories: BTreeMap<String, Arc<dyn JudgeFactory>>,
}

impl JudgeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory, replacing any factory with the same name.
    pub fn register(&mut self, factory: Arc<dyn JudgeFactory>) {
        self.factories
            .insert(factory.provider_type().to_string(), factory);
    }

    /// Create a provider by name.
    pub fn create(
        &self,
        provider_type: &str,
        config: &JsonValue,
        rubric: Arc<Rubric>,
    ) -> Result<Arc<dyn JudgeProvider>, ProviderError> {
        self.factory(provider_type)?.create(config, rubric)
    }

    /// Validate configuration for a provider name.
    pub fn validate(&self, provider_type: &str, config: &JsonValue) -> Result<(), ProviderError> {
        self.factory(provider_type)?.validate_config(config)
    }

    /// Registered provider names, sorted.
    pub fn available_types(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }

    pub fn has_provider(&self, provider_type: &str) -> bool {
        self.factories.contains_key(provider_type)
    }

    pub fn default_config(&self, provider_type: &str) -> Option<JsonValue> {
        self.factories
            .get(provider_type)
            .map(|f| f.default_config())
    }

    fn factory(&self, provider_type: &str) -> Result<&Arc<dyn JudgeFactory>, ProviderError> {
        self.factories
            .get(provider_type)
            .ok_or_else(|| ProviderError::UnknownProvider {
                name: provider_type.to_string(),
                available: self.available_types().into_iter().map(String::from).collect(),
            })
    }

    /// Create a registry with every compiled-in provider registered.
    pub fn with_defaults() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::new();
        #[cfg(feature = "openai")]
        registry.register(Arc::new(super::OpenAiJudgeFactory));
        #[cfg(feature = "gemini")]
        registry.register(Arc::new(super::GeminiJudgeFactory));
        registry
    }
}

impl std::fmt::Debug for JudgeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JudgeRegistry")
            .field("providers", &self.available_types())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use llm_judge_core::JudgeRequest;

    struct EchoJudge {
        model: String,
    }

    #[async_trait]
    impl JudgeProvider for EchoJudge {
        async fn evaluate(&self, request: &JudgeRequest) -> Result<String, ProviderError> {
            Ok(request.request_id.clone())
        }

        fn provider(&self) -> &str {
            "echo"
        }

        fn model_name(&self) -> &str {
            &self.model
        }
    }

    struct EchoFactory;

    impl JudgeFactory for EchoFactory {
        fn provider_type(&self) -> &'static str {
            "echo"
        }

        fn create(
            &self,
            config: &JsonValue,
            _rubric: Arc<Rubric>,
        ) -> Result<Arc<dyn JudgeProvider>, ProviderError> {
            let model = config["model"].as_str().unwrap_or("echo-1").to_string();
            Ok(Arc::new(EchoJudge { model }))
        }

        fn validate_config(&self, config: &JsonValue) -> Result<(), ProviderError> {
            super::super::validate_base_url(config)
        }
    }

    fn rubric() -> Arc<Rubric> {
        Arc::new(Rubric::embedded().unwrap())
    }

    #[test]
    fn test_register_and_create() {
        let mut registry = JudgeRegistry::new();
        registry.register(Arc::new(EchoFactory));
        assert!(registry.has_provider("echo"));
        assert!(!registry.has_provider("openai"));

        let judge = registry
            .create("echo", &serde_json::json!({ "model": "echo-2" }), rubric())
            .unwrap();
        assert_eq!(judge.provider(), "echo");
        assert_eq!(judge.model_name(), "echo-2");
    }

    #[test]
    fn test_unknown_provider_lists_available() {
        let mut registry = JudgeRegistry::new();
        registry.register(Arc::new(EchoFactory));

        match registry.create("nope", &serde_json::json!({}), rubric()) {
            Err(ProviderError::UnknownProvider { name, available }) => {
                assert_eq!(name, "nope");
                assert_eq!(available, vec!["echo".to_string()]);
            }
            Err(e) => panic!("expected UnknownProvider, got {e}"),
            Ok(_) => panic!("expected UnknownProvider, got a provider"),
        }
    }

    #[test]
    fn test_validate() {
        let mut registry = JudgeRegistry::new();
        registry.register(Arc::new(EchoFactory));
        assert!(registry.validate("echo", &serde_json::json!({})).is_ok());
        assert!(registry
            .validate("echo", &serde_json::json!({ "base_url": "nope" }))
            .is_err());
        assert!(registry.validate("missing", &serde_json::json!({})).is_err());
    }

    #[tokio::test]
    async fn test_judge_delegates_to_evaluate() {
        let judge = EchoJudge { model: "m".to_string() };
        let request: JudgeRequest = serde_json::from_value(serde_json::json!({
            "request_id": "echo-7",
            "task_type": "summarization",
            "input": { "source_text": "s", "instruction": "i" },
            "output": { "model_name": "g", "generated_text": "t" }
        }))
        .unwrap();
        assert_eq!(judge.judge(&request).await.unwrap(), "echo-7");
    }

    #[cfg(all(feature = "openai", feature = "gemini"))]
    #[test]
    fn test_with_defaults_registers_builtin_providers() {
        let registry = JudgeRegistry::with_defaults();
        assert_eq!(registry.available_types(), vec!["gemini", "openai"]);
    }
}
