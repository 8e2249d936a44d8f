//! Evaluation runner: judge, then format gate, then scorer.
//!
//! A single evaluation is strictly sequential; the judge call is the only
//! await point. Batches fan out over independent requests that share the
//! read-only rubric and schemas.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use thiserror::Error;

use llm_judge_core::{
    finalize_response, JudgeRequest, JudgeResult, Rubric, RubricError, SchemaError, Schemas,
};

use crate::providers::{JudgeOptions, JudgeProvider, JudgeRegistry, ProviderError};

/// Errors that end an evaluation attempt.
///
/// Malformed judge output is not an error; it becomes a failing result.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("Judge provider failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Rubric error: {0}")]
    Rubric(#[from] RubricError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
}

/// Which provider to use for a run, and how to configure it.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOptions {
    pub provider: String,
    pub judge_options: JudgeOptions,
}

impl RunOptions {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            judge_options: JudgeOptions::default(),
        }
    }

    pub fn with_judge_options(mut self, options: JudgeOptions) -> Self {
        self.judge_options = options;
        self
    }
}

/// Runs evaluations against a shared rubric and schema set.
///
/// Cheap to share: everything it holds is immutable after construction.
#[derive(Debug)]
pub struct Runner {
    rubric: Arc<Rubric>,
    schemas: Arc<Schemas>,
    registry: JudgeRegistry,
}

impl Runner {
    pub fn new(rubric: Arc<Rubric>, schemas: Arc<Schemas>, registry: JudgeRegistry) -> Self {
        Self {
            rubric,
            schemas,
            registry,
        }
    }

    pub fn builder() -> RunnerBuilder {
        RunnerBuilder::new()
    }

    pub fn rubric(&self) -> &Arc<Rubric> {
        &self.rubric
    }

    pub fn schemas(&self) -> &Arc<Schemas> {
        &self.schemas
    }

    pub fn registry(&self) -> &JudgeRegistry {
        &self.registry
    }

    /// Build the judge named in `options`.
    pub fn create_judge(
        &self,
        options: &RunOptions,
    ) -> Result<Arc<dyn JudgeProvider>, ProviderError> {
        self.registry.create(
            &options.provider,
            &options.judge_options.to_config(),
            Arc::clone(&self.rubric),
        )
    }

    /// Evaluate a request with a provider looked up by name.
    ///
    /// An unknown provider fails before any request is sent.
    pub async fn run_evaluation(
        &self,
        request: &JudgeRequest,
        options: &RunOptions,
    ) -> Result<JudgeResult, RunError> {
        let judge = self.create_judge(options)?;
        self.run_with_judge(request, judge.as_ref()).await
    }

    /// Evaluate a request with an already-built judge.
    ///
    /// # Execution Flow
    /// 1. Ask the judge for raw text (provider errors propagate)
    /// 2. Format gate: a failure returns the synthesized result as is
    /// 3. Score with the task's weights and overwrite `overall`
    pub async fn run_with_judge(
        &self,
        request: &JudgeRequest,
        judge: &dyn JudgeProvider,
    ) -> Result<JudgeResult, RunError> {
        tracing::info!(
            request_id = %request.request_id,
            provider = judge.provider(),
            model = judge.model_name(),
            "starting evaluation"
        );

        let raw = judge.judge(request).await?;

        let (gate, result) = finalize_response(
            &self.rubric,
            &self.schemas,
            request,
            judge.model_name(),
            &raw,
        )?;

        if !gate.passed {
            tracing::warn!(
                request_id = %request.request_id,
                errors = ?gate.errors,
                "format gate failed"
            );
            return Ok(result);
        }

        tracing::info!(
            request_id = %request.request_id,
            weighted_score = result.overall.weighted_score,
            pass = result.overall.pass,
            "evaluation complete"
        );

        Ok(result)
    }

    /// Evaluate many requests with at most `concurrency` in flight.
    ///
    /// Returns one outcome per request, in input order. A failed request
    /// does not stop the others.
    pub async fn run_batch(
        &self,
        requests: &[JudgeRequest],
        judge: &dyn JudgeProvider,
        concurrency: usize,
    ) -> Vec<Result<JudgeResult, RunError>> {
        tracing::debug!(
            requests = requests.len(),
            concurrency,
            provider = judge.provider(),
            "starting batch"
        );

        stream::iter(requests)
            .map(|request| self.run_with_judge(request, judge))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
}

/// Builder for [`Runner`].
///
/// Unset parts fall back to the embedded rubric, freshly compiled schemas
/// and [`JudgeRegistry::with_defaults`].
#[derive(Default)]
pub struct RunnerBuilder {
    rubric: Option<Arc<Rubric>>,
    schemas: Option<Arc<Schemas>>,
    registry: Option<JudgeRegistry>,
}

impl RunnerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rubric(mut self, rubric: Arc<Rubric>) -> Self {
        self.rubric = Some(rubric);
        self
    }

    pub fn schemas(mut self, schemas: Arc<Schemas>) -> Self {
        self.schemas = Some(schemas);
        self
    }

    pub fn registry(mut self, registry: JudgeRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> Result<Runner, RunError> {
        let rubric = match self.rubric {
            Some(rubric) => rubric,
            None => Arc::new(Rubric::embedded()?),
        };
        let schemas = match self.schemas {
            Some(schemas) => schemas,
            None => Arc::new(Schemas::compile()?),
        };
        let registry = self.registry.unwrap_or_else(JudgeRegistry::with_defaults);

        Ok(Runner::new(rubric, schemas, registry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use llm_judge_core::{Criterion, RequestInput, RequestOutput, TaskType, CORE_CRITERIA};
    use serde_json::{json, Value as JsonValue};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::providers::JudgeFactory;

    /// Returns canned text, or fails when the text is `None`.
    struct MockJudge {
        response: Option<String>,
        calls: AtomicUsize,
    }

    impl MockJudge {
        fn returning(response: impl Into<String>) -> Self {
            Self {
                response: Some(response.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                response: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl JudgeProvider for MockJudge {
        async fn evaluate(&self, _request: &JudgeRequest) -> Result<String, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone().ok_or_else(|| ProviderError::EmptyResponse {
                provider: "mock".to_string(),
            })
        }

        fn provider(&self) -> &str {
            "mock"
        }

        fn model_name(&self) -> &str {
            "mock-model"
        }
    }

    /// Echoes each request's id back in a valid result, with a delay that
    /// makes later requests finish first.
    struct SlowEchoJudge;

    #[async_trait]
    impl JudgeProvider for SlowEchoJudge {
        async fn evaluate(&self, request: &JudgeRequest) -> Result<String, ProviderError> {
            let delay: u64 = request.request_id.trim_start_matches("req-").parse().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(50 - delay * 10)).await;
            if request.request_id == "req-2" {
                return Err(ProviderError::HttpError("connection reset".to_string()));
            }
            Ok(judge_response(&request.request_id, |_| 4))
        }

        fn provider(&self) -> &str {
            "slow-echo"
        }

        fn model_name(&self) -> &str {
            "slow-echo-1"
        }
    }

    struct MockFactory;

    impl JudgeFactory for MockFactory {
        fn provider_type(&self) -> &'static str {
            "mock"
        }

        fn create(
            &self,
            _config: &JsonValue,
            _rubric: Arc<Rubric>,
        ) -> Result<Arc<dyn JudgeProvider>, ProviderError> {
            Ok(Arc::new(MockJudge::returning(judge_response("int-test-001", |_| 5))))
        }

        fn validate_config(&self, _config: &JsonValue) -> Result<(), ProviderError> {
            Ok(())
        }
    }

    fn request(id: &str) -> JudgeRequest {
        JudgeRequest {
            request_id: id.to_string(),
            task_type: TaskType::Summarization,
            input: RequestInput {
                source_text: "Test source text for integration.".to_string(),
                instruction: "Summarize this.".to_string(),
                reference_output: None,
            },
            output: RequestOutput {
                model_name: "gpt-4o".to_string(),
                generated_text: "Test summary.".to_string(),
            },
            metadata: None,
        }
    }

    fn judge_response(request_id: &str, score_of: impl Fn(Criterion) -> u8) -> String {
        let scores: Vec<_> = CORE_CRITERIA
            .iter()
            .map(|&c| json!({ "criterion": c.as_str(), "score": score_of(c), "reasoning": "Mock reasoning." }))
            .collect();
        json!({
            "request_id": request_id,
            "judge_model": "mock-model",
            "scores": scores,
            "overall": { "weighted_score": 3.0, "pass": true, "conciseness_penalty_applied": false },
            "format_valid": true
        })
        .to_string()
    }

    fn runner() -> Runner {
        let mut registry = JudgeRegistry::new();
        registry.register(Arc::new(MockFactory));
        Runner::builder().registry(registry).build().unwrap()
    }

    #[tokio::test]
    async fn test_valid_response_is_scored() {
        let judge = MockJudge::returning(judge_response("int-test-001", |c| match c {
            Criterion::Harmlessness | Criterion::FormatCompliance => 5,
            _ => 4,
        }));

        let result = runner()
            .run_with_judge(&request("int-test-001"), &judge)
            .await
            .unwrap();

        assert!(result.format_valid);
        assert!((result.overall.weighted_score - 4.2).abs() < 0.01);
        assert!(result.overall.pass);
        assert!(!result.overall.conciseness_penalty_applied);
        assert_eq!(result.scores.len(), 9);
        assert_eq!(judge.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_fives_scores_five() {
        let judge = MockJudge::returning(judge_response("int-test-001", |_| 5));
        let result = runner()
            .run_with_judge(&request("int-test-001"), &judge)
            .await
            .unwrap();
        assert_eq!(result.overall.weighted_score, 5.0);
        assert!(result.overall.pass);
    }

    #[tokio::test]
    async fn test_low_conciseness_applies_penalty() {
        let judge = MockJudge::returning(judge_response("int-test-001", |c| {
            if c == Criterion::Conciseness {
                1
            } else {
                4
            }
        }));
        let result = runner()
            .run_with_judge(&request("int-test-001"), &judge)
            .await
            .unwrap();

        assert!(result.overall.conciseness_penalty_applied);
        // base (4 * 0.8 + 1 * 0.2) = 3.4, minus 0.3
        assert!((result.overall.weighted_score - 3.1).abs() < 1e-9);
        assert!(result.overall.pass);
    }

    #[tokio::test]
    async fn test_invalid_json_fails_format_gate() {
        let judge = MockJudge::returning("not valid json");
        let result = runner()
            .run_with_judge(&request("int-test-001"), &judge)
            .await
            .unwrap();

        assert!(!result.format_valid);
        assert!(!result.overall.pass);
        assert_eq!(result.overall.weighted_score, 1.0);
        assert_eq!(result.request_id, "int-test-001");
        assert_eq!(result.judge_model, "mock-model");
        assert_eq!(result.raw_response.as_deref(), Some("not valid json"));
    }

    #[tokio::test]
    async fn test_schema_invalid_response_fails_format_gate() {
        let judge = MockJudge::returning(r#"{"request_id": "int-test-001", "scores": []}"#);
        let result = runner()
            .run_with_judge(&request("int-test-001"), &judge)
            .await
            .unwrap();
        assert!(!result.format_valid);
        assert!(result.scores.iter().all(|s| s.score == 1));
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let judge = MockJudge::failing();
        let err = runner()
            .run_with_judge(&request("int-test-001"), &judge)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RunError::Provider(ProviderError::EmptyResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_run_evaluation_by_provider_name() {
        let result = runner()
            .run_evaluation(&request("int-test-001"), &RunOptions::new("mock"))
            .await
            .unwrap();
        assert_eq!(result.overall.weighted_score, 5.0);
        assert_eq!(result.judge_model, "mock-model");
    }

    #[tokio::test]
    async fn test_run_evaluation_unknown_provider() {
        let err = runner()
            .run_evaluation(&request("int-test-001"), &RunOptions::new("nonexistent"))
            .await
            .unwrap_err();
        match err {
            RunError::Provider(ProviderError::UnknownProvider { name, available }) => {
                assert_eq!(name, "nonexistent");
                assert_eq!(available, vec!["mock".to_string()]);
            }
            other => panic!("expected UnknownProvider, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_preset_is_a_rubric_error() {
        let rubric = Rubric::embedded().unwrap();
        let mut weights = rubric.weights_file().clone();
        weights.presets.remove(&TaskType::Summarization);
        let rubric = Rubric::new(
            rubric.criteria_file().clone(),
            weights,
            rubric.prompts().clone(),
        );

        let runner = Runner::builder().rubric(Arc::new(rubric)).build().unwrap();
        let judge = MockJudge::returning(judge_response("int-test-001", |_| 4));
        let err = runner
            .run_with_judge(&request("int-test-001"), &judge)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RunError::Rubric(RubricError::MissingPreset(TaskType::Summarization))
        ));
    }

    #[tokio::test]
    async fn test_batch_preserves_input_order() {
        let requests: Vec<_> = (0..4).map(|i| request(&format!("req-{i}"))).collect();
        let outcomes = runner().run_batch(&requests, &SlowEchoJudge, 4).await;

        assert_eq!(outcomes.len(), 4);
        for (i, outcome) in outcomes.iter().enumerate() {
            match outcome {
                Ok(result) => {
                    assert_ne!(i, 2);
                    assert_eq!(result.request_id, format!("req-{i}"));
                    assert_eq!(result.overall.weighted_score, 4.0);
                }
                Err(RunError::Provider(ProviderError::HttpError(_))) => assert_eq!(i, 2),
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
    }

    #[tokio::test]
    async fn test_batch_with_zero_concurrency_still_runs() {
        let judge = MockJudge::returning(judge_response("x", |_| 3));
        let requests = vec![request("a"), request("b")];
        let outcomes = runner().run_batch(&requests, &judge, 0).await;
        assert_eq!(outcomes.len(), 2);
        assert_eq!(judge.calls.load(Ordering::SeqCst), 2);
    }
}
