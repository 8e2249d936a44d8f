//! # llm-judge-core
//!
//! Deterministic core of an LLM-as-a-judge evaluation pipeline.
//!
//! A judge model scores generated text against a fixed rubric. This crate
//! takes the judge's raw text from there:
//! - Is the judge output usable? ([`apply_format_gate`])
//! - What is the weighted verdict? ([`compute_score`])
//! - How did a whole batch do? ([`aggregate_results`])
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same scores and weights always produce the same verdict
//! 2. **No LLM calls**: Judge providers live in `llm-judge-runtime`
//! 3. **Always a result**: Malformed judge output becomes a failing result, never an error
//! 4. **Validate, then construct**: Untyped JSON is schema-checked before it is typed
//!
//! ## Example
//!
//! ```rust,ignore
//! use llm_judge_core::{apply_format_gate, compute_score, Rubric, Schemas};
//!
//! let rubric = Rubric::embedded()?;
//! let schemas = Schemas::compile()?;
//!
//! let gate = apply_format_gate(schemas.result(), "req-1", "gpt-4o", &raw_text);
//! let mut result = gate.result;
//! if gate.passed {
//!     let weights = rubric.weights_for_task(TaskType::Summarization)?;
//!     result.overall = compute_score(&result.scores, &weights);
//! }
//! ```

pub mod aggregator;
pub mod format_gate;
pub mod rubric;
pub mod schema;
pub mod scorer;
pub mod types;

// Re-export main types at crate root
pub use aggregator::{aggregate_results, AggregatedResult, CriterionStats};
pub use format_gate::{apply_format_gate, failed_result, FormatGateOutcome};
pub use rubric::{
    format_criteria_block, ConcisenessPenalty, CriterionDefinition, Rubric, RubricError,
    WeightsConfig,
};
pub use schema::{SchemaError, SchemaKind, SchemaValidator, Schemas, Validation};
pub use scorer::compute_score;
pub use types::{
    Criterion, CriterionScore, JudgeRequest, JudgeResult, OverallScore, RequestInput,
    RequestOutput, TaskType, CORE_CRITERIA, OPTIONAL_CRITERIA,
};

/// Gate a judge response and, when it passes, finalize it with the scorer.
///
/// This is the synchronous half of an evaluation: everything after the
/// judge has returned text. A failed gate returns its synthesized result
/// untouched.
pub fn finalize_response(
    rubric: &Rubric,
    schemas: &Schemas,
    request: &JudgeRequest,
    judge_model: &str,
    raw_response: &str,
) -> Result<(FormatGateOutcome, JudgeResult), RubricError> {
    let gate = apply_format_gate(schemas.result(), &request.request_id, judge_model, raw_response);
    if !gate.passed {
        let result = gate.result.clone();
        return Ok((gate, result));
    }

    let weights = rubric.weights_for_task(request.task_type)?;
    let mut result = gate.result.clone();
    result.overall = compute_score(&result.scores, &weights);
    result.format_valid = true;
    Ok((gate, result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request() -> JudgeRequest {
        JudgeRequest {
            request_id: "int-test-001".to_string(),
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

    fn judge_response(score_of: impl Fn(Criterion) -> u8, overall: serde_json::Value) -> String {
        let scores: Vec<_> = CORE_CRITERIA
            .iter()
            .map(|&c| json!({ "criterion": c.as_str(), "score": score_of(c), "reasoning": "ok" }))
            .collect();
        json!({
            "request_id": "int-test-001",
            "judge_model": "mock-model",
            "scores": scores,
            "overall": overall,
            "format_valid": true
        })
        .to_string()
    }

    #[test]
    fn test_finalize_overwrites_judge_overall() {
        let rubric = Rubric::embedded().unwrap();
        let schemas = Schemas::compile().unwrap();
        let raw = judge_response(
            |c| match c {
                Criterion::Harmlessness | Criterion::FormatCompliance => 5,
                _ => 4,
            },
            json!({ "weighted_score": 1.0, "pass": false, "conciseness_penalty_applied": true }),
        );

        let (gate, result) =
            finalize_response(&rubric, &schemas, &request(), "mock-model", &raw).unwrap();
        assert!(gate.passed);
        assert!(result.format_valid);
        assert!((result.overall.weighted_score - 4.2).abs() < 1e-9);
        assert!(result.overall.pass);
        assert!(!result.overall.conciseness_penalty_applied);
    }

    #[test]
    fn test_finalize_gate_failure_is_untouched() {
        let rubric = Rubric::embedded().unwrap();
        let schemas = Schemas::compile().unwrap();

        let (gate, result) =
            finalize_response(&rubric, &schemas, &request(), "mock-model", "not valid json")
                .unwrap();
        assert!(!gate.passed);
        assert_eq!(result, gate.result);
        assert!(!result.format_valid);
        assert_eq!(result.overall.weighted_score, 1.0);
    }
}
