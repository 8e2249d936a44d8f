//! Format gate: raw judge text in, well-formed [`JudgeResult`] out.
//!
//! Every attempt yields a result. Unparseable or schema-invalid output
//! becomes a deterministic failing result that keeps the raw text for
//! audit, so nothing downstream has to handle a missing result.

use crate::schema::SchemaValidator;
use crate::types::{Criterion, CriterionScore, JudgeResult, OverallScore, CORE_CRITERIA};

pub const PARSE_FAILURE: &str = "Failed to parse JSON response";
pub const NOT_EVALUATED_REASONING: &str = "Not evaluated due to format gate failure";
pub const FORMAT_FAILURE_REASONING: &str =
    "Format gate failed: response did not conform to required JSON schema";

/// Outcome of gating one judge response.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatGateOutcome {
    pub passed: bool,
    /// Empty when passed.
    pub errors: Vec<String>,
    /// The parsed result when passed (its `overall` is still the judge's
    /// provisional value), otherwise the synthesized failing result.
    pub result: JudgeResult,
}

/// Parse and validate raw judge output against the result schema.
pub fn apply_format_gate(
    validator: &SchemaValidator,
    request_id: &str,
    judge_model: &str,
    raw_response: &str,
) -> FormatGateOutcome {
    let parsed: serde_json::Value = match serde_json::from_str(raw_response) {
        Ok(v) => v,
        Err(e) => {
            tracing::debug!(request_id, error = %e, "judge response is not JSON");
            return failed(request_id, judge_model, raw_response, vec![PARSE_FAILURE.to_string()]);
        }
    };

    match validator.parse::<JudgeResult>(parsed) {
        Ok(result) => FormatGateOutcome {
            passed: true,
            errors: Vec::new(),
            result,
        },
        Err(errors) => failed(request_id, judge_model, raw_response, errors),
    }
}

fn failed(
    request_id: &str,
    judge_model: &str,
    raw_response: &str,
    errors: Vec<String>,
) -> FormatGateOutcome {
    FormatGateOutcome {
        passed: false,
        errors,
        result: failed_result(request_id, judge_model, raw_response),
    }
}

/// The result recorded when a judge response cannot be trusted.
///
/// All core criteria score 1 and the verdict is a fail at 1.0 without
/// any penalty.
pub fn failed_result(request_id: &str, judge_model: &str, raw_response: &str) -> JudgeResult {
    let scores = CORE_CRITERIA
        .iter()
        .map(|&criterion| {
            let reasoning = if criterion == Criterion::FormatCompliance {
                FORMAT_FAILURE_REASONING
            } else {
                NOT_EVALUATED_REASONING
            };
            CriterionScore::new(criterion, 1, reasoning)
        })
        .collect();

    JudgeResult {
        request_id: request_id.to_string(),
        judge_model: judge_model.to_string(),
        scores,
        overall: OverallScore {
            weighted_score: 1.0,
            pass: false,
            conciseness_penalty_applied: false,
        },
        format_valid: false,
        raw_response: Some(raw_response.to_string()),
    }
}
