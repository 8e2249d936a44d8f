//! Weighted scoring with a conditional conciseness penalty.
//!
//! The scorer is pure: the same scores and config always produce the
//! same verdict.
//!
//! 1. Weighted mean over the criteria present in both the scores and
//!    the weights (missing criteria drop out of numerator and denominator)
//! 2. If nothing matched, the base score is 1.0
//! 3. Conciseness `<= threshold` subtracts the penalty, clamped at `floor`
//! 4. Round to two decimals, half away from zero
//! 5. Pass requires `format_compliance >= 3` (when reported) and
//!    `weighted_score >= pass_threshold`

use crate::rubric::WeightsConfig;
use crate::types::{find_score, Criterion, CriterionScore, OverallScore};

/// Minimum `format_compliance` score for a result to pass.
pub const FORMAT_COMPLIANCE_MIN: u8 = 3;

/// Compute the overall verdict for a list of criterion scores.
pub fn compute_score(scores: &[CriterionScore], config: &WeightsConfig) -> OverallScore {
    let mut weighted_sum = 0.0;
    let mut total_weight = 0.0;

    for (criterion, weight) in &config.weights {
        if let Some(found) = find_score(scores, *criterion) {
            weighted_sum += f64::from(found.score) * weight;
            total_weight += weight;
        }
    }

    let base = if total_weight > 0.0 {
        weighted_sum / total_weight
    } else {
        1.0
    };

    let penalty = &config.conciseness_penalty;
    let (adjusted, conciseness_penalty_applied) = match find_score(scores, Criterion::Conciseness) {
        Some(c) if c.score <= penalty.threshold => {
            (penalty.floor.max(base - penalty.penalty), true)
        }
        _ => (base, false),
    };

    let weighted_score = round2(adjusted);

    let format_valid = find_score(scores, Criterion::FormatCompliance)
        .map(|s| s.score >= FORMAT_COMPLIANCE_MIN)
        .unwrap_or(true);

    OverallScore {
        weighted_score,
        pass: format_valid && weighted_score >= config.pass_threshold,
        conciseness_penalty_applied,
    }
}

/// Round to two decimal places, halves away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
