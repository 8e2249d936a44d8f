//! Summary statistics over many completed results.
//!
//! Aggregation never fails: empty input gives an all-zero summary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::scorer::round2;
use crate::types::{Criterion, JudgeResult};

/// Score distribution for one criterion across all results.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CriterionStats {
    /// Rounded to two decimals.
    pub average: f64,
    pub min: u8,
    pub max: u8,
}

/// Summary of a batch of results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedResult {
    pub total_evaluations: usize,
    pub pass_count: usize,
    pub fail_count: usize,
    pub pass_rate: f64,
    pub average_weighted_score: f64,
    pub per_criterion: BTreeMap<Criterion, CriterionStats>,
    pub conciseness_penalty_rate: f64,
}

impl AggregatedResult {
    fn empty() -> Self {
        Self {
            total_evaluations: 0,
            pass_count: 0,
            fail_count: 0,
            pass_rate: 0.0,
            average_weighted_score: 0.0,
            per_criterion: BTreeMap::new(),
            conciseness_penalty_rate: 0.0,
        }
    }
}

/// Running totals for one criterion.
#[derive(Default)]
struct Accumulator {
    sum: u64,
    count: u64,
    min: u8,
    max: u8,
}

impl Accumulator {
    fn push(&mut self, score: u8) {
        if self.count == 0 {
            self.min = score;
            self.max = score;
        } else {
            self.min = self.min.min(score);
            self.max = self.max.max(score);
        }
        self.sum += u64::from(score);
        self.count += 1;
    }

    fn stats(&self) -> CriterionStats {
        CriterionStats {
            average: round2(self.sum as f64 / self.count as f64),
            min: self.min,
            max: self.max,
        }
    }
}

/// Reduce results into pass rates, score averages and per-criterion stats.
///
/// Per-criterion statistics pool every individual score for a criterion
/// across all results; a criterion missing from some results is averaged
/// only over the results that report it.
pub fn aggregate_results(results: &[JudgeResult]) -> AggregatedResult {
    if results.is_empty() {
        return AggregatedResult::empty();
    }

    let total = results.len();
    let pass_count = results.iter().filter(|r| r.overall.pass).count();
    let penalty_count = results
        .iter()
        .filter(|r| r.overall.conciseness_penalty_applied)
        .count();
    let weighted_sum: f64 = results.iter().map(|r| r.overall.weighted_score).sum();

    let mut pools: BTreeMap<Criterion, Accumulator> = BTreeMap::new();
    for score in results.iter().flat_map(|r| &r.scores) {
        pools.entry(score.criterion).or_default().push(score.score);
    }

    AggregatedResult {
        total_evaluations: total,
        pass_count,
        fail_count: total - pass_count,
        pass_rate: round2(pass_count as f64 / total as f64),
        average_weighted_score: round2(weighted_sum / total as f64),
        per_criterion: pools.iter().map(|(c, acc)| (*c, acc.stats())).collect(),
        conciseness_penalty_rate: round2(penalty_count as f64 / total as f64),
    }
}
