//! Per-task weight presets and scoring thresholds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{Criterion, TaskType};

/// Reduction applied when conciseness is scored poorly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConcisenessPenalty {
    /// Penalty applies when the conciseness score is `<= threshold`.
    pub threshold: u8,
    pub penalty: f64,
    /// The penalized score never drops below this.
    pub floor: f64,
}

/// Everything the scorer needs for one task type.
///
/// Weights need not sum to 1; the scorer normalizes by the weight of
/// the criteria actually present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightsConfig {
    pub weights: BTreeMap<Criterion, f64>,
    pub conciseness_penalty: ConcisenessPenalty,
    pub pass_threshold: f64,
}

/// On-disk layout of `weights_presets_v1.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightsFile {
    pub version: String,
    pub conciseness_penalty: ConcisenessPenalty,
    pub pass_threshold: f64,
    pub presets: BTreeMap<TaskType, BTreeMap<Criterion, f64>>,
}

impl WeightsFile {
    /// Build the scoring config for a task, if a preset exists.
    pub fn config_for(&self, task_type: TaskType) -> Option<WeightsConfig> {
        self.presets.get(&task_type).map(|weights| WeightsConfig {
            weights: weights.clone(),
            conciseness_penalty: self.conciseness_penalty,
            pass_threshold: self.pass_threshold,
        })
    }
}
