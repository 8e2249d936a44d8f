//! Data model shared by every stage of the evaluation pipeline.
//!
//! Requests come from an external caller and are never mutated here.
//! Results are produced by the format gate and finalized by the runner.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// The category of generation task being judged.
///
/// Selects both the prompt template and the weight preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    Summarization,
    ReportGeneration,
    ReportQa,
}

impl TaskType {
    /// All task types, in canonical order.
    pub const ALL: [TaskType; 3] = [
        TaskType::Summarization,
        TaskType::ReportGeneration,
        TaskType::ReportQa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Summarization => "summarization",
            TaskType::ReportGeneration => "report_generation",
            TaskType::ReportQa => "report_qa",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown task type: {}", s))
    }
}

/// One named axis of quality, scored 1-5.
///
/// Declaration order is the canonical rubric order; `Ord` follows it so
/// ordered maps keyed by criterion iterate the way the rubric reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    Accuracy,
    Completeness,
    Relevance,
    Coherence,
    Conciseness,
    Clarity,
    Reasoning,
    Harmlessness,
    FormatCompliance,
    CitationQuality,
    Actionability,
}

/// The nine criteria every result must report.
pub const CORE_CRITERIA: [Criterion; 9] = [
    Criterion::Accuracy,
    Criterion::Completeness,
    Criterion::Relevance,
    Criterion::Coherence,
    Criterion::Conciseness,
    Criterion::Clarity,
    Criterion::Reasoning,
    Criterion::Harmlessness,
    Criterion::FormatCompliance,
];

/// Criteria a judge may report but scoring never requires.
pub const OPTIONAL_CRITERIA: [Criterion; 2] = [Criterion::CitationQuality, Criterion::Actionability];

impl Criterion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Criterion::Accuracy => "accuracy",
            Criterion::Completeness => "completeness",
            Criterion::Relevance => "relevance",
            Criterion::Coherence => "coherence",
            Criterion::Conciseness => "conciseness",
            Criterion::Clarity => "clarity",
            Criterion::Reasoning => "reasoning",
            Criterion::Harmlessness => "harmlessness",
            Criterion::FormatCompliance => "format_compliance",
            Criterion::CitationQuality => "citation_quality",
            Criterion::Actionability => "actionability",
        }
    }

    pub fn is_core(&self) -> bool {
        CORE_CRITERIA.contains(self)
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Criterion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CORE_CRITERIA
            .into_iter()
            .chain(OPTIONAL_CRITERIA)
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown criterion: {}", s))
    }
}

/// What the generating model was asked to do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestInput {
    pub source_text: String,
    pub instruction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_output: Option<String>,
}

/// What the generating model produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestOutput {
    pub model_name: String,
    pub generated_text: String,
}

/// A request to judge one piece of generated text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeRequest {
    pub request_id: String,
    pub task_type: TaskType,
    pub input: RequestInput,
    pub output: RequestOutput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// A single criterion's score with the judge's reasoning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub criterion: Criterion,
    /// Integer in 1..=5 (enforced by the result schema).
    #[serde(deserialize_with = "deserialize_score")]
    pub score: u8,
    pub reasoning: String,
}

impl CriterionScore {
    pub fn new(criterion: Criterion, score: u8, reasoning: impl Into<String>) -> Self {
        Self {
            criterion,
            score,
            reasoning: reasoning.into(),
        }
    }
}

/// Accept `4` and `4.0` alike; JSON Schema treats both as integers.
fn deserialize_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    struct ScoreVisitor;

    impl<'v> Visitor<'v> for ScoreVisitor {
        type Value = u8;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("an integer score between 0 and 255")
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<u8, E> {
            u8::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<u8, E> {
            u8::try_from(v).map_err(|_| E::invalid_value(de::Unexpected::Signed(v), &self))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<u8, E> {
            if v.fract() == 0.0 && (0.0..=255.0).contains(&v) {
                Ok(v as u8)
            } else {
                Err(E::invalid_value(de::Unexpected::Float(v), &self))
            }
        }
    }

    deserializer.deserialize_any(ScoreVisitor)
}

/// The derived verdict for a result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverallScore {
    /// In `[floor, 5]`, rounded to two decimals.
    pub weighted_score: f64,
    pub pass: bool,
    pub conciseness_penalty_applied: bool,
}

/// The outcome of judging one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeResult {
    pub request_id: String,
    pub judge_model: String,
    pub scores: Vec<CriterionScore>,
    /// Always recomputed by the scorer; never taken from the judge.
    pub overall: OverallScore,
    pub format_valid: bool,
    /// Unparsed judge output, kept for audit when the format gate fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl JudgeResult {
    /// First score reported for `criterion`, if any.
    pub fn score_for(&self, criterion: Criterion) -> Option<&CriterionScore> {
        find_score(&self.scores, criterion)
    }
}

/// Lookup by criterion name; the first match wins when a criterion repeats.
pub fn find_score(scores: &[CriterionScore], criterion: Criterion) -> Option<&CriterionScore> {
    scores.iter().find(|s| s.criterion == criterion)
}
