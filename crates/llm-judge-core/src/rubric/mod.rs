//! Rubric configuration: criteria, weight presets and prompt templates.
//!
//! A [`Rubric`] is loaded once, either from the files compiled into this
//! crate or from a directory with the same layout, and is read-only
//! afterwards. Share it as `Arc<Rubric>` across concurrent evaluations.
//!
//! Directory layout:
//!
//! ```text
//! rubric/
//!   criteria_v1.json            (or .yaml / .yml)
//!   weights_presets_v1.json     (or .yaml / .yml)
//!   prompts/
//!     system_judge.txt
//!     uc1_summarization.txt
//!     uc2_report_generation.txt
//!     uc3_report_qa.txt
//! ```

mod criteria;
mod prompts;
mod weights;

pub use criteria::{format_criteria_block, CriteriaFile, CriterionDefinition, ScoreAnchors};
pub use prompts::{render_user_prompt, template_file, PromptTemplates, SYSTEM_PROMPT_FILE};
pub use weights::{ConcisenessPenalty, WeightsConfig, WeightsFile};

use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::types::{Criterion, JudgeRequest, TaskType};

const EMBEDDED_CRITERIA: &str = include_str!("../../../../rubric/criteria_v1.json");
const EMBEDDED_WEIGHTS: &str = include_str!("../../../../rubric/weights_presets_v1.json");
const EMBEDDED_SYSTEM_PROMPT: &str = include_str!("../../../../rubric/prompts/system_judge.txt");
const EMBEDDED_SUMMARIZATION: &str =
    include_str!("../../../../rubric/prompts/uc1_summarization.txt");
const EMBEDDED_REPORT_GENERATION: &str =
    include_str!("../../../../rubric/prompts/uc2_report_generation.txt");
const EMBEDDED_REPORT_QA: &str = include_str!("../../../../rubric/prompts/uc3_report_qa.txt");

const CRITERIA_STEM: &str = "criteria_v1";
const WEIGHTS_STEM: &str = "weights_presets_v1";

/// Errors from loading or querying rubric configuration.
#[derive(Error, Debug)]
pub enum RubricError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse JSON in {origin}: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse YAML in {origin}: {source}")]
    Yaml {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("No {stem}.json, .yaml or .yml found in {dir}")]
    MissingFile { stem: &'static str, dir: PathBuf },

    #[error("No weight preset found for task type: {0}")]
    MissingPreset(TaskType),
}

/// Criteria definitions, weight presets and prompt templates.
#[derive(Debug, Clone)]
pub struct Rubric {
    criteria: CriteriaFile,
    weights: WeightsFile,
    prompts: PromptTemplates,
}

impl Rubric {
    /// Assemble a rubric from already-loaded parts.
    pub fn new(criteria: CriteriaFile, weights: WeightsFile, prompts: PromptTemplates) -> Self {
        Self {
            criteria,
            weights,
            prompts,
        }
    }

    /// The rubric compiled into this crate.
    pub fn embedded() -> Result<Self, RubricError> {
        let criteria = parse_json(EMBEDDED_CRITERIA, "embedded criteria")?;
        let weights = parse_json(EMBEDDED_WEIGHTS, "embedded weights")?;
        let prompts = PromptTemplates {
            system: EMBEDDED_SYSTEM_PROMPT.to_string(),
            summarization: EMBEDDED_SUMMARIZATION.to_string(),
            report_generation: EMBEDDED_REPORT_GENERATION.to_string(),
            report_qa: EMBEDDED_REPORT_QA.to_string(),
        };
        Ok(Self::new(criteria, weights, prompts))
    }

    /// Load a rubric from a directory laid out like the embedded one.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, RubricError> {
        let dir = dir.as_ref();
        tracing::debug!(dir = %dir.display(), "loading rubric");

        let criteria = load_structured(&find_structured(dir, CRITERIA_STEM)?)?;
        let weights = load_structured(&find_structured(dir, WEIGHTS_STEM)?)?;

        let prompts_dir = dir.join("prompts");
        let prompts = PromptTemplates {
            system: read_text(&prompts_dir.join(SYSTEM_PROMPT_FILE))?,
            summarization: read_text(&prompts_dir.join(template_file(TaskType::Summarization)))?,
            report_generation: read_text(
                &prompts_dir.join(template_file(TaskType::ReportGeneration)),
            )?,
            report_qa: read_text(&prompts_dir.join(template_file(TaskType::ReportQa)))?,
        };

        Ok(Self::new(criteria, weights, prompts))
    }

    /// Every criterion definition, core and optional.
    pub fn all_criteria(&self) -> &[CriterionDefinition] {
        self.criteria.all()
    }

    /// Definitions for the criteria every result must report.
    pub fn core_criteria(&self) -> Vec<&CriterionDefinition> {
        self.criteria.core()
    }

    pub fn criterion(&self, criterion: Criterion) -> Option<&CriterionDefinition> {
        self.criteria.get(criterion)
    }

    pub fn criteria_version(&self) -> &str {
        &self.criteria.version
    }

    pub fn weights_version(&self) -> &str {
        &self.weights.version
    }

    pub fn criteria_file(&self) -> &CriteriaFile {
        &self.criteria
    }

    pub fn weights_file(&self) -> &WeightsFile {
        &self.weights
    }

    pub fn prompts(&self) -> &PromptTemplates {
        &self.prompts
    }

    /// Scoring configuration for a task type.
    ///
    /// Fails when the loaded presets have no entry for the task; that is a
    /// configuration error, not a data error.
    pub fn weights_for_task(&self, task_type: TaskType) -> Result<WeightsConfig, RubricError> {
        self.weights
            .config_for(task_type)
            .ok_or(RubricError::MissingPreset(task_type))
    }

    pub fn system_prompt(&self) -> &str {
        &self.prompts.system
    }

    /// The literal user prompt sent to a judge for this request.
    pub fn build_user_prompt(&self, request: &JudgeRequest) -> String {
        let block = format_criteria_block(self.core_criteria());
        render_user_prompt(self.prompts.template(request.task_type), request, &block)
    }
}

fn find_structured(dir: &Path, stem: &'static str) -> Result<PathBuf, RubricError> {
    ["json", "yaml", "yml"]
        .iter()
        .map(|ext| dir.join(format!("{}.{}", stem, ext)))
        .find(|p| p.is_file())
        .ok_or_else(|| RubricError::MissingFile {
            stem,
            dir: dir.to_path_buf(),
        })
}

fn read_text(path: &Path) -> Result<String, RubricError> {
    fs::read_to_string(path).map_err(|source| RubricError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn load_structured<T: DeserializeOwned>(path: &Path) -> Result<T, RubricError> {
    let contents = read_text(path)?;
    let origin = path.display().to_string();
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => {
            serde_yaml::from_str(&contents).map_err(|source| RubricError::Yaml { origin, source })
        }
        _ => parse_json(&contents, &origin),
    }
}

fn parse_json<T: DeserializeOwned>(contents: &str, origin: &str) -> Result<T, RubricError> {
    serde_json::from_str(contents).map_err(|source| RubricError::Json {
        origin: origin.to_string(),
        source,
    })
}
