//! Prompt templates and user-prompt assembly.
//!
//! Templates use `{{name}}` placeholders plus one conditional section,
//! `{{#reference_output}}...{{/reference_output}}`, kept only when the
//! request carries a non-empty reference output.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use crate::types::{JudgeRequest, TaskType};

lazy_static! {
    /// The conditional reference-output section, body captured.
    static ref REFERENCE_SECTION: Regex =
        Regex::new(r"(?s)\{\{#reference_output\}\}(.*?)\{\{/reference_output\}\}").unwrap();
}

pub const SYSTEM_PROMPT_FILE: &str = "system_judge.txt";

/// File names of the per-task templates inside a `prompts/` directory.
pub fn template_file(task_type: TaskType) -> &'static str {
    match task_type {
        TaskType::Summarization => "uc1_summarization.txt",
        TaskType::ReportGeneration => "uc2_report_generation.txt",
        TaskType::ReportQa => "uc3_report_qa.txt",
    }
}

/// The system prompt and one user template per task type.
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub system: String,
    pub summarization: String,
    pub report_generation: String,
    pub report_qa: String,
}

impl PromptTemplates {
    pub fn template(&self, task_type: TaskType) -> &str {
        match task_type {
            TaskType::Summarization => &self.summarization,
            TaskType::ReportGeneration => &self.report_generation,
            TaskType::ReportQa => &self.report_qa,
        }
    }
}

/// Fill a template with request fields and the rendered criteria block.
///
/// Each placeholder is replaced once, in a fixed order.
pub fn render_user_prompt(template: &str, request: &JudgeRequest, criteria_block: &str) -> String {
    let mut prompt = template
        .replacen("{{source_text}}", &request.input.source_text, 1)
        .replacen("{{instruction}}", &request.input.instruction, 1)
        .replacen("{{generated_text}}", &request.output.generated_text, 1)
        .replacen("{{request_id}}", &request.request_id, 1)
        .replacen("{{criteria_block}}", criteria_block, 1);

    match request.input.reference_output.as_deref() {
        Some(reference) if !reference.is_empty() => {
            prompt = REFERENCE_SECTION
                .replace(&prompt, |caps: &Captures<'_>| caps[1].to_string())
                .into_owned();
            prompt = prompt.replacen("{{reference_output}}", reference, 1);
        }
        _ => {
            prompt = REFERENCE_SECTION.replace(&prompt, "").into_owned();
        }
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RequestInput, RequestOutput};

    const TEMPLATE: &str = "ID {{request_id}}\nQ {{instruction}}\nS {{source_text}}\n\
{{#reference_output}}REF: {{reference_output}}\n{{/reference_output}}G {{generated_text}}\nC {{criteria_block}}";

    fn request(reference: Option<&str>) -> JudgeRequest {
        JudgeRequest {
            request_id: "r-9".to_string(),
            task_type: TaskType::Summarization,
            input: RequestInput {
                source_text: "source".to_string(),
                instruction: "do it".to_string(),
                reference_output: reference.map(str::to_string),
            },
            output: RequestOutput {
                model_name: "m".to_string(),
                generated_text: "generated".to_string(),
            },
            metadata: None,
        }
    }

    #[test]
    fn test_substitutes_all_placeholders() {
        let prompt = render_user_prompt(TEMPLATE, &request(None), "### accuracy");
        assert_eq!(prompt, "ID r-9\nQ do it\nS source\nG generated\nC ### accuracy");
    }

    #[test]
    fn test_keeps_reference_section_when_present() {
        let prompt = render_user_prompt(TEMPLATE, &request(Some("the ref")), "block");
        assert!(prompt.contains("REF: the ref\n"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_drops_reference_section_when_empty() {
        let prompt = render_user_prompt(TEMPLATE, &request(Some("")), "block");
        assert!(!prompt.contains("REF:"));
        assert_eq!(prompt, render_user_prompt(TEMPLATE, &request(None), "block"));
    }

    #[test]
    fn test_dollar_signs_in_reference_are_literal() {
        let prompt = render_user_prompt(TEMPLATE, &request(Some("costs $1 and $2")), "block");
        assert!(prompt.contains("REF: costs $1 and $2"));
    }

    #[test]
    fn test_template_file_names() {
        assert_eq!(template_file(TaskType::Summarization), "uc1_summarization.txt");
        assert_eq!(template_file(TaskType::ReportQa), "uc3_report_qa.txt");
    }
}
