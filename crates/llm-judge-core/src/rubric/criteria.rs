//! Criterion definitions and their score anchors.

use serde::{Deserialize, Serialize};

use crate::types::Criterion;

/// Anchor descriptions for the low, middle and high end of the scale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreAnchors {
    pub score_1: String,
    pub score_3: String,
    pub score_5: String,
}

/// How a single criterion is described to the judge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionDefinition {
    pub criterion: Criterion,
    pub description: String,
    pub anchors: ScoreAnchors,
    #[serde(default)]
    pub optional: bool,
}

/// On-disk layout of `criteria_v1.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriteriaFile {
    pub version: String,
    pub criteria: Vec<CriterionDefinition>,
}

impl CriteriaFile {
    pub fn all(&self) -> &[CriterionDefinition] {
        &self.criteria
    }

    /// Definitions not marked optional, in file order.
    pub fn core(&self) -> Vec<&CriterionDefinition> {
        self.criteria.iter().filter(|c| !c.optional).collect()
    }

    pub fn get(&self, criterion: Criterion) -> Option<&CriterionDefinition> {
        self.criteria.iter().find(|c| c.criterion == criterion)
    }
}

/// Render definitions as the markdown block embedded in judge prompts.
pub fn format_criteria_block<'a>(
    criteria: impl IntoIterator<Item = &'a CriterionDefinition>,
) -> String {
    criteria
        .into_iter()
        .map(|c| {
            format!(
                "### {}\n{}\n- Score 1: {}\n- Score 3: {}\n- Score 5: {}",
                c.criterion, c.description, c.anchors.score_1, c.anchors.score_3, c.anchors.score_5
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(criterion: Criterion, optional: bool) -> CriterionDefinition {
        CriterionDefinition {
            criterion,
            description: format!("About {}", criterion),
            anchors: ScoreAnchors {
                score_1: "bad".to_string(),
                score_3: "okay".to_string(),
                score_5: "great".to_string(),
            },
            optional,
        }
    }

    #[test]
    fn test_format_block_layout() {
        let defs = [
            definition(Criterion::Accuracy, false),
            definition(Criterion::Clarity, false),
        ];
        let block = format_criteria_block(&defs);
        assert_eq!(
            block,
            "### accuracy\nAbout accuracy\n- Score 1: bad\n- Score 3: okay\n- Score 5: great\n\n\
             ### clarity\nAbout clarity\n- Score 1: bad\n- Score 3: okay\n- Score 5: great"
        );
    }

    #[test]
    fn test_core_filters_optional() {
        let file = CriteriaFile {
            version: "1.0".to_string(),
            criteria: vec![
                definition(Criterion::Accuracy, false),
                definition(Criterion::Actionability, true),
            ],
        };
        assert_eq!(file.all().len(), 2);
        assert_eq!(file.core().len(), 1);
        assert!(file.get(Criterion::Actionability).is_some());
        assert!(file.get(Criterion::Clarity).is_none());
    }
}
