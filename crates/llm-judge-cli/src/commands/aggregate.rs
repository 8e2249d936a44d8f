use anyhow::Context;

use llm_judge_core::{aggregate_results, JudgeResult};

use super::{emit_json, read_json, SUCCESS};
use crate::cli::AggregateArgs;

pub fn execute(args: &AggregateArgs) -> anyhow::Result<u8> {
    let results = args
        .files
        .iter()
        .map(|path| {
            let value = read_json(path)?;
            serde_json::from_value::<JudgeResult>(value)
                .with_context(|| format!("{} is not a judge result", path.display()))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    tracing::info!(count = results.len(), "aggregating results");

    let aggregated = aggregate_results(&results);
    emit_json(&aggregated, args.output.as_deref())?;
    Ok(SUCCESS)
}
