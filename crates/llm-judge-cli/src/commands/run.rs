use std::sync::Arc;

use anyhow::Context;

use llm_judge_core::{JudgeRequest, Rubric, Schemas};
use llm_judge_runtime::{JudgeOptions, JudgeRegistry, RunOptions, Runner};

use super::{emit_json, read_json, INVALID, SUCCESS};
use crate::cli::RunArgs;

pub async fn execute(args: &RunArgs) -> anyhow::Result<u8> {
    let data = read_json(&args.json)?;
    let schemas = Arc::new(Schemas::compile()?);

    let request: JudgeRequest = match schemas.request().parse(data) {
        Ok(request) => request,
        Err(errors) => {
            tracing::error!(file = %args.json.display(), "invalid request");
            for error in &errors {
                eprintln!("  {}", error);
            }
            return Ok(INVALID);
        }
    };

    let rubric = match &args.rubric_dir {
        Some(dir) => Rubric::from_dir(dir)
            .with_context(|| format!("Failed to load rubric from {}", dir.display()))?,
        None => Rubric::embedded()?,
    };

    let runner = Runner::builder()
        .rubric(Arc::new(rubric))
        .schemas(schemas)
        .registry(JudgeRegistry::with_defaults())
        .build()?;

    let mut judge_options = JudgeOptions::new();
    if let Some(model) = &args.model {
        judge_options = judge_options.model(model.as_str());
    }
    if let Some(temperature) = args.temperature {
        judge_options = judge_options.temperature(temperature);
    }
    let options = RunOptions::new(args.provider.as_str()).with_judge_options(judge_options);

    let result = runner
        .run_evaluation(&request, &options)
        .await
        .with_context(|| format!("Evaluation failed for request {}", request.request_id))?;

    emit_json(&result, args.output.as_deref())?;
    Ok(SUCCESS)
}
