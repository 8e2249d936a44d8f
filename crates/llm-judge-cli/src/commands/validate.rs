use serde::Serialize;

use llm_judge_core::{SchemaKind, Schemas};

use super::{emit_json, read_json, INVALID, SUCCESS};
use crate::cli::ValidateArgs;

#[derive(Debug, Serialize)]
struct ValidationReport {
    valid: bool,
    file: String,
    schema: SchemaKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<String>>,
}

pub fn execute(args: &ValidateArgs) -> anyhow::Result<u8> {
    let data = read_json(&args.json)?;
    let schemas = Schemas::compile()?;
    let kind = SchemaKind::from(args.schema);

    let validation = schemas.get(kind).validate(&data);
    let file = args.json.display().to_string();

    if validation.valid {
        tracing::info!(file = %file, schema = %kind, "validation passed");
    } else {
        tracing::error!(file = %file, schema = %kind, errors = validation.errors.len(), "validation failed");
    }

    let report = ValidationReport {
        valid: validation.valid,
        file,
        schema: kind,
        errors: (!validation.valid).then_some(validation.errors),
    };
    emit_json(&report, None)?;

    Ok(if report.valid { SUCCESS } else { INVALID })
}
