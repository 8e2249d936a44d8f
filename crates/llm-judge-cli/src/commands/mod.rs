mod aggregate;
mod run;
mod validate;

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use serde::Serialize;

use crate::cli::{Cli, Commands};

/// Exit status when the command did what was asked.
pub const SUCCESS: u8 = 0;
/// Exit status when the input failed validation.
pub const INVALID: u8 = 1;
/// Exit status for any other failure.
pub const FATAL: u8 = 2;

pub async fn dispatch(cli: Cli) -> anyhow::Result<ExitCode> {
    let code = match cli.command {
        Commands::Validate(args) => validate::execute(&args)?,
        Commands::Run(args) => run::execute(&args).await?,
        Commands::Aggregate(args) => aggregate::execute(&args)?,
    };
    Ok(ExitCode::from(code))
}

fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse JSON in {}", path.display()))
}

/// Pretty JSON with a trailing newline, to `output` or stdout.
fn emit_json<T: Serialize>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');

    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "output written");
        }
        None => print!("{}", text),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_json_writes_pretty_with_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        emit_json(&serde_json::json!({ "a": 1 }), Some(&path)).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "{\n  \"a\": 1\n}\n");
    }

    #[test]
    fn test_read_json_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ nope").unwrap();

        let err = read_json(&path).unwrap_err();
        assert!(format!("{err:#}").contains("bad.json"));
    }
}
