use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Targets the default filter applies to.
const TARGETS: [&str; 3] = ["llm_judge", "llm_judge_core", "llm_judge_runtime"];

/// Install the stderr subscriber. stdout is reserved for JSON output.
///
/// `LLM_JUDGE_LOG`, then `RUST_LOG`, override the level picked by
/// `--verbose`.
pub fn init_tracing(verbose: bool, log_json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let level = if verbose { "debug" } else { "info" };

    let filter = EnvFilter::try_from_env("LLM_JUDGE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));

    let registry = tracing_subscriber::registry().with(filter);

    if log_json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()?;
    } else {
        registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()?;
    }

    Ok(())
}

fn default_directives(level: &str) -> String {
    TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}
