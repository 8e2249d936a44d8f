use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use llm_judge_core::SchemaKind;

/// llm-judge - LLM-as-a-Judge evaluation framework
#[derive(Parser, Debug)]
#[command(name = "llm-judge", version, about = "LLM-as-a-Judge evaluation framework")]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a JSON file against the request or result schema
    Validate(ValidateArgs),

    /// Run evaluation on a judge request
    Run(RunArgs),

    /// Aggregate multiple evaluation results
    Aggregate(AggregateArgs),
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the JSON file
    #[arg(long = "json", value_name = "PATH")]
    pub json: PathBuf,

    /// Schema to validate against
    #[arg(long, value_enum, default_value_t = SchemaArg::Result)]
    pub schema: SchemaArg,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the request JSON file
    #[arg(long = "json", value_name = "PATH")]
    pub json: PathBuf,

    /// Judge provider (openai or gemini)
    #[arg(long)]
    pub provider: String,

    /// Judge model override
    #[arg(long)]
    pub model: Option<String>,

    /// Sampling temperature override
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Write the result here instead of stdout
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Load the rubric from this directory instead of the built-in one
    #[arg(long, env = "LLM_JUDGE_RUBRIC_DIR", value_name = "DIR")]
    pub rubric_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct AggregateArgs {
    /// Result JSON files
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Write the summary here instead of stdout
    #[arg(long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchemaArg {
    Request,
    Result,
}

impl From<SchemaArg> for SchemaKind {
    fn from(arg: SchemaArg) -> Self {
        match arg {
            SchemaArg::Request => SchemaKind::Request,
            SchemaArg::Result => SchemaKind::Result,
        }
    }
}
