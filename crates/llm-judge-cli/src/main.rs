//! llm-judge - LLM-as-a-Judge evaluation CLI
//!
//! Validates requests and results against their schemas, runs a judge
//! over a request, and aggregates results. JSON goes to stdout; logs go
//! to stderr. A `.env` file in the working directory is loaded first.

mod cli;
mod commands;
mod logging;

use std::process::ExitCode;

use clap::Parser;

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    // Variables already set in the environment take precedence over `.env`.
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    if let Err(e) = logging::init_tracing(cli.verbose, cli.log_json) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    match commands::dispatch(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "fatal");
            eprintln!("error: {:#}", e);
            ExitCode::from(commands::FATAL)
        }
    }
}
