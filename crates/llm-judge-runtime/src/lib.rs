//! # llm-judge-runtime
//!
//! Judge providers and the evaluation runner for llm-judge.
//!
//! This crate is where remote calls happen. Everything after the judge
//! returns text (format gate, scoring, aggregation) is the deterministic
//! code in `llm-judge-core`.
//!
//! Providers are behind cargo features:
//! - `openai`: chat-completion judge
//! - `gemini`: generative-content judge
//! - `all-providers`: both
//!
//! ## Example
//!
//! ```rust,ignore
//! use llm_judge_runtime::{JudgeOptions, RunOptions, Runner};
//!
//! let runner = Runner::builder().build()?;
//! let options = RunOptions::new("openai")
//!     .with_judge_options(JudgeOptions::new().model("gpt-4o-mini"));
//!
//! let result = runner.run_evaluation(&request, &options).await?;
//! println!("{} pass={}", result.overall.weighted_score, result.overall.pass);
//! ```
//!
//! No retries, timeouts or cancellation happen here. Wrap the judge or
//! the future if a caller needs them.

pub mod providers;
pub mod runner;

pub use providers::{
    ApiCredential, CredentialSource, JudgeFactory, JudgeOptions, JudgePrompt, JudgeProvider,
    JudgeRegistry, ProviderError,
};
pub use runner::{RunError, RunOptions, Runner, RunnerBuilder};

#[cfg(feature = "gemini")]
pub use providers::{GeminiJudge, GeminiJudgeFactory};
#[cfg(feature = "openai")]
pub use providers::{OpenAiJudge, OpenAiJudgeFactory};
