//! # travel-agent-bench
//!
//! Prototype a "virtual travel agent" on Amazon Bedrock by asking several
//! foundation models the same travel questions under different prompt setups
//! and putting the answers side by side.
//!
//! ## Overview
//!
//! - **Prompts**: an optional instruction, few-shot exemplars and a template
//!   for the human turn, rendered into a conversation per query
//! - **Models**: an async `LLM` trait with a Bedrock Converse implementation
//!   and an offline `FakeLLM`
//! - **Comparison**: runs every query against every model and collects the
//!   answers into a table per prompt variant, rendered as Markdown or CSV
//! - **Config**: a TOML file listing models, options and prompt variants
//!
//! ## Example
//!
//! ```ignore
//! use travel_agent_bench::comparison::{load_queries, QueryRunner};
//! use travel_agent_bench::llm::{Bedrock, BedrockModel};
//! use travel_agent_bench::prompt::{ConversationTemplate, FewShotExample};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let bedrock = Bedrock::new().await?;
//! let template = ConversationTemplate::new()
//!     .with_instruction("You are a virtual travel agent.")
//!     .with_example(FewShotExample::new("Paris in May?", "Absolutely! ..."));
//!
//! let runner = QueryRunner::new(template)
//!     .with_model(BedrockModel::Claude3Haiku, bedrock.clone().with_model(BedrockModel::Claude3Haiku.as_str()))
//!     .with_model(BedrockModel::Llama38BInstruct, bedrock.with_model(BedrockModel::Llama38BInstruct.as_str()));
//!
//! let table = runner.run(&load_queries("queries.txt").await?).await?;
//! println!("{}", table);
//! # Ok(()) }
//! ```

/// Query files, the query runner, result tables and prompt-variant comparisons.
pub mod comparison;
/// TOML run configuration.
pub mod config;
/// Top-level error type.
pub mod error;
/// Common LLM trait, options, token usage and errors.
pub mod language_models;
/// LLM implementations: Bedrock (feature `bedrock`) and an offline fake.
pub mod llm;
/// Templates and few-shot conversations.
pub mod prompt;
/// Chat messages.
pub mod schemas;

