pub mod client;
pub mod error;
pub mod models;

pub use client::Bedrock;
pub use error::BedrockError;
pub use models::{supports_system_prompt, BedrockModel};
