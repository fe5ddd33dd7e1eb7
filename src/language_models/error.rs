use thiserror::Error;
use tokio::time::error::Elapsed;

#[cfg(feature = "bedrock")]
use crate::llm::BedrockError;

#[derive(Error, Debug)]
pub enum LLMError {
    #[cfg(feature = "bedrock")]
    #[error("Bedrock error: {0}")]
    BedrockError(#[from] BedrockError),

    #[error("Operation timed out")]
    Timeout(#[from] Elapsed),

    #[error("Invalid conversation: {0}")]
    InvalidConversation(String),

    #[error("Content not found in response: Expected at {0}")]
    ContentNotFound(String),

    #[error("Error: {0}")]
    OtherError(String),
}
