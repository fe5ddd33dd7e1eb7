//! Top-level error type.
//!
//! Each module keeps its own error enum; `BenchError` gathers them so callers
//! that drive a whole run can propagate with `?`.

pub use crate::comparison::{QueryFileError, RunError, TableError};
pub use crate::config::ConfigError;
pub use crate::language_models::LLMError;
pub use crate::prompt::PromptError;

#[derive(thiserror::Error, Debug)]
pub enum BenchError {
    #[error("LLM error: {0}")]
    LLMError(#[from] LLMError),

    #[error("Prompt error: {0}")]
    PromptError(#[from] PromptError),

    #[error("Query file error: {0}")]
    QueryFileError(#[from] QueryFileError),

    #[error("Table error: {0}")]
    TableError(#[from] TableError),

    #[error("Run error: {0}")]
    RunError(#[from] RunError),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_error_conversion() {
        let bench_error: BenchError = RunError::NoModels.into();

        match bench_error {
            BenchError::RunError(_) => {}
            _ => panic!("Expected RunError variant"),
        }
    }

    #[test]
    fn test_llm_error_conversion() {
        let llm_error = LLMError::OtherError("throttled".to_string());
        let bench_error: BenchError = llm_error.into();

        match bench_error {
            BenchError::LLMError(_) => {}
            _ => panic!("Expected LLMError variant"),
        }
        assert_eq!(
            BenchError::from(LLMError::OtherError("x".into())).to_string(),
            "LLM error: Error: x"
        );
    }

    #[test]
    fn test_config_error_conversion() {
        let bench_error: BenchError = ConfigError::NoVariants.into();

        match bench_error {
            BenchError::ConfigError(_) => {}
            _ => panic!("Expected ConfigError variant"),
        }
    }
}
