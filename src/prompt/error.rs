use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Variable '{0}' is not provided in the prompt arguments")]
    MissingVariable(String),

    #[error("Template references unknown variable '{0}'")]
    UnknownVariable(String),

    #[error("Unclosed placeholder starting at byte {0}")]
    UnclosedPlaceholder(usize),

    #[error("Closing brace without a placeholder at byte {0}")]
    UnopenedPlaceholder(usize),

    #[error("Invalid placeholder name: '{0}'")]
    InvalidPlaceholder(String),

    #[error(transparent)]
    RegexError(#[from] regex::Error),
}
