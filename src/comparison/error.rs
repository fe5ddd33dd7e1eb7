use std::{io, path::PathBuf};

use thiserror::Error;

use crate::{language_models::LLMError, prompt::PromptError};

use super::ModelId;

#[derive(Error, Debug)]
pub enum QueryFileError {
    #[error("Failed to read query file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Query file {0} contains no queries")]
    Empty(PathBuf),
}

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Duplicate column: {0}")]
    DuplicateColumn(ModelId),

    #[error("Row for example {example:?} does not match the table columns (missing: {missing:?}, unexpected: {unexpected:?})")]
    ColumnMismatch {
        example: String,
        missing: Vec<ModelId>,
        unexpected: Vec<ModelId>,
    },

    #[error("Variants {first:?} and {second:?} would both be written to {path}")]
    FileNameCollision {
        first: String,
        second: String,
        path: PathBuf,
    },

    #[error(transparent)]
    CsvError(#[from] csv::Error),

    #[error(transparent)]
    IOError(#[from] io::Error),
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("No model registered")]
    NoModels,

    #[error("Model registered twice: {0}")]
    DuplicateModel(ModelId),

    #[error("No prompt variant registered")]
    NoVariants,

    #[error("Prompt variant registered twice: {0}")]
    DuplicateVariant(String),

    #[error("Model {model} failed on example #{example_index}: {source}")]
    Model {
        model: ModelId,
        example_index: usize,
        #[source]
        source: LLMError,
    },

    #[error("Prompt error: {0}")]
    PromptError(#[from] PromptError),

    #[error("Table error: {0}")]
    TableError(#[from] TableError),
}
