//! Run configuration, read from a TOML file.
//!
//! ```toml
//! queries_file = "queries.txt"
//! models = ["anthropic.claude-3-haiku-20240307-v1:0"]
//!
//! [options]
//! max_tokens = 512
//!
//! [[variants]]
//! name = "few-shot"
//! instruction = "You are a virtual travel agent."
//!
//! [[variants.examples]]
//! input = "Can I see the northern lights in March?"
//! output = "Absolutely! March is one of the best months."
//! ```

use std::{
    collections::HashSet,
    io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    comparison::{FailurePolicy, ModelId, PromptVariant},
    language_models::options::CallOptions,
    prompt::{ConversationTemplate, FewShotExample, PromptError},
};

/// Model ids compared when a configuration names none of its own.
pub const DEFAULT_MODELS: [&str; 5] = [
    "anthropic.claude-3-haiku-20240307-v1:0",
    "anthropic.claude-3-sonnet-20240229-v1:0",
    "meta.llama3-8b-instruct-v1:0",
    "mistral.mistral-7b-instruct-v0:2",
    "amazon.titan-text-express-v1",
];

pub const DEFAULT_QUERIES_FILE: &str = "queries.txt";

const TRAVEL_AGENT_INSTRUCTION: &str = "You are a virtual travel agent. \
Help the traveller plan their trip: suggest destinations, the best time to go, \
and practical tips. Keep answers short and friendly.";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config lists no models")]
    NoModels,

    #[error("Config lists model {0} more than once")]
    DuplicateModel(String),

    #[error("Config lists no prompt variants")]
    NoVariants,

    #[error("Config lists prompt variant {0} more than once")]
    DuplicateVariant(String),

    #[error("Prompt variant {variant}: {source}")]
    Prompt {
        variant: String,
        #[source]
        source: PromptError,
    },
}

/// One `[[variants]]` entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VariantConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub human_template: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<FewShotExample>,
}

impl VariantConfig {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_instruction<S: Into<String>>(mut self, instruction: S) -> Self {
        self.instruction = Some(instruction.into());
        self
    }

    pub fn with_examples(mut self, examples: Vec<FewShotExample>) -> Self {
        self.examples = examples;
        self
    }

    pub fn into_variant(self) -> Result<PromptVariant, ConfigError> {
        let mut template = ConversationTemplate::new().with_examples(self.examples);
        if let Some(instruction) = self.instruction {
            template = template.with_instruction(instruction);
        }
        if let Some(human_template) = self.human_template {
            template = template
                .with_human_template(human_template)
                .map_err(|source| ConfigError::Prompt {
                    variant: self.name.clone(),
                    source,
                })?;
        }
        Ok(PromptVariant::new(self.name, template))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchConfig {
    #[serde(default = "default_queries_file")]
    pub queries_file: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default = "default_models")]
    pub models: Vec<String>,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    #[serde(default)]
    pub options: CallOptions,
    #[serde(default)]
    pub variants: Vec<VariantConfig>,
}

fn default_queries_file() -> PathBuf {
    PathBuf::from(DEFAULT_QUERIES_FILE)
}

fn default_models() -> Vec<String> {
    DEFAULT_MODELS.iter().map(|m| m.to_string()).collect()
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self::travel_agent()
    }
}

impl BenchConfig {
    /// The built-in setup: the default models, each asked the same queries
    /// with no system prompt, with a system prompt, and with few-shot
    /// exemplars.
    pub fn travel_agent() -> Self {
        let examples = vec![
            FewShotExample::new(
                "I'd like to see the cherry blossoms in Japan.",
                "Absolutely! Late March to early April is peak season. Kyoto and Tokyo \
                 are the classic picks; book early as hotels fill up fast.",
            ),
            FewShotExample::new(
                "Where can I go skiing in Europe in February?",
                "Absolutely! The Alps are at their best in February. Try Zermatt in \
                 Switzerland or Val d'Isère in France for reliable snow.",
            ),
        ];

        Self {
            queries_file: default_queries_file(),
            region: None,
            models: default_models(),
            failure_policy: FailurePolicy::default(),
            options: CallOptions::default(),
            variants: vec![
                VariantConfig::new("no-system-prompt"),
                VariantConfig::new("system-prompt").with_instruction(TRAVEL_AGENT_INSTRUCTION),
                VariantConfig::new("few-shot")
                    .with_instruction(TRAVEL_AGENT_INSTRUCTION)
                    .with_examples(examples),
            ],
        }
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let mut config: BenchConfig = toml::from_str(text)?;
        if config.variants.is_empty() {
            config.variants = Self::travel_agent().variants;
        }
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a config file. A relative `queries_file` is taken
    /// from the config file's directory.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = Self::from_toml_str(&text)?;
        if let Some(dir) = path.parent() {
            config.queries_file = resolve_path(dir, &config.queries_file);
        }
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.models.is_empty() {
            return Err(ConfigError::NoModels);
        }
        let mut seen = HashSet::new();
        for model in &self.models {
            if !seen.insert(model.as_str()) {
                return Err(ConfigError::DuplicateModel(model.clone()));
            }
        }

        if self.variants.is_empty() {
            return Err(ConfigError::NoVariants);
        }
        let mut seen = HashSet::new();
        for variant in &self.variants {
            if !seen.insert(variant.name.as_str()) {
                return Err(ConfigError::DuplicateVariant(variant.name.clone()));
            }
        }
        Ok(())
    }

    pub fn model_ids(&self) -> Vec<ModelId> {
        self.models.iter().map(|m| ModelId::new(m.as_str())).collect()
    }

    /// Build the prompt variants, keeping only the named ones when `only` is
    /// non-empty.
    pub fn prompt_variants(&self, only: &[String]) -> Result<Vec<PromptVariant>, ConfigError> {
        self.variants
            .iter()
            .filter(|v| only.is_empty() || only.contains(&v.name))
            .cloned()
            .map(VariantConfig::into_variant)
            .collect()
    }
}

fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
