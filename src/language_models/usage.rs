use crate::language_models::TokenUsage;
use std::collections::HashMap;

/// Aggregated usage metadata across multiple model invocations.
///
/// Tracks token usage per model so a comparison run can report what each
/// model consumed.
///
/// # Example
/// ```rust,ignore
/// let mut usage = UsageMetadata::new();
/// usage.add_usage("anthropic.claude-3-haiku-20240307-v1:0", &token_usage);
/// usage.add_usage("anthropic.claude-3-haiku-20240307-v1:0", &token_usage2);
/// let total = usage.get_total_usage("anthropic.claude-3-haiku-20240307-v1:0");
/// ```
#[derive(Debug, Clone, Default)]
pub struct UsageMetadata {
    usage_by_model: HashMap<String, TokenUsage>,
}

impl UsageMetadata {
    pub fn new() -> Self {
        Self {
            usage_by_model: HashMap::new(),
        }
    }

    /// Add token usage for a specific model.
    pub fn add_usage(&mut self, model: &str, usage: &TokenUsage) {
        let entry = self
            .usage_by_model
            .entry(model.to_string())
            .or_insert_with(|| TokenUsage::new(0, 0));
        entry.add(usage);
    }

    /// Get total usage for a specific model.
    pub fn get_total_usage(&self, model: &str) -> Option<&TokenUsage> {
        self.usage_by_model.get(model)
    }

    /// Get all usage data.
    pub fn get_all_usage(&self) -> &HashMap<String, TokenUsage> {
        &self.usage_by_model
    }

    /// Sum over every model.
    pub fn total(&self) -> TokenUsage {
        self.usage_by_model
            .values()
            .fold(TokenUsage::default(), |acc, usage| acc.sum(usage))
    }

    pub fn is_empty(&self) -> bool {
        self.usage_by_model.is_empty()
    }

    /// Merge another UsageMetadata into this one.
    pub fn merge(&mut self, other: UsageMetadata) {
        for (model, usage) in other.usage_by_model {
            self.add_usage(&model, &usage);
        }
    }
}
