use std::path::{Path, PathBuf};

use crate::{
    language_models::{llm::LLM, options::CallOptions, UsageMetadata},
    prompt::ConversationTemplate,
};

use super::{FailurePolicy, ModelId, QueryRunner, ResultTable, RunError, TableError};

/// A named prompt setup, e.g. "few-shot".
#[derive(Debug, Clone)]
pub struct PromptVariant {
    pub name: String,
    pub template: ConversationTemplate,
}

impl PromptVariant {
    pub fn new<S: Into<String>>(name: S, template: ConversationTemplate) -> Self {
        Self {
            name: name.into(),
            template,
        }
    }
}

/// Runs the same examples through every prompt variant against the same
/// set of models.
#[derive(Clone, Default)]
pub struct Comparison {
    models: Vec<(ModelId, Box<dyn LLM>)>,
    variants: Vec<PromptVariant>,
    options: CallOptions,
    failure_policy: FailurePolicy,
}

impl Comparison {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model<M, L>(mut self, model: M, llm: L) -> Self
    where
        M: Into<ModelId>,
        L: Into<Box<dyn LLM>>,
    {
        self.models.push((model.into(), llm.into()));
        self
    }

    pub fn with_variant(mut self, variant: PromptVariant) -> Self {
        self.variants.push(variant);
        self
    }

    pub fn with_variants<I: IntoIterator<Item = PromptVariant>>(mut self, variants: I) -> Self {
        self.variants.extend(variants);
        self
    }

    pub fn with_options(mut self, options: CallOptions) -> Self {
        self.options.merge_options(options);
        self
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    pub fn variants(&self) -> &[PromptVariant] {
        &self.variants
    }

    pub fn model_ids(&self) -> Vec<ModelId> {
        self.models.iter().map(|(id, _)| id.clone()).collect()
    }

    fn runner_for(&self, variant: &PromptVariant) -> QueryRunner {
        QueryRunner::new(variant.template.clone())
            .with_options(self.options.clone())
            .with_failure_policy(self.failure_policy)
            .with_models(self.models.iter().cloned())
    }

    pub async fn run(&self, examples: &[String]) -> Result<ComparisonReport, RunError> {
        if self.variants.is_empty() {
            return Err(RunError::NoVariants);
        }
        for (i, variant) in self.variants.iter().enumerate() {
            if self.variants[..i].iter().any(|v| v.name == variant.name) {
                return Err(RunError::DuplicateVariant(variant.name.clone()));
            }
        }

        let mut report = ComparisonReport::default();
        for variant in &self.variants {
            log::info!("Prompt variant '{}'", variant.name);
            let table = self.runner_for(variant).run(examples).await?;
            report.tables.push(VariantTable {
                name: variant.name.clone(),
                table,
            });
        }
        Ok(report)
    }
}

#[derive(Debug, Clone)]
pub struct VariantTable {
    pub name: String,
    pub table: ResultTable,
}

/// One result table per prompt variant, in the order the variants ran.
#[derive(Debug, Clone, Default)]
pub struct ComparisonReport {
    tables: Vec<VariantTable>,
}

impl ComparisonReport {
    pub fn get(&self, variant: &str) -> Option<&ResultTable> {
        self.tables
            .iter()
            .find(|t| t.name == variant)
            .map(|t| &t.table)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariantTable> {
        self.tables.iter()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    /// Token usage per model, summed over every variant.
    pub fn usage(&self) -> UsageMetadata {
        let mut usage = UsageMetadata::new();
        for variant in &self.tables {
            usage.merge(variant.table.usage());
        }
        usage
    }

    pub fn to_markdown(&self) -> String {
        self.tables
            .iter()
            .map(|t| format!("## {}\n\n{}", t.name, t.table.to_markdown()))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Write `<variant>.csv` for every variant into `dir`, returning the
    /// paths written.
    pub fn write_csv_dir<P: AsRef<Path>>(&self, dir: P) -> Result<Vec<PathBuf>, TableError> {
        let dir = dir.as_ref();
        let paths = self.csv_paths(dir)?;
        std::fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(self.tables.len());
        for (variant, path) in self.tables.iter().zip(paths) {
            let file = std::fs::File::create(&path)?;
            variant.table.write_csv(file)?;
            log::info!("Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }

    /// One file per variant; two names that sanitise to the same file are
    /// rejected before anything is written.
    fn csv_paths(&self, dir: &Path) -> Result<Vec<PathBuf>, TableError> {
        let mut paths: Vec<PathBuf> = Vec::with_capacity(self.tables.len());
        for (i, variant) in self.tables.iter().enumerate() {
            let path = dir.join(format!("{}.csv", file_stem(&variant.name)));
            if let Some(j) = paths.iter().position(|p| p == &path) {
                return Err(TableError::FileNameCollision {
                    first: self.tables[j].name.clone(),
                    second: self.tables[i].name.clone(),
                    path,
                });
            }
            paths.push(path);
        }
        Ok(paths)
    }
}

fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}
