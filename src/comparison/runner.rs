use serde::{Deserialize, Serialize};

use crate::{
    language_models::{llm::LLM, options::CallOptions, GenerateResult, LLMError},
    prompt::ConversationTemplate,
    schemas::Message,
};

use super::{Cell, ModelId, ResultRow, ResultTable, RunError};

/// What the runner does when a model call fails.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FailurePolicy {
    /// Keep the error in the table and move on.
    #[default]
    Record,
    /// Stop the run at the first failure.
    Abort,
}

/// Sends every example to every registered model, one call at a time.
///
/// Examples are the outer loop and models the inner one, so the calls go out
/// row by row in the order the table is filled.
#[derive(Clone)]
pub struct QueryRunner {
    template: ConversationTemplate,
    models: Vec<(ModelId, Box<dyn LLM>)>,
    options: CallOptions,
    failure_policy: FailurePolicy,
}

impl QueryRunner {
    pub fn new(template: ConversationTemplate) -> Self {
        Self {
            template,
            models: Vec::new(),
            options: CallOptions::default(),
            failure_policy: FailurePolicy::default(),
        }
    }

    pub fn with_model<M, L>(mut self, model: M, llm: L) -> Self
    where
        M: Into<ModelId>,
        L: Into<Box<dyn LLM>>,
    {
        let mut llm = llm.into();
        llm.add_options(self.options.clone());
        self.models.push((model.into(), llm));
        self
    }

    pub fn with_models<I, M>(self, models: I) -> Self
    where
        I: IntoIterator<Item = (M, Box<dyn LLM>)>,
        M: Into<ModelId>,
    {
        models
            .into_iter()
            .fold(self, |runner, (model, llm)| runner.with_model(model, llm))
    }

    /// Options apply to models already registered and to those added later.
    pub fn with_options(mut self, options: CallOptions) -> Self {
        for (_, llm) in self.models.iter_mut() {
            llm.add_options(options.clone());
        }
        self.options.merge_options(options);
        self
    }

    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    pub fn template(&self) -> &ConversationTemplate {
        &self.template
    }

    pub fn model_ids(&self) -> Vec<ModelId> {
        self.models.iter().map(|(id, _)| id.clone()).collect()
    }

    fn check_models(&self) -> Result<(), RunError> {
        if self.models.is_empty() {
            return Err(RunError::NoModels);
        }
        for (i, (id, _)) in self.models.iter().enumerate() {
            if self.models[..i].iter().any(|(other, _)| other == id) {
                return Err(RunError::DuplicateModel(id.clone()));
            }
        }
        Ok(())
    }

    async fn call(&self, llm: &dyn LLM, messages: &[Message]) -> Result<GenerateResult, LLMError> {
        match self.options.timeout_duration() {
            Some(limit) => tokio::time::timeout(limit, llm.generate(messages)).await?,
            None => llm.generate(messages).await,
        }
    }

    pub async fn run(&self, examples: &[String]) -> Result<ResultTable, RunError> {
        self.check_models()?;
        let mut table = ResultTable::new(self.model_ids())?;

        log::info!(
            "Running {} example(s) against {} model(s)",
            examples.len(),
            self.models.len()
        );

        for (index, example) in examples.iter().enumerate() {
            let messages = self.template.format_messages(example)?;
            let mut row = ResultRow::new(example.clone());

            for (model, llm) in &self.models {
                log::debug!("Example #{} -> {}", index, model);
                log::trace!("{}", llm.messages_to_string(&messages));
                let cell = match self.call(llm.as_ref(), &messages).await {
                    Ok(result) => Cell::response(result.generation, result.tokens),
                    Err(error) => match self.failure_policy {
                        FailurePolicy::Abort => {
                            return Err(RunError::Model {
                                model: model.clone(),
                                example_index: index,
                                source: error,
                            })
                        }
                        FailurePolicy::Record => {
                            log::warn!("{} failed on example #{}: {}", model, index, error);
                            Cell::failed(error.to_string())
                        }
                    },
                };
                row.insert(model.clone(), cell);
            }

            table.push_row(row)?;
        }

        log::info!(
            "Finished: {} cell(s), {} failure(s)",
            table.cell_count(),
            table.failures()
        );
        Ok(table)
    }
}
