use serde::{Deserialize, Serialize};

use crate::schemas::Message;

use super::{PromptError, PromptTemplate};
use crate::prompt_args;

/// A demonstration exchange shown to the model before the real query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FewShotExample {
    pub input: String,
    pub output: String,
}

impl FewShotExample {
    pub fn new<S: Into<String>>(input: S, output: S) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// Shapes a user query into the conversation a model receives.
///
/// The rendered conversation is always:
///
/// 1. one system message holding the instruction (empty when there is none),
/// 2. one human/ai pair per few-shot example, in order,
/// 3. the query as the final human message.
///
/// Exemplar inputs and the query both go through the human template, so the
/// demonstrations look exactly like the real turn.
#[derive(Debug, Clone)]
pub struct ConversationTemplate {
    instruction: Option<String>,
    examples: Vec<FewShotExample>,
    human_template: PromptTemplate,
}

impl Default for ConversationTemplate {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationTemplate {
    pub fn new() -> Self {
        Self {
            instruction: None,
            examples: Vec::new(),
            human_template: PromptTemplate::input_only(),
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

    pub fn with_example(mut self, example: FewShotExample) -> Self {
        self.examples.push(example);
        self
    }

    /// Replace the human-turn template. It must reference `{input}` and no
    /// other variable.
    pub fn with_human_template<S: Into<String>>(mut self, template: S) -> Result<Self, PromptError> {
        let template = PromptTemplate::new(template)?;
        let variables = template.variables();
        if !variables.iter().any(|v| v == "input") {
            return Err(PromptError::MissingVariable("input".to_string()));
        }
        if let Some(unknown) = variables.into_iter().find(|v| v != "input") {
            return Err(PromptError::UnknownVariable(unknown));
        }
        self.human_template = template;
        Ok(self)
    }

    pub fn instruction(&self) -> Option<&str> {
        self.instruction.as_deref()
    }

    pub fn examples(&self) -> &[FewShotExample] {
        &self.examples
    }

    pub fn human_template(&self) -> &str {
        self.human_template.template()
    }

    fn render_human(&self, input: &str) -> Result<String, PromptError> {
        self.human_template.format(&prompt_args! { "input" => input })
    }

    pub fn format_messages(&self, query: &str) -> Result<Vec<Message>, PromptError> {
        let mut messages = Vec::with_capacity(2 + self.examples.len() * 2);
        messages.push(Message::new_system_message(
            self.instruction.clone().unwrap_or_default(),
        ));
        for example in &self.examples {
            messages.push(Message::new_human_message(self.render_human(&example.input)?));
            messages.push(Message::new_ai_message(example.output.clone()));
        }
        messages.push(Message::new_human_message(self.render_human(query)?));
        Ok(messages)
    }
}
