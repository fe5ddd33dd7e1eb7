use crate::{
    language_models::{llm::LLM, options::CallOptions, GenerateResult, LLMError, TokenUsage},
    llm::BedrockError,
    schemas::Message,
};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_bedrockruntime::operation::converse::ConverseOutput as ConverseResponse;
use aws_sdk_bedrockruntime::types::{ContentBlock, ConverseOutput, InferenceConfiguration};
use aws_sdk_bedrockruntime::Client as BedrockClient;
use std::sync::Arc;

use super::models::{supports_system_prompt, BedrockModel, ConversePrompt};

/// AWS Bedrock client speaking the Converse API.
///
/// Converse takes the same request shape for every model family, which is
/// what lets one conversation be sent unchanged to Claude, Llama, Mistral and
/// Titan models.
#[derive(Clone)]
pub struct Bedrock {
    model: String,
    options: CallOptions,
    client: Arc<BedrockClient>,
}

impl Bedrock {
    /// Create a new Bedrock client with credentials and region from the
    /// environment.
    pub async fn new() -> Result<Self, LLMError> {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Ok(Self::from_client(BedrockClient::new(&config)))
    }

    /// Create a new Bedrock client pinned to `region`.
    pub async fn with_region_config<S: Into<String>>(region: S) -> Result<Self, LLMError> {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.into()))
            .load()
            .await;
        Ok(Self::from_client(BedrockClient::new(&config)))
    }

    pub fn from_client(client: BedrockClient) -> Self {
        Self {
            model: BedrockModel::Claude3Haiku.to_string(),
            options: CallOptions::default(),
            client: Arc::new(client),
        }
    }

    /// Set the model
    pub fn with_model<S: Into<String>>(mut self, model: S) -> Self {
        self.model = model.into();
        self
    }

    /// Set call options
    pub fn with_options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn region(&self) -> Option<String> {
        self.client.config().region().map(|r| r.to_string())
    }

    fn inference_config(&self) -> InferenceConfiguration {
        InferenceConfiguration::builder()
            .set_max_tokens(self.options.max_tokens.map(|t| t as i32))
            .set_temperature(self.options.temperature)
            .set_top_p(self.options.top_p)
            .set_stop_sequences(self.options.stop_words.clone())
            .build()
    }

    /// Generates text using the Bedrock Converse API
    async fn converse(&self, messages: &[Message]) -> Result<GenerateResult, LLMError> {
        let prompt = ConversePrompt::from_messages(messages, supports_system_prompt(&self.model))?;
        let (system, bedrock_messages) = prompt.into_bedrock_parts()?;

        log::debug!(
            "Invoking {} with {} turn(s), system prompt: {}",
            self.model,
            bedrock_messages.len(),
            system.is_some()
        );

        let response = self
            .client
            .converse()
            .model_id(&self.model)
            .set_system(system)
            .set_messages(Some(bedrock_messages))
            .inference_config(self.inference_config())
            .send()
            .await
            .map_err(BedrockError::from)?;

        let generation = response_text(&response)?;
        let tokens = response.usage().map(|usage| {
            TokenUsage::new(
                usage.input_tokens().max(0) as u32,
                usage.output_tokens().max(0) as u32,
            )
        });

        Ok(GenerateResult { tokens, generation })
    }
}

/// Concatenated text blocks of the output message.
fn response_text(response: &ConverseResponse) -> Result<String, LLMError> {
    match response.output() {
        Some(ConverseOutput::Message(message)) => Ok(message
            .content()
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")),
        _ => Err(LLMError::ContentNotFound("output.message".to_string())),
    }
}

#[async_trait]
impl LLM for Bedrock {
    async fn generate(&self, messages: &[Message]) -> Result<GenerateResult, LLMError> {
        self.converse(messages).await
    }

    fn add_options(&mut self, options: CallOptions) {
        self.options.merge_options(options)
    }
}
