use std::{
    collections::VecDeque,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    language_models::{llm::LLM, options::CallOptions, GenerateResult, LLMError, TokenUsage},
    schemas::Message,
};

#[derive(Debug, Clone)]
enum Reply {
    Echo,
    Fixed(String),
    Scripted(VecDeque<Result<String, String>>),
}

#[derive(Debug)]
struct FakeState {
    reply: Reply,
    calls: Vec<Vec<Message>>,
    options: CallOptions,
}

/// Offline stand-in for a hosted model.
///
/// Clones share state, so a clone handed to a runner still reports every
/// conversation it was sent.
#[derive(Debug, Clone)]
pub struct FakeLLM {
    state: Arc<Mutex<FakeState>>,
    delay: Option<Duration>,
}

impl Default for FakeLLM {
    fn default() -> Self {
        Self::echo()
    }
}

impl FakeLLM {
    fn with_reply(reply: Reply) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                reply,
                calls: Vec::new(),
                options: CallOptions::default(),
            })),
            delay: None,
        }
    }

    /// Answers with the content of the last human message.
    pub fn echo() -> Self {
        Self::with_reply(Reply::Echo)
    }

    /// Answers every call with the same text.
    pub fn fixed<S: Into<String>>(reply: S) -> Self {
        Self::with_reply(Reply::Fixed(reply.into()))
    }

    /// Answers calls from a queue; `Err` entries fail that call. Once the
    /// queue is drained every further call fails.
    pub fn scripted<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = Result<String, String>>,
    {
        Self::with_reply(Reply::Scripted(replies.into_iter().collect()))
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Options merged in through [`LLM::add_options`].
    pub fn options(&self) -> CallOptions {
        self.lock().options.clone()
    }

    /// Every conversation received so far, in call order.
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn word_count(text: &str) -> u32 {
    text.split_whitespace().count() as u32
}

#[async_trait]
impl LLM for FakeLLM {
    async fn generate(&self, messages: &[Message]) -> Result<GenerateResult, LLMError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = {
            let mut state = self.lock();
            state.calls.push(messages.to_vec());
            let reply = match &mut state.reply {
                Reply::Echo => Ok(messages
                    .iter()
                    .rev()
                    .find(|m| m.is_human())
                    .map(|m| m.content.clone())
                    .unwrap_or_default()),
                Reply::Fixed(text) => Ok(text.clone()),
                Reply::Scripted(queue) => queue
                    .pop_front()
                    .unwrap_or_else(|| Err("no scripted reply left".to_string())),
            };
            reply
        };

        let generation = reply.map_err(LLMError::OtherError)?;
        let prompt_tokens = messages.iter().map(|m| word_count(&m.content)).sum();
        Ok(GenerateResult::new(generation.clone())
            .with_tokens(TokenUsage::new(prompt_tokens, word_count(&generation))))
    }

    fn add_options(&mut self, options: CallOptions) {
        self.lock().options.merge_options(options)
    }
}
