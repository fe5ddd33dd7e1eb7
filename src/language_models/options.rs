use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Generation settings shared by every model in a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallOptions {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub stop_words: Option<Vec<String>>,
    /// Per-call timeout in seconds.
    pub timeout: Option<u64>,
}

impl CallOptions {
    pub fn new() -> Self {
        CallOptions::default()
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_stop_words(mut self, stop_words: Vec<String>) -> Self {
        self.stop_words = Some(stop_words);
        self
    }

    pub fn with_timeout(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout_duration(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }

    pub fn merge_options(&mut self, incoming_options: CallOptions) {
        // For simple scalar types wrapped in Option, prefer incoming option if it is Some
        self.max_tokens = incoming_options.max_tokens.or(self.max_tokens);
        self.temperature = incoming_options.temperature.or(self.temperature);
        self.top_p = incoming_options.top_p.or(self.top_p);
        self.timeout = incoming_options.timeout.or(self.timeout);

        // Stop words accumulate; a word already present is not added twice
        if let Some(new_stop_words) = incoming_options.stop_words {
            let existing_stop_words = self.stop_words.get_or_insert_with(Vec::new);
            for word in new_stop_words {
                if !existing_stop_words.contains(&word) {
                    existing_stop_words.push(word);
                }
            }
        }
    }
}
