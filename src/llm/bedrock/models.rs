use std::fmt;

use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, Message as BedrockMessage, SystemContentBlock,
};

use crate::language_models::LLMError;
use crate::schemas::{Message, MessageType};

use super::BedrockError;

/// Foundation models commonly compared for the travel assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BedrockModel {
    /// Claude 3 Haiku
    Claude3Haiku,
    /// Claude 3 Sonnet
    Claude3Sonnet,
    /// Claude 3.5 Sonnet
    Claude35Sonnet,
    /// Llama 3 8B Instruct
    Llama38BInstruct,
    /// Llama 3 70B Instruct
    Llama370BInstruct,
    /// Mistral 7B Instruct
    Mistral7BInstruct,
    /// Mistral Large (24.02)
    MistralLarge,
    /// Titan Text G1 Express
    TitanTextExpress,
    /// Titan Text G1 Lite
    TitanTextLite,
    /// Cohere Command R
    CohereCommandR,
}

impl BedrockModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BedrockModel::Claude3Haiku => "anthropic.claude-3-haiku-20240307-v1:0",
            BedrockModel::Claude3Sonnet => "anthropic.claude-3-sonnet-20240229-v1:0",
            BedrockModel::Claude35Sonnet => "anthropic.claude-3-5-sonnet-20240620-v1:0",
            BedrockModel::Llama38BInstruct => "meta.llama3-8b-instruct-v1:0",
            BedrockModel::Llama370BInstruct => "meta.llama3-70b-instruct-v1:0",
            BedrockModel::Mistral7BInstruct => "mistral.mistral-7b-instruct-v0:2",
            BedrockModel::MistralLarge => "mistral.mistral-large-2402-v1:0",
            BedrockModel::TitanTextExpress => "amazon.titan-text-express-v1",
            BedrockModel::TitanTextLite => "amazon.titan-text-lite-v1",
            BedrockModel::CohereCommandR => "cohere.command-r-v1:0",
        }
    }

    /// The models a comparison run uses when none are configured.
    pub fn default_comparison_set() -> Vec<BedrockModel> {
        vec![
            BedrockModel::Claude3Haiku,
            BedrockModel::Claude3Sonnet,
            BedrockModel::Llama38BInstruct,
            BedrockModel::Mistral7BInstruct,
            BedrockModel::TitanTextExpress,
        ]
    }
}

impl fmt::Display for BedrockModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the Converse API accepts a `system` field for this model.
///
/// Model ids may carry a cross-region inference profile prefix such as
/// `us.`, so the check is on substrings.
pub fn supports_system_prompt(model_id: &str) -> bool {
    const NO_SYSTEM_PROMPT: [&str; 3] = [
        "amazon.titan-text",
        "mistral.mistral-7b-instruct",
        "mistral.mixtral-8x7b-instruct",
    ];
    !NO_SYSTEM_PROMPT
        .iter()
        .any(|family| model_id.contains(family))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TurnRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConverseTurn {
    pub role: TurnRole,
    pub text: String,
}

/// A conversation reshaped to what the Converse API accepts: an optional
/// system text and strictly alternating turns starting with the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ConversePrompt {
    pub system: Option<String>,
    pub turns: Vec<ConverseTurn>,
}

impl ConversePrompt {
    pub fn from_messages(messages: &[Message], supports_system: bool) -> Result<Self, LLMError> {
        let system_parts: Vec<&str> = messages
            .iter()
            .filter(|m| m.message_type == MessageType::SystemMessage)
            .map(|m| m.content.trim())
            .filter(|content| !content.is_empty())
            .collect();
        let mut system = if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join("\n\n"))
        };

        let mut turns: Vec<ConverseTurn> = Vec::new();
        for message in messages {
            let role = match message.message_type {
                MessageType::SystemMessage => continue,
                MessageType::HumanMessage => TurnRole::User,
                MessageType::AIMessage => TurnRole::Assistant,
            };
            match turns.last_mut() {
                Some(last) if last.role == role => {
                    last.text.push_str("\n\n");
                    last.text.push_str(&message.content);
                }
                _ => turns.push(ConverseTurn {
                    role,
                    text: message.content.clone(),
                }),
            }
        }

        match turns.first_mut() {
            None => {
                return Err(LLMError::InvalidConversation(
                    "conversation has no user message".to_string(),
                ))
            }
            Some(first) if first.role != TurnRole::User => {
                return Err(LLMError::InvalidConversation(
                    "conversation must start with a user message".to_string(),
                ))
            }
            Some(first) => {
                if !supports_system {
                    if let Some(instruction) = system.take() {
                        first.text = format!("{}\n\n{}", instruction, first.text);
                    }
                }
            }
        }

        Ok(Self { system, turns })
    }

    pub fn into_bedrock_parts(
        self,
    ) -> Result<(Option<Vec<SystemContentBlock>>, Vec<BedrockMessage>), BedrockError> {
        let system = self.system.map(|text| vec![SystemContentBlock::Text(text)]);
        let messages = self
            .turns
            .into_iter()
            .map(|turn| {
                let role = match turn.role {
                    TurnRole::User => ConversationRole::User,
                    TurnRole::Assistant => ConversationRole::Assistant,
                };
                BedrockMessage::builder()
                    .role(role)
                    .content(ContentBlock::Text(turn.text))
                    .build()
                    .map_err(|e| BedrockError::RequestBuildError(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok((system, messages))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn few_shot_conversation(instruction: &str) -> Vec<Message> {
        vec![
            Message::new_system_message(instruction),
            Message::new_human_message("Paris in June?"),
            Message::new_ai_message("Absolutely! How many nights?"),
            Message::new_human_message("A weekend in Rome"),
        ]
    }

    #[test]
    fn test_system_prompt_support() {
        assert!(supports_system_prompt(BedrockModel::Claude3Haiku.as_str()));
        assert!(supports_system_prompt(BedrockModel::Llama38BInstruct.as_str()));
        assert!(!supports_system_prompt(BedrockModel::TitanTextExpress.as_str()));
        assert!(!supports_system_prompt(BedrockModel::Mistral7BInstruct.as_str()));
        assert!(supports_system_prompt("us.anthropic.claude-3-haiku-20240307-v1:0"));
    }

    #[test]
    fn test_system_goes_to_system_field() {
        let prompt =
            ConversePrompt::from_messages(&few_shot_conversation("You are a travel agent."), true)
                .unwrap();
        assert_eq!(prompt.system.as_deref(), Some("You are a travel agent."));
        assert_eq!(prompt.turns.len(), 3);
        assert_eq!(prompt.turns[0].role, TurnRole::User);
        assert_eq!(prompt.turns[1].role, TurnRole::Assistant);
        assert_eq!(prompt.turns[2].text, "A weekend in Rome");
    }

    #[test]
    fn test_empty_instruction_is_omitted() {
        let prompt = ConversePrompt::from_messages(&few_shot_conversation(""), true).unwrap();
        assert_eq!(prompt.system, None);

        let folded = ConversePrompt::from_messages(&few_shot_conversation("  "), false).unwrap();
        assert_eq!(folded.turns[0].text, "Paris in June?");
    }

    #[test]
    fn test_instruction_folds_into_first_user_turn() {
        let prompt =
            ConversePrompt::from_messages(&few_shot_conversation("You are a travel agent."), false)
                .unwrap();
        assert_eq!(prompt.system, None);
        assert_eq!(
            prompt.turns[0].text,
            "You are a travel agent.\n\nParis in June?"
        );
        assert_eq!(prompt.turns.len(), 3);
    }

    #[test]
    fn test_consecutive_turns_are_merged() {
        let messages = vec![
            Message::new_human_message("Hi"),
            Message::new_human_message("I need a hotel"),
        ];
        let prompt = ConversePrompt::from_messages(&messages, true).unwrap();
        assert_eq!(prompt.turns.len(), 1);
        assert_eq!(prompt.turns[0].text, "Hi\n\nI need a hotel");
    }

    #[test]
    fn test_rejects_conversations_without_leading_user() {
        let only_system = vec![Message::new_system_message("be nice")];
        assert!(ConversePrompt::from_messages(&only_system, true).is_err());

        let ai_first = vec![Message::new_ai_message("Hello"), Message::new_human_message("Hi")];
        assert!(ConversePrompt::from_messages(&ai_first, true).is_err());
    }

    #[test]
    fn test_into_bedrock_parts() {
        let prompt =
            ConversePrompt::from_messages(&few_shot_conversation("You are a travel agent."), true)
                .unwrap();
        let (system, messages) = prompt.into_bedrock_parts().unwrap();
        assert_eq!(system.map(|s| s.len()), Some(1));
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role(), &ConversationRole::User);
        assert_eq!(messages[1].role(), &ConversationRole::Assistant);
    }

    #[test]
    fn test_default_comparison_set() {
        let models = BedrockModel::default_comparison_set();
        assert!((4..=7).contains(&models.len()));
        assert_eq!(
            BedrockModel::Claude3Haiku.to_string(),
            "anthropic.claude-3-haiku-20240307-v1:0"
        );
    }
}
