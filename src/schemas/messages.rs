use serde::{Deserialize, Serialize};

/// Role of a message within a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display)]
pub enum MessageType {
    #[strum(serialize = "system")]
    #[serde(rename = "system")]
    SystemMessage,
    #[strum(serialize = "human")]
    #[serde(rename = "human")]
    HumanMessage,
    #[strum(serialize = "ai")]
    #[serde(rename = "ai")]
    AIMessage,
}

impl Default for MessageType {
    fn default() -> Self {
        Self::HumanMessage
    }
}

/// A single turn of a conversation sent to a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Message {
    pub content: String,
    pub message_type: MessageType,
}

impl Message {
    pub fn new<S: Into<String>>(message_type: MessageType, content: S) -> Self {
        Message {
            content: content.into(),
            message_type,
        }
    }

    pub fn new_system_message<S: Into<String>>(content: S) -> Self {
        Self::new(MessageType::SystemMessage, content)
    }

    pub fn new_human_message<S: Into<String>>(content: S) -> Self {
        Self::new(MessageType::HumanMessage, content)
    }

    pub fn new_ai_message<S: Into<String>>(content: S) -> Self {
        Self::new(MessageType::AIMessage, content)
    }

    pub fn is_system(&self) -> bool {
        self.message_type == MessageType::SystemMessage
    }

    pub fn is_human(&self) -> bool {
        self.message_type == MessageType::HumanMessage
    }

    pub fn is_ai(&self) -> bool {
        self.message_type == MessageType::AIMessage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        assert!(Message::new_system_message("be brief").is_system());
        assert!(Message::new_human_message("hi").is_human());
        assert!(Message::new_ai_message("hello").is_ai());
    }

    #[test]
    fn test_message_type_display() {
        assert_eq!(MessageType::SystemMessage.to_string(), "system");
        assert_eq!(MessageType::HumanMessage.to_string(), "human");
        assert_eq!(MessageType::AIMessage.to_string(), "ai");
    }

    #[test]
    fn test_message_serde_role_names() {
        let message = Message::new_ai_message("Sure!");
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["message_type"], "ai");
        assert_eq!(json["content"], "Sure!");
    }
}
