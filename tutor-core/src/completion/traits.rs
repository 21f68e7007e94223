//! CompletionCapability trait and prompt types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CompletionError;

/// Role of a prompt message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message in a prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Structured prompt passed to the completion capability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptContext {
    /// System instruction
    pub system: String,
    /// Conversation messages, oldest first
    pub messages: Vec<PromptMessage>,
}

impl PromptContext {
    /// Create a context with only a system instruction
    pub fn system(instruction: impl Into<String>) -> Self {
        Self {
            system: instruction.into(),
            messages: Vec::new(),
        }
    }

    /// Append a message
    pub fn with_message(mut self, message: PromptMessage) -> Self {
        self.messages.push(message);
        self
    }
}

/// Trait for language-model completion backends
///
/// Implementations handle the actual remote call; the engine only sees
/// generated text or a typed failure. Calls may be slow, so every call site
/// goes through [`super::generate_bounded`].
#[async_trait]
pub trait CompletionCapability: Send + Sync {
    /// Generate text for the given prompt
    async fn generate(&self, ctx: PromptContext) -> Result<String, CompletionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_context_builder_appends_messages() {
        let ctx = PromptContext::system("teach")
            .with_message(PromptMessage::user("hello"))
            .with_message(PromptMessage::assistant("hi"));

        assert_eq!(ctx.system, "teach");
        assert_eq!(ctx.messages.len(), 2);
        assert_eq!(ctx.messages[0].role, Role::User);
        assert_eq!(ctx.messages[1].role, Role::Assistant);
    }

    #[test]
    fn prompt_message_serialization_uses_snake_case_roles() {
        let json = serde_json::to_string(&PromptMessage::user("x")).unwrap();
        assert!(json.contains("\"user\""));
    }
}
