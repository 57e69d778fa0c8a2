use crate::{Error, Result};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessageArgs,
    ChatCompletionRequestUserMessageContent,
};

/// A message sent to the chat completions endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatMessage {
    System(String),
    User(String),
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System(content.into())
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User(content.into())
    }

    pub fn to_openai_message(&self) -> Result<ChatCompletionRequestMessage> {
        match self {
            Self::System(content) => {
                let msg = ChatCompletionRequestSystemMessageArgs::default()
                    .content(ChatCompletionRequestSystemMessageContent::Text(
                        content.clone(),
                    ))
                    .build()
                    .map_err(|e| Error::llm(format!("Failed to build system message: {}", e)))?;
                Ok(msg.into())
            }
            Self::User(content) => {
                let msg = ChatCompletionRequestUserMessageArgs::default()
                    .content(ChatCompletionRequestUserMessageContent::Text(
                        content.clone(),
                    ))
                    .build()
                    .map_err(|e| Error::llm(format!("Failed to build user message: {}", e)))?;
                Ok(msg.into())
            }
        }
    }
}
