//! Conversation message types.
//!
//! This module contains types for representing messages exchanged with the
//! generative service, including roles and message content.

use serde::{Deserialize, Serialize};

/// Represents the author of a message, in the service's own terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message sent by the user (interactive turn or sweep call).
    User,
    /// Message produced by the model.
    Model,
}

impl MessageRole {
    /// Role name used on the wire by the generative API.
    pub fn as_api_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Model => "model",
        }
    }

    /// Role name shown to the user. The model speaks as the "assistant".
    pub fn display_name(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Model => "assistant",
        }
    }
}

/// A single message in the shared conversation history.
///
/// Each message has a role, content, and a timestamp indicating when it was
/// added to the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
    /// Timestamp when the message was created (RFC 3339 format).
    pub timestamp: String,
}

impl ConversationMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Model, content)
    }
}
