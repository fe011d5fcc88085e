//! Seams between the sweep/chat logic and the generative service.

use async_trait::async_trait;

use super::message::ConversationMessage;
use crate::error::Result;

/// A stateless generator: given the whole conversation so far, produce the
/// next model turn.
///
/// Implemented by the HTTP backend in production and by scripted stubs in
/// tests.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Generates the reply to the last user message in `history`.
    ///
    /// `history` always ends with a [`MessageRole::User`](super::MessageRole::User) message.
    async fn generate(&self, history: &[ConversationMessage]) -> Result<String>;
}

/// A stateful conversation: each call depends on and extends every prior
/// call made through the same value.
///
/// Callers must keep at most one `send` in flight per client; the `&mut self`
/// receiver enforces that.
#[async_trait]
pub trait ConversationClient: Send {
    /// Sends one message and returns the model's reply as opaque text.
    async fn send(&mut self, text: &str) -> Result<String>;
}

#[async_trait]
impl<C: ConversationClient + ?Sized> ConversationClient for Box<C> {
    async fn send(&mut self, text: &str) -> Result<String> {
        (**self).send(text).await
    }
}

#[async_trait]
impl<B: ChatBackend + ?Sized> ChatBackend for std::sync::Arc<B> {
    async fn generate(&self, history: &[ConversationMessage]) -> Result<String> {
        (**self).generate(history).await
    }
}
