use async_trait::async_trait;
use uuid::Uuid;

use super::client::{ChatBackend, ConversationClient};
use super::message::ConversationMessage;
use crate::error::Result;

/// One user's conversation with the generative service.
///
/// The session owns the single shared history. Sweep traffic and interactive
/// turns go through the same value, so both appear in one timeline. A session
/// lives as long as the front-end that created it and is never persisted.
pub struct ChatSession<B> {
    id: String,
    created_at: String,
    backend: B,
    history: Vec<ConversationMessage>,
}

impl<B: ChatBackend> ChatSession<B> {
    /// Starts a new session with empty history.
    pub fn new(backend: B) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            backend,
            history: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// Every completed exchange so far, oldest first.
    pub fn history(&self) -> &[ConversationMessage] {
        &self.history
    }
}

#[async_trait]
impl<B: ChatBackend> ConversationClient for ChatSession<B> {
    async fn send(&mut self, text: &str) -> Result<String> {
        self.history.push(ConversationMessage::user(text));

        match self.backend.generate(&self.history).await {
            Ok(reply) => {
                self.history.push(ConversationMessage::model(reply.clone()));
                Ok(reply)
            }
            Err(err) => {
                // A failed turn never reaches the history.
                self.history.pop();
                tracing::debug!(session_id = %self.id, "Rolled back failed turn: {}", err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MessageRole;
    use crate::testing::ScriptedBackend;
    use std::sync::Arc;

    #[tokio::test]
    async fn send_appends_user_and_model_turns() {
        let mut session = ChatSession::new(ScriptedBackend::echo());

        let reply = session.send("hello").await.unwrap();

        assert_eq!(reply, "echo: hello");
        let history = session.history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, MessageRole::User);
        assert_eq!(history[0].content, "hello");
        assert_eq!(history[1].role, MessageRole::Model);
        assert_eq!(history[1].content, "echo: hello");
    }

    #[tokio::test]
    async fn backend_sees_the_whole_history() {
        let backend = Arc::new(ScriptedBackend::echo());
        let mut session = ChatSession::new(Arc::clone(&backend));

        session.send("first").await.unwrap();
        session.send("second").await.unwrap();

        // The second request carried user, model, user.
        assert_eq!(backend.history_lengths(), vec![1, 3]);
    }

    #[tokio::test]
    async fn failed_turn_is_rolled_back() {
        let mut session = ChatSession::new(ScriptedBackend::echo().failing_on(&[1]));

        session.send("ok").await.unwrap();
        let err = session.send("boom").await.unwrap_err();
        assert!(err.is_service());
        assert_eq!(session.history().len(), 2);

        session.send("again").await.unwrap();
        assert_eq!(session.history().len(), 4);
        assert_eq!(session.history()[2].content, "again");
    }

    #[test]
    fn sessions_have_distinct_ids() {
        let a = ChatSession::new(ScriptedBackend::echo());
        let b = ChatSession::new(ScriptedBackend::echo());
        assert_ne!(a.id(), b.id());
        assert!(!a.created_at().is_empty());
    }
}
