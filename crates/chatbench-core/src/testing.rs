//! Deterministic stand-ins for the generative service.
//!
//! Built for this crate's tests and, through the `testing` feature, for the
//! tests of dependent crates, so sweeps and chat turns run without network
//! access.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

use crate::error::{ChatbenchError, Result};
use crate::session::{ChatBackend, ConversationClient, ConversationMessage};

/// A [`ChatBackend`] that echoes the last user message.
///
/// Calls are numbered from 0; calls listed via [`ScriptedBackend::failing_on`]
/// return a service error instead.
#[derive(Default)]
pub struct ScriptedBackend {
    failing: HashSet<usize>,
    calls: Mutex<Vec<usize>>,
}

impl ScriptedBackend {
    pub fn echo() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, calls: &[usize]) -> Self {
        self.failing.extend(calls.iter().copied());
        self
    }

    /// History length seen by each call, in call order.
    pub fn history_lengths(&self) -> Vec<usize> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl ChatBackend for ScriptedBackend {
    async fn generate(&self, history: &[ConversationMessage]) -> Result<String> {
        let index = {
            let mut calls = self
                .calls
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            calls.push(history.len());
            calls.len() - 1
        };

        if self.failing.contains(&index) {
            return Err(ChatbenchError::service(format!("scripted failure #{index}")));
        }

        let last = history.last().map(|m| m.content.as_str()).unwrap_or_default();
        Ok(format!("echo: {last}"))
    }
}

/// A [`ConversationClient`] that records every message and answers with a
/// numbered canned reply: `reply #<n>`.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    sent: Vec<String>,
    failing: HashSet<usize>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, calls: &[usize]) -> Self {
        self.failing.extend(calls.iter().copied());
        self
    }

    /// Every message passed to `send`, including failed ones.
    pub fn sent(&self) -> &[String] {
        &self.sent
    }
}

#[async_trait]
impl ConversationClient for ScriptedClient {
    async fn send(&mut self, text: &str) -> Result<String> {
        let index = self.sent.len();
        self.sent.push(text.to_string());

        if self.failing.contains(&index) {
            Err(ChatbenchError::service_with_status(
                503,
                format!("scripted failure #{index}"),
            ))
        } else {
            Ok(format!("reply #{index}"))
        }
    }
}
