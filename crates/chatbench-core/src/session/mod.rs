//! Conversation session domain.
//!
//! The remote service is the source of the model's replies; the
//! [`ChatSession`] value is the source of truth for the ordered history that
//! both the sweep and interactive chat extend.

mod client;
mod message;
mod model;

pub use client::{ChatBackend, ConversationClient};
pub use message::{ConversationMessage, MessageRole};
pub use model::ChatSession;
