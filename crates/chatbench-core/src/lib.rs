pub mod config;
pub mod context;
pub mod error;
pub mod prompt;
pub mod record;
pub mod session;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export common types
pub use config::{AppConfig, FileConfig, GenerationConfig, PromptSettings};
pub use context::{ContextMatrix, compose_message};
pub use error::{ChatbenchError, Result};
pub use prompt::Prompt;
pub use record::{ResponseRecord, ResultSink};
pub use session::{ChatBackend, ChatSession, ConversationClient, ConversationMessage, MessageRole};
