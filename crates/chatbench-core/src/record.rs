//! Sweep results and the sink they are written to.

use serde::{Deserialize, Serialize};

use crate::error::{ChatbenchError, Result};

/// Column names of the results file, in order.
pub const RESULT_HEADER: [&str; 3] = ["Prompt", "Context", "Response"];

/// Prefix of the Response field when the call for that row failed.
pub const ERROR_MARKER: &str = "[ERROR]";

/// One (prompt, context, response) row produced by a sweep call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    #[serde(rename = "Prompt")]
    pub prompt: String,
    #[serde(rename = "Context")]
    pub context: String,
    #[serde(rename = "Response")]
    pub response: String,
}

impl ResponseRecord {
    pub fn new(
        prompt: impl Into<String>,
        context: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            context: context.into(),
            response: response.into(),
        }
    }

    /// Row recorded in place of a response when the call failed.
    pub fn failed(
        prompt: impl Into<String>,
        context: impl Into<String>,
        error: &ChatbenchError,
    ) -> Self {
        Self::new(prompt, context, format!("{ERROR_MARKER} {error}"))
    }
}

/// Append-only destination for sweep rows.
///
/// Implementations persist each row before `append` returns so rows written
/// before a failure survive it.
pub trait ResultSink: Send {
    fn append(&mut self, record: &ResponseRecord) -> Result<()>;
}

impl ResultSink for Vec<ResponseRecord> {
    fn append(&mut self, record: &ResponseRecord) -> Result<()> {
        self.push(record.clone());
        Ok(())
    }
}
