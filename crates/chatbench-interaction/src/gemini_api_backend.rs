//! GeminiApiBackend - Direct REST API implementation for Gemini.
//!
//! Each request carries the whole conversation, so the backend itself holds
//! no state; the [`ChatSession`](chatbench_core::ChatSession) wrapping it owns
//! the history.

use async_trait::async_trait;
use chatbench_core::{
    AppConfig, ChatBackend, ChatbenchError, ConversationMessage, GenerationConfig, Result,
};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backend that talks to the Gemini `generateContent` HTTP API.
#[derive(Clone)]
pub struct GeminiApiBackend {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    generation: GenerationConfig,
}

impl GeminiApiBackend {
    /// Creates a backend for `model` against `base_url`
    /// (e.g. `https://generativelanguage.googleapis.com/v1beta/models`).
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatbenchError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            generation: GenerationConfig::default(),
        })
    }

    /// Builds a backend from resolved configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self::new(
            config.api_key.clone(),
            config.model.clone(),
            config.api_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )?
        .with_generation(config.generation.clone()))
    }

    /// Overrides the sampling parameters.
    pub fn with_generation(mut self, generation: GenerationConfig) -> Self {
        self.generation = generation;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send_request(&self, body: &GenerateContentRequest<'_>) -> Result<String> {
        let url = format!("{}/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|err| {
                // The URL carries the key; keep it out of the message.
                ChatbenchError::service(format!(
                    "Gemini API request failed: {}",
                    err.without_url()
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|err| {
            ChatbenchError::service(format!(
                "Failed to parse Gemini response: {}",
                err.without_url()
            ))
        })?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl ChatBackend for GeminiApiBackend {
    async fn generate(&self, history: &[ConversationMessage]) -> Result<String> {
        if history.is_empty() {
            return Err(ChatbenchError::internal(
                "Gemini request needs at least one message",
            ));
        }

        let contents = history
            .iter()
            .map(|message| Content {
                role: message.role.as_api_str(),
                parts: vec![Part {
                    text: &message.content,
                }],
            })
            .collect();

        let request = GenerateContentRequest {
            contents,
            generation_config: GenerationConfigPayload::from(&self.generation),
        };

        tracing::debug!(model = %self.model, turns = history.len(), "Sending Gemini request");
        self.send_request(&request).await
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfigPayload,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfigPayload {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

impl From<&GenerationConfig> for GenerationConfigPayload {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_p: config.top_p,
            top_k: config.top_k,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<ContentResponse>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Concatenates the text parts of the first candidate.
fn extract_text_response(response: GenerateContentResponse) -> Result<String> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(ChatbenchError::service(format!(
            "Gemini blocked the prompt: {reason}"
        )));
    }

    let Some(candidate) = response.candidates.and_then(|c| c.into_iter().next()) else {
        return Err(ChatbenchError::service(
            "Gemini API returned no response candidates",
        ));
    };

    let text: String = candidate
        .content
        .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect::<String>())
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".into());
        return Err(ChatbenchError::service(format!(
            "Gemini API returned no text (finish reason: {reason})"
        )));
    }

    Ok(text)
}

fn map_http_error(status: StatusCode, body: String) -> ChatbenchError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    ChatbenchError::service_with_status(status.as_u16(), message)
}
