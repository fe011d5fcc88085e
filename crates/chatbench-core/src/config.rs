//! Configuration model.
//!
//! Values come from three layers, lowest priority first: built-in defaults,
//! the optional `chatbench.toml` file, and the process environment. The
//! front-ends apply command line overrides on top of the resolved value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::context::ContextMatrix;
use crate::error::{ChatbenchError, Result};
use crate::prompt::{DEFAULT_PROMPT_COLUMN, DEFAULT_PROMPT_LIMIT};

pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";
pub const MODEL_ENV: &str = "CHATBENCH_MODEL";
pub const PROMPTS_ENV: &str = "CHATBENCH_PROMPTS";
pub const OUTPUT_ENV: &str = "CHATBENCH_OUTPUT";

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_PROMPTS_PATH: &str = "prompts.csv";
pub const DEFAULT_OUTPUT_PATH: &str = "gemini-results.csv";

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_p: 0.95,
            top_k: 64,
            max_output_tokens: 1024,
        }
    }
}

/// Shape of `chatbench.toml`. Every key is optional.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub model: Option<String>,
    pub api_base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub prompts_path: Option<PathBuf>,
    pub output_path: Option<PathBuf>,
    pub prompt_limit: Option<usize>,
    pub prompt_column: Option<String>,
    pub contexts: Option<Vec<String>>,
    pub generation: Option<GenerationConfig>,
}

impl FileConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// The configured context matrix, or the built-in one.
    ///
    /// An explicit empty list is a [`ChatbenchError::Config`] error.
    pub fn context_matrix(&self) -> Result<ContextMatrix> {
        match &self.contexts {
            Some(contexts) if contexts.is_empty() => Err(ChatbenchError::config(
                "contexts must list at least one entry (use \"\" for no context)",
            )),
            Some(contexts) => Ok(ContextMatrix::new(contexts.iter().cloned())),
            None => Ok(ContextMatrix::default()),
        }
    }
}

/// Where prompts come from and how many are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSettings {
    pub path: PathBuf,
    pub column: String,
    pub limit: usize,
}

impl PromptSettings {
    /// Prompt settings from `file`, with `CHATBENCH_PROMPTS` overriding the path.
    pub fn resolve<F>(file: &FileConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let limit = file.prompt_limit.unwrap_or(DEFAULT_PROMPT_LIMIT);
        if limit == 0 {
            return Err(ChatbenchError::config("prompt_limit must be at least 1"));
        }

        Ok(Self {
            path: non_blank(&env, PROMPTS_ENV)
                .map(PathBuf::from)
                .or_else(|| file.prompts_path.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PROMPTS_PATH)),
            column: file
                .prompt_column
                .clone()
                .unwrap_or_else(|| DEFAULT_PROMPT_COLUMN.to_string()),
            limit,
        })
    }
}

/// Fully resolved settings for one process.
#[derive(Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub model: String,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub prompts: PromptSettings,
    pub output_path: PathBuf,
    pub contexts: ContextMatrix,
    pub generation: GenerationConfig,
}

impl AppConfig {
    /// Merges defaults, `file` and the variables visible through `env`.
    ///
    /// Fails with [`ChatbenchError::Config`] when the API key is absent or blank.
    pub fn resolve<F>(file: FileConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = non_blank(&env, API_KEY_ENV).ok_or_else(|| {
            ChatbenchError::config(format!(
                "{API_KEY_ENV} is not set; export it or add it to a .env file"
            ))
        })?;

        let prompts = PromptSettings::resolve(&file, &env)?;
        let contexts = file.context_matrix()?;

        Ok(Self {
            api_key: api_key.trim().to_string(),
            model: non_blank(&env, MODEL_ENV)
                .or(file.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_base_url: file
                .api_base_url
                .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
            request_timeout_secs: file
                .request_timeout_secs
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            prompts,
            output_path: non_blank(&env, OUTPUT_ENV)
                .map(PathBuf::from)
                .or(file.output_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH)),
            contexts,
            generation: file.generation.unwrap_or_default(),
        })
    }
}

fn non_blank<F>(env: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    env(name).filter(|value| !value.trim().is_empty())
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("prompts", &self.prompts)
            .field("output_path", &self.output_path)
            .field("contexts", &self.contexts)
            .field("generation", &self.generation)
            .finish()
    }
}
