//! Adapters to hosted generative-language services.

pub mod gemini_api_backend;

pub use gemini_api_backend::GeminiApiBackend;
