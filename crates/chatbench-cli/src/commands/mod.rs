pub mod contexts;
pub mod prompts;
pub mod sweep;
