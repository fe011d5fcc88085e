use anyhow::{Context, Result};
use chatbench_core::PromptSettings;
use chatbench_infrastructure::{CsvPromptLoader, load_file_config};

use crate::SourceArgs;

/// Prompt settings for a command, with `--prompts` taking precedence.
pub fn resolve_settings(source: &SourceArgs) -> Result<PromptSettings> {
    let file = load_file_config(source.config.as_deref()).context("Failed to load configuration")?;
    let mut settings = PromptSettings::resolve(&file, |name| std::env::var(name).ok())?;
    if let Some(path) = &source.prompts {
        settings.path = path.clone();
    }
    Ok(settings)
}

pub fn list(source: &SourceArgs) -> Result<()> {
    let settings = resolve_settings(source)?;
    let prompts = CsvPromptLoader::from_settings(&settings)
        .load(&settings.path)
        .with_context(|| format!("Failed to load prompts from {}", settings.path.display()))?;

    if prompts.is_empty() {
        println!(
            "⚠️  No prompts found in {} (column `{}`)",
            settings.path.display(),
            settings.column
        );
        return Ok(());
    }

    println!("📋 {} prompts from {}:", prompts.len(), settings.path.display());
    for (i, prompt) in prompts.iter().enumerate() {
        println!("{:>3}. {}", i + 1, prompt);
    }

    Ok(())
}
