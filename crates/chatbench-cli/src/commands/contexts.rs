use anyhow::{Context, Result};
use chatbench_core::ContextMatrix;
use chatbench_infrastructure::load_file_config;
use std::path::Path;

pub fn list(config: Option<&Path>) -> Result<()> {
    let file = load_file_config(config).context("Failed to load configuration")?;
    let contexts = file.context_matrix()?;

    println!("📋 {} contexts:", contexts.len());
    for line in format_contexts(&contexts) {
        println!("{line}");
    }

    Ok(())
}

fn format_contexts(contexts: &ContextMatrix) -> Vec<String> {
    contexts
        .iter()
        .enumerate()
        .map(|(i, context)| {
            let label = if context.is_empty() { "(no context)" } else { context };
            format!("{:>3}. {}", i + 1, label)
        })
        .collect()
}
