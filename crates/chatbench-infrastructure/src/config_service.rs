//! Resolves the process configuration from `.env`, `chatbench.toml` and the
//! environment.

use chatbench_core::{AppConfig, ChatbenchError, FileConfig, Result};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory and the user config dir.
pub const CONFIG_FILE_NAME: &str = "chatbench.toml";

/// Loads configuration for a front-end.
///
/// # Search order for the TOML file
///
/// 1. `explicit`, when given (must exist)
/// 2. `./chatbench.toml`
/// 3. `<config dir>/chatbench/chatbench.toml` (e.g. `~/.config/chatbench/`)
///
/// A `.env` file in the working directory (or a parent) is loaded first so
/// its variables take part in resolution. Environment variables win over the
/// file.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let file = load_file_config(explicit)?;
    AppConfig::resolve(file, |name| std::env::var(name).ok())
}

/// Loads `.env` and the TOML file without resolving the API key.
///
/// For commands that never call the service (listing prompts or contexts).
pub fn load_file_config(explicit: Option<&Path>) -> Result<FileConfig> {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) => tracing::debug!("No .env file loaded: {}", e),
    }

    match locate_config_file(explicit)? {
        Some(path) => {
            tracing::info!("Using config file {}", path.display());
            read_config_file(&path)
        }
        None => Ok(FileConfig::default()),
    }
}

/// Parses one TOML config file.
pub fn read_config_file(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        ChatbenchError::config(format!("cannot read {}: {}", path.display(), e))
    })?;
    FileConfig::from_toml_str(&content).map_err(|e| match e {
        ChatbenchError::Config(msg) => {
            ChatbenchError::config(format!("{}: {}", path.display(), msg))
        }
        other => other,
    })
}

fn locate_config_file(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(ChatbenchError::config(format!(
                "config file {} does not exist",
                path.display()
            )));
        }
        return Ok(Some(path.to_path_buf()));
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Ok(Some(local));
    }

    Ok(dirs::config_dir()
        .map(|dir| dir.join("chatbench").join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file()))
}
