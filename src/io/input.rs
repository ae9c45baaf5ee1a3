use std::{fs, path::Path};

use anyhow::{Context, Result};

use crate::app::DictionarySession;

use super::DocumentFormat;

/// Parse a session snapshot previously written by [`session_to_string`](super::session_to_string).
pub fn parse_session_str(contents: &str, format: DocumentFormat) -> Result<DictionarySession> {
    match format {
        DocumentFormat::Json => serde_json::from_str::<DictionarySession>(contents)
            .with_context(|| "failed to parse JSON session snapshot"),
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => serde_yaml::from_str::<DictionarySession>(contents)
            .with_context(|| "failed to parse YAML session snapshot"),
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => toml::from_str::<DictionarySession>(contents)
            .with_context(|| "failed to parse TOML session snapshot"),
    }
}

/// Load a snapshot from disk, picking the format from the extension.
pub fn load_session(path: &Path) -> Result<DictionarySession> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read session {}", path.display()))?;
    let format = DocumentFormat::from_path(path).unwrap_or_default();
    parse_session_str(&contents, format)
        .with_context(|| format!("failed to load session {}", path.display()))
}
