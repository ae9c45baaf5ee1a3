use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::app::DictionarySession;

use super::DocumentFormat;

/// Destination for serialized output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    Stdout,
    File(PathBuf),
}

impl OutputDestination {
    pub fn file(path: impl AsRef<Path>) -> Self {
        OutputDestination::File(path.as_ref().to_path_buf())
    }
}

#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub destinations: Vec<OutputDestination>,
}

impl OutputOptions {
    pub fn new() -> Self {
        Self {
            destinations: vec![OutputDestination::Stdout],
        }
    }

    pub fn with_destinations(mut self, destinations: Vec<OutputDestination>) -> Self {
        self.destinations = destinations;
        self
    }
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Write an already serialized payload to every configured destination.
pub fn emit(payload: &str, options: &OutputOptions) -> Result<()> {
    for destination in &options.destinations {
        write_payload(destination, payload).with_context(|| match destination {
            OutputDestination::Stdout => "failed to write to stdout".to_string(),
            OutputDestination::File(path) => {
                format!("failed to write to file {}", path.display())
            }
        })?;
    }
    Ok(())
}

/// Serialize a session snapshot.
pub fn session_to_string(
    session: &DictionarySession,
    format: DocumentFormat,
    pretty: bool,
) -> Result<String> {
    match format {
        DocumentFormat::Json => {
            if pretty {
                serde_json::to_string_pretty(session).context("failed to serialize session")
            } else {
                serde_json::to_string(session).context("failed to serialize session")
            }
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => serde_yaml::to_string(session).context("failed to serialize session"),
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => {
            if pretty {
                toml::to_string_pretty(session).context("failed to serialize session")
            } else {
                toml::to_string(session).context("failed to serialize session")
            }
        }
    }
}

/// Persist a snapshot, picking the format from the extension.
pub fn save_session(session: &DictionarySession, path: &Path) -> Result<()> {
    let format = DocumentFormat::from_path(path).unwrap_or_default();
    let payload = session_to_string(session, format, true)?;
    write_payload(&OutputDestination::file(path), &payload)
        .with_context(|| format!("failed to write session {}", path.display()))
}

fn write_payload(destination: &OutputDestination, payload: &str) -> Result<()> {
    match destination {
        OutputDestination::Stdout => {
            let mut stdout = io::stdout();
            stdout
                .write_all(payload.as_bytes())
                .and_then(|_| stdout.write_all(b"\n"))
                .context("failed to flush stdout")?;
            stdout.flush().context("failed to flush stdout")
        }
        OutputDestination::File(path) => {
            let mut file = File::create(path)?;
            file.write_all(payload.as_bytes())?;
            file.write_all(b"\n")?;
            file.flush()?;
            Ok(())
        }
    }
}
