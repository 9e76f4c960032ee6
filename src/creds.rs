//! Credential storage and first-run key entry.
//!
//! The API key lives in `<config>/pulseboard/credentials.json`. Resolution
//! order: the `PULSEBOARD_API_KEY` environment variable, the stored file,
//! then a line-oriented prompt when stdin is a terminal.

use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

pub const API_KEY_ENV: &str = "PULSEBOARD_API_KEY";

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct CredentialStore {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl CredentialStore {
    /// Credential file path: `<config>/pulseboard/credentials.json`.
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("pulseboard").join("credentials.json"))
    }

    /// Load the store from disk (default if missing or invalid).
    pub fn load() -> Self {
        Self::path().map(|p| Self::load_from(&p)).unwrap_or_default()
    }

    fn load_from(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save the store to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::path() {
            self.save_to(&path)?;
        }
        Ok(())
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

/// Resolve the API key before any probing begins.
///
/// `reset` skips the environment and stored key and forces a fresh prompt.
/// A missing key with non-interactive stdin is an input error, not a hang.
pub fn resolve_api_key(reset: bool) -> Result<String> {
    if !reset {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            let key = key.trim().to_string();
            if !key.is_empty() {
                return Ok(key);
            }
        }
        if let Some(key) = CredentialStore::load().api_key {
            if !key.is_empty() {
                return Ok(key);
            }
        }
    }

    if !io::stdin().is_terminal() {
        bail!("no API key: set {API_KEY_ENV} or run interactively to store one");
    }

    let key = prompt_for_key()?;
    if key.is_empty() {
        bail!("API key must not be empty");
    }

    let store = CredentialStore { api_key: Some(key.clone()) };
    if let Err(err) = store.save() {
        tracing::warn!(%err, "could not store API key");
    }

    Ok(key)
}

fn prompt_for_key() -> Result<String> {
    print!("Pulseboard API key: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).context("reading API key")?;
    Ok(line.trim().to_string())
}
