//! Layered runtime settings.
//!
//! Resolution order: built-in defaults, then an optional TOML file
//! (`<config>/pulseboard/config.toml`, or the path given with `--config`),
//! then environment variables prefixed `PULSEBOARD_`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

const DEFAULT_BASE_URL: &str = "https://relay.pulseboard.dev";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL probe URLs are derived from.
    pub base_url: String,
    /// Hard per-probe timeout, in seconds.
    pub probe_timeout_secs: u64,
    /// Maximum qualifying attempts per target; only timeouts are retried.
    pub max_attempts: u32,
    /// Live display refresh rate, frames per second.
    pub fps: u32,
    /// An up relay averaging above this many milliseconds is marked slow.
    pub slow_threshold_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            probe_timeout_secs: 20,
            max_attempts: 4,
            fps: 12,
            slow_threshold_ms: 3000,
        }
    }
}

impl Settings {
    /// Default config file path: `<config>/pulseboard/config.toml`.
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("pulseboard").join("config.toml"))
    }

    /// Load settings, layering an optional file and the environment over
    /// the defaults. A missing default file is fine; a file passed
    /// explicitly must exist.
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        match override_path {
            Some(path) => {
                ensure!(path.exists(), "config file not found: {}", path.display());
                builder = builder.add_source(File::from(path));
            }
            None => {
                if let Some(path) = Self::config_path() {
                    if path.exists() {
                        builder = builder.add_source(File::from(path.as_path()));
                    }
                }
            }
        }

        let settings: Settings = builder
            .add_source(Environment::with_prefix("PULSEBOARD").try_parsing(true))
            .build()
            .context("building configuration")?
            .try_deserialize()
            .context("reading configuration")?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        ensure!(!self.base_url.trim().is_empty(), "base_url must not be empty");
        ensure!(self.probe_timeout_secs > 0, "probe_timeout_secs must be positive");
        ensure!(self.max_attempts > 0, "max_attempts must be positive");
        ensure!(self.fps > 0, "fps must be positive");
        ensure!(self.slow_threshold_ms > 0, "slow_threshold_ms must be positive");
        Ok(())
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Wall-clock interval between live frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps as f64)
    }
}
