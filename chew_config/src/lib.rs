#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the slow-eating client.
//!
//! - `Config` and its sections are deserialized from TOML; every section is
//!   optional and falls back to working defaults.
//! - Pacing delays are deliberately absent: they are fixed constants of the
//!   core, not tunables.
use serde::Deserialize;
use std::path::Path;

/// Upper bound for `estimator.timeout_ms` (5 minutes).
pub const MAX_ESTIMATOR_TIMEOUT_MS: u64 = 5 * 60 * 1000;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const LOG_ROTATIONS: [&str; 3] = ["never", "daily", "hourly"];

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EstimatorCfg {
    /// Base URL of the generative-language API (no trailing `/models`).
    pub endpoint: String,
    /// Multimodal model used for the food estimate.
    pub model: String,
    /// Name of the environment variable holding the API key. The key itself
    /// never lives in the config file.
    pub api_key_env: String,
    /// Whole-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for EstimatorCfg {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".into(),
            model: "gemini-3-flash-preview".into(),
            api_key_env: "API_KEY".into(),
            timeout_ms: 30_000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CameraCfg {
    /// Ask for the rear camera first and only then for any camera.
    pub prefer_rear: bool,
}

impl Default for CameraCfg {
    fn default() -> Self {
        Self { prefer_rear: true }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub estimator: EstimatorCfg,
    pub camera: CameraCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read and parse a config file. Validation is left to the caller.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {}: {e}", path.display()))?;
    load_toml(&text).map_err(|e| eyre::eyre!("invalid configuration in {}: {e}", path.display()))
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Estimator
        let endpoint = self.estimator.endpoint.trim();
        if endpoint.is_empty() {
            eyre::bail!("estimator.endpoint must not be empty");
        }
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            eyre::bail!("estimator.endpoint must start with http:// or https://");
        }
        if self.estimator.model.trim().is_empty() {
            eyre::bail!("estimator.model must not be empty");
        }
        if self.estimator.api_key_env.trim().is_empty() {
            eyre::bail!("estimator.api_key_env must not be empty");
        }
        if self.estimator.timeout_ms == 0 {
            eyre::bail!("estimator.timeout_ms must be >= 1");
        }
        if self.estimator.timeout_ms > MAX_ESTIMATOR_TIMEOUT_MS {
            eyre::bail!("estimator.timeout_ms is unreasonably large (>5min)");
        }

        // Logging
        if let Some(level) = &self.logging.level
            && !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str())
        {
            eyre::bail!("logging.level must be one of {}", LOG_LEVELS.join("|"));
        }
        if let Some(rotation) = &self.logging.rotation
            && !LOG_ROTATIONS.contains(&rotation.to_ascii_lowercase().as_str())
        {
            eyre::bail!("logging.rotation must be one of {}", LOG_ROTATIONS.join("|"));
        }

        Ok(())
    }
}
