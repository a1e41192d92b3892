//! Application configuration for planindex.
//!
//! User config lives at `~/.planindex/planindex.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PlanIndexError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "planindex.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".planindex";

// ---------------------------------------------------------------------------
// Config structs (matching planindex.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// HTTP transport settings.
    #[serde(default)]
    pub http: HttpConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default output directory for index artifacts.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Default maximum concurrent fetches.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// How the scheduler reacts to a failed unit.
    #[serde(default)]
    pub on_error: FailurePolicy,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            concurrency: default_concurrency(),
            on_error: FailurePolicy::default(),
        }
    }
}

fn default_output_dir() -> String {
    "var/index".into()
}
fn default_concurrency() -> usize {
    50
}

/// `[http]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds. Must be finite; an unresponsive
    /// source must not block the run indefinitely.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

// ---------------------------------------------------------------------------
// Failure policy
// ---------------------------------------------------------------------------

/// Run-level reaction to a failed fetch/extract unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Fail fast: the first failed unit aborts the run and no artifacts
    /// are written. This is the baseline behavior.
    #[default]
    Abort,
    /// Isolate and continue: log the failure, drop that URL, keep going.
    Skip,
}

impl std::str::FromStr for FailurePolicy {
    type Err = PlanIndexError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "abort" => Ok(Self::Abort),
            "skip" => Ok(Self::Skip),
            other => Err(PlanIndexError::config(format!(
                "unknown failure policy '{other}': expected 'abort' or 'skip'"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Pipeline config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime pipeline configuration — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum concurrent fetch/extract units in flight.
    pub concurrency: usize,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Failure policy applied by the scheduler.
    pub failure_policy: FailurePolicy,
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            concurrency: config.defaults.concurrency,
            timeout_secs: config.http.timeout_secs,
            failure_policy: config.defaults.on_error,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.planindex/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PlanIndexError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.planindex/planindex.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PlanIndexError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| PlanIndexError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PlanIndexError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PlanIndexError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PlanIndexError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
