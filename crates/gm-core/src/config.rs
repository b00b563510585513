use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::types::DayBoundary;

/// Top-level configuration loaded from `~/.gitmaxer/config.toml`.
///
/// **Security**: this struct never stores API keys or tokens. Credentials
/// are read from environment variables at runtime; the config holds only
/// the env-var *names*.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub generators: GeneratorsConfig,
    #[serde(default)]
    pub reconciler: ReconcilerConfig,
}

impl Config {
    /// Load config from the default path, falling back to defaults when the
    /// file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(path)
        } else {
            let cfg = Config::default();
            cfg.validate()?;
            Ok(cfg)
        }
    }

    /// Load from a specific path.
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let cfg: Config = toml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        self.validate()?;
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Semantic validation for settings not expressible via type checks.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.github.call_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "github.call_timeout_secs must be > 0".into(),
            ));
        }
        if self.reconciler.max_concurrent_users == 0 {
            return Err(ConfigError::Validation(
                "reconciler.max_concurrent_users must be > 0".into(),
            ));
        }
        if self.generators.gemini_models.is_empty() {
            return Err(ConfigError::Validation(
                "generators.gemini_models must list at least one model".into(),
            ));
        }
        Ok(())
    }

    fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".gitmaxer")
            .join("config.toml")
    }
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(String),
    #[error("parse: {0}")]
    Parse(String),
    #[error("validation: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Section structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable output.
    #[serde(default)]
    pub log_json: bool,
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            db_path: default_db_path(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}
fn default_db_path() -> String {
    "~/.gitmaxer/gitmaxer.db".into()
}

/// GitHub tokens are per-profile only; there is no process-wide fallback
/// token, so a profile without one is simply never swept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            call_timeout_secs: default_call_timeout(),
        }
    }
}

fn default_api_base() -> String {
    "https://api.github.com".into()
}
fn default_call_timeout() -> u64 {
    15
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorsConfig {
    /// Env var holding the Gemini API key. AI generation is disabled when
    /// the variable is unset.
    #[serde(default = "default_gemini_key_env")]
    pub gemini_key_env: String,
    #[serde(default = "default_gemini_base")]
    pub gemini_api_base: String,
    /// Models tried in order until one succeeds.
    #[serde(default = "default_gemini_models")]
    pub gemini_models: Vec<String>,
}

impl Default for GeneratorsConfig {
    fn default() -> Self {
        Self {
            gemini_key_env: default_gemini_key_env(),
            gemini_api_base: default_gemini_base(),
            gemini_models: default_gemini_models(),
        }
    }
}

fn default_gemini_key_env() -> String {
    "GEMINI_API_KEY".into()
}
fn default_gemini_base() -> String {
    "https://generativelanguage.googleapis.com".into()
}
fn default_gemini_models() -> Vec<String> {
    vec![
        "gemini-2.0-flash".into(),
        "gemini-1.5-flash-latest".into(),
        "gemini-1.5-flash-8b".into(),
        "gemini-1.5-pro-latest".into(),
        "gemini-1.0-pro".into(),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    #[serde(default = "default_max_concurrent_users")]
    pub max_concurrent_users: u32,
    /// Delay between successive commits within a run, in milliseconds.
    /// Cosmetic only; zero disables pacing.
    #[serde(default = "default_commit_pacing")]
    pub commit_pacing_ms: u64,
    /// Per-run deadline; remaining attempts are abandoned past it.
    #[serde(default = "default_run_deadline")]
    pub run_deadline_secs: u64,
    /// Day-boundary offset east of UTC in minutes; 0 means UTC midnight.
    #[serde(default)]
    pub day_boundary_offset_minutes: i32,
}

impl ReconcilerConfig {
    pub fn day_boundary(&self) -> DayBoundary {
        if self.day_boundary_offset_minutes == 0 {
            DayBoundary::Utc
        } else {
            DayBoundary::FixedOffset {
                minutes_east: self.day_boundary_offset_minutes,
            }
        }
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval(),
            max_concurrent_users: default_max_concurrent_users(),
            commit_pacing_ms: default_commit_pacing(),
            run_deadline_secs: default_run_deadline(),
            day_boundary_offset_minutes: 0,
        }
    }
}

fn default_sweep_interval() -> u64 {
    900
}
fn default_max_concurrent_users() -> u32 {
    4
}
fn default_commit_pacing() -> u64 {
    1000
}
fn default_run_deadline() -> u64 {
    280
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
