//! Configuration file handling
//!
//! Settings come from `$COSTWATCH_CONFIG`, else `<config dir>/costwatch/config.toml`.
//! A missing default file means built-in defaults; CLI flags override both.

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::types::{CostwatchError, Result};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "COSTWATCH_CONFIG";

/// Known operating thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdPreset {
    /// Automated one-shot reports: only flag larger daily spends
    Strict,
    /// Interactive exploration: flag almost anything
    Sensitive,
}

impl ThresholdPreset {
    pub fn value(self) -> f64 {
        match self {
            Self::Strict => 10.0,
            Self::Sensitive => 1.0,
        }
    }
}

fn strict_threshold() -> f64 {
    ThresholdPreset::Strict.value()
}
fn sensitive_threshold() -> f64 {
    ThresholdPreset::Sensitive.value()
}
fn default_days() -> u32 {
    30
}
fn default_true() -> bool {
    true
}
fn default_endpoint() -> String {
    "https://ce.us-east-1.amazonaws.com/".to_string()
}
fn default_token_env() -> String {
    "COSTWATCH_API_TOKEN".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_snapshot_path() -> PathBuf {
    PathBuf::from("cost_snapshot.json")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportSettings {
    #[serde(default = "strict_threshold")]
    pub threshold: f64,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            threshold: strict_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DashboardSettings {
    #[serde(default = "sensitive_threshold")]
    pub threshold: f64,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            threshold: sensitive_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuerySettings {
    /// Trailing window length, ending today
    #[serde(default = "default_days")]
    pub days: u32,
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            days: default_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostExplorerSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Name of the env var holding an optional bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CostExplorerSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: default_endpoint(),
            token_env: default_token_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapshotSettings {
    /// File, or directory of `*.json` files
    #[serde(default = "default_snapshot_path")]
    pub path: PathBuf,
}

impl Default for SnapshotSettings {
    fn default() -> Self {
        Self {
            path: default_snapshot_path(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub report: ReportSettings,
    #[serde(default)]
    pub dashboard: DashboardSettings,
    #[serde(default)]
    pub query: QuerySettings,
    #[serde(default)]
    pub cost_explorer: CostExplorerSettings,
    #[serde(default)]
    pub snapshot: SnapshotSettings,
}

impl Config {
    /// Default config location: `<config dir>/costwatch/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        BaseDirs::new().map(|d| d.config_dir().join("costwatch").join("config.toml"))
    }

    /// Load from an explicit path, `$COSTWATCH_CONFIG`, or the default location.
    ///
    /// An explicitly named file must exist; the default file may be absent.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::load_from(Path::new(&path));
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Parse and validate a config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CostwatchError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml(&content).map_err(|e| match e {
            CostwatchError::Config(msg) => {
                CostwatchError::Config(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(content).map_err(|e| CostwatchError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_threshold("report.threshold", self.report.threshold)?;
        validate_threshold("dashboard.threshold", self.dashboard.threshold)?;
        if self.query.days == 0 {
            return Err(CostwatchError::Config(
                "query.days must be at least 1".into(),
            ));
        }
        if self.cost_explorer.timeout_secs == 0 {
            return Err(CostwatchError::Config(
                "cost_explorer.timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Thresholds must be finite and non-negative
pub fn validate_threshold(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(CostwatchError::Config(format!(
            "{} must be a finite number >= 0, got {}",
            name, value
        )))
    }
}
