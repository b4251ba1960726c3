//! Configuration file and environment overrides
//!
//! Loaded from `pollboard.toml` in the platform config directory, or the
//! path in `POLLBOARD_CONFIG`. Every field has a default, so a missing or
//! empty file is valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::board::StepConfig;

pub const CONFIG_PATH_VAR: &str = "POLLBOARD_CONFIG";
pub const ACTUATOR_URL_VAR: &str = "POLLBOARD_ACTUATOR_URL";
pub const STEPS_A_VAR: &str = "POLLBOARD_STEPS_A";
pub const STEPS_B_VAR: &str = "POLLBOARD_STEPS_B";
pub const ACTUATOR_TIMEOUT_VAR: &str = "POLLBOARD_ACTUATOR_TIMEOUT_MS";

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub actuator: ActuatorConfig,
    pub schedule: ScheduleConfig,
    pub closure: ClosureConfig,
    pub storage: StorageConfig,
}

/// Physical device connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    /// Device base URL; no URL means the board runs without hardware
    pub base_url: Option<String>,
    pub steps_a: i64,
    pub steps_b: i64,
    pub timeout_ms: u64,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        let steps = StepConfig::default();
        Self {
            base_url: None,
            steps_a: steps.steps_a,
            steps_b: steps.steps_b,
            timeout_ms: 3000,
        }
    }
}

impl ActuatorConfig {
    /// Base URL without trailing slashes or the legacy `/step` suffix
    pub fn normalized_base_url(&self) -> Option<String> {
        let raw = self.base_url.as_deref()?.trim();
        let mut url = raw.trim_end_matches('/');
        if let Some(stripped) = url.strip_suffix("/step") {
            url = stripped.trim_end_matches('/');
        }
        if url.is_empty() {
            None
        } else {
            Some(url.to_string())
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Background task timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub rotation_interval_secs: u64,
    pub poll_interval_secs: u64,
    /// Pause between a front-end vote's move and its compensation
    pub vote_settle_ms: u64,
    /// Pause before compensating a closure caused by physical votes
    pub physical_settle_ms: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            rotation_interval_secs: 60,
            poll_interval_secs: 2,
            vote_settle_ms: 4000,
            physical_settle_ms: 2000,
        }
    }
}

impl ScheduleConfig {
    pub fn rotation_interval(&self) -> Duration {
        Duration::from_secs(self.rotation_interval_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn vote_settle(&self) -> Duration {
        Duration::from_millis(self.vote_settle_ms)
    }

    pub fn physical_settle(&self) -> Duration {
        Duration::from_millis(self.physical_settle_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClosureConfig {
    /// Total votes that force the active survey to close
    pub vote_threshold: u32,
}

impl Default for ClosureConfig {
    fn default() -> Self {
        Self { vote_threshold: 30 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub database_path: Option<PathBuf>,
}

impl Config {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("dev", "onyx", "pollboard")
    }

    /// `<config_dir>/pollboard.toml`
    pub fn default_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("pollboard.toml"))
    }

    /// Load from the resolved path, then apply environment overrides and validate
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .or_else(Self::default_path);

        let mut config = match path {
            Some(path) => Self::load(&path)?,
            None => {
                warn!("Could not determine config directory, using defaults");
                Self::default()
            }
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load a config file; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `POLLBOARD_*` overrides from `lookup`
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ACTUATOR_URL_VAR) {
            self.actuator.base_url = Some(url);
        }
        if let Some(steps) = parse_override(&lookup, STEPS_A_VAR) {
            self.actuator.steps_a = steps;
        }
        if let Some(steps) = parse_override(&lookup, STEPS_B_VAR) {
            self.actuator.steps_b = steps;
        }
        if let Some(ms) = parse_override(&lookup, ACTUATOR_TIMEOUT_VAR) {
            self.actuator.timeout_ms = ms;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.closure.vote_threshold == 0 {
            return Err(ConfigError::Invalid(
                "closure.vote_threshold must be at least 1".to_string(),
            ));
        }
        if self.schedule.rotation_interval_secs == 0 || self.schedule.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "schedule intervals must be at least 1 second".to_string(),
            ));
        }
        if self.actuator.timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "actuator.timeout_ms must be at least 1".to_string(),
            ));
        }
        if self.actuator.steps_a == 0 || self.actuator.steps_b == 0 {
            return Err(ConfigError::Invalid(
                "actuator steps must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Step deltas shared by every vote path
    pub fn step_config(&self) -> StepConfig {
        StepConfig {
            steps_a: self.actuator.steps_a,
            steps_b: self.actuator.steps_b,
        }
    }

    /// Configured database path, or `<data_dir>/pollboard.db`
    pub fn database_path(&self) -> Option<PathBuf> {
        self.storage.database_path.clone().or_else(|| {
            Self::project_dirs().map(|dirs| dirs.data_dir().join("pollboard.db"))
        })
    }
}

fn parse_override<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparseable override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.closure.vote_threshold, 30);
        assert_eq!(config.schedule.rotation_interval_secs, 60);
        assert_eq!(config.schedule.poll_interval_secs, 2);
        assert_eq!(config.step_config(), StepConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[actuator]
base_url = "http://10.0.0.7/step"
steps_a = 40
steps_b = -55
timeout_ms = 1500

[schedule]
rotation_interval_secs = 30
poll_interval_secs = 5

[closure]
vote_threshold = 12

[storage]
database_path = "/var/lib/pollboard/board.db"
"#;
        let config = Config::from_toml(toml).unwrap();
        assert_eq!(
            config.actuator.normalized_base_url().as_deref(),
            Some("http://10.0.0.7")
        );
        assert_eq!(config.step_config().steps_b, -55);
        assert_eq!(config.actuator.timeout(), Duration::from_millis(1500));
        assert_eq!(config.schedule.vote_settle_ms, 4000);
        assert_eq!(config.closure.vote_threshold, 12);
        assert_eq!(
            config.database_path(),
            Some(PathBuf::from("/var/lib/pollboard/board.db"))
        );
    }

    #[test]
    fn test_normalized_base_url() {
        let mut actuator = ActuatorConfig::default();
        assert!(actuator.normalized_base_url().is_none());

        actuator.base_url = Some("http://device.local/".to_string());
        assert_eq!(
            actuator.normalized_base_url().as_deref(),
            Some("http://device.local")
        );

        actuator.base_url = Some("   ".to_string());
        assert!(actuator.normalized_base_url().is_none());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            (ACTUATOR_URL_VAR, "http://board:8080"),
            (STEPS_A_VAR, "70"),
            (STEPS_B_VAR, "not-a-number"),
            (ACTUATOR_TIMEOUT_VAR, "900"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.actuator.base_url.as_deref(), Some("http://board:8080"));
        assert_eq!(config.actuator.steps_a, 70);
        assert_eq!(config.actuator.steps_b, -68);
        assert_eq!(config.actuator.timeout_ms, 900);
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let mut config = Config::default();
        config.closure.vote_threshold = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.actuator.steps_a = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.schedule.poll_interval_secs = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_missing_and_present_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("pollboard.toml");
        assert_eq!(Config::load(&path).unwrap(), Config::default());

        std::fs::write(&path, "[closure]\nvote_threshold = 5\n").unwrap();
        assert_eq!(Config::load(&path).unwrap().closure.vote_threshold, 5);

        std::fs::write(&path, "[closure\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }
}
