//! Layered configuration system
//!
//! Config is loaded with three layers of precedence (highest wins):
//! 1. Environment variables: `TEMPO_FIXED_HZ`
//! 2. Project-local: `<project>/tempo.toml`
//! 3. Built-in defaults

use crate::{Result, TempoError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the project-local config file
pub const CONFIG_FILE_NAME: &str = "tempo.toml";

/// Environment variable overriding `clock.fixed_hz`
pub const FIXED_HZ_ENV: &str = "TEMPO_FIXED_HZ";

const MIN_FIXED_HZ: f64 = 1.0;
const MAX_FIXED_HZ: f64 = 1000.0;

/// Dispatcher registry settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatcherConfig {
    /// Slots reserved up front in each phase registry
    #[serde(default = "default_initial_capacity")]
    pub initial_capacity: usize,
    /// Log every stale handle skipped during dispatch
    #[serde(default = "default_true")]
    pub log_stale: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            initial_capacity: default_initial_capacity(),
            log_stale: true,
        }
    }
}

/// Frame clock settings used by hosts driving the dispatcher
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Fixed-update rate in Hz
    #[serde(default = "default_fixed_hz")]
    pub fixed_hz: f64,
    /// Longest frame delta fed into the accumulator, in seconds
    #[serde(default = "default_max_frame_time")]
    pub max_frame_time: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            fixed_hz: default_fixed_hz(),
            max_frame_time: default_max_frame_time(),
        }
    }
}

fn default_true() -> bool {
    true
}
fn default_initial_capacity() -> usize {
    16
}
fn default_fixed_hz() -> f64 {
    60.0
}
fn default_max_frame_time() -> f64 {
    0.25
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TempoConfig {
    #[serde(default)]
    pub dispatcher: DispatcherConfig,
    #[serde(default)]
    pub clock: ClockConfig,
}

impl TempoConfig {
    /// Load config with layered precedence: defaults < project file < env vars
    pub fn load(project_dir: &Path) -> Result<Self> {
        Self::load_with(project_dir, |key| std::env::var(key).ok())
    }

    fn load_with(project_dir: &Path, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let local_path = project_dir.join(CONFIG_FILE_NAME);
        let mut config = if local_path.exists() {
            Self::load_file(&local_path)?
        } else {
            log::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, project_dir.display());
            Self::default()
        };

        config.apply_env_overrides(env)?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from a specific file path only, without env overrides
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let config = Self::load_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse config from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TempoConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the effective config back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check that clock parameters describe a usable fixed timestep
    pub fn validate(&self) -> Result<()> {
        let hz = self.clock.fixed_hz;
        if !(MIN_FIXED_HZ..=MAX_FIXED_HZ).contains(&hz) {
            return Err(TempoError::ValueOutOfRange {
                field: "clock.fixed_hz".into(),
                min: MIN_FIXED_HZ,
                max: MAX_FIXED_HZ,
                value: hz,
            });
        }
        let max_frame = self.clock.max_frame_time;
        if !(max_frame > 0.0 && max_frame <= 1.0) {
            return Err(TempoError::ValueOutOfRange {
                field: "clock.max_frame_time".into(),
                min: 0.0,
                max: 1.0,
                value: max_frame,
            });
        }
        Ok(())
    }

    fn load_file(path: &Path) -> Result<Self> {
        log::info!("Loading configuration from: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let config: TempoConfig = toml::from_str(&content).map_err(|e| {
            TempoError::ConfigError(format!("Failed to parse config {}: {}", path.display(), e))
        })?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(raw) = lookup(FIXED_HZ_ENV) {
            let hz: f64 = raw.trim().parse().map_err(|_| {
                TempoError::ConfigError(format!("{} is not a number: {:?}", FIXED_HZ_ENV, raw))
            })?;
            log::debug!("{} overrides clock.fixed_hz: {}", FIXED_HZ_ENV, hz);
            self.clock.fixed_hz = hz;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn temp_project(name: &str, content: Option<&str>) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("tempo_config_test_{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(CONFIG_FILE_NAME);
        match content {
            Some(content) => {
                let mut f = std::fs::File::create(&path).unwrap();
                f.write_all(content.as_bytes()).unwrap();
            }
            None => {
                let _ = std::fs::remove_file(&path);
            }
        }
        dir
    }

    #[test]
    fn defaults() {
        let config = TempoConfig::default();
        assert_eq!(config.dispatcher.initial_capacity, 16);
        assert!(config.dispatcher.log_stale);
        assert_eq!(config.clock.fixed_hz, 60.0);
        assert_eq!(config.clock.max_frame_time, 0.25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = TempoConfig::from_toml_str(
            r#"
[clock]
fixed_hz = 50.0
"#,
        )
        .unwrap();
        assert_eq!(config.clock.fixed_hz, 50.0);
        assert_eq!(config.clock.max_frame_time, 0.25);
        assert_eq!(config.dispatcher, DispatcherConfig::default());
    }

    #[test]
    fn load_from_file() {
        let dir = temp_project(
            "load_from_file",
            Some(
                r#"
[dispatcher]
initial_capacity = 64
log_stale = false
"#,
            ),
        );
        let config = TempoConfig::load_from_file(&dir.join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config.dispatcher.initial_capacity, 64);
        assert!(!config.dispatcher.log_stale);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn load_missing_project_file_uses_defaults() {
        let dir = temp_project("missing_file", None);
        let config = TempoConfig::load_with(&dir, |_| None).unwrap();
        assert_eq!(config, TempoConfig::default());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn env_layers_over_project_file() {
        let dir = temp_project(
            "env_over_file",
            Some("[clock]\nfixed_hz = 50.0\nmax_frame_time = 0.5\n"),
        );
        let config =
            TempoConfig::load_with(&dir, |key| (key == FIXED_HZ_ENV).then(|| "30".to_string()))
                .unwrap();
        assert_eq!(config.clock.fixed_hz, 30.0);
        assert_eq!(config.clock.max_frame_time, 0.5);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn env_override_wins() {
        let mut config = TempoConfig::default();
        config
            .apply_env_overrides(|key| (key == FIXED_HZ_ENV).then(|| "120".to_string()))
            .unwrap();
        assert_eq!(config.clock.fixed_hz, 120.0);
    }

    #[test]
    fn env_override_rejects_garbage() {
        let mut config = TempoConfig::default();
        let err = config
            .apply_env_overrides(|_| Some("fast".to_string()))
            .unwrap_err();
        assert!(matches!(err, TempoError::ConfigError(_)));
        assert_eq!(config.clock.fixed_hz, 60.0);
    }

    #[test]
    fn rejects_zero_rate() {
        let err = TempoConfig::from_toml_str("[clock]\nfixed_hz = 0.0\n").unwrap_err();
        assert!(matches!(err, TempoError::ValueOutOfRange { .. }));
    }

    #[test]
    fn rejects_unbounded_frame_time() {
        let err = TempoConfig::from_toml_str("[clock]\nmax_frame_time = -1.0\n").unwrap_err();
        match err {
            TempoError::ValueOutOfRange { field, .. } => assert_eq!(field, "clock.max_frame_time"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = temp_project("malformed", Some("[clock\nfixed_hz = 1"));
        let err = TempoConfig::load_from_file(&dir.join(CONFIG_FILE_NAME)).unwrap_err();
        match err {
            TempoError::ConfigError(msg) => assert!(msg.contains(CONFIG_FILE_NAME)),
            other => panic!("unexpected error: {other}"),
        }

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn toml_output_parses_back() {
        let mut config = TempoConfig::default();
        config.clock.fixed_hz = 30.0;
        let text = config.to_toml_string().unwrap();
        assert_eq!(TempoConfig::from_toml_str(&text).unwrap(), config);
    }
}
