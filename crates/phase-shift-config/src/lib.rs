//! Phase shift configuration system
//!
//! This crate loads transition settings from `phaseshift.toml` so hosts can
//! tune timing without recompiling. The settings are raw values; the core
//! crate validates them and resolves them into a `TransitionConfiguration`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

/// Default configuration file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "phaseshift.toml";

/// Result type for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the schema.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct PhaseShiftConfig {
    /// Transition timing settings
    pub transition: TransitionSettings,
}

/// Named timing preset the settings start from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    #[default]
    Default,
    Fast,
    Slow,
}

/// Easing curve names accepted in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveName {
    Linear,
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
}

/// Transition timing settings
///
/// Every field except `preset` is an override; unset fields keep the
/// preset's value.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct TransitionSettings {
    /// Preset to start from (default, fast, slow)
    pub preset: Preset,
    /// Animation duration in seconds
    pub duration: Option<f64>,
    /// Spring damping ratio, 0.0 (bouncy) to 1.0 (critically damped)
    pub damping: Option<f64>,
    /// Initial spring velocity, in fractions of the travel per second
    pub initial_velocity: Option<f64>,
    /// Easing curve for the presentation animation
    pub presentation_curve: Option<CurveName>,
    /// Easing curve for the dismissal animation
    pub dismissal_curve: Option<CurveName>,
}

impl PhaseShiftConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the phaseshift.toml configuration file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml_str(&content)
    }

    /// Load configuration from the default location (phaseshift.toml in the
    /// current directory) or return the default configuration if the file
    /// doesn't exist or can't be parsed.
    pub fn load_or_default() -> Self {
        Self::load_from_path_or_default(DEFAULT_CONFIG_FILE)
    }

    /// Same as [`PhaseShiftConfig::load_or_default`] for an explicit path.
    pub fn load_from_path_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load_from_file(path.as_ref()) {
            Ok(config) => config,
            Err(ConfigError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                Self::default()
            }
            Err(error) => {
                warn!(%error, path = ?path.as_ref(), "falling back to default transition settings");
                Self::default()
            }
        }
    }

    /// Serialize the configuration back to TOML text.
    pub fn to_toml_string(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = PhaseShiftConfig::default();
        assert_eq!(config.transition.preset, Preset::Default);
        assert_eq!(config.transition.duration, None);
        assert_eq!(config.transition.presentation_curve, None);
    }

    #[test]
    fn test_parse_overrides() {
        let config = PhaseShiftConfig::from_toml_str(
            r#"
            [transition]
            preset = "fast"
            duration = 0.25
            damping = 0.6
            dismissal_curve = "ease_in_out"
            "#,
        )
        .unwrap();

        assert_eq!(config.transition.preset, Preset::Fast);
        assert_eq!(config.transition.duration, Some(0.25));
        assert_eq!(config.transition.damping, Some(0.6));
        assert_eq!(config.transition.initial_velocity, None);
        assert_eq!(config.transition.dismissal_curve, Some(CurveName::EaseInOut));
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = PhaseShiftConfig::from_toml_str("").unwrap();
        assert_eq!(config, PhaseShiftConfig::default());
    }

    #[test]
    fn test_unknown_curve_is_rejected() {
        let result = PhaseShiftConfig::from_toml_str(
            r#"
            [transition]
            presentation_curve = "bounce"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[transition]\npreset = \"slow\"\ninitial_velocity = 0.1").unwrap();

        let config = PhaseShiftConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.transition.preset, Preset::Slow);
        assert_eq!(config.transition.initial_velocity, Some(0.1));
    }

    #[test]
    fn test_missing_file_errors_but_or_default_recovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        assert!(matches!(
            PhaseShiftConfig::load_from_file(&path),
            Err(ConfigError::Read { .. })
        ));
        assert_eq!(
            PhaseShiftConfig::load_from_path_or_default(&path),
            PhaseShiftConfig::default()
        );
    }

    #[test]
    fn test_malformed_file_falls_back_to_default() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[transition\nduration = ").unwrap();

        assert_eq!(
            PhaseShiftConfig::load_from_path_or_default(file.path()),
            PhaseShiftConfig::default()
        );
    }

    #[test]
    fn test_toml_roundtrip_keeps_overrides() {
        let mut config = PhaseShiftConfig::default();
        config.transition.duration = Some(0.4);
        config.transition.presentation_curve = Some(CurveName::EaseOut);

        let text = config.to_toml_string().unwrap();
        let parsed = PhaseShiftConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
