use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::monitor::LoopConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Seconds between cycles
    pub interval_secs: u64,

    /// Explicit-content decision threshold (strict `>`)
    pub nsfw_threshold: f32,

    /// Toxicity decision threshold (strict `>`)
    pub toxicity_threshold: f32,

    /// Canonical analysis language (ISO 639-1), text is translated into it
    pub target_language: String,

    /// Tesseract recognition language
    pub ocr_language: String,

    /// Firebase Realtime Database URL for the detection log
    pub database_url: String,

    /// Optional database auth token
    #[serde(default)]
    pub database_auth: Option<String>,

    /// Optional path to Tesseract trained data
    #[serde(default)]
    pub tessdata_dir: Option<String>,

    /// Display to watch; None = primary
    #[serde(default)]
    pub monitor_index: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval_secs: 10,
            nsfw_threshold: 0.5,
            toxicity_threshold: 0.5,
            target_language: "en".to_string(),
            ocr_language: "eng".to_string(),
            database_url: String::new(),
            database_auth: None,
            tessdata_dir: None,
            monitor_index: None,
        }
    }
}

impl Config {
    /// Load configuration, creating a default file on first run.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::LoadFailed {
                path: config_path.display().to_string(),
                source: Box::new(e),
            })?;
            let config: Config =
                serde_json::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: config_path.display().to_string(),
                    source: Box::new(e),
                })?;

            tracing::info!("Loaded config from: {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            tracing::info!("Created default config at: {}", config_path.display());
            tracing::info!("Edit this file to set the event store URL and thresholds.");
            Ok(config)
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::DirectoryCreationFailed {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let json =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
                path: config_path.display().to_string(),
                source: Box::new(e),
            })?;
        fs::write(&config_path, json).map_err(|e| ConfigError::SaveFailed {
            path: config_path.display().to_string(),
            source: Box::new(e),
        })?;

        Ok(())
    }

    /// Startup validation; the loop never runs on a bad configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "interval_secs must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.nsfw_threshold) {
            return Err(ConfigError::Invalid(format!(
                "nsfw_threshold {} outside [0, 1]",
                self.nsfw_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.toxicity_threshold) {
            return Err(ConfigError::Invalid(format!(
                "toxicity_threshold {} outside [0, 1]",
                self.toxicity_threshold
            )));
        }
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "database_url is not set; the detection log has nowhere to go".to_string(),
            ));
        }
        Ok(())
    }

    /// Detection policy as consumed by the monitor loop.
    pub fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            nsfw_threshold: self.nsfw_threshold,
            toxicity_threshold: self.toxicity_threshold,
            interval: Duration::from_secs(self.interval_secs),
        }
    }

    /// Get the config file path (in app's base directory)
    fn config_path() -> Result<PathBuf, ConfigError> {
        let exe_path = env::current_exe().map_err(|e| ConfigError::LoadFailed {
            path: "<exe>".to_string(),
            source: Box::new(e),
        })?;
        let exe_dir = exe_path
            .parent()
            .ok_or_else(|| ConfigError::Invalid("could not determine executable directory".into()))?;

        Ok(exe_dir.join("config").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.interval_secs, 10);
        assert_eq!(config.nsfw_threshold, 0.5);
        assert_eq!(config.toxicity_threshold, 0.5);
        assert_eq!(config.target_language, "en");
        assert_eq!(config.ocr_language, "eng");
    }

    #[test]
    fn test_default_config_needs_database_url() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let mut config = config;
        config.database_url = "https://example-default-rtdb.firebaseio.com".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_thresholds() {
        let mut config = Config {
            database_url: "https://db.example".to_string(),
            ..Config::default()
        };

        config.nsfw_threshold = 1.5;
        assert!(config.validate().is_err());

        config.nsfw_threshold = 0.5;
        config.toxicity_threshold = -0.1;
        assert!(config.validate().is_err());

        config.toxicity_threshold = 0.5;
        config.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: Config = serde_json::from_str(&json).unwrap();

        assert_eq!(config.interval_secs, deserialized.interval_secs);
        assert_eq!(config.nsfw_threshold, deserialized.nsfw_threshold);
        assert_eq!(config.database_url, deserialized.database_url);
    }

    #[test]
    fn test_loop_config_mapping() {
        let mut config = Config::default();
        config.interval_secs = 3;
        config.toxicity_threshold = 0.8;

        let loop_config = config.loop_config();
        assert_eq!(loop_config.interval, Duration::from_secs(3));
        assert_eq!(loop_config.toxicity_threshold, 0.8);
        assert_eq!(loop_config.nsfw_threshold, 0.5);
    }
}
