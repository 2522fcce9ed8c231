//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use kickbot_tracking_model::{CaptureRegion, ControlSettings, FrameSize, Parameters};

use crate::error::{KickbotError, KickbotResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Physics and trigger tuning.
    pub parameters: Parameters,

    /// Initial loop controls.
    pub controls: ControlSettings,

    /// Where and how much of the screen to capture.
    pub capture: CaptureSettings,

    /// Tracking loop settings.
    pub engine: EngineSettings,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Capture region placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Origin of the capture region in screen pixels.
    pub region: CaptureRegion,

    /// Requested capture size in pixels.
    pub size: FrameSize,
}

/// Tracking loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Number of per-cycle timing records kept.
    pub timings_capacity: usize,

    /// Sleep between checks while the loop is paused (milliseconds).
    pub idle_sleep_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "kickbot=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            region: CaptureRegion::new(316, 799),
            size: FrameSize::new(320, 455),
        }
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            timings_capacity: 128,
            idle_sleep_ms: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match Self::load_from(&config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Failed to load config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Load config from an explicit path.
    pub fn load_from(path: &Path) -> KickbotResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> KickbotResult<()> {
        self.save_to(&config_file_path())
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, path: &Path) -> KickbotResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Check the values the tracking loop relies on.
    ///
    /// The hot path does not guard against bad numbers, so this is the
    /// place to reject them.
    pub fn validate(&self) -> KickbotResult<()> {
        let mut problems: Vec<String> = self
            .parameters
            .non_finite_fields()
            .into_iter()
            .map(|name| format!("parameters.{name} must be finite"))
            .collect();

        if self.parameters.max_lost_frames == 0 {
            problems.push("parameters.max_lost_frames must be at least 1".to_string());
        }
        if self.capture.size.is_empty() {
            problems.push(format!(
                "capture.size must be non-empty (got {}x{})",
                self.capture.size.width, self.capture.size.height
            ));
        }
        if self.engine.timings_capacity == 0 {
            problems.push("engine.timings_capacity must be at least 1".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(KickbotError::config(problems.join("; ")))
        }
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("kickbot").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn test_validate_collects_every_problem() {
        let mut config = AppConfig::default();
        config.parameters.acceleration = f32::NAN;
        config.parameters.max_lost_frames = 0;
        config.capture.size = FrameSize::new(0, 455);

        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("parameters.acceleration"));
        assert!(message.contains("max_lost_frames"));
        assert!(message.contains("capture.size"));
    }

    #[test]
    fn test_save_and_load_from_path() {
        let dir = std::env::temp_dir().join("kickbot_test_config");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("config.json");

        let mut config = AppConfig::default();
        config.parameters.height_trigger_hard = 0.3;
        config.controls.click_padding = 4;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.parameters.height_trigger_hard, 0.3);
        assert_eq!(loaded.controls.click_padding, 4);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"engine": {"idle_sleep_ms": 25}}"#).unwrap();
        assert_eq!(config.engine.idle_sleep_ms, 25);
        assert_eq!(config.engine.timings_capacity, 128);
        assert_eq!(config.capture.size, FrameSize::new(320, 455));
    }
}
