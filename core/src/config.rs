//! Configuration management (config.toml)
//!
//! Handles loading, saving, and providing defaults for application settings.
//! Settings are stored in TOML format in the platform-specific config directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::input::InputConfig;

/// Application configuration.
///
/// Every section and field has a serde default, so partial files load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backbuffer settings
    #[serde(default)]
    pub video: VideoConfig,
    /// Audio ring and tone settings
    #[serde(default)]
    pub audio: AudioConfig,
    /// Controller settings
    #[serde(default)]
    pub input: InputConfig,
    /// Loop pacing
    #[serde(default)]
    pub runtime: RuntimeSection,
}

/// Backbuffer geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Backbuffer width in pixels (default: 1280)
    #[serde(default = "default_width")]
    pub width: u32,
    /// Backbuffer height in pixels (default: 720)
    #[serde(default = "default_height")]
    pub height: u32,
}

/// Audio configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Output sample rate (default: 48000)
    #[serde(default = "default_samples_per_second")]
    pub samples_per_second: u32,
    /// Initial tone frequency in Hz (default: 256)
    #[serde(default = "default_tone_hz")]
    pub tone_hz: u32,
    /// Peak sample amplitude (default: 5000)
    #[serde(default = "default_tone_volume")]
    pub tone_volume: i16,
    /// Latency window as a fraction of a second, 1/N (default: 15)
    #[serde(default = "default_latency_divisor")]
    pub latency_divisor: u32,
    /// Tone frequency with the stick centered (default: 512)
    #[serde(default = "default_center_hz")]
    pub center_hz: i32,
    /// Frequency offset at roughly full stick deflection (default: 256)
    #[serde(default = "default_hz_range")]
    pub hz_range: i32,
}

/// Loop pacing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeSection {
    /// Target iterations per second, 0 runs unpaced (default: 60)
    #[serde(default = "default_tick_rate")]
    pub tick_rate: u32,
    /// Per-frame work budget in milliseconds before a warning (default: 4.0)
    #[serde(default = "default_cpu_budget_ms")]
    pub cpu_budget_ms: f64,
}

fn default_width() -> u32 {
    1280
}
fn default_height() -> u32 {
    720
}

fn default_samples_per_second() -> u32 {
    48_000
}
fn default_tone_hz() -> u32 {
    256
}
fn default_tone_volume() -> i16 {
    5000
}
fn default_latency_divisor() -> u32 {
    15
}
fn default_center_hz() -> i32 {
    512
}
fn default_hz_range() -> i32 {
    256
}

fn default_tick_rate() -> u32 {
    60
}
fn default_cpu_budget_ms() -> f64 {
    4.0
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            samples_per_second: default_samples_per_second(),
            tone_hz: default_tone_hz(),
            tone_volume: default_tone_volume(),
            latency_divisor: default_latency_divisor(),
            center_hz: default_center_hz(),
            hz_range: default_hz_range(),
        }
    }
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            tick_rate: default_tick_rate(),
            cpu_budget_ms: default_cpu_budget_ms(),
        }
    }
}

/// Returns the platform-specific configuration directory.
///
/// On Windows: `%APPDATA%\Pulseframe\config`
/// On macOS: `~/Library/Application Support/io.pulseframe.Pulseframe`
/// On Linux: `~/.config/Pulseframe`
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.pulseframe", "", "Pulseframe")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Loads the configuration from disk.
///
/// Reads `config.toml` from the platform's configuration directory.
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> Config {
    let Some(path) = config_dir().map(|dir| dir.join("config.toml")) else {
        return Config::default();
    };
    if !path.exists() {
        return Config::default();
    }
    match load_from(&path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ignoring {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Loads the configuration from an explicit path, surfacing read and parse errors.
pub fn load_from(path: &Path) -> Result<Config, CoreError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))?;
    toml::from_str(&content).map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))
}

/// Saves the configuration to disk.
///
/// Writes `config.toml` to the platform's configuration directory.
/// Creates the directory if it doesn't exist.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file
/// cannot be written.
pub fn save(config: &Config) -> std::io::Result<()> {
    if let Some(dir) = config_dir() {
        save_to(config, &dir.join("config.toml"))?;
    }
    Ok(())
}

/// Writes `config` as pretty TOML to `path`, creating parent directories.
pub fn save_to(config: &Config, path: &Path) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let content = toml::to_string_pretty(config).map_err(std::io::Error::other)?;
    std::fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    // =============================================================
    // Default value tests
    // =============================================================

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.video.width, 1280);
        assert_eq!(config.video.height, 720);
        assert_eq!(config.audio.samples_per_second, 48_000);
        assert_eq!(config.audio.tone_hz, 256);
        assert_eq!(config.audio.tone_volume, 5000);
        assert_eq!(config.audio.latency_divisor, 15);
        assert_eq!(config.input.stick_deadzone, 7849);
        assert_eq!(config.runtime.tick_rate, 60);
    }

    // =============================================================
    // TOML serialization tests
    // =============================================================

    #[test]
    fn test_config_deserialize_empty() {
        // Empty TOML should produce defaults
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_deserialize_partial_audio() {
        let toml_str = r#"
[audio]
tone_hz = 440
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.audio.tone_hz, 440);
        assert_eq!(config.audio.samples_per_second, 48_000); // default
        assert_eq!(config.video, VideoConfig::default());
    }

    #[test]
    fn test_config_deserialize_unpaced() {
        let toml_str = r#"
[runtime]
tick_rate = 0
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.runtime.tick_rate, 0);
        assert!((config.runtime.cpu_budget_ms - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_video_config_serialize() {
        let video = VideoConfig {
            width: 640,
            height: 480,
        };
        let toml_str = toml::to_string(&video).unwrap();
        assert!(toml_str.contains("width = 640"));
        assert!(toml_str.contains("height = 480"));
    }

    // =============================================================
    // File tests
    // =============================================================

    #[test]
    fn test_save_then_load_from() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.video.width = 320;
        config.input.stick_deadzone = 0;
        save_to(&config, &path).unwrap();

        assert_eq!(load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_load_from_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[video]\nwidth = \"wide\"\n").unwrap();

        let err = load_from(&path).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_from(&dir.path().join("absent.toml")).is_err());
    }
}
