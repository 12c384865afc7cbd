use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::logging::DEFAULT_FILTER;
use crate::player::PlayerOptions;

/// Config files searched by `Config::load`, first match wins
pub const CONFIG_PATHS: [&str; 2] = ["exercise-segments.toml", "config/exercise-segments.toml"];

/// Configuration for the exercise segment synchronizer
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Embedded player settings
    #[serde(default)]
    pub player: PlayerConfig,

    /// Playback window enforcement
    #[serde(default)]
    pub sync: SyncConfig,

    /// Analysis service settings
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Player width in pixels
    pub width: u32,

    /// Player height in pixels
    pub height: u32,

    /// Start playing as soon as the video loads
    pub autoplay: bool,

    /// Show player controls
    pub controls: bool,

    /// Hide most platform branding
    pub modest_branding: bool,

    /// Prefix for per-segment mount ids (`<prefix>-<index>`)
    pub mount_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Interval between playback position checks (milliseconds)
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Endpoint that turns a video URL into exercise segments
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level or filter directive
    pub log_level: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            width: 560,
            height: 315,
            autoplay: false,
            controls: true,
            modest_branding: true,
            mount_prefix: "player".to_string(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { poll_interval_ms: 100 }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_seconds: 120, // analysis of a full video is slow
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_FILTER.to_string(),
        }
    }
}

impl PlayerConfig {
    pub fn options(&self) -> PlayerOptions {
        PlayerOptions {
            width: self.width,
            height: self.height,
            autoplay: self.autoplay,
            controls: self.controls,
            modest_branding: self.modest_branding,
        }
    }
}

impl Config {
    /// Load configuration from the first config file found, then the environment
    pub fn load() -> Result<Self> {
        Self::load_from(&CONFIG_PATHS)
    }

    /// Load the first existing file among `paths`
    ///
    /// A file that exists but does not parse is an error, not a silent
    /// fallback to defaults.
    pub fn load_from<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        for path in paths {
            let path = path.as_ref();
            if path.exists() {
                let config = Self::from_file(path)
                    .map_err(|e| anyhow!("Failed to parse config file {}: {}", path.display(), e))?;
                tracing::info!("📄 Loaded configuration from: {}", path.display());
                return Ok(config.with_env_overrides());
            }
        }

        tracing::debug!("No config file found, using defaults");
        Ok(Self::default().with_env_overrides())
    }

    /// Load configuration from a specific TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Cannot read config {}: {}", path.display(), e))?;
        let config: Config = toml::from_str(&config_str)?;
        Ok(config)
    }

    /// Apply environment variable overrides
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(interval) = std::env::var("EXERCISE_SEGMENTS_POLL_INTERVAL_MS") {
            match interval.parse() {
                Ok(ms) => self.sync.poll_interval_ms = ms,
                Err(_) => tracing::warn!("Ignoring invalid EXERCISE_SEGMENTS_POLL_INTERVAL_MS: {}", interval),
            }
        }

        if let Ok(endpoint) = std::env::var("EXERCISE_SEGMENTS_ANALYSIS_ENDPOINT") {
            self.analysis.endpoint = Some(endpoint);
        }

        if let Ok(log_level) = std::env::var("EXERCISE_SEGMENTS_LOG_LEVEL") {
            self.logging.log_level = log_level;
        }

        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.sync.poll_interval_ms == 0 {
            return Err(anyhow!("poll_interval_ms must be greater than 0"));
        }

        if self.player.width == 0 || self.player.height == 0 {
            return Err(anyhow!("player dimensions must be greater than 0"));
        }

        if self.player.mount_prefix.trim().is_empty() {
            return Err(anyhow!("mount_prefix must not be empty"));
        }

        if let Some(endpoint) = &self.analysis.endpoint {
            url::Url::parse(endpoint).map_err(|e| anyhow!("Invalid analysis endpoint {}: {}", endpoint, e))?;
        }

        Ok(())
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.sync.poll_interval_ms = ms;
        self
    }

    pub fn with_player_size(mut self, width: u32, height: u32) -> Self {
        self.config.player.width = width;
        self.config.player.height = height;
        self
    }

    pub fn with_mount_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.player.mount_prefix = prefix.into();
        self
    }

    pub fn with_analysis_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.analysis.endpoint = Some(endpoint.into());
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::SyncSettings;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.sync.poll_interval_ms, 100);
        assert!(!config.player.autoplay);
        assert!(config.player.controls);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_poll_interval_ms(250)
            .with_player_size(640, 360)
            .with_mount_prefix("card")
            .build();

        let settings = SyncSettings::from(&config);
        assert_eq!(settings.poll_interval, Duration::from_millis(250));
        assert_eq!(settings.mount_prefix, "card");
        assert_eq!(settings.player_options.width, 640);
    }

    #[test]
    fn test_config_validation() {
        let config = ConfigBuilder::new().with_poll_interval_ms(0).build();
        assert!(config.validate().is_err());

        let config = ConfigBuilder::new().with_analysis_endpoint("not an endpoint").build();
        assert!(config.validate().is_err());

        let config = ConfigBuilder::new()
            .with_analysis_endpoint("http://localhost:8000/analyze")
            .build();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[sync]\npoll_interval_ms = 50\n").unwrap();
        assert_eq!(config.sync.poll_interval_ms, 50);
        assert_eq!(config.player.width, 560);
        assert!(config.analysis.endpoint.is_none());
    }

    #[test]
    fn test_broken_config_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let broken = temp_dir.path().join("exercise-segments.toml");
        std::fs::write(&broken, "[sync]\npoll_interval_ms = \"fast\"\n").unwrap();

        let err = Config::load_from(&[&broken]).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_first_existing_config_wins() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.toml");
        let present = temp_dir.path().join("present.toml");
        std::fs::write(&present, "[player]\nmount_prefix = \"card\"\n").unwrap();

        let config = Config::load_from(&[&missing, &present]).unwrap();
        assert_eq!(config.player.mount_prefix, "card");

        let config = Config::load_from(&[&missing]).unwrap();
        assert_eq!(config.player.mount_prefix, "player");
    }
}
