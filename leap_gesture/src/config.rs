//! Runtime configuration, read from a TOML file.
//!
//! ```toml
//! [service]
//! duration_scale = 1.5      # stretch every attempt window
//!
//! [replay]
//! fallback_interval_ms = 10 # pacing when timestamps are missing
//! subscriber_wait_ms = 5000 # how long a replay waits for an attempt
//! ```
//!
//! Missing sections and fields fall back to their defaults.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub replay:  ReplayConfig,
}

/// Recognition service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Multiplier applied to every catalog duration.
    pub duration_scale: f32,
}

/// Replay source settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplayConfig {
    pub fallback_interval_ms: u64,
    /// The replay holds its first frame until an attempt subscribes, for at
    /// most this long.
    pub subscriber_wait_ms:   u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig { duration_scale: 1.0 }
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        ReplayConfig { fallback_interval_ms: 10, subscriber_wait_ms: 5_000 }
    }
}

impl ReplayConfig {
    pub fn fallback_interval(&self) -> Duration {
        Duration::from_millis(self.fallback_interval_ms)
    }

    pub fn subscriber_wait(&self) -> Duration {
        Duration::from_millis(self.subscriber_wait_ms)
    }
}

impl Config {
    /// Check every field; the error names the first one out of range.
    pub fn validate(&self) -> Result<()> {
        let scale = self.service.duration_scale;
        if !(scale > 0.0 && scale <= 10.0) {
            return Err(Error::Config(format!(
                "service.duration_scale must be in (0, 10], got {}", scale
            )));
        }
        if self.replay.fallback_interval_ms == 0 {
            return Err(Error::Config("replay.fallback_interval_ms must be > 0".to_string()));
        }
        if self.replay.subscriber_wait_ms == 0 {
            return Err(Error::Config("replay.subscriber_wait_ms must be > 0".to_string()));
        }
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when given, otherwise use the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Config::load(p),
            None    => Ok(Config::default()),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, content: &str) -> std::path::PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.service.duration_scale, 1.0);
        assert_eq!(config.replay.fallback_interval(), Duration::from_millis(10));
        assert_eq!(config.replay.subscriber_wait(), Duration::from_secs(5));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "[service]\nduration_scale = 2.0\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.service.duration_scale, 2.0);
        assert_eq!(config.replay, ReplayConfig::default());
    }

    #[test]
    fn out_of_range_scale_rejected() {
        for bad in [0.0, -1.0, 10.5, f32::NAN] {
            let mut config = Config::default();
            config.service.duration_scale = bad;
            assert!(matches!(config.validate(), Err(Error::Config(_))), "{bad}");
        }
    }

    #[test]
    fn zero_fallback_interval_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "[replay]\nfallback_interval_ms = 0\n");
        assert!(matches!(Config::load(&path), Err(Error::Config(_))));
    }

    #[test]
    fn zero_subscriber_wait_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "[replay]\nsubscriber_wait_ms = 0\n");
        assert!(matches!(Config::load(&path), Err(Error::Config(_))));
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "[service\nduration_scale = ");
        assert!(matches!(Config::load(&path), Err(Error::Config(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(Config::load(&path), Err(Error::Io(_))));
        assert_eq!(Config::load_or_default(None).unwrap(), Config::default());
    }

    #[test]
    fn toml_round_trip() {
        let mut config = Config::default();
        config.replay.subscriber_wait_ms = 250;
        let dir = TempDir::new().unwrap();
        let path = write(&dir, &config.to_toml().unwrap());
        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
