//! CLI configuration management

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Integration time in milliseconds (1-10000).
    #[serde(default = "CliConfig::default_integration_time_ms")]
    pub integration_time_ms: u32,
    /// Verbosity bitmask selecting metadata blocks.
    #[serde(default = "CliConfig::default_verbosity")]
    pub verbosity: u32,
    /// Log level when `RUST_LOG` and `--log-level` are absent.
    #[serde(default = "CliConfig::default_log_level")]
    pub log_level: String,
    /// Session timeout used while draining stale spectra.
    #[serde(default = "CliConfig::default_drain_timeout_ms")]
    pub drain_timeout_ms: u32,
    /// Session timeout for the spectrum read itself.
    #[serde(default = "CliConfig::default_spectrum_timeout_ms")]
    pub spectrum_timeout_ms: u32,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            integration_time_ms: Self::default_integration_time_ms(),
            verbosity: Self::default_verbosity(),
            log_level: Self::default_log_level(),
            drain_timeout_ms: Self::default_drain_timeout_ms(),
            spectrum_timeout_ms: Self::default_spectrum_timeout_ms(),
        }
    }
}

impl CliConfig {
    fn default_integration_time_ms() -> u32 {
        100
    }

    fn default_verbosity() -> u32 {
        // Serial number, date/time, integration time, generic header.
        31
    }

    fn default_log_level() -> String {
        "warn".to_owned()
    }

    fn default_drain_timeout_ms() -> u32 {
        20
    }

    fn default_spectrum_timeout_ms() -> u32 {
        10_000
    }

    /// Load configuration from the specified path, or from the default
    /// location when none is given.
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => {
                let p = Self::default_path();
                if !p.exists() {
                    return Err(anyhow!("no configuration file found"));
                }
                p
            }
        };

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read config file: {}", config_path.display()))?;

        let config: CliConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse config file: {}", config_path.display()))?;

        config.validate()?;

        tracing::debug!("loaded configuration from {}", config_path.display());
        Ok(config)
    }

    /// Load configuration or fall back to the defaults.
    pub fn load_or_default() -> Self {
        Self::load(None).unwrap_or_default()
    }

    /// Save configuration to the specified path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("failed to serialize configuration")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, content)
            .with_context(|| format!("failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Default configuration file path.
    pub fn default_path() -> PathBuf {
        if let Some(config_dir) = dirs::config_dir() {
            config_dir.join("spectrousb").join("spectroread.toml")
        } else {
            PathBuf::from(".config/spectrousb/spectroread.toml")
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(anyhow!(
                "invalid log level '{}', must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }

        if !(1..=10_000).contains(&self.integration_time_ms) {
            return Err(anyhow!(
                "integration time {} out of range (1-10000 ms)",
                self.integration_time_ms
            ));
        }

        for (name, value) in [
            ("drain_timeout_ms", self.drain_timeout_ms),
            ("spectrum_timeout_ms", self.spectrum_timeout_ms),
        ] {
            if !(1..=99_999).contains(&value) {
                return Err(anyhow!("{name} {value} out of range (1-99999 ms)"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CliConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.integration_time_ms, 100);
        assert_eq!(config.verbosity, 31);
    }

    #[test]
    fn test_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spectroread.toml");

        let mut config = CliConfig::default();
        config.integration_time_ms = 250;
        config.verbosity = 127;
        config.save(&path).unwrap();

        let loaded = CliConfig::load(Some(path)).unwrap();
        assert_eq!(loaded.integration_time_ms, 250);
        assert_eq!(loaded.verbosity, 127);
        assert_eq!(loaded.log_level, config.log_level);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spectroread.toml");
        fs::write(&path, "integration_time_ms = 500\n").unwrap();

        let loaded = CliConfig::load(Some(path)).unwrap();
        assert_eq!(loaded.integration_time_ms, 500);
        assert_eq!(loaded.spectrum_timeout_ms, 10_000);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = CliConfig::default();
        config.log_level = "noisy".to_owned();
        assert!(config.validate().is_err());

        let mut config = CliConfig::default();
        config.integration_time_ms = 0;
        assert!(config.validate().is_err());

        let mut config = CliConfig::default();
        config.spectrum_timeout_ms = 100_000;
        assert!(config.validate().is_err());
    }
}
