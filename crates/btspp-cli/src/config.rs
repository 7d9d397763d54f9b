//! btspp CLI configuration
//!
//! Settings come from a TOML file (`--config`), falling back to defaults.
//! Command line flags are applied on top by the caller.

use std::path::Path;

use serde::{Deserialize, Serialize};

use btspp_ble::BleConfig;
use btspp_core::SppConfig;
use btspp_rfcomm::{RfcommConfig, MAX_RFCOMM_CHANNEL};

use crate::error::{CliError, Result};
use crate::platform::BackendKind;

// ----------------------------------------------------------------------------
// Application Configuration
// ----------------------------------------------------------------------------

/// Complete configuration for the btspp CLI
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Which Bluetooth stack to use
    pub backend: BackendKind,
    /// Scan window and poll timings
    pub spp: SppConfig,
    /// BLE backend settings
    pub ble: BleConfig,
    /// Classic RFCOMM backend settings
    pub rfcomm: RfcommConfig,
}

impl AppConfig {
    /// Load and validate configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the backends cannot use
    pub fn validate(&self) -> Result<()> {
        self.spp.validate()?;

        if self.ble.write_chunk_size == 0 {
            return Err(CliError::Config(
                "ble.write_chunk_size must be greater than zero".to_string(),
            ));
        }

        if self.rfcomm.channels.is_empty() {
            return Err(CliError::Config(
                "rfcomm.channels must list at least one channel".to_string(),
            ));
        }
        if let Some(channel) = self
            .rfcomm
            .channels
            .iter()
            .find(|c| !(1..=MAX_RFCOMM_CHANNEL).contains(*c))
        {
            return Err(CliError::Config(format!(
                "RFCOMM channel {} is outside 1-{}",
                channel, MAX_RFCOMM_CHANNEL
            )));
        }

        Ok(())
    }

    /// Create example configuration file content
    pub fn example_config() -> String {
        toml::to_string_pretty(&AppConfig::default())
            .unwrap_or_else(|_| "# Failed to generate example config".to_string())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_config_creation() {
        let config = AppConfig::default();
        assert_eq!(config.backend, BackendKind::Auto);
        assert_eq!(config.spp.scan_window, Duration::from_secs(10));
        assert_eq!(config.rfcomm.channels, vec![1]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut invalid = AppConfig::default();
        invalid.rfcomm.channels = vec![0];
        assert!(invalid.validate().is_err());

        let mut invalid = AppConfig::default();
        invalid.ble.write_chunk_size = 0;
        assert!(invalid.validate().is_err());

        let mut invalid = AppConfig::default();
        invalid.spp.poll_interval = Duration::from_secs(60);
        assert!(matches!(invalid.validate(), Err(CliError::Spp(_))));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml(
            r#"
            backend = "ble"

            [rfcomm]
            channels = [1, 2]
            "#,
        )
        .unwrap();

        assert_eq!(config.backend, BackendKind::Ble);
        assert_eq!(config.rfcomm.channels, vec![1, 2]);
        assert!(config.rfcomm.paired_only);
        assert_eq!(config.spp, SppConfig::default());
    }

    #[test]
    fn test_example_config_generation() {
        let example = AppConfig::example_config();
        assert!(example.contains("[spp"));
        assert!(example.contains("[ble"));
        assert!(example.contains("[rfcomm]"));

        let parsed = AppConfig::from_toml(&example).unwrap();
        assert_eq!(parsed, AppConfig::default());
    }
}
