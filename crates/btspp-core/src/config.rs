//! Discovery and resolution configuration

use std::time::Duration;

use crate::error::{Result, SppError};

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

/// Timing configuration for scanning and address resolution
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SppConfig {
    /// How long a discovery scan stays active after the last request
    pub scan_window: Duration,
    /// Delay between cache lookups while waiting for an address
    pub poll_interval: Duration,
}

impl Default for SppConfig {
    fn default() -> Self {
        Self {
            scan_window: Duration::from_secs(10),
            poll_interval: Duration::from_secs(1),
        }
    }
}

impl SppConfig {
    /// Create a new configuration with default timings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the scan window
    pub fn with_scan_window(mut self, window: Duration) -> Self {
        self.scan_window = window;
        self
    }

    /// Set the poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Number of cache lookups made while waiting for an unknown address.
    ///
    /// The attempts together span the whole scan window, and at least one
    /// lookup is always made.
    pub fn poll_attempts(&self) -> u32 {
        let window = self.scan_window.as_nanos();
        let interval = self.poll_interval.as_nanos().max(1);
        let attempts = window.div_ceil(interval).max(1);
        u32::try_from(attempts).unwrap_or(u32::MAX)
    }

    /// Check that the timings are usable
    pub fn validate(&self) -> Result<()> {
        if self.scan_window.is_zero() {
            return Err(SppError::InvalidConfiguration {
                reason: "scan window must be greater than zero".to_string(),
            });
        }
        if self.poll_interval.is_zero() {
            return Err(SppError::InvalidConfiguration {
                reason: "poll interval must be greater than zero".to_string(),
            });
        }
        if self.poll_interval > self.scan_window {
            return Err(SppError::InvalidConfiguration {
                reason: format!(
                    "poll interval ({:?}) exceeds scan window ({:?})",
                    self.poll_interval, self.scan_window
                ),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timings() {
        let config = SppConfig::default();
        assert_eq!(config.scan_window, Duration::from_secs(10));
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert_eq!(config.poll_attempts(), 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_poll_attempts_round_up() {
        let config = SppConfig::new()
            .with_scan_window(Duration::from_millis(2500))
            .with_poll_interval(Duration::from_secs(1));
        assert_eq!(config.poll_attempts(), 3);
    }

    #[test]
    fn test_config_validation() {
        let config = SppConfig::new().with_poll_interval(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = SppConfig::new().with_scan_window(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = SppConfig::new()
            .with_scan_window(Duration::from_secs(1))
            .with_poll_interval(Duration::from_secs(2));
        assert!(matches!(
            config.validate(),
            Err(SppError::InvalidConfiguration { .. })
        ));
    }
}
