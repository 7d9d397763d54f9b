//! Error types for SPP discovery and connection handling

use thiserror::Error;

// ----------------------------------------------------------------------------
// Error Types
// ----------------------------------------------------------------------------

/// Errors surfaced by discovery, resolution and the connection lifecycle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SppError {
    #[error("Device cannot be found: {address}")]
    DeviceNotFound { address: String },

    #[error("Channel {channel} cannot be found on device {address}")]
    ChannelNotFound { address: String, channel: String },

    #[error("Failed to connect to {address}: {reason}")]
    ConnectFailed { address: String, reason: String },

    #[error("Please open() the device first before writing")]
    NotOpen,

    #[error("Device {address} is already open")]
    AlreadyOpen { address: String },

    #[error("Failed to write to device: {0}")]
    WriteFailed(String),

    #[error("Failed to disconnect from device: {0}")]
    DisconnectFailed(String),

    #[error("Scan failed: {0}")]
    Scan(String),

    #[error("Bluetooth adapter not available: {0}")]
    AdapterUnavailable(String),

    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },
}

impl SppError {
    /// Build a `ConnectFailed` error from any displayable backend error
    pub fn connect_failed(address: &str, reason: impl std::fmt::Display) -> Self {
        SppError::ConnectFailed {
            address: address.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result type for SPP operations
pub type Result<T> = std::result::Result<T, SppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = SppError::DeviceNotFound {
            address: "00:00:00:00:00:00".to_string(),
        };
        assert_eq!(err.to_string(), "Device cannot be found: 00:00:00:00:00:00");

        let err = SppError::connect_failed("AA:BB:CC:DD:EE:FF", "link refused");
        assert_eq!(
            err.to_string(),
            "Failed to connect to AA:BB:CC:DD:EE:FF: link refused"
        );
        assert!(SppError::NotOpen.to_string().contains("open()"));
    }
}
