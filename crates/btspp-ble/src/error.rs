//! Error types for the BLE backend

use btspp_core::SppError;
use thiserror::Error;

// ----------------------------------------------------------------------------
// Error Types
// ----------------------------------------------------------------------------

/// Errors specific to the BLE backend
#[derive(Error, Debug)]
pub enum BleError {
    #[error("BLE adapter not available: {0}")]
    AdapterNotAvailable(String),

    #[error("Peripheral {address} is not known to the adapter")]
    PeripheralNotFound { address: String },

    #[error("Failed to connect to {address}: {reason}")]
    ConnectionFailed { address: String, reason: String },

    #[error("Connection to {address} timed out")]
    ConnectionTimeout { address: String },

    #[error("Failed to discover services on {address}: {reason}")]
    ServiceDiscoveryFailed { address: String, reason: String },

    #[error("Characteristic {channel} not found on {address}")]
    CharacteristicNotFound { address: String, channel: String },

    #[error("Failed to write to characteristic: {0}")]
    WriteFailed(String),

    #[error("Failed to disconnect: {0}")]
    DisconnectFailed(String),

    #[error("Failed to scan: {0}")]
    ScanFailed(String),

    #[error("Failed to get BLE events: {0}")]
    EventStreamFailed(String),
}

impl From<BleError> for SppError {
    fn from(err: BleError) -> Self {
        match err {
            BleError::AdapterNotAvailable(reason) => SppError::AdapterUnavailable(reason),
            BleError::PeripheralNotFound { ref address }
            | BleError::ConnectionFailed { ref address, .. }
            | BleError::ConnectionTimeout { ref address }
            | BleError::ServiceDiscoveryFailed { ref address, .. } => SppError::ConnectFailed {
                address: address.clone(),
                reason: err.to_string(),
            },
            BleError::CharacteristicNotFound { address, channel } => {
                SppError::ChannelNotFound { address, channel }
            }
            BleError::WriteFailed(reason) => SppError::WriteFailed(reason),
            BleError::DisconnectFailed(reason) => SppError::DisconnectFailed(reason),
            BleError::ScanFailed(reason) | BleError::EventStreamFailed(reason) => {
                SppError::Scan(reason)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let err: SppError = BleError::ConnectionTimeout {
            address: "AA:BB:CC:DD:EE:FF".to_string(),
        }
        .into();
        assert_eq!(
            err,
            SppError::ConnectFailed {
                address: "AA:BB:CC:DD:EE:FF".to_string(),
                reason: "Connection to AA:BB:CC:DD:EE:FF timed out".to_string(),
            }
        );

        let err: SppError = BleError::CharacteristicNotFound {
            address: "AA:BB:CC:DD:EE:FF".to_string(),
            channel: "fff1".to_string(),
        }
        .into();
        assert!(matches!(err, SppError::ChannelNotFound { .. }));
    }
}
