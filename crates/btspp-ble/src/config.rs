//! BLE backend configuration

use std::time::Duration;

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

/// Configuration for the BLE backend
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BleConfig {
    /// Which adapter to use when the host has several
    pub adapter_index: usize,
    /// Maximum time to wait for a GATT connection
    pub connection_timeout: Duration,
    /// Largest single characteristic write; longer payloads are split
    pub write_chunk_size: usize,
    /// Label given to writable characteristics in discovery listings
    pub channel_name: String,
}

impl Default for BleConfig {
    fn default() -> Self {
        Self {
            adapter_index: 0,
            connection_timeout: Duration::from_secs(5),
            write_chunk_size: 244, // Conservative ATT payload size
            channel_name: "SPP".to_string(),
        }
    }
}

impl BleConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set adapter index
    pub fn with_adapter_index(mut self, index: usize) -> Self {
        self.adapter_index = index;
        self
    }

    /// Set connection timeout
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Set write chunk size
    pub fn with_write_chunk_size(mut self, size: usize) -> Self {
        self.write_chunk_size = size;
        self
    }

    /// Set channel label
    pub fn with_channel_name(mut self, name: String) -> Self {
        self.channel_name = name;
        self
    }
}
