//! RFCOMM backend configuration

// ----------------------------------------------------------------------------
// Configuration
// ----------------------------------------------------------------------------

/// Configuration for the classic Bluetooth backend
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RfcommConfig {
    /// BlueZ adapter name (e.g. `hci0`); the default adapter when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adapter_name: Option<String>,
    /// RFCOMM channels listed for every discovered device
    pub channels: Vec<u8>,
    /// Label given to listed channels
    pub channel_name: String,
    /// Only report paired devices; otherwise also run an inquiry scan
    pub paired_only: bool,
}

impl Default for RfcommConfig {
    fn default() -> Self {
        Self {
            adapter_name: None,
            channels: vec![1],
            channel_name: "SPP".to_string(),
            paired_only: true,
        }
    }
}

impl RfcommConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set adapter name
    pub fn with_adapter_name(mut self, name: String) -> Self {
        self.adapter_name = Some(name);
        self
    }

    /// Set listed channels
    pub fn with_channels(mut self, channels: Vec<u8>) -> Self {
        self.channels = channels;
        self
    }

    /// Set whether only paired devices are reported
    pub fn with_paired_only(mut self, paired_only: bool) -> Self {
        self.paired_only = paired_only;
        self
    }
}
