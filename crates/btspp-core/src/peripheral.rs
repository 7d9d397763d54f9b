//! Discovered peripheral snapshots and their public projection

use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Peripheral Descriptor
// ----------------------------------------------------------------------------

/// A channel a peripheral offers for serial traffic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Backend-specific channel identifier (characteristic UUID or RFCOMM channel)
    pub channel: String,
    /// Human readable label
    pub name: String,
}

impl ChannelInfo {
    pub fn new(channel: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            name: name.into(),
        }
    }
}

/// Snapshot of a peripheral as last observed by a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeripheralDescriptor {
    /// Stable device address
    pub address: String,
    /// Advertised name, empty when the device has none
    pub display_name: String,
    /// Channels the device is known to offer, in backend order
    pub advertised_channels: Vec<ChannelInfo>,
    /// Whether the device accepts connections
    pub connectable: bool,
}

impl PeripheralDescriptor {
    /// Create a connectable descriptor with no known channels
    pub fn new(address: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            display_name: display_name.into(),
            advertised_channels: Vec::new(),
            connectable: true,
        }
    }

    /// Set the advertised channels
    pub fn with_channels(mut self, channels: Vec<ChannelInfo>) -> Self {
        self.advertised_channels = channels;
        self
    }

    /// Set the connectable flag
    pub fn with_connectable(mut self, connectable: bool) -> Self {
        self.connectable = connectable;
        self
    }

    /// Project into the listing shape returned by discovery
    pub fn to_device_info(&self) -> DeviceInfo {
        DeviceInfo {
            address: self.address.clone(),
            name: self.display_name.clone(),
            services: self.advertised_channels.clone(),
        }
    }
}

// ----------------------------------------------------------------------------
// Discovery Listing
// ----------------------------------------------------------------------------

/// Device entry returned by `DiscoveryService::find_devices`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub address: String,
    pub name: String,
    pub services: Vec<ChannelInfo>,
}
