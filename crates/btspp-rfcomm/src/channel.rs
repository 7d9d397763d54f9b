//! RFCOMM channel numbers and device descriptors

use btspp_core::{ChannelInfo, PeripheralDescriptor};

use crate::config::RfcommConfig;

/// Highest RFCOMM server channel
pub const MAX_RFCOMM_CHANNEL: u8 = 30;

/// Parse a channel identifier into an RFCOMM channel number (1–30)
pub fn parse_rfcomm_channel(channel: &str) -> Option<u8> {
    let number: u8 = channel.trim().parse().ok()?;
    (1..=MAX_RFCOMM_CHANNEL).contains(&number).then_some(number)
}

/// Descriptor for a classic device, listing the configured channels
pub fn classic_descriptor(address: String, name: Option<String>, config: &RfcommConfig) -> PeripheralDescriptor {
    let channels = config
        .channels
        .iter()
        .map(|channel| ChannelInfo::new(channel.to_string(), config.channel_name.clone()))
        .collect();
    PeripheralDescriptor::new(address, name.unwrap_or_default()).with_channels(channels)
}
