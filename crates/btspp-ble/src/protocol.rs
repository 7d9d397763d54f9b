//! GATT channel naming and characteristic selection
//!
//! A BLE channel is the UUID of a writable characteristic. Channels may be
//! given in 16-bit (`FFF1`), 32-bit or full 128-bit form, case-insensitively.

use btleplug::api::{CharPropFlags, Characteristic};
use btspp_core::ChannelInfo;
use uuid::Uuid;

// ----------------------------------------------------------------------------
// UUID Helpers
// ----------------------------------------------------------------------------

/// Bluetooth base UUID that short 16/32-bit identifiers expand into
pub const BLUETOOTH_BASE_UUID: Uuid = Uuid::from_u128(0x00000000_0000_1000_8000_00805F9B34FB);

const BASE_MASK: u128 = (1u128 << 96) - 1;

/// Parse a channel identifier into a full UUID
pub fn parse_channel(channel: &str) -> Option<Uuid> {
    let trimmed = channel.trim();
    let short = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if matches!(short.len(), 4 | 8) {
        if !short.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(short, 16).ok()?;
        return Some(Uuid::from_u128(
            ((value as u128) << 96) | BLUETOOTH_BASE_UUID.as_u128(),
        ));
    }

    Uuid::parse_str(trimmed).ok()
}

/// Shortest textual form of a UUID: 16 or 32-bit when it derives from the
/// Bluetooth base UUID, otherwise the full hyphenated form.
pub fn channel_label(uuid: &Uuid) -> String {
    let value = uuid.as_u128();
    if value & BASE_MASK != BLUETOOTH_BASE_UUID.as_u128() {
        return uuid.to_string();
    }
    let short = (value >> 96) as u32;
    if short <= 0xFFFF {
        format!("{:04x}", short)
    } else {
        format!("{:08x}", short)
    }
}

// ----------------------------------------------------------------------------
// Characteristic Selection
// ----------------------------------------------------------------------------

/// Whether a characteristic accepts writes of either kind
pub fn is_writable(properties: CharPropFlags) -> bool {
    properties.intersects(CharPropFlags::WRITE | CharPropFlags::WRITE_WITHOUT_RESPONSE)
}

/// Writable characteristics as discovery channels
pub fn writable_channels<'a>(
    characteristics: impl IntoIterator<Item = &'a Characteristic>,
    name: &str,
) -> Vec<ChannelInfo> {
    characteristics
        .into_iter()
        .filter(|c| is_writable(c.properties))
        .map(|c| ChannelInfo::new(channel_label(&c.uuid), name))
        .collect()
}

/// Advertised service UUIDs as discovery channels, used until the
/// peripheral's characteristics are known
pub fn service_channels<'a>(services: impl IntoIterator<Item = &'a Uuid>) -> Vec<ChannelInfo> {
    services
        .into_iter()
        .map(|uuid| ChannelInfo::new(channel_label(uuid), "Service"))
        .collect()
}

/// Find the writable characteristic whose UUID is `channel`
pub fn find_write_characteristic<'a>(
    characteristics: impl IntoIterator<Item = &'a Characteristic>,
    channel: Uuid,
) -> Option<Characteristic> {
    characteristics
        .into_iter()
        .find(|c| c.uuid == channel && is_writable(c.properties))
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn characteristic(uuid: Uuid, properties: CharPropFlags) -> Characteristic {
        Characteristic {
            uuid,
            service_uuid: parse_channel("FFF0").unwrap(),
            properties,
            descriptors: BTreeSet::new(),
        }
    }

    #[test]
    fn test_parse_short_channels() {
        let expected = Uuid::parse_str("0000fff1-0000-1000-8000-00805f9b34fb").unwrap();
        assert_eq!(parse_channel("FFF1"), Some(expected));
        assert_eq!(parse_channel("fff1"), Some(expected));
        assert_eq!(parse_channel("0xFFF1"), Some(expected));
        assert_eq!(parse_channel("0000FFF1"), Some(expected));
    }

    #[test]
    fn test_parse_full_channel() {
        let full = "6e400002-b5a3-f393-e0a9-e50e24dcca9e";
        assert_eq!(parse_channel(full), Uuid::parse_str(full).ok());
        assert_eq!(parse_channel(&full.to_uppercase()), Uuid::parse_str(full).ok());
    }

    #[test]
    fn test_parse_invalid_channel() {
        assert_eq!(parse_channel("X"), None);
        assert_eq!(parse_channel("ZZZZ"), None);
        assert_eq!(parse_channel(""), None);
        assert_eq!(parse_channel("+FFF"), None);
        assert_eq!(parse_channel("0x+FFF"), None);
        assert_eq!(parse_channel("+FFFFFFF"), None);
    }

    #[test]
    fn test_channel_label() {
        assert_eq!(channel_label(&parse_channel("FFF1").unwrap()), "fff1");
        assert_eq!(channel_label(&parse_channel("12345678").unwrap()), "12345678");
        let custom = Uuid::parse_str("6e400002-b5a3-f393-e0a9-e50e24dcca9e").unwrap();
        assert_eq!(channel_label(&custom), "6e400002-b5a3-f393-e0a9-e50e24dcca9e");
    }

    #[test]
    fn test_only_writable_characteristics_listed() {
        let chars = [
            characteristic(parse_channel("FFF1").unwrap(), CharPropFlags::WRITE),
            characteristic(parse_channel("FFF2").unwrap(), CharPropFlags::NOTIFY),
            characteristic(
                parse_channel("FFF3").unwrap(),
                CharPropFlags::WRITE_WITHOUT_RESPONSE | CharPropFlags::READ,
            ),
        ];

        let channels = writable_channels(chars.iter(), "SPP");
        assert_eq!(
            channels,
            vec![ChannelInfo::new("fff1", "SPP"), ChannelInfo::new("fff3", "SPP")]
        );
    }

    #[test]
    fn test_find_write_characteristic() {
        let chars = [
            characteristic(parse_channel("FFF1").unwrap(), CharPropFlags::WRITE),
            characteristic(parse_channel("FFF2").unwrap(), CharPropFlags::NOTIFY),
        ];

        let found = find_write_characteristic(chars.iter(), parse_channel("fff1").unwrap());
        assert_eq!(found.map(|c| c.uuid), parse_channel("FFF1"));

        // Present but not writable
        assert!(find_write_characteristic(chars.iter(), parse_channel("FFF2").unwrap()).is_none());
        assert!(find_write_characteristic(chars.iter(), parse_channel("FFF9").unwrap()).is_none());
    }
}
