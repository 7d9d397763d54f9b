//! Shared table of the most recently observed peripherals

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::peripheral::PeripheralDescriptor;

// ----------------------------------------------------------------------------
// Discovery Cache
// ----------------------------------------------------------------------------

/// Address-keyed cache of discovered peripherals.
///
/// Cloning yields another handle to the same table. Entries are never
/// expired; a newer observation of the same address replaces the old one.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryCache {
    peripherals: Arc<RwLock<HashMap<String, PeripheralDescriptor>>>,
}

impl DiscoveryCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a scan observation, replacing any previous entry for the address.
    ///
    /// Returns `false` when the descriptor was discarded because the device
    /// is not connectable.
    pub async fn on_observed(&self, descriptor: PeripheralDescriptor) -> bool {
        if !descriptor.connectable {
            debug!(
                "Ignoring non-connectable peripheral {}",
                descriptor.address
            );
            return false;
        }

        let mut peripherals = self.peripherals.write().await;
        if peripherals.contains_key(&descriptor.address) {
            debug!("Refreshed peripheral {}", descriptor.address);
        } else {
            debug!(
                "Discovered peripheral {} ({})",
                descriptor.address, descriptor.display_name
            );
        }
        peripherals.insert(descriptor.address.clone(), descriptor);
        true
    }

    /// Check whether an address has been observed
    pub async fn has(&self, address: &str) -> bool {
        self.peripherals.read().await.contains_key(address)
    }

    /// Get the latest descriptor for an address
    pub async fn get(&self, address: &str) -> Option<PeripheralDescriptor> {
        self.peripherals.read().await.get(address).cloned()
    }

    /// Snapshot of every cached descriptor, ordered by address
    pub async fn list_all(&self) -> Vec<PeripheralDescriptor> {
        let peripherals = self.peripherals.read().await;
        let mut all: Vec<PeripheralDescriptor> = peripherals.values().cloned().collect();
        all.sort_by(|a, b| a.address.cmp(&b.address));
        all
    }

    /// Number of cached peripherals
    pub async fn len(&self) -> usize {
        self.peripherals.read().await.len()
    }

    /// Whether the cache holds no peripherals
    pub async fn is_empty(&self) -> bool {
        self.peripherals.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::peripheral::ChannelInfo;
    use proptest::prelude::*;

    #[tokio::test]
    async fn test_last_observation_wins() {
        let cache = DiscoveryCache::new();
        cache
            .on_observed(PeripheralDescriptor::new("AA:BB:CC:DD:EE:FF", "Printer"))
            .await;
        cache
            .on_observed(
                PeripheralDescriptor::new("AA:BB:CC:DD:EE:FF", "Printer v2")
                    .with_channels(vec![ChannelInfo::new("fff1", "SPP")]),
            )
            .await;

        assert_eq!(cache.len().await, 1);
        let entry = cache.get("AA:BB:CC:DD:EE:FF").await.unwrap();
        assert_eq!(entry.display_name, "Printer v2");
        assert_eq!(entry.advertised_channels.len(), 1);
    }

    #[tokio::test]
    async fn test_non_connectable_discarded() {
        let cache = DiscoveryCache::new();
        let recorded = cache
            .on_observed(PeripheralDescriptor::new("11:22:33:44:55:66", "Beacon").with_connectable(false))
            .await;

        assert!(!recorded);
        assert!(!cache.has("11:22:33:44:55:66").await);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_clones_share_entries() {
        let cache = DiscoveryCache::new();
        let handle = cache.clone();
        handle
            .on_observed(PeripheralDescriptor::new("AA:AA:AA:AA:AA:AA", ""))
            .await;
        assert!(cache.has("AA:AA:AA:AA:AA:AA").await);
        assert!(cache.get("BB:BB:BB:BB:BB:BB").await.is_none());
    }

    proptest! {
        #[test]
        fn prop_listing_has_unique_addresses(
            observations in proptest::collection::vec((0u8..8, "[a-z]{0,6}"), 0..40)
        ) {
            let listed = tokio_test::block_on(async {
                let cache = DiscoveryCache::new();
                for (id, name) in &observations {
                    let address = format!("00:00:00:00:00:{:02X}", id);
                    cache.on_observed(PeripheralDescriptor::new(address, name.clone())).await;
                }
                cache.list_all().await
            });

            let mut addresses: Vec<&str> = listed.iter().map(|d| d.address.as_str()).collect();
            let total = addresses.len();
            addresses.dedup();
            prop_assert_eq!(addresses.len(), total);

            for descriptor in &listed {
                let last = observations
                    .iter()
                    .rev()
                    .find(|(id, _)| format!("00:00:00:00:00:{:02X}", id) == descriptor.address)
                    .map(|(_, name)| name.clone());
                prop_assert_eq!(Some(descriptor.display_name.clone()), last);
            }
        }
    }
}
