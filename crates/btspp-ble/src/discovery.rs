//! BLE scanning and translation of adapter events into cache observations

use btleplug::api::{BDAddr, Central, CentralEvent, Peripheral as _, ScanFilter};
use btleplug::platform::{Adapter, Peripheral};
use btspp_core::{DiscoveryCache, PeripheralDescriptor};
use futures::stream::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::BleConfig;
use crate::error::BleError;
use crate::protocol::{service_channels, writable_channels};

// ----------------------------------------------------------------------------
// Peripheral Description
// ----------------------------------------------------------------------------

/// Address used as the cache key for a peripheral.
///
/// Some stacks (CoreBluetooth) hide the hardware address and report all
/// zeros; the platform peripheral id is used instead in that case.
pub fn peripheral_address(peripheral: &Peripheral, address: BDAddr) -> String {
    if address == BDAddr::default() {
        format!("{:?}", peripheral.id())
    } else {
        address.to_string()
    }
}

/// Build a descriptor from whatever the adapter currently knows
pub async fn describe_peripheral(
    peripheral: &Peripheral,
    config: &BleConfig,
) -> Option<PeripheralDescriptor> {
    let properties = match peripheral.properties().await {
        Ok(Some(properties)) => properties,
        Ok(None) => return None,
        Err(e) => {
            debug!("Failed to read peripheral properties: {}", e);
            return None;
        }
    };

    let address = peripheral_address(peripheral, properties.address);
    let characteristics = peripheral.characteristics();
    let channels = if characteristics.is_empty() {
        service_channels(properties.services.iter())
    } else {
        writable_channels(characteristics.iter(), &config.channel_name)
    };

    Some(
        PeripheralDescriptor::new(address, properties.local_name.unwrap_or_default())
            .with_channels(channels),
    )
}

// ----------------------------------------------------------------------------
// Scanning
// ----------------------------------------------------------------------------

/// Start the adapter scan
pub async fn start_scanning(adapter: &Adapter) -> Result<(), BleError> {
    adapter
        .start_scan(ScanFilter::default())
        .await
        .map_err(|e| BleError::ScanFailed(format!("Failed to start BLE scan: {}", e)))
}

/// Stop the adapter scan
pub async fn stop_scanning(adapter: &Adapter) -> Result<(), BleError> {
    adapter
        .stop_scan()
        .await
        .map_err(|e| BleError::ScanFailed(format!("Failed to stop BLE scan: {}", e)))
}

/// Subscribe to adapter events and feed every observation into `cache`.
///
/// Peripherals the adapter already knows about are reported first.
pub async fn spawn_event_listener(
    adapter: Adapter,
    cache: DiscoveryCache,
    config: BleConfig,
) -> Result<JoinHandle<()>, BleError> {
    let mut events = adapter
        .events()
        .await
        .map_err(|e| BleError::EventStreamFailed(e.to_string()))?;

    Ok(tokio::spawn(async move {
        if let Ok(known) = adapter.peripherals().await {
            for peripheral in known {
                if let Some(descriptor) = describe_peripheral(&peripheral, &config).await {
                    cache.on_observed(descriptor).await;
                }
            }
        }

        while let Some(event) = events.next().await {
            process_discovery_event(&adapter, &cache, &config, event).await;
        }
        info!("BLE event stream ended");
    }))
}

/// Process one adapter event
async fn process_discovery_event(
    adapter: &Adapter,
    cache: &DiscoveryCache,
    config: &BleConfig,
    event: CentralEvent,
) {
    match event {
        CentralEvent::DeviceDiscovered(id) | CentralEvent::DeviceUpdated(id) => {
            match adapter.peripheral(&id).await {
                Ok(peripheral) => {
                    if let Some(descriptor) = describe_peripheral(&peripheral, config).await {
                        cache.on_observed(descriptor).await;
                    }
                }
                Err(e) => warn!("Discovered peripheral vanished: {}", e),
            }
        }
        CentralEvent::DeviceDisconnected(id) => {
            debug!("Peripheral {:?} disconnected", id);
        }
        _ => {}
    }
}
