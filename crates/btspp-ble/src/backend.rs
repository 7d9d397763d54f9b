//! `SppBackend` implementation over btleplug

use async_trait::async_trait;
use btleplug::api::{Central, Manager as _};
use btleplug::platform::{Adapter, Manager};
use btspp_core::{DiscoveryCache, PeripheralDescriptor, Result as SppResult, SppBackend, SppError};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::BleConfig;
use crate::connection::{
    connect_endpoint, disconnect_endpoint, find_peripheral, write_endpoint, BleEndpoint,
};
use crate::discovery::{describe_peripheral, spawn_event_listener, start_scanning, stop_scanning};
use crate::error::BleError;
use crate::protocol::parse_channel;

// ----------------------------------------------------------------------------
// BLE Backend
// ----------------------------------------------------------------------------

/// BLE backend: channels are writable GATT characteristics
pub struct BleBackend {
    adapter: Adapter,
    config: BleConfig,
    /// Background task forwarding adapter events into the cache
    listener: Mutex<Option<JoinHandle<()>>>,
    /// Cache handed to the last scan, refreshed after service discovery
    cache: Mutex<Option<DiscoveryCache>>,
}

impl BleBackend {
    /// Open the configured BLE adapter
    pub async fn new(config: BleConfig) -> Result<Self, BleError> {
        let manager = Manager::new()
            .await
            .map_err(|e| BleError::AdapterNotAvailable(format!("Failed to create BLE manager: {}", e)))?;

        let adapters = manager
            .adapters()
            .await
            .map_err(|e| BleError::AdapterNotAvailable(format!("Failed to get BLE adapters: {}", e)))?;

        let adapter = adapters
            .into_iter()
            .nth(config.adapter_index)
            .ok_or_else(|| {
                BleError::AdapterNotAvailable(format!(
                    "No BLE adapter at index {}",
                    config.adapter_index
                ))
            })?;

        info!("BLE adapter initialized");
        Ok(Self {
            adapter,
            config,
            listener: Mutex::new(None),
            cache: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &BleConfig {
        &self.config
    }
}

#[async_trait]
impl SppBackend for BleBackend {
    type Endpoint = BleEndpoint;

    fn name(&self) -> &'static str {
        "BLE"
    }

    async fn start_scan(&self, cache: DiscoveryCache) -> SppResult<()> {
        {
            let mut listener = self.listener.lock().await;
            let running = listener.as_ref().is_some_and(|task| !task.is_finished());
            if !running {
                let task =
                    spawn_event_listener(self.adapter.clone(), cache.clone(), self.config.clone())
                        .await?;
                *listener = Some(task);
            }
        }
        *self.cache.lock().await = Some(cache);

        start_scanning(&self.adapter).await?;
        Ok(())
    }

    async fn stop_scan(&self) -> SppResult<()> {
        stop_scanning(&self.adapter).await?;
        Ok(())
    }

    async fn connect(
        &self,
        descriptor: &PeripheralDescriptor,
        channel: &str,
    ) -> SppResult<BleEndpoint> {
        let address = descriptor.address.as_str();
        let channel_uuid = parse_channel(channel).ok_or_else(|| SppError::ChannelNotFound {
            address: address.to_string(),
            channel: channel.to_string(),
        })?;

        let peripherals = self
            .adapter
            .peripherals()
            .await
            .map_err(|e| SppError::connect_failed(address, e))?;
        let peripheral = find_peripheral(peripherals, address).await?;

        let endpoint =
            connect_endpoint(peripheral, address, channel, channel_uuid, &self.config).await?;

        // Characteristics are known now; refresh the listing for this device
        if let Some(cache) = self.cache.lock().await.as_ref() {
            if let Some(refreshed) = describe_peripheral(&endpoint.peripheral, &self.config).await {
                debug!("Refreshing {} with discovered characteristics", address);
                cache.on_observed(refreshed).await;
            }
        }

        Ok(endpoint)
    }

    async fn write(&self, endpoint: &mut BleEndpoint, data: &[u8]) -> SppResult<()> {
        write_endpoint(endpoint, data, self.config.write_chunk_size).await?;
        Ok(())
    }

    async fn disconnect(&self, endpoint: BleEndpoint) -> SppResult<()> {
        disconnect_endpoint(endpoint).await?;
        Ok(())
    }
}
