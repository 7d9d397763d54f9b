//! `SppBackend` implementation over BlueZ RFCOMM sockets

use async_trait::async_trait;
use bluer::rfcomm::{SocketAddr, Stream};
use bluer::{Adapter, AdapterEvent, Address, Session};
use btspp_core::{DiscoveryCache, PeripheralDescriptor, Result as SppResult, SppBackend, SppError};
use futures::{pin_mut, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::channel::{classic_descriptor, parse_rfcomm_channel};
use crate::config::RfcommConfig;

// ----------------------------------------------------------------------------
// Endpoint
// ----------------------------------------------------------------------------

/// An RFCOMM stream bound to one device channel
pub struct RfcommEndpoint {
    address: String,
    channel: u8,
    stream: Stream,
}

impl RfcommEndpoint {
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }
}

// ----------------------------------------------------------------------------
// RFCOMM Backend
// ----------------------------------------------------------------------------

/// Classic Bluetooth backend: channels are RFCOMM channel numbers
pub struct RfcommBackend {
    // Keeps the D-Bus connection alive for the adapter
    _session: Session,
    adapter: Adapter,
    config: RfcommConfig,
    /// Inquiry task, only used when unpaired devices are reported
    inquiry: Mutex<Option<JoinHandle<()>>>,
}

impl RfcommBackend {
    /// Connect to BlueZ and open the configured adapter
    pub async fn new(config: RfcommConfig) -> SppResult<Self> {
        let session = Session::new()
            .await
            .map_err(|e| SppError::AdapterUnavailable(format!("BlueZ session: {}", e)))?;

        let adapter = match &config.adapter_name {
            Some(name) => session.adapter(name),
            None => session.default_adapter().await,
        }
        .map_err(|e| SppError::AdapterUnavailable(format!("Bluetooth adapter: {}", e)))?;

        if !adapter.is_powered().await.unwrap_or(false) {
            adapter.set_powered(true).await.map_err(|e| {
                SppError::AdapterUnavailable(format!("Failed to power on adapter: {}", e))
            })?;
        }

        info!("Classic Bluetooth adapter {} initialized", adapter.name());
        Ok(Self {
            _session: session,
            adapter,
            config,
            inquiry: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &RfcommConfig {
        &self.config
    }

    /// Report every device BlueZ already knows, paired ones only if configured
    async fn report_known_devices(&self, cache: &DiscoveryCache) -> SppResult<()> {
        let addresses = self
            .adapter
            .device_addresses()
            .await
            .map_err(|e| SppError::Scan(format!("Failed to list devices: {}", e)))?;

        for address in addresses {
            if let Some(descriptor) = describe_device(&self.adapter, address, &self.config).await {
                cache.on_observed(descriptor).await;
            }
        }
        Ok(())
    }

    async fn start_inquiry(&self, cache: DiscoveryCache) -> SppResult<()> {
        let mut inquiry = self.inquiry.lock().await;
        if inquiry.as_ref().is_some_and(|task| !task.is_finished()) {
            return Ok(());
        }

        let events = self
            .adapter
            .discover_devices()
            .await
            .map_err(|e| SppError::Scan(format!("Failed to start inquiry: {}", e)))?;

        let adapter = self.adapter.clone();
        let config = self.config.clone();
        *inquiry = Some(tokio::spawn(async move {
            pin_mut!(events);
            while let Some(event) = events.next().await {
                if let AdapterEvent::DeviceAdded(address) = event {
                    if let Some(descriptor) = describe_device(&adapter, address, &config).await {
                        cache.on_observed(descriptor).await;
                    }
                }
            }
        }));
        Ok(())
    }
}

/// Describe one BlueZ device, or `None` if it should not be reported
async fn describe_device(
    adapter: &Adapter,
    address: Address,
    config: &RfcommConfig,
) -> Option<PeripheralDescriptor> {
    let device = match adapter.device(address) {
        Ok(device) => device,
        Err(e) => {
            debug!("Skipping device {}: {}", address, e);
            return None;
        }
    };

    if config.paired_only && !device.is_paired().await.unwrap_or(false) {
        return None;
    }

    let name = device.name().await.unwrap_or(None);
    Some(classic_descriptor(address.to_string(), name, config))
}

#[async_trait]
impl SppBackend for RfcommBackend {
    type Endpoint = RfcommEndpoint;

    fn name(&self) -> &'static str {
        "RFCOMM"
    }

    async fn start_scan(&self, cache: DiscoveryCache) -> SppResult<()> {
        self.report_known_devices(&cache).await?;
        if !self.config.paired_only {
            self.start_inquiry(cache).await?;
        }
        Ok(())
    }

    async fn stop_scan(&self) -> SppResult<()> {
        // Dropping the event stream ends the inquiry
        if let Some(task) = self.inquiry.lock().await.take() {
            task.abort();
            debug!("Stopped classic inquiry");
        }
        Ok(())
    }

    async fn connect(
        &self,
        descriptor: &PeripheralDescriptor,
        channel: &str,
    ) -> SppResult<RfcommEndpoint> {
        let address_text = descriptor.address.as_str();
        let number = parse_rfcomm_channel(channel).ok_or_else(|| {
            SppError::connect_failed(address_text, format!("invalid RFCOMM channel {:?}", channel))
        })?;
        let address: Address = address_text
            .parse()
            .map_err(|e| SppError::connect_failed(address_text, e))?;

        let stream = Stream::connect(SocketAddr::new(address, number))
            .await
            .map_err(|e| {
                warn!("RFCOMM connect to {} channel {} failed: {}", address, number, e);
                SppError::connect_failed(address_text, e)
            })?;

        info!("Connected to {} on RFCOMM channel {}", address, number);
        Ok(RfcommEndpoint {
            address: address_text.to_string(),
            channel: number,
            stream,
        })
    }

    async fn write(&self, endpoint: &mut RfcommEndpoint, data: &[u8]) -> SppResult<()> {
        endpoint
            .stream
            .write_all(data)
            .await
            .map_err(|e| SppError::WriteFailed(e.to_string()))?;
        endpoint
            .stream
            .flush()
            .await
            .map_err(|e| SppError::WriteFailed(e.to_string()))?;
        debug!("Sent {} bytes to {}", data.len(), endpoint.address);
        Ok(())
    }

    async fn disconnect(&self, mut endpoint: RfcommEndpoint) -> SppResult<()> {
        endpoint
            .stream
            .shutdown()
            .await
            .map_err(|e| SppError::DisconnectFailed(e.to_string()))?;
        info!(
            "Disconnected from {} channel {}",
            endpoint.address, endpoint.channel
        );
        Ok(())
    }
}
