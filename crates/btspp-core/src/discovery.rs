//! Discovery queries and endpoint resolution

use std::sync::Arc;

use tracing::{debug, info};

use crate::backend::SppBackend;
use crate::cache::DiscoveryCache;
use crate::clock::{Clock, TokioClock};
use crate::config::SppConfig;
use crate::device::Device;
use crate::error::{Result, SppError};
use crate::peripheral::{DeviceInfo, PeripheralDescriptor};
use crate::scan::ScanWindow;

// ----------------------------------------------------------------------------
// Discovery Service
// ----------------------------------------------------------------------------

/// Owns the discovery cache and scan window for one backend.
///
/// Create one per process and share it behind an `Arc`; every `Device` keeps
/// a handle to the service it was created from.
pub struct DiscoveryService<B: SppBackend> {
    backend: Arc<B>,
    cache: DiscoveryCache,
    scan: ScanWindow<B>,
    clock: Arc<dyn Clock>,
    config: SppConfig,
}

impl<B: SppBackend> DiscoveryService<B> {
    /// Create a service using the tokio clock
    pub fn new(backend: B, config: SppConfig) -> Result<Self> {
        Self::with_clock(backend, config, Arc::new(TokioClock::new()))
    }

    /// Create a service with an explicit clock
    pub fn with_clock(backend: B, config: SppConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let backend = Arc::new(backend);
        let cache = DiscoveryCache::new();
        let scan = ScanWindow::new(
            Arc::clone(&backend),
            cache.clone(),
            Arc::clone(&clock),
            config.scan_window,
        );

        Ok(Self {
            backend,
            cache,
            scan,
            clock,
            config,
        })
    }

    /// Create a shared service and kick off an initial scan so that the
    /// cache is already warming up by the time callers ask for devices.
    pub async fn start(backend: B, config: SppConfig) -> Result<Arc<Self>> {
        let service = Arc::new(Self::new(backend, config)?);
        service.start_scan().await;
        Ok(service)
    }

    /// Start or extend the scan window
    pub async fn start_scan(&self) {
        self.scan.start_scan().await;
    }

    /// Stop scanning immediately
    pub async fn stop_scan(&self) {
        self.scan.stop_scan().await;
    }

    /// Whether a scan is running
    pub async fn is_scanning(&self) -> bool {
        self.scan.is_active().await
    }

    /// Scan for the whole window and list every peripheral seen.
    ///
    /// Always waits the full window, even if the devices of interest were
    /// already cached; advertisements have no completion signal.
    pub async fn find_devices(&self) -> Vec<DeviceInfo> {
        self.start_scan().await;
        self.clock.sleep(self.config.scan_window).await;

        let devices: Vec<DeviceInfo> = self
            .cache
            .list_all()
            .await
            .iter()
            .map(PeripheralDescriptor::to_device_info)
            .collect();
        info!(
            "Found {} device(s) over {}",
            devices.len(),
            self.backend.name()
        );
        devices
    }

    /// Wait, bounded by the scan window, for `address` to show up in the cache
    pub async fn wait_for(&self, address: &str) -> Result<PeripheralDescriptor> {
        if let Some(descriptor) = self.cache.get(address).await {
            return Ok(descriptor);
        }

        self.start_scan().await;

        let attempts = self.config.poll_attempts();
        for attempt in 1..=attempts {
            self.clock.sleep(self.config.poll_interval).await;
            if let Some(descriptor) = self.cache.get(address).await {
                debug!("Found {} after {} poll(s)", address, attempt);
                return Ok(descriptor);
            }
        }

        Err(SppError::DeviceNotFound {
            address: address.to_string(),
        })
    }

    /// Resolve an address and channel into a connected backend endpoint
    pub async fn resolve(&self, address: &str, channel: &str) -> Result<B::Endpoint> {
        let descriptor = self.wait_for(address).await?;
        debug!(
            "Connecting to {} channel {} over {}",
            address,
            channel,
            self.backend.name()
        );
        self.backend.connect(&descriptor, channel).await
    }

    /// Create a closed connection handle. Performs no I/O.
    pub fn device(self: &Arc<Self>, address: impl Into<String>, channel: impl Into<String>) -> Device<B> {
        Device::new(Arc::clone(self), address, channel)
    }

    /// Shared discovery cache
    pub fn cache(&self) -> &DiscoveryCache {
        &self.cache
    }

    /// Active configuration
    pub fn config(&self) -> &SppConfig {
        &self.config
    }

    pub(crate) fn backend(&self) -> &B {
        &self.backend
    }
}
