//! Backend adapter seam shared by the BLE and classic Bluetooth stacks

use async_trait::async_trait;

use crate::cache::DiscoveryCache;
use crate::error::Result;
use crate::peripheral::PeripheralDescriptor;

// ----------------------------------------------------------------------------
// Backend Trait
// ----------------------------------------------------------------------------

/// A Bluetooth stack able to discover peripherals and stream bytes to them.
///
/// Discovery is push based: once `start_scan` has been called the backend
/// reports every observation into the cache it was given. Resolution and the
/// connection lifecycle only ever talk to a backend through this trait.
#[async_trait]
pub trait SppBackend: Send + Sync + 'static {
    /// Writable handle produced by a successful `connect`
    type Endpoint: Send + 'static;

    /// Short backend name used in log output
    fn name(&self) -> &'static str;

    /// Begin reporting observations into `cache`
    async fn start_scan(&self, cache: DiscoveryCache) -> Result<()>;

    /// Stop an active scan
    async fn stop_scan(&self) -> Result<()>;

    /// Connect to a discovered peripheral and bind the requested channel.
    ///
    /// Fails with `ChannelNotFound` when the device has no writable match
    /// for `channel`, and with `ConnectFailed` for link level failures.
    async fn connect(
        &self,
        descriptor: &PeripheralDescriptor,
        channel: &str,
    ) -> Result<Self::Endpoint>;

    /// Write raw bytes to a connected endpoint
    async fn write(&self, endpoint: &mut Self::Endpoint, data: &[u8]) -> Result<()>;

    /// Tear down a connected endpoint
    async fn disconnect(&self, endpoint: Self::Endpoint) -> Result<()>;
}
