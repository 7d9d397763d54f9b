//! Backend selection
//!
//! The only place that knows which Bluetooth stacks exist on the host. The
//! rest of the tool works with `PlatformBackend` through `SppBackend`.

use async_trait::async_trait;
use btspp_ble::{BleBackend, BleEndpoint};
use btspp_core::{DiscoveryCache, PeripheralDescriptor, Result as SppResult, SppBackend, SppError};
#[cfg(target_os = "linux")]
use btspp_rfcomm::{RfcommBackend, RfcommEndpoint};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::AppConfig;
use crate::error::{CliError, Result};

// ----------------------------------------------------------------------------
// Backend Kind
// ----------------------------------------------------------------------------

/// Which Bluetooth stack to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Classic RFCOMM on Linux, BLE everywhere else
    #[default]
    Auto,
    /// Bluetooth Low Energy (GATT)
    Ble,
    /// Classic Bluetooth (RFCOMM)
    Classic,
}

impl BackendKind {
    /// Resolve `Auto` for the current host
    pub fn resolve(self) -> BackendKind {
        match self {
            BackendKind::Auto if cfg!(target_os = "linux") => BackendKind::Classic,
            BackendKind::Auto => BackendKind::Ble,
            other => other,
        }
    }
}

// ----------------------------------------------------------------------------
// Platform Backend
// ----------------------------------------------------------------------------

/// The backend chosen at start-up
pub enum PlatformBackend {
    Ble(BleBackend),
    #[cfg(target_os = "linux")]
    Classic(RfcommBackend),
}

/// Endpoint of whichever backend was chosen
pub enum PlatformEndpoint {
    Ble(BleEndpoint),
    #[cfg(target_os = "linux")]
    Classic(RfcommEndpoint),
}

impl PlatformBackend {
    /// Initialise the backend for `kind`
    pub async fn select(kind: BackendKind, config: &AppConfig) -> Result<Self> {
        match kind.resolve() {
            BackendKind::Ble => {
                info!("Using BLE backend");
                Ok(PlatformBackend::Ble(BleBackend::new(config.ble.clone()).await?))
            }
            #[cfg(target_os = "linux")]
            BackendKind::Classic => {
                info!("Using classic RFCOMM backend");
                Ok(PlatformBackend::Classic(
                    RfcommBackend::new(config.rfcomm.clone()).await?,
                ))
            }
            #[cfg(not(target_os = "linux"))]
            BackendKind::Classic => Err(CliError::BackendUnavailable(
                "classic RFCOMM requires BlueZ (Linux)".to_string(),
            )),
            BackendKind::Auto => Err(CliError::Config(
                "backend kind was not resolved".to_string(),
            )),
        }
    }
}

fn mismatched_endpoint() -> SppError {
    SppError::WriteFailed("endpoint belongs to a different backend".to_string())
}

#[async_trait]
impl SppBackend for PlatformBackend {
    type Endpoint = PlatformEndpoint;

    fn name(&self) -> &'static str {
        match self {
            PlatformBackend::Ble(backend) => backend.name(),
            #[cfg(target_os = "linux")]
            PlatformBackend::Classic(backend) => backend.name(),
        }
    }

    async fn start_scan(&self, cache: DiscoveryCache) -> SppResult<()> {
        match self {
            PlatformBackend::Ble(backend) => backend.start_scan(cache).await,
            #[cfg(target_os = "linux")]
            PlatformBackend::Classic(backend) => backend.start_scan(cache).await,
        }
    }

    async fn stop_scan(&self) -> SppResult<()> {
        match self {
            PlatformBackend::Ble(backend) => backend.stop_scan().await,
            #[cfg(target_os = "linux")]
            PlatformBackend::Classic(backend) => backend.stop_scan().await,
        }
    }

    async fn connect(
        &self,
        descriptor: &PeripheralDescriptor,
        channel: &str,
    ) -> SppResult<PlatformEndpoint> {
        match self {
            PlatformBackend::Ble(backend) => backend
                .connect(descriptor, channel)
                .await
                .map(PlatformEndpoint::Ble),
            #[cfg(target_os = "linux")]
            PlatformBackend::Classic(backend) => backend
                .connect(descriptor, channel)
                .await
                .map(PlatformEndpoint::Classic),
        }
    }

    #[allow(unreachable_patterns)]
    async fn write(&self, endpoint: &mut PlatformEndpoint, data: &[u8]) -> SppResult<()> {
        match (self, endpoint) {
            (PlatformBackend::Ble(backend), PlatformEndpoint::Ble(endpoint)) => {
                backend.write(endpoint, data).await
            }
            #[cfg(target_os = "linux")]
            (PlatformBackend::Classic(backend), PlatformEndpoint::Classic(endpoint)) => {
                backend.write(endpoint, data).await
            }
            _ => Err(mismatched_endpoint()),
        }
    }

    #[allow(unreachable_patterns)]
    async fn disconnect(&self, endpoint: PlatformEndpoint) -> SppResult<()> {
        match (self, endpoint) {
            (PlatformBackend::Ble(backend), PlatformEndpoint::Ble(endpoint)) => {
                backend.disconnect(endpoint).await
            }
            #[cfg(target_os = "linux")]
            (PlatformBackend::Classic(backend), PlatformEndpoint::Classic(endpoint)) => {
                backend.disconnect(endpoint).await
            }
            _ => Err(SppError::DisconnectFailed(
                "endpoint belongs to a different backend".to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_resolves_per_platform() {
        let resolved = BackendKind::Auto.resolve();
        if cfg!(target_os = "linux") {
            assert_eq!(resolved, BackendKind::Classic);
        } else {
            assert_eq!(resolved, BackendKind::Ble);
        }
        assert_eq!(BackendKind::Ble.resolve(), BackendKind::Ble);
        assert_eq!(BackendKind::Classic.resolve(), BackendKind::Classic);
    }
}
