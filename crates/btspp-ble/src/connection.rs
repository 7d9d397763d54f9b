//! GATT connection set-up and data transmission

use btleplug::api::{BDAddr, CharPropFlags, Characteristic, Peripheral as _, WriteType};
use btleplug::platform::Peripheral;
use tokio::time::timeout;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::BleConfig;
use crate::discovery::peripheral_address;
use crate::error::BleError;
use crate::protocol::find_write_characteristic;

// ----------------------------------------------------------------------------
// Endpoint
// ----------------------------------------------------------------------------

/// A connected peripheral and the characteristic bytes are written to
#[derive(Debug, Clone)]
pub struct BleEndpoint {
    pub(crate) address: String,
    pub(crate) peripheral: Peripheral,
    pub(crate) characteristic: Characteristic,
}

impl BleEndpoint {
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn characteristic_uuid(&self) -> Uuid {
        self.characteristic.uuid
    }
}

// ----------------------------------------------------------------------------
// Connection Management
// ----------------------------------------------------------------------------

/// Find the adapter's peripheral for a cached address
pub async fn find_peripheral(
    peripherals: Vec<Peripheral>,
    address: &str,
) -> Result<Peripheral, BleError> {
    for peripheral in peripherals {
        let known = match peripheral.properties().await {
            Ok(Some(properties)) => peripheral_address(&peripheral, properties.address),
            _ => peripheral_address(&peripheral, BDAddr::default()),
        };
        if known.eq_ignore_ascii_case(address) {
            return Ok(peripheral);
        }
    }
    Err(BleError::PeripheralNotFound {
        address: address.to_string(),
    })
}

/// Connect, enumerate services and bind the characteristic named by `channel`
pub async fn connect_endpoint(
    peripheral: Peripheral,
    address: &str,
    channel: &str,
    channel_uuid: Uuid,
    config: &BleConfig,
) -> Result<BleEndpoint, BleError> {
    if !peripheral.is_connected().await.unwrap_or(false) {
        match timeout(config.connection_timeout, peripheral.connect()).await {
            Ok(Ok(())) => info!("Connected to {}", address),
            Ok(Err(e)) => {
                error!("Failed to connect to {}: {}", address, e);
                return Err(BleError::ConnectionFailed {
                    address: address.to_string(),
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                error!("Connection to {} timed out", address);
                return Err(BleError::ConnectionTimeout {
                    address: address.to_string(),
                });
            }
        }
    }

    if let Err(e) = peripheral.discover_services().await {
        error!("Failed to discover services for {}: {}", address, e);
        release(&peripheral, address).await;
        return Err(BleError::ServiceDiscoveryFailed {
            address: address.to_string(),
            reason: e.to_string(),
        });
    }

    let characteristics = peripheral.characteristics();
    let Some(characteristic) = find_write_characteristic(characteristics.iter(), channel_uuid)
    else {
        debug!(
            "{} has no writable characteristic {} among {} characteristic(s)",
            address,
            channel,
            characteristics.len()
        );
        release(&peripheral, address).await;
        return Err(BleError::CharacteristicNotFound {
            address: address.to_string(),
            channel: channel.to_string(),
        });
    };

    Ok(BleEndpoint {
        address: address.to_string(),
        peripheral,
        characteristic,
    })
}

/// Drop a half-set-up connection
async fn release(peripheral: &Peripheral, address: &str) {
    if let Err(e) = peripheral.disconnect().await {
        debug!("Failed to release {} after setup error: {}", address, e);
    }
}

/// Write `data` to the endpoint, split into chunks of at most `chunk_size`.
///
/// Acknowledged writes are used unless the characteristic only supports
/// write-without-response.
pub async fn write_endpoint(
    endpoint: &BleEndpoint,
    data: &[u8],
    chunk_size: usize,
) -> Result<(), BleError> {
    let write_type = if endpoint.characteristic.properties.contains(CharPropFlags::WRITE) {
        WriteType::WithResponse
    } else {
        WriteType::WithoutResponse
    };

    for chunk in data.chunks(chunk_size.max(1)) {
        endpoint
            .peripheral
            .write(&endpoint.characteristic, chunk, write_type)
            .await
            .map_err(|e| BleError::WriteFailed(e.to_string()))?;
    }

    debug!("Sent {} bytes to {}", data.len(), endpoint.address);
    Ok(())
}

/// Disconnect the endpoint's peripheral
pub async fn disconnect_endpoint(endpoint: BleEndpoint) -> Result<(), BleError> {
    endpoint
        .peripheral
        .disconnect()
        .await
        .map_err(|e| BleError::DisconnectFailed(e.to_string()))?;
    info!("Disconnected from {}", endpoint.address);
    Ok(())
}
