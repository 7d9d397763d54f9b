//! Bluetooth Low Energy backend for btspp
//!
//! Implements [`btspp_core::SppBackend`] over btleplug. A channel is the UUID
//! of a writable GATT characteristic; bytes are written to it with
//! acknowledgement requested.
//!
//! ## Architecture
//!
//! - [`config`] - Backend configuration and settings
//! - [`error`] - Error types specific to the BLE backend
//! - [`protocol`] - Channel UUID parsing and characteristic selection
//! - [`discovery`] - Scanning and adapter event handling
//! - [`connection`] - Connection set-up and data transmission
//!
//! ## Usage
//!
//! ```rust,no_run
//! use btspp_ble::{BleBackend, BleConfig};
//! use btspp_core::{DiscoveryService, SppConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = BleBackend::new(BleConfig::default()).await?;
//! let service = DiscoveryService::start(backend, SppConfig::default()).await?;
//!
//! let mut printer = service.device("AA:BB:CC:DD:EE:FF", "FFF1");
//! printer.open().await?;
//! printer.write(&[0x1B, 0x40]).await?;
//! printer.close().await?;
//! # Ok(())
//! # }
//! ```

mod backend;
pub mod config;
pub mod connection;
pub mod discovery;
pub mod error;
pub mod protocol;

// Public API exports
pub use backend::BleBackend;
pub use config::BleConfig;
pub use connection::BleEndpoint;
pub use error::BleError;
pub use protocol::{parse_channel, BLUETOOTH_BASE_UUID};
