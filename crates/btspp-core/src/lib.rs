//! Transport-neutral discovery and connection lifecycle for Bluetooth
//! serial-port-profile peripherals
//!
//! Callers discover devices, pick an address and channel, then open, write
//! and close without knowing whether the bytes travel over a BLE GATT
//! characteristic or a classic RFCOMM channel.
//!
//! ## Architecture
//!
//! - [`scan`] - Rolling scan window that debounces scan requests
//! - [`cache`] - Shared table of the latest observation per address
//! - [`discovery`] - Discovery queries and bounded address resolution
//! - [`device`] - Connection handle enforcing open → write → close
//! - [`backend`] - The trait each Bluetooth stack implements
//!
//! ## Usage
//!
//! ```rust,ignore
//! use btspp_core::{DiscoveryService, SppConfig};
//!
//! let service = DiscoveryService::start(backend, SppConfig::default()).await?;
//! for device in service.find_devices().await {
//!     println!("{} {}", device.address, device.name);
//! }
//!
//! let mut printer = service.device("AA:BB:CC:DD:EE:FF", "FFF1");
//! printer.open().await?;
//! printer.write(&[0x1B, 0x40]).await?;
//! printer.close().await?;
//! ```

pub mod backend;
pub mod cache;
pub mod clock;
pub mod config;
pub mod device;
pub mod discovery;
pub mod error;
pub mod peripheral;
pub mod scan;

// Public API exports
pub use backend::SppBackend;
pub use cache::DiscoveryCache;
pub use clock::{Clock, TokioClock};
pub use config::SppConfig;
pub use device::{ConnectionState, Device};
pub use discovery::DiscoveryService;
pub use error::{Result, SppError};
pub use peripheral::{ChannelInfo, DeviceInfo, PeripheralDescriptor};
pub use scan::ScanWindow;
