//! Classic Bluetooth (RFCOMM) backend for btspp
//!
//! Implements [`btspp_core::SppBackend`] on top of BlueZ through `bluer`.
//! Scanning reports the devices BlueZ knows (paired ones by default), each
//! with the configured list of RFCOMM channels; opening binds a stream
//! socket directly to the requested channel number.
//!
//! The backend itself is only available on Linux. Channel parsing and
//! configuration build everywhere so that callers can share config files.

pub mod channel;
pub mod config;

#[cfg(target_os = "linux")]
mod backend;

pub use channel::{parse_rfcomm_channel, MAX_RFCOMM_CHANNEL};
pub use config::RfcommConfig;

#[cfg(target_os = "linux")]
pub use backend::{RfcommBackend, RfcommEndpoint};
