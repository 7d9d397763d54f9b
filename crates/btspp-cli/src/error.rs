//! Error handling for the btspp CLI

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Spp(#[from] btspp_core::SppError),

    #[error("BLE backend error: {0}")]
    Ble(#[from] btspp_ble::BleError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backend not available on this platform: {0}")]
    BackendUnavailable(String),

    #[error("Invalid payload: {0}")]
    Payload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("Hex decoding error: {0}")]
    HexDecoding(#[from] hex::FromHexError),
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
