//! btspp command-line tool
//!
//! Lists nearby serial-port-profile devices and writes payloads to them
//! through whichever Bluetooth backend the host supports.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod platform;

pub use cli::{Cli, Commands};
pub use commands::CommandDispatcher;
pub use config::AppConfig;
pub use error::{CliError, Result};
pub use platform::{BackendKind, PlatformBackend, PlatformEndpoint};
