//! Command handlers for the btspp CLI

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tracing::{info, warn};

use btspp_core::{DeviceInfo, DiscoveryService, SppBackend};

use crate::cli::Commands;
use crate::config::AppConfig;
use crate::error::{CliError, Result};
use crate::platform::{BackendKind, PlatformBackend};

/// Command dispatcher for handling CLI commands
pub struct CommandDispatcher;

impl CommandDispatcher {
    /// Execute a CLI command
    pub async fn execute(command: Commands, kind: BackendKind, config: AppConfig) -> Result<()> {
        match command {
            Commands::Config => {
                println!("{}", AppConfig::example_config());
                Ok(())
            }
            Commands::List { json } => {
                let service = Self::start_service(kind, &config).await?;
                Self::handle_list_command(&service, json).await
            }
            Commands::Print {
                address,
                channel,
                hex,
                file,
            } => {
                let payload = read_payload(hex, file).await?;
                let service = Self::start_service(kind, &config).await?;
                Self::handle_print_command(&service, address, channel, &payload).await
            }
        }
    }

    async fn start_service(
        kind: BackendKind,
        config: &AppConfig,
    ) -> Result<Arc<DiscoveryService<PlatformBackend>>> {
        let backend = PlatformBackend::select(kind, config).await?;
        Ok(DiscoveryService::start(backend, config.spp.clone()).await?)
    }

    /// Handle the list command
    pub async fn handle_list_command<B: SppBackend>(
        service: &DiscoveryService<B>,
        json: bool,
    ) -> Result<()> {
        info!("Scanning for {:?}...", service.config().scan_window);
        let devices = service.find_devices().await;
        service.stop_scan().await;

        if json {
            println!("{}", serde_json::to_string_pretty(&devices)?);
        } else {
            print!("{}", format_device_table(&devices));
        }
        Ok(())
    }

    /// Handle the print command
    pub async fn handle_print_command<B: SppBackend>(
        service: &Arc<DiscoveryService<B>>,
        address: String,
        channel: String,
        payload: &[u8],
    ) -> Result<()> {
        let mut device = service.device(address, channel);
        device.open().await?;

        let written = device.write(payload).await;
        let closed = device.close().await;
        service.stop_scan().await;

        written?;
        if let Err(e) = closed {
            warn!("Payload delivered but close failed: {}", e);
        }
        info!("Wrote {} bytes to {}", payload.len(), device.address());
        Ok(())
    }
}

/// Collect the payload from `--hex`, `--file` or standard input
pub async fn read_payload(hex: Option<String>, file: Option<PathBuf>) -> Result<Vec<u8>> {
    let payload = match (hex, file) {
        (Some(text), _) => decode_hex_payload(&text)?,
        (None, Some(path)) => tokio::fs::read(path).await?,
        (None, None) => {
            let mut buffer = Vec::new();
            tokio::io::stdin().read_to_end(&mut buffer).await?;
            buffer
        }
    };

    if payload.is_empty() {
        return Err(CliError::Payload("nothing to write".to_string()));
    }
    Ok(payload)
}

/// Decode hex text, ignoring whitespace and an optional `0x` prefix
pub fn decode_hex_payload(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.split_whitespace().collect();
    let digits = compact
        .strip_prefix("0x")
        .or_else(|| compact.strip_prefix("0X"))
        .unwrap_or(&compact);
    Ok(hex::decode(digits)?)
}

/// Human readable listing, one device per line followed by its channels
pub fn format_device_table(devices: &[DeviceInfo]) -> String {
    if devices.is_empty() {
        return "No devices found\n".to_string();
    }

    let mut out = String::new();
    for device in devices {
        let name = if device.name.is_empty() {
            "(unnamed)"
        } else {
            device.name.as_str()
        };
        out.push_str(&format!("{}  {}\n", device.address, name));
        for service in &device.services {
            out.push_str(&format!("    channel {:<38} {}\n", service.channel, service.name));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use btspp_core::ChannelInfo;

    #[test]
    fn test_decode_hex_payload() {
        assert_eq!(decode_hex_payload("1b40").unwrap(), vec![0x1B, 0x40]);
        assert_eq!(decode_hex_payload("0x1B 40").unwrap(), vec![0x1B, 0x40]);
        assert!(decode_hex_payload("1b4").is_err());
        assert!(decode_hex_payload("zz").is_err());
    }

    #[tokio::test]
    async fn test_empty_payload_rejected() {
        let result = read_payload(Some(String::new()), None).await;
        assert!(matches!(result, Err(CliError::Payload(_))));
    }

    #[test]
    fn test_format_device_table() {
        let devices = vec![
            DeviceInfo {
                address: "AA:BB:CC:DD:EE:FF".to_string(),
                name: "Receipt Printer".to_string(),
                services: vec![ChannelInfo::new("fff1", "SPP")],
            },
            DeviceInfo {
                address: "00:11:22:33:44:55".to_string(),
                name: String::new(),
                services: Vec::new(),
            },
        ];

        let table = format_device_table(&devices);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "AA:BB:CC:DD:EE:FF  Receipt Printer");
        assert!(lines[1].trim_start().starts_with("channel fff1"));
        assert!(lines[1].ends_with("SPP"));
        assert_eq!(lines[2], "00:11:22:33:44:55  (unnamed)");
    }

    #[test]
    fn test_format_empty_table() {
        assert_eq!(format_device_table(&[]), "No devices found\n");
    }
}
