//! Command-line interface definitions and parsing

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::platform::BackendKind;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Bluetooth stack to use (overrides the configuration file)
    #[arg(short, long, value_enum, global = true)]
    pub backend: Option<BackendKind>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan for one window and list devices with their serial channels
    List {
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
    /// Open a device channel, write a payload and close it again
    Print {
        /// Device address
        #[arg(short, long)]
        address: String,
        /// Channel: characteristic UUID on BLE, RFCOMM channel number on classic
        #[arg(short = 'n', long)]
        channel: String,
        /// Payload as hex, e.g. "1b40"
        #[arg(long, conflicts_with = "file")]
        hex: Option<String>,
        /// Read the payload from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Print an example configuration file
    Config,
}
