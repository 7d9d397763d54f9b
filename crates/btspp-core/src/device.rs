//! Connection handle and its open/write/close lifecycle

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::backend::SppBackend;
use crate::discovery::DiscoveryService;
use crate::error::{Result, SppError};

// ----------------------------------------------------------------------------
// Connection State
// ----------------------------------------------------------------------------

/// Lifecycle state of a `Device`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Closed,
    Opening,
    Open,
    Closing,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Closed => "closed",
            ConnectionState::Opening => "opening",
            ConnectionState::Open => "open",
            ConnectionState::Closing => "closing",
        };
        f.write_str(name)
    }
}

/// The endpoint only exists inside `Open`
enum Link<E> {
    Closed,
    Opening,
    Open(E),
    Closing,
}

impl<E> Link<E> {
    fn state(&self) -> ConnectionState {
        match self {
            Link::Closed => ConnectionState::Closed,
            Link::Opening => ConnectionState::Opening,
            Link::Open(_) => ConnectionState::Open,
            Link::Closing => ConnectionState::Closing,
        }
    }
}

// ----------------------------------------------------------------------------
// Device Handle
// ----------------------------------------------------------------------------

/// One logical connection to a peripheral channel.
///
/// Created closed; only `open` and `close` move it between states. Operations
/// take `&mut self`, so a handle cannot be driven concurrently.
pub struct Device<B: SppBackend> {
    service: Arc<DiscoveryService<B>>,
    address: String,
    channel: String,
    link: Link<B::Endpoint>,
}

impl<B: SppBackend> Device<B> {
    /// Create a closed handle. Performs no I/O.
    pub fn new(
        service: Arc<DiscoveryService<B>>,
        address: impl Into<String>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            service,
            address: address.into(),
            channel: channel.into(),
            link: Link::Closed,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn state(&self) -> ConnectionState {
        self.link.state()
    }

    pub fn is_open(&self) -> bool {
        matches!(self.link, Link::Open(_))
    }

    /// Resolve the address and channel and connect.
    ///
    /// May take up to the scan window when the device has not been seen yet.
    /// On failure the handle stays closed.
    pub async fn open(&mut self) -> Result<()> {
        if self.is_open() {
            return Err(SppError::AlreadyOpen {
                address: self.address.clone(),
            });
        }

        self.link = Link::Opening;
        match self.service.resolve(&self.address, &self.channel).await {
            Ok(endpoint) => {
                self.link = Link::Open(endpoint);
                info!("Opened {} channel {}", self.address, self.channel);
                Ok(())
            }
            Err(e) => {
                self.link = Link::Closed;
                error!("Failed to open {}: {}", self.address, e);
                Err(e)
            }
        }
    }

    /// Write raw bytes to the open channel
    pub async fn write(&mut self, data: &[u8]) -> Result<()> {
        let Link::Open(endpoint) = &mut self.link else {
            return Err(SppError::NotOpen);
        };

        self.service.backend().write(endpoint, data).await?;
        debug!("Wrote {} bytes to {}", data.len(), self.address);
        Ok(())
    }

    /// Disconnect. A no-op when the handle is not open.
    ///
    /// The handle is closed afterwards even if the backend reports a
    /// disconnect failure; that failure is still returned.
    pub async fn close(&mut self) -> Result<()> {
        let Link::Open(endpoint) = std::mem::replace(&mut self.link, Link::Closing) else {
            self.link = Link::Closed;
            return Ok(());
        };

        let result = self.service.backend().disconnect(endpoint).await;
        self.link = Link::Closed;

        match result {
            Ok(()) => {
                info!("Closed {}", self.address);
                Ok(())
            }
            Err(e) => {
                error!("Failed to disconnect from {}: {}", self.address, e);
                Err(match e {
                    SppError::DisconnectFailed(reason) => SppError::DisconnectFailed(reason),
                    other => SppError::DisconnectFailed(other.to_string()),
                })
            }
        }
    }
}

impl<B: SppBackend> fmt::Debug for Device<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("address", &self.address)
            .field("channel", &self.channel)
            .field("state", &self.state())
            .finish()
    }
}
