//! Test utilities for exercising discovery and the connection lifecycle
//!
//! Provides a scripted backend whose peripherals "advertise" after a delay
//! once a scan starts, and a clock that records every sleep it is asked for.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use btspp_core::{
    Clock, DiscoveryCache, PeripheralDescriptor, Result as SppResult, SppBackend, SppError,
};

// ----------------------------------------------------------------------------
// Mock Backend
// ----------------------------------------------------------------------------

/// Every call the core made into the backend, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    StartScan,
    StopScan,
    Connect { address: String, channel: String },
    Write { address: String, data: Vec<u8> },
    Disconnect { address: String },
}

#[derive(Default)]
struct MockState {
    advertisements: Vec<(Duration, PeripheralDescriptor)>,
    unreachable: HashSet<String>,
    fail_scan: bool,
    fail_writes: bool,
    fail_disconnects: bool,
    calls: Vec<BackendCall>,
}

/// Endpoint handed out by `MockBackend::connect`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockEndpoint {
    pub address: String,
    pub channel: String,
}

/// Scripted backend. Clones share state, so a test can keep one clone to
/// inspect calls after moving the other into a `DiscoveryService`.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `descriptor` show up `delay` after each scan start
    pub fn advertise(&self, delay: Duration, descriptor: PeripheralDescriptor) -> &Self {
        self.state
            .lock()
            .unwrap()
            .advertisements
            .push((delay, descriptor));
        self
    }

    /// Make connections to `address` fail at the link level
    pub fn set_unreachable(&self, address: &str) -> &Self {
        self.state
            .lock()
            .unwrap()
            .unreachable
            .insert(address.to_string());
        self
    }

    pub fn set_fail_scan(&self, fail: bool) -> &Self {
        self.state.lock().unwrap().fail_scan = fail;
        self
    }

    pub fn set_fail_writes(&self, fail: bool) -> &Self {
        self.state.lock().unwrap().fail_writes = fail;
        self
    }

    pub fn set_fail_disconnects(&self, fail: bool) -> &Self {
        self.state.lock().unwrap().fail_disconnects = fail;
        self
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, predicate: impl Fn(&BackendCall) -> bool) -> usize {
        self.calls().iter().filter(|call| predicate(call)).count()
    }

    /// Bytes written, concatenated per address
    pub fn written_to(&self, address: &str) -> Vec<u8> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                BackendCall::Write { address: a, data } if a == address => Some(data),
                _ => None,
            })
            .flatten()
            .collect()
    }

    fn record(&self, call: BackendCall) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl SppBackend for MockBackend {
    type Endpoint = MockEndpoint;

    fn name(&self) -> &'static str {
        "mock"
    }

    async fn start_scan(&self, cache: DiscoveryCache) -> SppResult<()> {
        self.record(BackendCall::StartScan);

        let (fail, advertisements) = {
            let state = self.state.lock().unwrap();
            (state.fail_scan, state.advertisements.clone())
        };
        if fail {
            return Err(SppError::Scan("radio off".to_string()));
        }

        for (delay, descriptor) in advertisements {
            let cache = cache.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                cache.on_observed(descriptor).await;
            });
        }
        Ok(())
    }

    async fn stop_scan(&self) -> SppResult<()> {
        self.record(BackendCall::StopScan);
        Ok(())
    }

    async fn connect(
        &self,
        descriptor: &PeripheralDescriptor,
        channel: &str,
    ) -> SppResult<MockEndpoint> {
        self.record(BackendCall::Connect {
            address: descriptor.address.clone(),
            channel: channel.to_string(),
        });

        if self.state.lock().unwrap().unreachable.contains(&descriptor.address) {
            return Err(SppError::connect_failed(&descriptor.address, "link refused"));
        }

        let offered = descriptor
            .advertised_channels
            .iter()
            .any(|c| c.channel.eq_ignore_ascii_case(channel));
        if !offered {
            return Err(SppError::ChannelNotFound {
                address: descriptor.address.clone(),
                channel: channel.to_string(),
            });
        }

        Ok(MockEndpoint {
            address: descriptor.address.clone(),
            channel: channel.to_string(),
        })
    }

    async fn write(&self, endpoint: &mut MockEndpoint, data: &[u8]) -> SppResult<()> {
        if self.state.lock().unwrap().fail_writes {
            return Err(SppError::WriteFailed("GATT write rejected".to_string()));
        }
        self.record(BackendCall::Write {
            address: endpoint.address.clone(),
            data: data.to_vec(),
        });
        Ok(())
    }

    async fn disconnect(&self, endpoint: MockEndpoint) -> SppResult<()> {
        self.record(BackendCall::Disconnect {
            address: endpoint.address.clone(),
        });
        if self.state.lock().unwrap().fail_disconnects {
            return Err(SppError::DisconnectFailed("peripheral busy".to_string()));
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Recording Clock
// ----------------------------------------------------------------------------

/// Clock that records requested sleeps and delegates to the tokio timer,
/// so tests run under `start_paused` stay instant.
#[derive(Clone, Default)]
pub struct RecordingClock {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for RecordingClock {
    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        tokio::time::sleep(duration).await;
    }
}

// ----------------------------------------------------------------------------
// Fixtures
// ----------------------------------------------------------------------------

pub const PRINTER_ADDRESS: &str = "AA:BB:CC:DD:EE:FF";
pub const PRINTER_CHANNEL: &str = "FFF1";

/// A receipt printer offering one writable channel
pub fn printer(address: &str) -> PeripheralDescriptor {
    PeripheralDescriptor::new(address, "Receipt Printer")
        .with_channels(vec![btspp_core::ChannelInfo::new(PRINTER_CHANNEL, "SPP")])
}
