//! Rolling scan window
//!
//! A scan stays active for a fixed window after the most recent request.
//! Requests made while a scan is running re-arm the single stop timer
//! instead of starting a second scan.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backend::SppBackend;
use crate::cache::DiscoveryCache;
use crate::clock::Clock;

// ----------------------------------------------------------------------------
// Scan Window Controller
// ----------------------------------------------------------------------------

#[derive(Default)]
struct ScanState {
    /// Bumped on every (re)arm so a superseded timer never stops a newer window
    generation: u64,
    /// Present exactly while a backend scan is running
    stop_timer: Option<JoinHandle<()>>,
}

/// Starts and stops backend scans over a bounded, extendable window
pub struct ScanWindow<B: SppBackend> {
    backend: Arc<B>,
    cache: DiscoveryCache,
    clock: Arc<dyn Clock>,
    window: Duration,
    state: Arc<Mutex<ScanState>>,
}

impl<B: SppBackend> ScanWindow<B> {
    /// Create an idle scan window
    pub fn new(
        backend: Arc<B>,
        cache: DiscoveryCache,
        clock: Arc<dyn Clock>,
        window: Duration,
    ) -> Self {
        Self {
            backend,
            cache,
            clock,
            window,
            state: Arc::new(Mutex::new(ScanState::default())),
        }
    }

    /// Start a scan, or push back the end of the one already running.
    ///
    /// Backend failures are logged, not returned. A failed start leaves the
    /// window idle, so the next request calls the backend again.
    pub async fn start_scan(&self) {
        let mut state = self.state.lock().await;

        if let Some(timer) = state.stop_timer.take() {
            timer.abort();
            debug!("Extending {} scan window", self.backend.name());
        } else {
            match self.backend.start_scan(self.cache.clone()).await {
                Ok(()) => info!("Started {} scan", self.backend.name()),
                Err(e) => {
                    warn!("Failed to start {} scan: {}", self.backend.name(), e);
                    return;
                }
            }
        }

        state.generation = state.generation.wrapping_add(1);

        let generation = state.generation;
        let backend = Arc::clone(&self.backend);
        let clock = Arc::clone(&self.clock);
        let shared = Arc::clone(&self.state);
        let window = self.window;

        state.stop_timer = Some(tokio::spawn(async move {
            clock.sleep(window).await;

            let mut state = shared.lock().await;
            if state.generation != generation {
                return;
            }
            state.stop_timer = None;

            // Held across the stop so a concurrent restart cannot be undone by it
            match backend.stop_scan().await {
                Ok(()) => info!("Stopped {} scan", backend.name()),
                Err(e) => warn!("Failed to stop {} scan: {}", backend.name(), e),
            }
        }));
    }

    /// Stop the current scan immediately, if any
    pub async fn stop_scan(&self) {
        let mut state = self.state.lock().await;
        let Some(timer) = state.stop_timer.take() else {
            return;
        };
        timer.abort();
        state.generation = state.generation.wrapping_add(1);

        if let Err(e) = self.backend.stop_scan().await {
            warn!("Failed to stop {} scan: {}", self.backend.name(), e);
        }
    }

    /// Whether a scan is currently running
    pub async fn is_active(&self) -> bool {
        self.state.lock().await.stop_timer.is_some()
    }
}
