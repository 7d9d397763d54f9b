//! Time source used by the scan window and the resolution poll loop

use std::time::Duration;

use async_trait::async_trait;

/// Suspends the current task for a duration.
///
/// Discovery waits go through this trait so that tests can run a full scan
/// window without real delay.
#[async_trait]
pub trait Clock: Send + Sync + 'static {
    /// Sleep for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Clock backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl TokioClock {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
