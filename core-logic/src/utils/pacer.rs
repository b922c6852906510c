//! # Core Logic - Transaction Pacing
//!
//! Fixed-rate throttle between consecutive broadcasts. There is no adaptive
//! backoff: every gap is the same configured duration.

use std::time::Duration;
use tokio::time::sleep;
use crate::utils::logger::BATCH_TARGET;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cooldown {
    duration: Duration,
}

impl Cooldown {
    pub const DEFAULT_SECS: u64 = 10;

    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub fn from_secs(secs: u64) -> Self {
        Self::new(Duration::from_secs(secs))
    }

    pub fn none() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whole seconds shown in the cooldown line, rounded up
    pub fn display_secs(&self) -> u64 {
        self.duration.as_secs() + u64::from(self.duration.subsec_nanos() > 0)
    }

    /// Sleeps for the configured duration, one second at a time so the
    /// countdown can be traced at debug level.
    pub async fn wait(&self) {
        if self.duration.is_zero() {
            return;
        }

        info!(target: BATCH_TARGET, "Cooldown: next transaction in {}s", self.display_secs());
        let mut remaining = self.duration;
        let step = Duration::from_secs(1);
        while !remaining.is_zero() {
            debug!(target: BATCH_TARGET, "{:.0}s remaining", remaining.as_secs_f64().ceil());
            let tick = remaining.min(step);
            sleep(tick).await;
            remaining -= tick;
        }
    }
}

impl Default for Cooldown {
    fn default() -> Self {
        Self::from_secs(Self::DEFAULT_SECS)
    }
}
