//! Background driver for [`MembershipStore::sweep`].
//!
//! ```text
//! Sweeper (every sweep_interval)
//!     │
//!     └─► now = Utc::now()          taken once per pass
//!             └─► store.sweep(now)  one write lock, one consistent cut
//! ```
//!
//! The sweeper is the caller of `sweep`, so it is the one that logs failures.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::TrackerConfig;
use crate::store::MembershipStore;

// tokio intervals panic on a zero period.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Periodically evicts expired events and queue entries.
pub struct Sweeper {
    store: Arc<MembershipStore>,
    interval: Duration,
}

impl Sweeper {
    pub fn new(store: Arc<MembershipStore>, interval: Duration) -> Self {
        Self {
            store,
            interval: interval.max(MIN_INTERVAL),
        }
    }

    pub fn from_config(store: Arc<MembershipStore>, config: &TrackerConfig) -> Self {
        Self::new(store, config.sweep_interval)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sweep on every tick until `shutdown` is cancelled.
    ///
    /// The first sweep happens one interval after start.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(interval_secs = self.interval.as_secs_f64(), "membership sweeper starting");

        let mut interval = tokio::time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval.tick().await; // Skip first immediate tick

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {
                    if let Err(e) = self.store.sweep(Utc::now()) {
                        error!(error = %e, "membership sweep failed");
                    }
                }
            }
        }

        info!("membership sweeper stopped");
    }

    /// Run the sweeper on the current tokio runtime.
    pub fn spawn(self, shutdown: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }
}
