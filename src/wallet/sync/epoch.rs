//! Bookkeeping for synchronization passes.
//!
//! `SyncPassTracker` counts passes, installed snapshots, failures and results thrown away because a
//! newer event arrived while the pass was in flight. The controller publishes its stats with every
//! view.

use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct SyncPassTracker {
    passes_started: usize,
    snapshots_installed: usize,
    stale_discarded: usize,
    failures: usize,
    /// Epoch of the last result that was installed
    last_installed_epoch: Option<u64>,
    highest_epoch_seen: u64,
}

impl SyncPassTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_pass(&mut self, epoch: u64) {
        self.passes_started += 1;
        self.highest_epoch_seen = self.highest_epoch_seen.max(epoch);
        debug!("Sync pass {} started at epoch {}", self.passes_started, epoch);
    }

    pub fn record_installed(&mut self, epoch: u64) {
        self.snapshots_installed += 1;
        self.last_installed_epoch = Some(epoch);
    }

    /// A pass that started at `started` finished after the epoch moved to `current`.
    pub fn record_stale(&mut self, started: u64, current: u64) {
        self.stale_discarded += 1;
        self.highest_epoch_seen = self.highest_epoch_seen.max(current);
        info!(
            "Discarding result of pass started at epoch {}, current epoch is {}",
            started, current
        );
    }

    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    pub fn get_stats(&self) -> PassStats {
        PassStats {
            passes_started: self.passes_started,
            snapshots_installed: self.snapshots_installed,
            stale_discarded: self.stale_discarded,
            failures: self.failures,
            last_installed_epoch: self.last_installed_epoch,
            highest_epoch_seen: self.highest_epoch_seen,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassStats {
    pub passes_started: usize,
    pub snapshots_installed: usize,
    pub stale_discarded: usize,
    pub failures: usize,
    pub last_installed_epoch: Option<u64>,
    pub highest_epoch_seen: u64,
}

impl PassStats {
    /// Get a human-readable summary of the pass statistics
    pub fn summary(&self) -> String {
        format!(
            "{} passes: {} installed, {} failed{}",
            self.passes_started,
            self.snapshots_installed,
            self.failures,
            if self.stale_discarded == 0 {
                String::new()
            } else {
                format!(", {} stale", self.stale_discarded)
            }
        )
    }
}
