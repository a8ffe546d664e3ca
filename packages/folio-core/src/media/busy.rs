//! Per-region busy indicators.
//!
//! Every in-flight upload holds a [`BusyGuard`] for its partition. A region
//! stays busy until its last guard drops, so two overlapping uploads of the
//! same kind cannot clear each other's indicator, and different kinds never
//! interact.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use super::Partition;

struct Region {
    in_flight: usize,
    tx: watch::Sender<bool>,
}

/// Tracks in-flight uploads per partition.
#[derive(Clone)]
pub struct BusyTracker {
    regions: Arc<Mutex<HashMap<Partition, Region>>>,
}

impl Default for BusyTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl BusyTracker {
    /// Create a tracker with every region idle.
    pub fn new() -> Self {
        let regions = Partition::ALL
            .into_iter()
            .map(|p| {
                let (tx, _rx) = watch::channel(false);
                (p, Region { in_flight: 0, tx })
            })
            .collect();

        Self {
            regions: Arc::new(Mutex::new(regions)),
        }
    }

    /// Mark one more upload in flight for `partition`.
    pub fn begin(&self, partition: Partition) -> BusyGuard {
        let mut regions = self.regions.lock();
        if let Some(region) = regions.get_mut(&partition) {
            region.in_flight += 1;
            if region.in_flight == 1 {
                region.tx.send_replace(true);
                tracing::debug!(partition = partition.name(), "Region busy");
            }
        }

        BusyGuard {
            tracker: self.clone(),
            partition,
        }
    }

    /// Whether any upload for `partition` is in flight.
    pub fn is_busy(&self, partition: Partition) -> bool {
        self.in_flight(partition) > 0
    }

    /// Number of uploads in flight for `partition`.
    pub fn in_flight(&self, partition: Partition) -> usize {
        self.regions
            .lock()
            .get(&partition)
            .map(|r| r.in_flight)
            .unwrap_or(0)
    }

    /// Watch the busy flag of `partition`.
    pub fn subscribe(&self, partition: Partition) -> watch::Receiver<bool> {
        let regions = self.regions.lock();
        match regions.get(&partition) {
            Some(region) => region.tx.subscribe(),
            None => watch::channel(false).1,
        }
    }

    fn end(&self, partition: Partition) {
        let mut regions = self.regions.lock();
        if let Some(region) = regions.get_mut(&partition) {
            region.in_flight = region.in_flight.saturating_sub(1);
            if region.in_flight == 0 {
                region.tx.send_replace(false);
                tracing::debug!(partition = partition.name(), "Region idle");
            }
        }
    }
}

/// Releases its region's busy slot on drop.
pub struct BusyGuard {
    tracker: BusyTracker,
    partition: Partition,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.tracker.end(self.partition);
    }
}
