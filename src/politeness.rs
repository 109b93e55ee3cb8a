use dashmap::DashMap;
use std::time::{Duration, Instant};

/// Per-host politeness gate.
///
/// Each host maps to the earliest instant the next fetch may start.
/// Reservation is atomic per host (the map entry is held while the slot is
/// claimed), so two workers can never pass the gate for one host in the
/// same window. Hosts are created lazily and never persisted; politeness
/// resets across restarts.
pub struct HostSchedule {
    delay: Duration,
    next_slot: DashMap<String, Instant>,
}

impl HostSchedule {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_slot: DashMap::new(),
        }
    }

    /// Claim the next fetch slot for `host` and advance the host's
    /// next-permitted-time by the configured delay. Successive slots for a
    /// host are monotonically non-decreasing and spaced by at least `delay`.
    pub fn reserve(&self, host: &str) -> Instant {
        let mut entry = self
            .next_slot
            .entry(host.to_string())
            .or_insert_with(Instant::now);

        let now = Instant::now();
        let slot = if *entry > now { *entry } else { now };
        *entry = slot + self.delay;
        slot
    }

    /// Block until this worker's reserved slot for `host` arrives.
    pub async fn acquire(&self, host: &str) {
        let slot = self.reserve(host);
        let now = Instant::now();
        if slot > now {
            tokio::time::sleep(slot - now).await;
        }
    }
}
