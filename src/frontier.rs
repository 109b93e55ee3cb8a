use parking_lot::Mutex;
use std::path::Path;

use crate::filter;
use crate::ledger::{Ledger, LedgerError};
use crate::urls;

/// How to bring up the frontier at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitMode {
    /// Discard any existing ledger and seed from the start set.
    Restart,
    /// Replay incomplete ledger entries; fall back to seeds if none.
    Resume,
}

/// Durable, resumable queue of URLs pending fetch plus their completion
/// ledger.
///
/// The ready list and the ledger-write path share one mutex, so no two
/// workers dequeue the same URL and concurrent admits of one normalized
/// URL collapse to a single ledger row. Ledger writes commit before the
/// call returns.
pub struct Frontier {
    ledger: Ledger,
    ready: Mutex<Vec<String>>,
}

impl Frontier {
    /// Open the ledger and build the ready list.
    ///
    /// Fails only when the durable store cannot be opened or replayed;
    /// that failure is fatal to startup.
    pub fn initialize<P: AsRef<Path>>(
        data_dir: P,
        seed_urls: &[String],
        mode: InitMode,
    ) -> Result<Self, LedgerError> {
        let ledger = Ledger::open(data_dir, mode == InitMode::Restart)?;

        let frontier = Self {
            ledger,
            ready: Mutex::new(Vec::new()),
        };

        match mode {
            InitMode::Restart => {
                for seed in seed_urls {
                    frontier.admit(seed);
                }
            }
            InitMode::Resume => {
                let replayed = frontier.replay()?;
                if replayed == 0 && frontier.ledger.is_empty()? {
                    tracing::info!("empty ledger on resume, seeding from start set");
                    for seed in seed_urls {
                        frontier.admit(seed);
                    }
                }
            }
        }

        tracing::info!(
            queued = frontier.pending_len(),
            "frontier initialized"
        );
        Ok(frontier)
    }

    /// Load incomplete ledger entries that still pass the URL filter into
    /// the ready list. Returns how many were queued.
    fn replay(&self) -> Result<usize, LedgerError> {
        let total = self.ledger.len()?;
        let pending = self.ledger.pending_urls()?;

        let mut ready = self.ready.lock();
        for url in pending {
            if filter::is_eligible(&url) {
                ready.push(url);
            }
        }

        tracing::info!(
            to_download = ready.len(),
            discovered = total,
            "replayed ledger"
        );
        Ok(ready.len())
    }

    /// Admit a candidate URL: normalize, hash, and record it if unseen.
    /// Already-seen hashes (pending or complete) are a silent no-op, as is
    /// malformed input.
    pub fn admit(&self, raw_url: &str) {
        let normalized = match urls::normalize(raw_url) {
            Some(u) => u,
            None => {
                tracing::debug!(url = %raw_url, "dropping unparseable URL");
                return;
            }
        };
        let hash = urls::url_hash(&normalized);

        let mut ready = self.ready.lock();
        match self.ledger.record_pending(&hash, &normalized) {
            Ok(true) => {
                ready.push(normalized);
                if ready.len() % 100 == 0 {
                    tracing::info!(queued = ready.len(), "frontier grew");
                }
            }
            Ok(false) => {} // seen before, idempotent by construction
            Err(e) => {
                tracing::error!(url = %normalized, error = %e, "ledger write failed on admit");
            }
        }
    }

    /// Pull one URL off the ready list, or None when the frontier is
    /// empty. Emptiness is a worker's terminal condition, not an error.
    /// LIFO order gives a depth-first exploration bias.
    pub fn dequeue(&self) -> Option<String> {
        self.ready.lock().pop()
    }

    /// Flip the URL's ledger entry to complete. A hash that was never
    /// admitted is a logged anomaly, never a crash.
    pub fn complete(&self, url: &str) {
        let normalized = match urls::normalize(url) {
            Some(u) => u,
            None => url.to_string(),
        };
        let hash = urls::url_hash(&normalized);

        match self.ledger.mark_complete(&hash, &normalized) {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(url = %normalized, "completed a URL that was never admitted");
            }
            Err(e) => {
                tracing::error!(url = %normalized, error = %e, "ledger write failed on complete");
            }
        }

        let remaining = self.pending_len();
        if remaining < 50 || remaining % 50 == 0 {
            tracing::debug!(remaining, "URL marked complete");
        }
    }

    pub fn pending_len(&self) -> usize {
        self.ready.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.ready.lock().is_empty()
    }

    /// Read access to the underlying ledger for reporting and tests.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn seeds(urls: &[&str]) -> Vec<String> {
        urls.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn test_restart_seeds_frontier() {
        let dir = TempDir::new().unwrap();
        let frontier = Frontier::initialize(
            dir.path(),
            &seeds(&["http://www.ics.uci.edu/", "http://www.cs.uci.edu/"]),
            InitMode::Restart,
        )
        .unwrap();

        assert_eq!(frontier.pending_len(), 2);
        assert_eq!(frontier.ledger().len().unwrap(), 2);
    }

    #[test]
    fn test_admit_is_idempotent_across_spellings() {
        let dir = TempDir::new().unwrap();
        let frontier = Frontier::initialize(dir.path(), &[], InitMode::Restart).unwrap();

        frontier.admit("http://www.ics.uci.edu/page");
        frontier.admit("HTTP://www.ics.uci.edu/page#fragment");
        frontier.admit("http://www.ics.uci.edu:80/page");

        assert_eq!(frontier.pending_len(), 1);
        assert_eq!(frontier.ledger().len().unwrap(), 1);

        assert!(frontier.dequeue().is_some());
        assert!(frontier.dequeue().is_none());
    }

    #[test]
    fn test_completed_url_never_requeued() {
        let dir = TempDir::new().unwrap();
        let frontier = Frontier::initialize(dir.path(), &[], InitMode::Restart).unwrap();

        frontier.admit("http://www.ics.uci.edu/page");
        let url = frontier.dequeue().unwrap();
        frontier.complete(&url);

        frontier.admit("http://www.ics.uci.edu/page");
        assert!(frontier.dequeue().is_none());

        let hash = urls::url_hash(&url);
        assert!(frontier.ledger().get(&hash).unwrap().unwrap().completed);
    }

    #[test]
    fn test_malformed_urls_are_dropped() {
        let dir = TempDir::new().unwrap();
        let frontier = Frontier::initialize(dir.path(), &[], InitMode::Restart).unwrap();

        frontier.admit("not a url at all");
        assert!(frontier.is_empty());
        assert!(frontier.ledger().is_empty().unwrap());
    }

    #[test]
    fn test_resume_replays_only_incomplete_eligible_entries() {
        let dir = TempDir::new().unwrap();
        {
            let frontier = Frontier::initialize(dir.path(), &[], InitMode::Restart).unwrap();
            frontier.admit("http://www.ics.uci.edu/done");
            frontier.admit("http://www.ics.uci.edu/pending");
            frontier.admit("http://www.ics.uci.edu/manual.pdf"); // filtered on replay

            let done = urls::normalize("http://www.ics.uci.edu/done").unwrap();
            frontier.complete(&done);
            // Simulated crash: frontier dropped without draining.
        }

        let resumed = Frontier::initialize(
            dir.path(),
            &seeds(&["http://www.stat.uci.edu/"]),
            InitMode::Resume,
        )
        .unwrap();

        let mut replayed = Vec::new();
        while let Some(url) = resumed.dequeue() {
            replayed.push(url);
        }
        assert_eq!(replayed, vec!["http://www.ics.uci.edu/pending".to_string()]);
        // Ledger untouched: three rows survive, seeds not re-admitted.
        assert_eq!(resumed.ledger().len().unwrap(), 3);
    }

    #[test]
    fn test_resume_with_empty_ledger_falls_back_to_seeds() {
        let dir = TempDir::new().unwrap();
        let frontier = Frontier::initialize(
            dir.path(),
            &seeds(&["http://www.ics.uci.edu/"]),
            InitMode::Resume,
        )
        .unwrap();

        assert_eq!(frontier.pending_len(), 1);
    }

    #[test]
    fn test_restart_discards_previous_ledger() {
        let dir = TempDir::new().unwrap();
        {
            let frontier = Frontier::initialize(dir.path(), &[], InitMode::Restart).unwrap();
            frontier.admit("http://www.ics.uci.edu/old");
        }

        let fresh = Frontier::initialize(
            dir.path(),
            &seeds(&["http://www.cs.uci.edu/"]),
            InitMode::Restart,
        )
        .unwrap();

        assert_eq!(fresh.ledger().len().unwrap(), 1);
        assert_eq!(
            fresh.dequeue(),
            Some("http://www.cs.uci.edu/".to_string())
        );
    }
}
