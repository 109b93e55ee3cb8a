use dashmap::DashMap;
use std::collections::VecDeque;

use crate::config::Limits;

/// Order-independent page signature: the sorted distinct tokens, truncated
/// to a fixed cap. An exact-match heuristic, not a content hash.
pub type Signature = Vec<String>;

/// Build a page's signature from its token stream.
pub fn signature(tokens: &[String]) -> Signature {
    let mut distinct: Vec<&String> = {
        let mut set: Vec<&String> = tokens.iter().collect();
        set.sort_unstable();
        set.dedup();
        set
    };
    distinct.truncate(Limits::FINGERPRINT_TOKENS);
    distinct.into_iter().cloned().collect()
}

/// Bounded per-host history of recent page signatures.
///
/// Each host keeps at most `capacity` signatures; the oldest is evicted
/// first. Lookups are exact-match within a single host's history, so the
/// same fingerprint on a different host is never flagged. The map entry
/// guard serializes inserts per host; distinct hosts proceed independently.
pub struct FingerprintStore {
    capacity: usize,
    by_host: DashMap<String, VecDeque<Signature>>,
}

impl FingerprintStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            by_host: DashMap::new(),
        }
    }

    /// Check `sig` against `host`'s recent history.
    ///
    /// Returns true when an identical signature is already present (a
    /// near-duplicate); otherwise records the signature and returns false.
    pub fn check_and_insert(&self, host: &str, sig: Signature) -> bool {
        let mut history = self.by_host.entry(host.to_string()).or_default();

        if history.iter().any(|seen| *seen == sig) {
            return true;
        }

        if history.len() >= self.capacity {
            history.pop_front();
        }
        history.push_back(sig);
        false
    }

    /// Number of signatures currently held for a host.
    pub fn history_len(&self, host: &str) -> usize {
        self.by_host.get(host).map(|h| h.len()).unwrap_or(0)
    }
}

impl Default for FingerprintStore {
    fn default() -> Self {
        Self::new(Limits::HOST_HISTORY_CAP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_signature_is_sorted_distinct_and_capped() {
        let tokens = toks(&["beta", "alpha", "beta", "gamma", "alpha"]);
        assert_eq!(signature(&tokens), toks(&["alpha", "beta", "gamma"]));

        let many: Vec<String> = (0..600).map(|i| format!("w{:04}", i)).collect();
        assert_eq!(signature(&many).len(), Limits::FINGERPRINT_TOKENS);
    }

    #[test]
    fn test_duplicate_flagged_on_second_occurrence_same_host() {
        let store = FingerprintStore::new(10);
        let sig = signature(&toks(&["research", "papers", "faculty"]));

        assert!(!store.check_and_insert("a.ics.uci.edu", sig.clone()));
        assert!(store.check_and_insert("a.ics.uci.edu", sig));
    }

    #[test]
    fn test_same_signature_different_host_not_flagged() {
        let store = FingerprintStore::new(10);
        let sig = signature(&toks(&["research", "papers", "faculty"]));

        assert!(!store.check_and_insert("a.ics.uci.edu", sig.clone()));
        assert!(!store.check_and_insert("b.ics.uci.edu", sig));
    }

    #[test]
    fn test_oldest_signature_evicted_at_capacity() {
        let store = FingerprintStore::new(2);
        let first = signature(&toks(&["one"]));
        let second = signature(&toks(&["two"]));
        let third = signature(&toks(&["three"]));

        store.check_and_insert("h", first.clone());
        store.check_and_insert("h", second);
        store.check_and_insert("h", third);
        assert_eq!(store.history_len("h"), 2);

        // The evicted signature no longer matches.
        assert!(!store.check_and_insert("h", first));
    }

    #[test]
    fn test_token_order_does_not_matter() {
        let store = FingerprintStore::new(10);
        let a = signature(&toks(&["x", "y", "z"]));
        let b = signature(&toks(&["z", "x", "y", "x"]));

        assert!(!store.check_and_insert("h", a));
        assert!(store.check_and_insert("h", b));
    }
}
