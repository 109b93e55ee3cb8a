//! Best-effort, in-memory crawl statistics.
//!
//! One aggregator object owned by the crawl session and shared by all
//! workers; a single mutex keeps the containers consistent under
//! concurrent writes. Nothing here is persisted, so the numbers are lost
//! on crash by design.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::config::Limits;

#[derive(Default)]
struct StatsInner {
    unique_pages: HashSet<String>,
    word_freq: HashMap<String, u64>,
    subdomains: HashMap<String, HashSet<String>>,
    longest_page: Option<(String, usize)>,
    skips: HashMap<&'static str, u64>,
}

pub struct CrawlStats {
    inner: Mutex<StatsInner>,
}

impl CrawlStats {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StatsInner::default()),
        }
    }

    /// Merge an accepted page into the aggregates: unique-page set, word
    /// frequencies, longest-page record, and the per-subdomain page set
    /// (only for hosts under the crawl's root domain).
    pub fn record_page(&self, page_url: &str, host: &str, tokens: &[String]) {
        let mut inner = self.inner.lock();

        inner.unique_pages.insert(page_url.to_string());

        for token in tokens {
            *inner.word_freq.entry(token.clone()).or_insert(0) += 1;
        }

        let is_new_longest = inner
            .longest_page
            .as_ref()
            .map(|(_, count)| tokens.len() > *count)
            .unwrap_or(true);
        if is_new_longest {
            inner.longest_page = Some((page_url.to_string(), tokens.len()));
        }

        if host.ends_with(Limits::STATS_DOMAIN_ROOT) {
            inner
                .subdomains
                .entry(host.to_string())
                .or_default()
                .insert(page_url.to_string());
        }
    }

    /// Count a page that was skipped, keyed by rejection reason.
    pub fn record_skip(&self, reason: &'static str) {
        let mut inner = self.inner.lock();
        *inner.skips.entry(reason).or_insert(0) += 1;
    }

    /// Read-only snapshot for the reporting sink.
    pub fn snapshot(&self, top_n: usize) -> StatsSnapshot {
        let inner = self.inner.lock();

        let mut top_words: Vec<WordCount> = inner
            .word_freq
            .iter()
            .map(|(word, count)| WordCount {
                word: word.clone(),
                count: *count,
            })
            .collect();
        top_words.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.word.cmp(&b.word)));
        top_words.truncate(top_n);

        let mut subdomains: Vec<SubdomainCount> = inner
            .subdomains
            .iter()
            .map(|(host, pages)| SubdomainCount {
                host: host.clone(),
                pages: pages.len(),
            })
            .collect();
        subdomains.sort_by(|a, b| a.host.cmp(&b.host));

        let mut skips: Vec<SkipCount> = inner
            .skips
            .iter()
            .map(|(reason, count)| SkipCount {
                reason: reason.to_string(),
                count: *count,
            })
            .collect();
        skips.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.reason.cmp(&b.reason)));

        StatsSnapshot {
            unique_pages: inner.unique_pages.len(),
            longest_page: inner
                .longest_page
                .as_ref()
                .map(|(url, words)| LongestPage {
                    url: url.clone(),
                    words: *words,
                }),
            top_words,
            subdomains,
            skips,
        }
    }
}

impl Default for CrawlStats {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub unique_pages: usize,
    pub longest_page: Option<LongestPage>,
    pub top_words: Vec<WordCount>,
    pub subdomains: Vec<SubdomainCount>,
    pub skips: Vec<SkipCount>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LongestPage {
    pub url: String,
    pub words: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubdomainCount {
    pub host: String,
    pub pages: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkipCount {
    pub reason: String,
    pub count: u64,
}
