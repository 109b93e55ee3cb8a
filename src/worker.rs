use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::task::JoinSet;

use crate::classify::{PageClassifier, Verdict};
use crate::extract;
use crate::fetch::Fetch;
use crate::filter;
use crate::frontier::Frontier;
use crate::politeness::HostSchedule;
use crate::stats::CrawlStats;
use crate::urls;

pub const PROGRESS_INTERVAL: usize = 100;

/// Shared state every worker loop runs against.
struct PoolInner {
    frontier: Arc<Frontier>,
    fetcher: Arc<dyn Fetch>,
    classifier: PageClassifier,
    politeness: HostSchedule,
    stats: Arc<CrawlStats>,
    processed: AtomicUsize,
    admitted: AtomicUsize,
}

/// Fixed pool of concurrent fetch loops over one frontier.
///
/// Workers are independent: each pulls, waits out the politeness gate,
/// fetches, classifies, feeds survivors back, and marks the URL complete.
/// A worker exits on its first empty dequeue; admits only originate from
/// still-running workers, so the pool drains to zero without a rendezvous.
pub struct CrawlerPool {
    inner: Arc<PoolInner>,
    workers: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CrawlSummary {
    pub processed: usize,
    pub admitted: usize,
    pub duration_secs: u64,
}

impl CrawlerPool {
    pub fn new(
        workers: usize,
        frontier: Arc<Frontier>,
        fetcher: Arc<dyn Fetch>,
        classifier: PageClassifier,
        politeness: HostSchedule,
        stats: Arc<CrawlStats>,
    ) -> Self {
        Self {
            inner: Arc::new(PoolInner {
                frontier,
                fetcher,
                classifier,
                politeness,
                stats,
                processed: AtomicUsize::new(0),
                admitted: AtomicUsize::new(0),
            }),
            workers: workers.max(1),
        }
    }

    /// Run the pool to completion: every worker has observed an empty
    /// frontier and exited.
    pub async fn run(&self) -> CrawlSummary {
        let start = SystemTime::now();
        let mut tasks = JoinSet::new();

        for worker_id in 0..self.workers {
            let inner = Arc::clone(&self.inner);
            tasks.spawn(async move {
                Self::worker_loop(inner, worker_id).await;
            });
        }

        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                tracing::error!(error = %e, "worker task join error");
            }
        }

        let duration = start.elapsed().unwrap_or_default();
        CrawlSummary {
            processed: self.inner.processed.load(Ordering::Relaxed),
            admitted: self.inner.admitted.load(Ordering::Relaxed),
            duration_secs: duration.as_secs(),
        }
    }

    async fn worker_loop(inner: Arc<PoolInner>, worker_id: usize) {
        loop {
            let url = match inner.frontier.dequeue() {
                Some(url) => url,
                None => {
                    tracing::info!(worker = worker_id, "frontier empty, worker stopping");
                    break;
                }
            };

            if let Some(host) = urls::host_of(&url) {
                inner.politeness.acquire(&host).await;
            }

            let links = Self::process_page(&inner, &url).await;
            for link in &links {
                inner.frontier.admit(link);
            }
            inner.admitted.fetch_add(links.len(), Ordering::Relaxed);

            // Complete unconditionally: a page that failed to fetch or
            // classify is still done, never retried.
            inner.frontier.complete(&url);

            let processed = inner.processed.fetch_add(1, Ordering::Relaxed) + 1;
            if processed % PROGRESS_INTERVAL == 0 {
                tracing::info!(
                    processed,
                    queued = inner.frontier.pending_len(),
                    "crawl progress"
                );
            }
        }
    }

    /// Fetch and score one page, returning the filtered outbound links.
    /// Every failure mode is contained to this page and yields an empty
    /// link set.
    async fn process_page(inner: &PoolInner, url: &str) -> Vec<String> {
        let response = match inner.fetcher.fetch(url).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "fetch failed");
                inner.stats.record_skip("fetch_error");
                return Vec::new();
            }
        };

        match inner.classifier.classify(url, &response) {
            Verdict::Accepted => {
                let candidates = extract::extract_links(&response.effective_url, &response.body_text());
                candidates
                    .into_iter()
                    .filter(|candidate| filter::is_eligible(candidate))
                    .collect()
            }
            Verdict::Rejected(_) => Vec::new(),
        }
    }
}
