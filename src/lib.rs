pub mod classify;
pub mod cli;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod filter;
pub mod fingerprint;
pub mod frontier;
pub mod ledger;
pub mod logging;
pub mod politeness;
pub mod report;
pub mod stats;
pub mod urls;
pub mod worker;

// Re-export main types for library usage
pub use classify::{PageClassifier, RejectReason, Verdict};
pub use config::{CrawlConfig, Limits};
pub use fetch::{Fetch, FetchError, FetchResponse, HttpClient};
pub use fingerprint::FingerprintStore;
pub use frontier::{Frontier, InitMode};
pub use ledger::{Ledger, LedgerEntry, LedgerError};
pub use politeness::HostSchedule;
pub use stats::{CrawlStats, StatsSnapshot};
pub use worker::{CrawlSummary, CrawlerPool};
