use std::sync::Arc;
use thiserror::Error;

use campus_crawler::classify::PageClassifier;
use campus_crawler::cli::Cli;
use campus_crawler::fetch::HttpClient;
use campus_crawler::fingerprint::FingerprintStore;
use campus_crawler::frontier::{Frontier, InitMode};
use campus_crawler::ledger::LedgerError;
use campus_crawler::politeness::HostSchedule;
use campus_crawler::stats::CrawlStats;
use campus_crawler::worker::CrawlerPool;
use campus_crawler::{logging, report};

#[derive(Error, Debug)]
pub enum MainError {
    #[error("Storage unavailable: {0}")]
    Storage(#[from] LedgerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Setup error: {0}")]
    Setup(String),
}

#[tokio::main]
async fn main() -> Result<(), MainError> {
    let config = Cli::parse_args().into_config();

    logging::init_logging(config.data_dir.join("logs"))
        .map_err(|e| MainError::Setup(e.to_string()))?;

    let mode = if config.restart {
        InitMode::Restart
    } else {
        InitMode::Resume
    };

    tracing::info!(
        seeds = config.seed_urls.len(),
        workers = config.workers,
        delay_ms = config.politeness_delay.as_millis() as u64,
        ?mode,
        "starting crawl"
    );

    // A ledger that cannot be opened is the one fatal startup condition.
    let frontier = Arc::new(Frontier::initialize(
        &config.data_dir,
        &config.seed_urls,
        mode,
    )?);

    let fetcher = Arc::new(HttpClient::new(&config.user_agent, config.timeout_secs));
    let stats = Arc::new(CrawlStats::new());
    let classifier = PageClassifier::new(FingerprintStore::default(), Arc::clone(&stats));
    let politeness = HostSchedule::new(config.politeness_delay);

    let pool = CrawlerPool::new(
        config.workers,
        Arc::clone(&frontier),
        fetcher,
        classifier,
        politeness,
        Arc::clone(&stats),
    );

    let summary = pool.run().await;

    let discovered = frontier.ledger().len()?;
    let completed = frontier.ledger().completed_count()?;
    tracing::info!(discovered, completed, "crawl drained");

    let snapshot = stats.snapshot(config.top_words);
    report::print_report(&snapshot, &summary);

    if let Some(path) = &config.report_json {
        report::write_json(path, &snapshot, &summary)?;
        tracing::info!(path = %path.display(), "report written");
    }

    Ok(())
}
