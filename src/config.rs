// Tuning constants - single source of truth

use std::path::PathBuf;
use std::time::Duration;

pub struct Limits;

impl Limits {
    // URL filter
    pub const MAX_URL_LEN: usize = 2000;
    pub const MAX_QUERY_LEN: usize = 200;
    pub const MAX_PATH_DEPTH: usize = 15;
    pub const REPEATED_SEGMENT_FLOOR: usize = 8;

    // Content classifier
    pub const MAX_BODY_BYTES: usize = 8_000_000;
    pub const MIN_TEXT_RATIO: f64 = 0.05;
    pub const MIN_TOKENS: usize = 100;
    pub const MAX_TOKENS: usize = 100_000;
    pub const MIN_UNIQUE_RATIO: f64 = 0.2;

    // Near-duplicate fingerprints
    pub const FINGERPRINT_TOKENS: usize = 500;
    pub const HOST_HISTORY_CAP: usize = 1000;

    // Subdomain statistics are only tracked under this root
    pub const STATS_DOMAIN_ROOT: &'static str = ".uci.edu";
}

/// Runtime configuration assembled by the CLI layer.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub seed_urls: Vec<String>,
    pub data_dir: PathBuf,
    pub workers: usize,
    pub politeness_delay: Duration,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub restart: bool,
    pub top_words: usize,
    pub report_json: Option<PathBuf>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seed_urls: Vec::new(),
            data_dir: PathBuf::from("./data"),
            workers: 8,
            politeness_delay: Duration::from_millis(500),
            timeout_secs: 30,
            user_agent: "CampusCrawler/1.0".to_string(),
            restart: false,
            top_words: 50,
            report_json: None,
        }
    }
}
